use lkl_primitives::BlockNumber;
use std::fmt::{Display, Formatter};


/// The node answered a block request with a different block.
#[derive(Debug)]
pub struct DepthMismatch {
    pub requested: BlockNumber,
    pub received: BlockNumber
}


impl Display for DepthMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "block #{} was requested, but the node returned block #{}",
            self.requested,
            self.received
        )
    }
}


impl std::error::Error for DepthMismatch {}
