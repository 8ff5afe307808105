use crate::sink::Sink;
use lkl_primitives::BlockNumber;
use tracing::{info, warn};


/// Picks the first block to export from what the sink already holds.
///
/// Resumes right after the highest stored block. An empty sink or a failed
/// query both start from block 0.
pub async fn recover<S: Sink + ?Sized>(sink: &S) -> BlockNumber {
    match sink.query_max_depth().await {
        Ok(Some(depth)) => {
            let next = depth.saturating_add(1);
            info!("sink holds blocks till #{}, resuming from #{}", depth, next);
            next
        },
        Ok(None) => {
            warn!("sink has no blocks yet, starting with block 0");
            0
        },
        Err(err) => {
            warn!(error =? err, "failed to get the last block from the sink, starting with block 0");
            0
        }
    }
}
