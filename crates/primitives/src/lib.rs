mod fingerprint;
mod records;
pub mod serde;


pub use fingerprint::*;
pub use records::*;


pub type BlockNumber = u64;
