use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::atomic::AtomicU64;


lazy_static::lazy_static! {
    pub static ref PROGRESS: Gauge<f64, AtomicU64> = Default::default();
    pub static ref LAST_BLOCK: Gauge = Default::default();
    pub static ref LAST_BLOCK_TIMESTAMP: Gauge = Default::default();
    pub static ref EXPORTED_BLOCKS: Counter = Default::default();
    pub static ref EXPORTED_TRANSACTIONS: Counter = Default::default();
    pub static ref UNRESOLVED_TRANSACTIONS: Counter = Default::default();
}


pub fn register_metrics(registry: &mut Registry) {
    registry.register(
        "lkl_progress_blocks_per_second",
        "Overall block processing speed",
        PROGRESS.clone()
    );
    registry.register(
        "lkl_last_block",
        "Last exported block",
        LAST_BLOCK.clone()
    );
    registry.register(
        "lkl_last_block_timestamp",
        "Timestamp of the last exported block",
        LAST_BLOCK_TIMESTAMP.clone()
    );
    registry.register(
        "lkl_exported_blocks",
        "Number of blocks written to the sink",
        EXPORTED_BLOCKS.clone()
    );
    registry.register(
        "lkl_exported_transactions",
        "Number of transactions written to the sink",
        EXPORTED_TRANSACTIONS.clone()
    );
    registry.register(
        "lkl_unresolved_transactions",
        "Number of transactions written without a hash",
        UNRESOLVED_TRANSACTIONS.clone()
    );
}
