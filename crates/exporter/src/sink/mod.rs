use async_trait::async_trait;
use lkl_primitives::{BlockNumber, BlockRecord, TransactionRecord};


mod clickhouse;
mod kafka;
mod memory;


pub use clickhouse::*;
pub use kafka::*;
pub use memory::*;


pub type SinkBox = Box<dyn Sink>;


/// Durable destination for exported records.
///
/// Appended records are only guaranteed to be stored after a successful
/// [Sink::flush]. There is no atomicity between the block and its transactions.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn append_block(&mut self, block: &BlockRecord) -> anyhow::Result<()>;

    async fn append_transactions(&mut self, transactions: &[TransactionRecord]) -> anyhow::Result<()>;

    async fn flush(&mut self) -> anyhow::Result<()>;

    /// Highest block depth stored so far, `None` for an empty sink.
    async fn query_max_depth(&self) -> anyhow::Result<Option<BlockNumber>>;
}


#[async_trait]
impl Sink for SinkBox {
    #[inline]
    async fn append_block(&mut self, block: &BlockRecord) -> anyhow::Result<()> {
        self.as_mut().append_block(block).await
    }

    #[inline]
    async fn append_transactions(&mut self, transactions: &[TransactionRecord]) -> anyhow::Result<()> {
        self.as_mut().append_transactions(transactions).await
    }

    #[inline]
    async fn flush(&mut self) -> anyhow::Result<()> {
        self.as_mut().flush().await
    }

    #[inline]
    async fn query_max_depth(&self) -> anyhow::Result<Option<BlockNumber>> {
        self.as_ref().query_max_depth().await
    }
}
