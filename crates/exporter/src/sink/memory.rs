use crate::sink::Sink;
use async_trait::async_trait;
use lkl_primitives::{BlockNumber, BlockRecord, TransactionRecord};


/// Keeps records in process memory. Appends become visible on flush.
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Vec<BlockRecord>,
    transactions: Vec<TransactionRecord>,
    pending_blocks: Vec<BlockRecord>,
    pending_transactions: Vec<TransactionRecord>,
    flushes: usize,
}


impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: impl IntoIterator<Item = BlockRecord>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn blocks(&self) -> &[BlockRecord] {
        &self.blocks
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}


#[async_trait]
impl Sink for MemorySink {
    async fn append_block(&mut self, block: &BlockRecord) -> anyhow::Result<()> {
        self.pending_blocks.push(block.clone());
        Ok(())
    }

    async fn append_transactions(&mut self, transactions: &[TransactionRecord]) -> anyhow::Result<()> {
        self.pending_transactions.extend_from_slice(transactions);
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        self.blocks.append(&mut self.pending_blocks);
        self.transactions.append(&mut self.pending_transactions);
        self.flushes += 1;
        Ok(())
    }

    async fn query_max_depth(&self) -> anyhow::Result<Option<BlockNumber>> {
        Ok(self.blocks.iter().map(|b| b.depth).max())
    }
}
