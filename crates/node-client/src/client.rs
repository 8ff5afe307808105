use crate::types::{RawBlock, TransactionInfo};
use async_trait::async_trait;
use lkl_primitives::BlockNumber;


/// Read access to a LikeLib node.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Returns `None` when the block is not produced yet.
    async fn get_block(&self, number: BlockNumber) -> anyhow::Result<Option<RawBlock>>;

    /// Hashes of all transactions the account took part in, in node order.
    async fn get_account_transactions(&self, address: &str) -> anyhow::Result<Vec<String>>;

    async fn get_transaction(&self, hash: &str) -> anyhow::Result<TransactionInfo>;
}


#[async_trait]
impl<C: NodeClient + ?Sized> NodeClient for std::sync::Arc<C> {
    #[inline]
    async fn get_block(&self, number: BlockNumber) -> anyhow::Result<Option<RawBlock>> {
        self.as_ref().get_block(number).await
    }

    #[inline]
    async fn get_account_transactions(&self, address: &str) -> anyhow::Result<Vec<String>> {
        self.as_ref().get_account_transactions(address).await
    }

    #[inline]
    async fn get_transaction(&self, hash: &str) -> anyhow::Result<TransactionInfo> {
        self.as_ref().get_transaction(hash).await
    }
}
