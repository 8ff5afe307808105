mod common;


use common::FakeNode;
use lkl_exporter::TxHashResolver;
use lkl_node_client::{NodeClient, RawBlock, TransactionInfo};
use lkl_primitives::TxHash;


#[tokio::test]
async fn genesis_needs_no_lookup() {
    let node = FakeNode::new();
    let mut resolver = TxHashResolver::new();

    let hash = resolver.resolve(&node, 0, "alice", 1590000000).await.unwrap();

    assert_eq!(hash, TxHash::Genesis);
    assert_eq!(node.calls().get_account.len(), 0);
    assert_eq!(resolver.cache_len(), 0);
}


#[tokio::test]
async fn first_matching_candidate_wins() {
    let node = FakeNode::new().with_account("alice", &[
        ("h1", 100),
        ("h2", 200),
        ("h3", 200),
        ("h4", 300),
    ]);
    let mut resolver = TxHashResolver::new();

    let hash = resolver.resolve(&node, 5, "alice", 200).await.unwrap();

    assert_eq!(hash, TxHash::Resolved("h2".into()));
    assert!(resolver.is_consumed("h2"));
    assert_eq!(node.calls().get_transaction, vec!["h1", "h2"]);
}


#[tokio::test]
async fn matched_hash_is_never_returned_again() {
    let node = FakeNode::new().with_account("alice", &[
        ("h1", 100),
        ("h2", 200),
        ("h3", 200),
    ]);
    let mut resolver = TxHashResolver::new();

    let first = resolver.resolve(&node, 5, "alice", 200).await.unwrap();
    let second = resolver.resolve(&node, 5, "alice", 200).await.unwrap();
    let third = resolver.resolve(&node, 5, "alice", 200).await.unwrap();

    assert_eq!(first, TxHash::Resolved("h2".into()));
    assert_eq!(second, TxHash::Resolved("h3".into()));
    assert_eq!(third, TxHash::Unresolved);
    assert_eq!(resolver.cache_len(), 2);
}


#[tokio::test]
async fn consumed_hashes_are_not_fetched() {
    let node = FakeNode::new().with_account("alice", &[
        ("h1", 100),
        ("h2", 200),
    ]);
    let mut resolver = TxHashResolver::new();

    resolver.resolve(&node, 1, "alice", 100).await.unwrap();
    resolver.resolve(&node, 2, "alice", 200).await.unwrap();

    assert_eq!(node.calls().get_transaction, vec!["h1", "h2"]);
}


#[tokio::test]
async fn no_match_is_unresolved() {
    let node = FakeNode::new().with_account("alice", &[("h1", 100)]);
    let mut resolver = TxHashResolver::new();

    let hash = resolver.resolve(&node, 3, "alice", 999).await.unwrap();
    assert_eq!(hash, TxHash::Unresolved);

    let hash = resolver.resolve(&node, 3, "nobody", 999).await.unwrap();
    assert_eq!(hash, TxHash::Unresolved);
    assert_eq!(resolver.cache_len(), 0);
}


#[tokio::test]
async fn node_failure_is_propagated() {
    let node = BrokenTransactions(FakeNode::new().with_account("carol", &[("h9", 1)]));
    let mut resolver = TxHashResolver::new();

    let err = resolver.resolve(&node, 3, "carol", 1).await.unwrap_err();
    assert!(format!("{:#}", err).contains("connection reset"));
    assert_eq!(resolver.cache_len(), 0);
}


struct BrokenTransactions(FakeNode);


#[async_trait::async_trait]
impl NodeClient for BrokenTransactions {
    async fn get_block(&self, number: u64) -> anyhow::Result<Option<RawBlock>> {
        self.0.get_block(number).await
    }

    async fn get_account_transactions(&self, address: &str) -> anyhow::Result<Vec<String>> {
        self.0.get_account_transactions(address).await
    }

    async fn get_transaction(&self, _hash: &str) -> anyhow::Result<TransactionInfo> {
        anyhow::bail!("connection reset")
    }
}
