#![allow(dead_code)]
use async_trait::async_trait;
use lkl_exporter::Sink;
use lkl_node_client::{NodeClient, RawBlock, RawTransaction, TransactionInfo};
use lkl_primitives::{BlockNumber, BlockRecord, TransactionRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;


pub fn tx(from: &str, to: &str, amount: u128, timestamp: u64) -> RawTransaction {
    RawTransaction {
        from: from.to_string(),
        to: to.to_string(),
        amount,
        data: String::new(),
        fee: 1,
        timestamp,
    }
}


pub fn block(depth: BlockNumber, transactions: Vec<RawTransaction>) -> RawBlock {
    RawBlock {
        depth,
        coinbase: "miner".to_string(),
        nonce: depth * 7,
        previous_block_hash: format!("hash-{}", depth.saturating_sub(1)),
        timestamp: 1590000000 + depth,
        transactions,
    }
}


#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Calls {
    pub get_block: Vec<BlockNumber>,
    pub get_account: Vec<String>,
    pub get_transaction: Vec<String>,
}


/// In-process node with a fixed chain.
#[derive(Default)]
pub struct FakeNode {
    blocks: BTreeMap<BlockNumber, RawBlock>,
    accounts: HashMap<String, Vec<String>>,
    transactions: HashMap<String, u64>,
    delays: Mutex<HashMap<BlockNumber, usize>>,
    calls: Mutex<Calls>,
}


impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, block: RawBlock) -> Self {
        self.blocks.insert(block.depth, block);
        self
    }

    /// Registers the account history as `(hash, timestamp)` pairs in node order.
    pub fn with_account(mut self, address: &str, history: &[(&str, u64)]) -> Self {
        let hashes = history.iter().map(|(hash, _)| hash.to_string()).collect();
        self.accounts.insert(address.to_string(), hashes);
        for (hash, timestamp) in history {
            self.transactions.insert(hash.to_string(), *timestamp);
        }
        self
    }

    /// Block is reported as missing for the first `misses` requests.
    pub fn with_delay(self, depth: BlockNumber, misses: usize) -> Self {
        self.delays.lock().unwrap().insert(depth, misses);
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }
}


#[async_trait]
impl NodeClient for FakeNode {
    async fn get_block(&self, number: BlockNumber) -> anyhow::Result<Option<RawBlock>> {
        self.calls.lock().unwrap().get_block.push(number);
        if let Some(misses) = self.delays.lock().unwrap().get_mut(&number) {
            if *misses > 0 {
                *misses -= 1;
                return Ok(None)
            }
        }
        Ok(self.blocks.get(&number).cloned())
    }

    async fn get_account_transactions(&self, address: &str) -> anyhow::Result<Vec<String>> {
        self.calls.lock().unwrap().get_account.push(address.to_string());
        Ok(self.accounts.get(address).cloned().unwrap_or_default())
    }

    async fn get_transaction(&self, hash: &str) -> anyhow::Result<TransactionInfo> {
        self.calls.lock().unwrap().get_transaction.push(hash.to_string());
        let timestamp = self.transactions.get(hash)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("unknown transaction {}", hash))?;
        Ok(TransactionInfo { timestamp })
    }
}


/// Sink which rejects every operation.
pub struct BrokenSink;


#[async_trait]
impl Sink for BrokenSink {
    async fn append_block(&mut self, _block: &BlockRecord) -> anyhow::Result<()> {
        anyhow::bail!("sink is down")
    }

    async fn append_transactions(&mut self, _transactions: &[TransactionRecord]) -> anyhow::Result<()> {
        anyhow::bail!("sink is down")
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        anyhow::bail!("sink is down")
    }

    async fn query_max_depth(&self) -> anyhow::Result<Option<BlockNumber>> {
        anyhow::bail!("sink is down")
    }
}
