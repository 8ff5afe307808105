use anyhow::Context;
use lkl_node_client::NodeClient;
use lkl_primitives::{BlockNumber, TxHash};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};


/// Recovers transaction hashes which the node omits from block reads.
///
/// A transaction is matched against the sender's history by timestamp.
/// Every matched hash is remembered for the rest of the run, so two transactions
/// of one sender never resolve to the same hash. The set only grows.
#[derive(Debug, Default)]
pub struct TxHashResolver {
    resolved: HashSet<String>
}


impl TxHashResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_consumed(&self, hash: &str) -> bool {
        self.resolved.contains(hash)
    }

    #[instrument(level = "debug", skip(self, client))]
    pub async fn resolve<C: NodeClient + ?Sized>(
        &mut self,
        client: &C,
        depth: BlockNumber,
        from: &str,
        timestamp: u64
    ) -> anyhow::Result<TxHash>
    {
        if depth == 0 {
            return Ok(TxHash::Genesis)
        }

        let history = client.get_account_transactions(from)
            .await
            .with_context(|| format!("failed to get transaction history of {}", from))?;

        let mut inspected = 0;
        for hash in history {
            if self.resolved.contains(&hash) {
                continue
            }
            inspected += 1;

            let tx = client.get_transaction(&hash)
                .await
                .with_context(|| format!("failed to get transaction {}", hash))?;

            if tx.timestamp == timestamp {
                debug!(inspected, hash = %hash, "transaction hash resolved");
                self.resolved.insert(hash.clone());
                return Ok(TxHash::Resolved(hash))
            }
        }

        warn!(depth, from, timestamp, inspected, "no transaction in the sender history matches the timestamp");
        Ok(TxHash::Unresolved)
    }
}
