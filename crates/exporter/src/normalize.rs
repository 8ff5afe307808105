use crate::errors::DepthMismatch;
use crate::resolver::TxHashResolver;
use lkl_node_client::{NodeClient, RawBlock};
use lkl_primitives::{BlockNumber, BlockRecord, TransactionKind, TransactionRecord};


pub fn normalize_block(height: BlockNumber, raw: &RawBlock) -> anyhow::Result<BlockRecord> {
    if raw.depth != height {
        return Err(DepthMismatch {
            requested: height,
            received: raw.depth
        }.into())
    }

    Ok(BlockRecord {
        depth: raw.depth,
        coinbase: raw.coinbase.clone(),
        nonce: raw.nonce,
        previous_block_hash: raw.previous_block_hash.clone(),
        timestamp: raw.timestamp,
    })
}


/// Converts block transactions in block order, resolving the hash of each one.
pub async fn normalize_transactions<C: NodeClient + ?Sized>(
    raw: &RawBlock,
    client: &C,
    resolver: &mut TxHashResolver
) -> anyhow::Result<Vec<TransactionRecord>>
{
    let mut records = Vec::with_capacity(raw.transactions.len());

    for tx in raw.transactions.iter() {
        let transaction_hash = resolver.resolve(client, raw.depth, &tx.from, tx.timestamp).await?;
        records.push(TransactionRecord {
            transaction_hash,
            kind: TransactionKind::Call,
            from: tx.from.clone(),
            to: tx.to.clone(),
            amount: tx.amount,
            data: tx.data.clone(),
            fee: tx.fee,
            timestamp: tx.timestamp,
            depth: raw.depth,
        });
    }

    Ok(records)
}
