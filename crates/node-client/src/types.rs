use lkl_primitives::serde::decode_int;
use lkl_primitives::BlockNumber;
use serde::Deserialize;


/// Block as returned by `get_block`. Transactions come without hashes.
#[derive(Deserialize, Clone, Debug)]
pub struct RawBlock {
    #[serde(deserialize_with = "decode_int")]
    pub depth: BlockNumber,
    pub coinbase: String,
    #[serde(deserialize_with = "decode_int")]
    pub nonce: u64,
    pub previous_block_hash: String,
    #[serde(deserialize_with = "decode_int")]
    pub timestamp: u64,
    pub transactions: Vec<RawTransaction>,
}


#[derive(Deserialize, Clone, Debug)]
pub struct RawTransaction {
    pub from: String,
    pub to: String,
    #[serde(deserialize_with = "decode_int")]
    pub amount: u128,
    pub data: String,
    #[serde(deserialize_with = "decode_int")]
    pub fee: u64,
    #[serde(deserialize_with = "decode_int")]
    pub timestamp: u64,
}


/// Result of `get_transaction`. Only the timestamp is needed to match a hash
/// against a block transaction, other fields are ignored.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransactionInfo {
    #[serde(deserialize_with = "decode_int")]
    pub timestamp: u64,
}


#[derive(Deserialize, Debug)]
pub(crate) struct AccountInfo {
    pub transaction_hashes: Vec<String>,
}


/// Envelope shared by all node methods.
#[derive(Deserialize, Debug)]
pub(crate) struct NodeResponse {
    pub status: String,
    #[serde(default)]
    pub result: serde_json::Value,
}
