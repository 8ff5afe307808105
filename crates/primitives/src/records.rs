use crate::BlockNumber;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};


pub const GENESIS_TX_HASH: &str = "genesis";


/// Flat block row as it is written to a sink.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlockRecord {
    pub depth: BlockNumber,
    pub coinbase: String,
    pub nonce: u64,
    pub previous_block_hash: String,
    pub timestamp: u64,
}


/// Identity of a transaction.
///
/// The node does not return hashes in block reads, so a hash is either known
/// by convention (genesis), recovered from the sender's history, or missing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TxHash {
    Genesis,
    Resolved(String),
    Unresolved,
}


impl TxHash {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TxHash::Genesis => Some(GENESIS_TX_HASH),
            TxHash::Resolved(hash) => Some(hash),
            TxHash::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, TxHash::Unresolved)
    }
}


impl Display for TxHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str().unwrap_or("<unresolved>"))
    }
}


impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_str().serialize(serializer)
    }
}


impl <'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            None => TxHash::Unresolved,
            Some(hash) if hash == GENESIS_TX_HASH => TxHash::Genesis,
            Some(hash) => TxHash::Resolved(hash),
        })
    }
}


#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Call,
}


impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Call => "call",
        }
    }
}


/// Flat transaction row as it is written to a sink.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    pub transaction_hash: TxHash,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub from: String,
    pub to: String,
    pub amount: u128,
    pub data: String,
    pub fee: u64,
    pub timestamp: u64,
    pub depth: BlockNumber,
}
