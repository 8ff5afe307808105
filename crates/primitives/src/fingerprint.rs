use crate::TransactionRecord;
use std::fmt::Display;
use xxhash_rust::xxh3::Xxh3;


const FIELD_SEPARATOR: u8 = 0x1f;
/// Never occurs in UTF-8 text, so an absent value can't collide with a string.
const ABSENT: u8 = 0xff;


/// Content hash over an ordered sequence of field values.
///
/// Every value is hashed in its textual form followed by a unit separator,
/// so `("ab", "c")` and `("a", "bc")` produce different digests.
pub struct Fingerprint {
    hasher: Xxh3
}


impl Fingerprint {
    pub fn new() -> Self {
        Self {
            hasher: Xxh3::new()
        }
    }

    pub fn field(&mut self, value: impl Display) -> &mut Self {
        self.hasher.update(value.to_string().as_bytes());
        self.hasher.update(&[FIELD_SEPARATOR]);
        self
    }

    pub fn optional_field(&mut self, value: Option<impl Display>) -> &mut Self {
        match value {
            Some(value) => self.field(value),
            None => {
                self.hasher.update(&[ABSENT, FIELD_SEPARATOR]);
                self
            }
        }
    }

    pub fn finish(&self) -> String {
        format!("{:032x}", self.hasher.digest128())
    }
}


impl Default for Fingerprint {
    fn default() -> Self {
        Self::new()
    }
}


impl TransactionRecord {
    /// Key under which the record is published. Identical records always get
    /// identical keys, which lets consumers drop replays after a restart.
    pub fn fingerprint(&self) -> String {
        Fingerprint::new()
            .optional_field(self.transaction_hash.as_str())
            .field(self.kind.as_str())
            .field(&self.from)
            .field(&self.to)
            .field(self.amount)
            .field(&self.data)
            .field(self.fee)
            .field(self.timestamp)
            .field(self.depth)
            .finish()
    }
}


#[cfg(test)]
mod test {
    use super::Fingerprint;
    use crate::{TransactionKind, TransactionRecord, TxHash};


    fn record() -> TransactionRecord {
        TransactionRecord {
            transaction_hash: TxHash::Resolved("f00d".into()),
            kind: TransactionKind::Call,
            from: "alice".into(),
            to: "bob".into(),
            amount: 100,
            data: "".into(),
            fee: 2,
            timestamp: 1590000001,
            depth: 12,
        }
    }


    #[test]
    fn identical_records_share_a_key() {
        assert_eq!(record().fingerprint(), record().fingerprint());
        assert_eq!(record().fingerprint().len(), 32);
    }

    #[test]
    fn any_field_changes_the_key() {
        let base = record().fingerprint();

        let mut r = record();
        r.transaction_hash = TxHash::Unresolved;
        assert_ne!(r.fingerprint(), base);

        let mut r = record();
        r.amount += 1;
        assert_ne!(r.fingerprint(), base);

        let mut r = record();
        r.to = "carol".into();
        assert_ne!(r.fingerprint(), base);

        let mut r = record();
        r.depth = 13;
        assert_ne!(r.fingerprint(), base);

        let mut r = record();
        r.data = "00".into();
        assert_ne!(r.fingerprint(), base);
    }

    #[test]
    fn unresolved_hash_differs_from_empty_hash() {
        let mut empty = record();
        empty.transaction_hash = TxHash::Resolved(String::new());
        let mut unresolved = record();
        unresolved.transaction_hash = TxHash::Unresolved;
        assert_ne!(empty.fingerprint(), unresolved.fingerprint());
    }

    #[test]
    fn values_do_not_merge_across_fields() {
        let a = Fingerprint::new().field("ab").field("c").finish();
        let b = Fingerprint::new().field("a").field("bc").finish();
        assert_ne!(a, b);
    }
}
