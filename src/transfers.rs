//! Transfer ledger: an independent log of value-transfer records.
//!
//! Records are keyed by a globally unique 32-byte hash and carry a
//! monotonic sequence number in assignment order. Three lookup paths:
//! exact hash, insertion order (with pagination), and participant
//! address. The ledger has no dependency on the other stores.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{notify, EventHandler, LedgerEvent};
use crate::types::{now_timestamp, Address, Amount, TxHash};

/// An immutable value-transfer record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferRecord {
    pub hash: TxHash,
    pub sender: Address,
    pub receiver: Address,
    pub amount: Amount,
    /// Unix seconds at recording.
    pub created_at: i64,
    /// 1-based position in assignment order.
    pub sequence_number: u64,
}

/// Transfer ledger operation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The all-zero hash is not a valid transfer identifier.
    #[error("transfer hash cannot be empty")]
    EmptyHash,

    /// The sender identity is the reserved zero address.
    #[error("sender address cannot be zero")]
    InvalidSender,

    /// The receiver identity is the reserved zero address.
    #[error("receiver address cannot be zero")]
    InvalidReceiver,

    /// Transfers must move a positive amount.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// The hash was already recorded.
    #[error("transfer {0} already recorded")]
    DuplicateHash(TxHash),

    /// No record under that hash.
    #[error("transfer {0} not found")]
    NotFound(TxHash),

    /// Positional lookup past the end of the ledger.
    #[error("index {index} out of bounds for {total} transfers")]
    IndexOutOfBounds { index: usize, total: usize },
}

/// Append-only transfer log with hash, positional, and per-address
/// indices.
pub struct TransferLedger {
    records: Vec<TransferRecord>,
    by_hash: HashMap<TxHash, usize>,
    by_address: HashMap<Address, Vec<usize>>,
    next_sequence: u64,
    observers: Vec<EventHandler>,
}

impl TransferLedger {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            by_hash: HashMap::new(),
            by_address: HashMap::new(),
            next_sequence: 1,
            observers: Vec::new(),
        }
    }

    /// Register an observer invoked after each successful recording.
    pub fn subscribe(&mut self, observer: EventHandler) {
        self.observers.push(observer);
    }

    /// Record a transfer under a fresh unique hash.
    ///
    /// Checks, in order: non-zero hash, non-zero sender, non-zero
    /// receiver, positive amount, hash not already recorded. A failed
    /// attempt mutates nothing. On success the record is indexed by
    /// hash, by insertion order, and under each participant address;
    /// a self-transfer appears once in that single address's list.
    /// Emits [`LedgerEvent::TransferRecorded`].
    pub fn record(
        &mut self,
        hash: TxHash,
        sender: Address,
        receiver: Address,
        amount: Amount,
    ) -> Result<TransferRecord, TransferError> {
        if hash.is_zero() {
            return Err(TransferError::EmptyHash);
        }
        if sender.is_zero() {
            return Err(TransferError::InvalidSender);
        }
        if receiver.is_zero() {
            return Err(TransferError::InvalidReceiver);
        }
        if amount == 0 {
            return Err(TransferError::InvalidAmount);
        }
        if self.by_hash.contains_key(&hash) {
            return Err(TransferError::DuplicateHash(hash));
        }

        let record = TransferRecord {
            hash,
            sender,
            receiver,
            amount,
            created_at: now_timestamp(),
            sequence_number: self.next_sequence,
        };
        self.next_sequence += 1;

        let index = self.records.len();
        self.records.push(record.clone());
        self.by_hash.insert(hash, index);
        self.by_address.entry(sender).or_default().push(index);
        if receiver != sender {
            self.by_address.entry(receiver).or_default().push(index);
        }
        tracing::debug!(
            hash = %hash,
            sender = %sender,
            receiver = %receiver,
            amount,
            sequence = record.sequence_number,
            "transfer recorded"
        );

        notify(
            &self.observers,
            &LedgerEvent::TransferRecorded {
                hash,
                sender,
                receiver,
                amount,
                sequence_number: record.sequence_number,
                timestamp: record.created_at,
            },
        );
        Ok(record)
    }

    /// Exact lookup by hash.
    pub fn get(&self, hash: TxHash) -> Result<&TransferRecord, TransferError> {
        self.by_hash
            .get(&hash)
            .map(|&i| &self.records[i])
            .ok_or(TransferError::NotFound(hash))
    }

    /// Positional lookup in insertion order (0-based).
    pub fn get_by_index(&self, index: usize) -> Result<&TransferRecord, TransferError> {
        self.records.get(index).ok_or(TransferError::IndexOutOfBounds {
            index,
            total: self.records.len(),
        })
    }

    /// All records in insertion order.
    pub fn get_all(&self) -> &[TransferRecord] {
        &self.records
    }

    /// Records where `address` is sender or receiver, in insertion
    /// order. Unknown addresses yield an empty list.
    pub fn get_by_address(&self, address: Address) -> Vec<&TransferRecord> {
        self.by_address
            .get(&address)
            .map(|indices| indices.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Up to `limit` records starting at `offset` in insertion order.
    /// Short or empty slices near or past the end, never an error.
    pub fn get_paginated(&self, offset: usize, limit: usize) -> &[TransferRecord] {
        let start = offset.min(self.records.len());
        let end = offset.saturating_add(limit).min(self.records.len());
        &self.records[start..end]
    }

    pub fn get_total(&self) -> usize {
        self.records.len()
    }

    /// Whether the hash has been recorded. No-fail.
    pub fn is_recorded(&self, hash: TxHash) -> bool {
        self.by_hash.contains_key(&hash)
    }
}

impl Default for TransferLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn hash(n: u64) -> TxHash {
        TxHash::from_low_u64(n)
    }

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn record_stores_and_indexes() {
        let mut ledger = TransferLedger::new();
        let record = ledger.record(hash(1), addr(1), addr(2), 100).unwrap();

        assert_eq!(record.sequence_number, 1);
        assert_eq!(ledger.get_total(), 1);
        assert!(ledger.is_recorded(hash(1)));
        assert_eq!(ledger.get(hash(1)).unwrap(), &record);
        assert_eq!(ledger.get_by_index(0).unwrap(), &record);
        assert_eq!(ledger.get_by_address(addr(1)), [&record]);
        assert_eq!(ledger.get_by_address(addr(2)), [&record]);
    }

    #[test]
    fn validation_order_and_no_mutation_on_failure() {
        let mut ledger = TransferLedger::new();

        // Everything invalid at once: the empty hash is reported first.
        assert_eq!(
            ledger.record(TxHash::ZERO, Address::ZERO, Address::ZERO, 0).unwrap_err(),
            TransferError::EmptyHash
        );
        assert_eq!(
            ledger.record(hash(1), Address::ZERO, Address::ZERO, 0).unwrap_err(),
            TransferError::InvalidSender
        );
        assert_eq!(
            ledger.record(hash(1), addr(1), Address::ZERO, 0).unwrap_err(),
            TransferError::InvalidReceiver
        );
        assert_eq!(
            ledger.record(hash(1), addr(1), addr(2), 0).unwrap_err(),
            TransferError::InvalidAmount
        );
        assert_eq!(ledger.get_total(), 0);
    }

    #[test]
    fn duplicate_hash_rejected_and_total_unchanged() {
        let mut ledger = TransferLedger::new();
        ledger.record(hash(1), addr(1), addr(2), 100).unwrap();

        let err = ledger.record(hash(1), addr(2), addr(1), 200).unwrap_err();
        assert_eq!(err, TransferError::DuplicateHash(hash(1)));
        assert_eq!(ledger.get_total(), 1);
        // Original record untouched.
        assert_eq!(ledger.get(hash(1)).unwrap().amount, 100);
        assert_eq!(ledger.get_by_address(addr(1)).len(), 1);
    }

    #[test]
    fn sequence_numbers_are_monotonic_and_gap_free() {
        let mut ledger = TransferLedger::new();
        for i in 1..=5 {
            let record = ledger.record(hash(i), addr(1), addr(2), 10 * i as u128).unwrap();
            assert_eq!(record.sequence_number, i);
        }
        // A failed duplicate does not consume a sequence number.
        let _ = ledger.record(hash(3), addr(1), addr(2), 1);
        let record = ledger.record(hash(6), addr(1), addr(2), 1).unwrap();
        assert_eq!(record.sequence_number, 6);
    }

    #[test]
    fn address_index_spans_both_roles() {
        let mut ledger = TransferLedger::new();
        ledger.record(hash(1), addr(1), addr(2), 100).unwrap();
        ledger.record(hash(2), addr(2), addr(1), 200).unwrap();
        ledger.record(hash(3), addr(3), addr(4), 300).unwrap();

        let for_addr1 = ledger.get_by_address(addr(1));
        assert_eq!(for_addr1.len(), 2);
        assert_eq!(for_addr1[0].hash, hash(1));
        assert_eq!(for_addr1[1].hash, hash(2));
        assert_eq!(ledger.get_by_address(addr(3)).len(), 1);
        assert!(ledger.get_by_address(addr(9)).is_empty());
    }

    #[test]
    fn self_transfer_appears_once_in_own_address_list() {
        let mut ledger = TransferLedger::new();
        ledger.record(hash(1), addr(1), addr(1), 50).unwrap();

        let list = ledger.get_by_address(addr(1));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].sender, list[0].receiver);
        assert_eq!(ledger.get_total(), 1);
    }

    #[test]
    fn lookups_fail_cleanly() {
        let ledger = TransferLedger::new();
        assert_eq!(
            ledger.get(hash(9)).unwrap_err(),
            TransferError::NotFound(hash(9))
        );
        assert_eq!(
            ledger.get_by_index(0).unwrap_err(),
            TransferError::IndexOutOfBounds { index: 0, total: 0 }
        );
        assert!(!ledger.is_recorded(hash(9)));
    }

    #[test]
    fn pagination_reconstructs_the_full_log() {
        let mut ledger = TransferLedger::new();
        for i in 1..=7 {
            ledger.record(hash(i), addr(1), addr(2), i as u128).unwrap();
        }

        let limit = 3;
        let mut rebuilt: Vec<TransferRecord> = Vec::new();
        let mut offset = 0;
        loop {
            let page = ledger.get_paginated(offset, limit);
            if page.is_empty() {
                break;
            }
            rebuilt.extend_from_slice(page);
            offset += limit;
        }
        assert_eq!(rebuilt, ledger.get_all());
    }

    #[test]
    fn pagination_edges() {
        let mut ledger = TransferLedger::new();
        ledger.record(hash(1), addr(1), addr(2), 1).unwrap();
        ledger.record(hash(2), addr(1), addr(2), 2).unwrap();

        assert_eq!(ledger.get_paginated(0, 1).len(), 1);
        assert_eq!(ledger.get_paginated(1, 10).len(), 1);
        assert!(ledger.get_paginated(2, 1).is_empty());
        assert!(ledger.get_paginated(100, 10).is_empty());
        assert_eq!(ledger.get_paginated(0, usize::MAX).len(), 2);
    }

    #[test]
    fn recording_emits_event_with_sequence() {
        let mut ledger = TransferLedger::new();
        let events: Arc<Mutex<Vec<LedgerEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        ledger.subscribe(Arc::new(move |event| sink.lock().unwrap().push(event.clone())));

        ledger.record(hash(1), addr(1), addr(2), 100).unwrap();
        let _ = ledger.record(hash(1), addr(1), addr(2), 100); // duplicate, no event

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            LedgerEvent::TransferRecorded {
                sequence_number: 1,
                amount: 100,
                ..
            }
        ));
    }
}
