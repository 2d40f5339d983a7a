//! In-memory certificate store.
//!
//! Records live in a vector in issuance order and are never removed, so their
//! positions double as stable handles for the two lookup indexes and for the
//! pending set.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::domain::{ActivityEntry, CertError, CertificateRecord};
use crate::storage::snapshot::Snapshot;

/// Most recent activity entries retained.
pub const ACTIVITY_CAPACITY: usize = 100;

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<CertificateRecord>,
    by_id: HashMap<String, usize>,
    by_tx: HashMap<String, usize>,
    /// Positions of records with `verified == false`, in issuance order.
    pending: BTreeSet<usize>,
    /// Newest first.
    activity: VecDeque<ActivityEntry>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the indexes from a persisted snapshot.
    ///
    /// Later duplicates of an id or transaction id are dropped so the
    /// uniqueness invariants hold even for a hand-edited file.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        for record in snapshot.certs {
            if store.insert(record.clone()).is_err() {
                tracing::warn!(id = %record.id, "skipping duplicate record in snapshot");
            }
        }
        store.activity = snapshot
            .activity
            .into_iter()
            .take(ACTIVITY_CAPACITY)
            .collect();
        store
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            certs: self.records.clone(),
            activity: self.activity.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn contains_tx(&self, tx: &str) -> bool {
        self.by_tx.contains_key(tx)
    }

    /// Adds a record to both indexes, and to the pending set when unverified.
    pub fn insert(&mut self, record: CertificateRecord) -> Result<&CertificateRecord, CertError> {
        if self.by_id.contains_key(&record.id) || self.by_tx.contains_key(&record.transaction_id) {
            return Err(CertError::DuplicateId(record.id));
        }
        let pos = self.records.len();
        self.by_id.insert(record.id.clone(), pos);
        self.by_tx.insert(record.transaction_id.clone(), pos);
        if !record.verified {
            self.pending.insert(pos);
        }
        self.records.push(record);
        Ok(&self.records[pos])
    }

    pub fn get(&self, id: &str) -> Option<&CertificateRecord> {
        self.by_id.get(id).map(|&pos| &self.records[pos])
    }

    pub fn get_by_tx(&self, tx: &str) -> Option<&CertificateRecord> {
        self.by_tx.get(tx).map(|&pos| &self.records[pos])
    }

    /// Sets `verified` and drops the record from the pending set.
    ///
    /// Returns the record and whether this call changed it.
    pub fn mark_verified(&mut self, id: &str) -> Option<(&CertificateRecord, bool)> {
        let pos = *self.by_id.get(id)?;
        let record = &mut self.records[pos];
        let changed = !record.verified;
        record.verified = true;
        self.pending.remove(&pos);
        Some((&self.records[pos], changed))
    }

    pub fn pending(&self) -> impl Iterator<Item = &CertificateRecord> {
        self.pending.iter().map(|&pos| &self.records[pos])
    }

    /// All records in issuance order.
    pub fn iter(&self) -> impl Iterator<Item = &CertificateRecord> {
        self.records.iter()
    }

    pub fn push_activity(&mut self, entry: ActivityEntry) {
        self.activity.push_front(entry);
        self.activity.truncate(ACTIVITY_CAPACITY);
    }

    pub fn recent_activity(&self, limit: usize) -> impl Iterator<Item = &ActivityEntry> {
        self.activity.iter().take(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActivityKind;
    use chrono::Utc;

    fn record(id: &str, tx: &str) -> CertificateRecord {
        CertificateRecord {
            id: id.into(),
            transaction_id: tx.into(),
            student_address: None,
            name: "Jane Doe".into(),
            degree: "B.Sc.".into(),
            major: "CS".into(),
            year: "2025".into(),
            issuer: "Mock University".into(),
            verified: false,
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn indexes_by_id_and_transaction() {
        let mut store = RecordStore::new();
        store.insert(record("a", "0x1")).unwrap();
        store.insert(record("b", "0x2")).unwrap();

        assert_eq!(store.get("b").unwrap().transaction_id, "0x2");
        assert_eq!(store.get_by_tx("0x1").unwrap().id, "a");
        assert!(store.get("c").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut store = RecordStore::new();
        store.insert(record("a", "0x1")).unwrap();
        let err = store.insert(record("a", "0x9")).unwrap_err();
        assert_eq!(err, CertError::DuplicateId("a".into()));
        assert!(!store.contains_tx("0x9"));
    }

    #[test]
    fn verifying_leaves_pending_set_in_order() {
        let mut store = RecordStore::new();
        for (id, tx) in [("a", "0x1"), ("b", "0x2"), ("c", "0x3")] {
            store.insert(record(id, tx)).unwrap();
        }

        let (rec, changed) = store.mark_verified("b").unwrap();
        assert!(rec.verified);
        assert!(changed);

        let pending: Vec<&str> = store.pending().map(|r| r.id.as_str()).collect();
        assert_eq!(pending, vec!["a", "c"]);

        let (_, changed_again) = store.mark_verified("b").unwrap();
        assert!(!changed_again);
        assert!(store.mark_verified("zzz").is_none());
    }

    #[test]
    fn activity_is_newest_first_and_bounded() {
        let mut store = RecordStore::new();
        for i in 0..(ACTIVITY_CAPACITY + 5) {
            store.push_activity(ActivityEntry {
                kind: ActivityKind::Issue,
                id: format!("c{}", i),
                transaction_id: format!("0x{}", i),
                at: Utc::now(),
                summary: String::new(),
            });
        }
        let recent: Vec<String> = store.recent_activity(2).map(|e| e.id.clone()).collect();
        assert_eq!(recent, vec![format!("c{}", ACTIVITY_CAPACITY + 4), format!("c{}", ACTIVITY_CAPACITY + 3)]);
        assert_eq!(store.recent_activity(usize::MAX).count(), ACTIVITY_CAPACITY);
    }

    #[test]
    fn snapshot_restores_pending_state() {
        let mut store = RecordStore::new();
        store.insert(record("a", "0x1")).unwrap();
        store.insert(record("b", "0x2")).unwrap();
        store.mark_verified("a");

        let restored = RecordStore::from_snapshot(store.to_snapshot());
        assert!(restored.get("a").unwrap().verified);
        let pending: Vec<&str> = restored.pending().map(|r| r.id.as_str()).collect();
        assert_eq!(pending, vec!["b"]);
        assert_eq!(restored.get_by_tx("0x2").unwrap().id, "b");
    }
}
