//! Issuance, verification and lookup of certificates.
//!
//! `CertificateService` owns the [`RecordStore`]; every mutation of a record
//! goes through one of its methods. One instance is built per process (or per
//! local snapshot load) and handed to whoever serves requests.

use chrono::Utc;

use crate::crypto::ids;
use crate::domain::validation::validate_submission;
use crate::domain::{
    ActivityEntry, ActivityKind, CertError, CertificateRecord, IssueReceipt, Submission,
};
use crate::storage::{RecordStore, Snapshot};

/// Issuer recorded when a submission does not name one.
pub const DEFAULT_ISSUER: &str = "Mock University";

/// Entries shown in the issuer activity feed.
pub const ISSUER_FEED_LEN: usize = 10;

pub struct CertificateService {
    store: RecordStore,
    default_issuer: String,
}

impl Default for CertificateService {
    fn default() -> Self {
        Self::new(DEFAULT_ISSUER)
    }
}

impl CertificateService {
    pub fn new(default_issuer: impl Into<String>) -> Self {
        Self::with_store(RecordStore::new(), default_issuer)
    }

    pub fn with_store(store: RecordStore, default_issuer: impl Into<String>) -> Self {
        Self {
            store,
            default_issuer: default_issuer.into(),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot, default_issuer: impl Into<String>) -> Self {
        Self::with_store(RecordStore::from_snapshot(snapshot), default_issuer)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.to_snapshot()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    // --- Issuance ---

    /// Validates `submission` and stores it as a pending certificate.
    pub fn issue(&mut self, submission: Submission) -> Result<IssueReceipt, CertError> {
        validate_submission(&submission)?;

        let id = submission.id.trim().to_string();
        if self.store.contains_id(&id) {
            tracing::warn!(%id, "rejecting duplicate certificate");
            return Err(CertError::DuplicateId(id));
        }

        let mut transaction_id = ids::new_transaction_id();
        while self.store.contains_tx(&transaction_id) {
            transaction_id = ids::new_transaction_id();
        }

        let issuer = submission
            .issuer
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.default_issuer.as_str())
            .to_string();

        let record = CertificateRecord {
            id: id.clone(),
            transaction_id: transaction_id.clone(),
            student_address: submission.student_address().map(str::to_string),
            name: submission.name.trim().to_string(),
            degree: submission.degree.trim().to_string(),
            major: submission.major.trim().to_string(),
            year: submission.year.trim().to_string(),
            issuer,
            verified: false,
            issued_at: Utc::now(),
        };
        let summary = record.summary();
        let issued_at = record.issued_at;
        self.store.insert(record)?;
        self.store.push_activity(ActivityEntry {
            kind: ActivityKind::Issue,
            id: id.clone(),
            transaction_id: transaction_id.clone(),
            at: issued_at,
            summary,
        });

        tracing::info!(%id, tx = %transaction_id, "certificate issued, pending verification");
        Ok(IssueReceipt { transaction_id, id })
    }

    // --- Verification ---

    /// Marks a certificate verified and removes it from the pending set.
    ///
    /// Verifying an already verified certificate changes nothing and returns
    /// the record as it is.
    pub fn verify(&mut self, id: &str) -> Result<CertificateRecord, CertError> {
        let (record, changed) = self
            .store
            .mark_verified(id)
            .ok_or_else(|| CertError::not_found_cid(id))?;
        let record = record.clone();

        if changed {
            self.store.push_activity(ActivityEntry {
                kind: ActivityKind::Verify,
                id: record.id.clone(),
                transaction_id: record.transaction_id.clone(),
                at: Utc::now(),
                summary: format!("Verified {}", record.summary()),
            });
            tracing::info!(id = %record.id, "certificate verified");
        } else {
            tracing::debug!(id = %record.id, "certificate already verified");
        }
        Ok(record)
    }

    // --- Lookup ---

    pub fn by_id(&self, id: &str) -> Result<CertificateRecord, CertError> {
        tracing::debug!(%id, "lookup by cid");
        self.store
            .get(id)
            .cloned()
            .ok_or_else(|| CertError::not_found_cid(id))
    }

    pub fn by_transaction_id(&self, tx: &str) -> Result<CertificateRecord, CertError> {
        tracing::debug!(%tx, "lookup by transaction");
        self.store
            .get_by_tx(tx)
            .cloned()
            .ok_or_else(|| CertError::not_found_tx(tx))
    }

    /// Unverified certificates in issuance order.
    pub fn pending(&self) -> Vec<CertificateRecord> {
        self.store.pending().cloned().collect()
    }

    /// Certificates held by `address` (case-insensitive); every certificate
    /// when no address is given.
    pub fn student_certificates(&self, address: Option<&str>) -> Vec<CertificateRecord> {
        let wanted = address.map(str::trim).filter(|a| !a.is_empty());
        self.store
            .iter()
            .filter(|r| match wanted {
                None => true,
                Some(addr) => r
                    .student_address
                    .as_deref()
                    .is_some_and(|own| own.eq_ignore_ascii_case(addr)),
            })
            .cloned()
            .collect()
    }

    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityEntry> {
        self.store.recent_activity(limit).cloned().collect()
    }
}
