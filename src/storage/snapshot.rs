//! JSON snapshot file backing the local client.
//!
//! Layout: `{"certs": [record, ...], "activity": [entry, ...]}`. Indexes are
//! not persisted; they are rebuilt by [`RecordStore::from_snapshot`].
//!
//! [`RecordStore::from_snapshot`]: crate::storage::RecordStore::from_snapshot

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{ActivityEntry, CertificateRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub certs: Vec<CertificateRecord>,
    #[serde(default)]
    pub activity: Vec<ActivityEntry>,
}

/// A snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot; a missing or unreadable file yields an empty one.
    pub fn load(&self) -> anyhow::Result<Snapshot> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Snapshot::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading snapshot {}", self.path.display()))
            }
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "snapshot unreadable, starting empty");
                Ok(Snapshot::default())
            }
        }
    }

    /// Writes through a sibling temp file so a crash never leaves half a file.
    pub fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        let raw = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing snapshot {}", self.path.display()))?;
        Ok(())
    }
}
