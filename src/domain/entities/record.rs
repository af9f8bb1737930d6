//! Record entity: one short code and the URL it stands for.

use serde::{Deserialize, Serialize};

/// A stored mapping from a short code to its target URL.
///
/// `code` and `target` never change once the record is finalized; only
/// `clicks` is mutable. `id` is the store's internal sequence number and is
/// only surfaced for the sequence-encoded code strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub code: String,
    pub target: String,
    #[serde(default)]
    pub clicks: u64,
}

impl Record {
    /// Creates a fresh record with zero clicks.
    pub fn new(id: u64, code: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            target: target.into(),
            clicks: 0,
        }
    }

    /// Creates a placeholder that has an id but no code yet.
    pub fn pending(id: u64, target: impl Into<String>) -> Self {
        Self::new(id, String::new(), target)
    }

    /// Returns true while the record is waiting for its final code.
    ///
    /// Pending records are invisible to lookups.
    pub fn is_pending(&self) -> bool {
        self.code.is_empty()
    }

    /// Read-only view used by the stats endpoint.
    pub fn stats(&self) -> LinkStats {
        LinkStats {
            target: self.target.clone(),
            clicks: self.clicks,
        }
    }
}

/// Target URL and click count of a single code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub target: String,
    pub clicks: u64,
}
