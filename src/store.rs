//! Explicit store abstraction for verification records, injected into
//! callers instead of a process-wide singleton.

use crate::error::Result;
use crate::schema::IncomeVerification;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Keyed persistence for verifications, ordered most-recently-created
/// first. The whole collection is the unit of persistence and must
/// round-trip through serialization without losing the aggregate
/// invariants.
pub trait VerificationStore {
    /// Inserts a new verification at the front, or replaces an existing
    /// one in place (preserving its position) when the id is known.
    fn save(&self, verification: IncomeVerification) -> Result<()>;
    fn get(&self, id: Uuid) -> Result<Option<IncomeVerification>>;
    fn list(&self) -> Result<Vec<IncomeVerification>>;
    /// Returns whether a record was removed.
    fn delete(&self, id: Uuid) -> Result<bool>;
}

/// In-memory store for tests and single-process hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    verifications: Arc<RwLock<Vec<IncomeVerification>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.verifications.write().unwrap().clear();
    }

    pub fn to_json(&self) -> Result<String> {
        let verifications = self.verifications.read().unwrap();
        Ok(serde_json::to_string_pretty(&*verifications)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let verifications: Vec<IncomeVerification> = serde_json::from_str(json)?;
        Ok(Self {
            verifications: Arc::new(RwLock::new(verifications)),
        })
    }
}

impl VerificationStore for MemoryStore {
    fn save(&self, verification: IncomeVerification) -> Result<()> {
        let mut verifications = self.verifications.write().unwrap();
        if let Some(existing) = verifications.iter_mut().find(|v| v.id == verification.id) {
            *existing = verification;
        } else {
            verifications.insert(0, verification);
        }
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<IncomeVerification>> {
        Ok(self
            .verifications
            .read()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<IncomeVerification>> {
        Ok(self.verifications.read().unwrap().clone())
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let mut verifications = self.verifications.write().unwrap();
        let before = verifications.len();
        verifications.retain(|v| v.id != id);
        Ok(verifications.len() < before)
    }
}
