//! High-level API for the single session slot.

use crate::{ProfileStorage, StorageError, StorageKeys, StorageResult};
use hub_types::UserProfile;

/// The durable slot holding the current user profile, if any.
///
/// The slot mirrors the in-memory session byte-for-byte: it is written
/// exactly once per successful login and cleared on logout. A corrupt
/// value surfaces as [`StorageError::Encoding`] so the caller can discard
/// it and fall back to remote reconciliation.
pub struct SessionSlot {
    storage: Box<dyn ProfileStorage>,
}

impl SessionSlot {
    /// Create a session slot over the given storage backend.
    pub fn new(storage: Box<dyn ProfileStorage>) -> Self {
        Self { storage }
    }

    /// Read the persisted profile.
    ///
    /// Returns `Ok(None)` when the slot is empty, `Err(Encoding)` when the
    /// stored value does not parse.
    pub fn read_profile(&self) -> StorageResult<Option<UserProfile>> {
        match self.storage.get(StorageKeys::SESSION_PROFILE)? {
            Some(json) => {
                let profile: UserProfile = serde_json::from_str(&json)
                    .map_err(|e| StorageError::Encoding(e.to_string()))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Write the profile to the slot, replacing any previous value.
    pub fn write_profile(&self, profile: &UserProfile) -> StorageResult<()> {
        let json =
            serde_json::to_string(profile).map_err(|e| StorageError::Encoding(e.to_string()))?;
        self.storage.set(StorageKeys::SESSION_PROFILE, &json)
    }

    /// Check whether the slot holds a value (parseable or not).
    pub fn has_profile(&self) -> StorageResult<bool> {
        self.storage.has(StorageKeys::SESSION_PROFILE)
    }

    /// Clear the slot. Delete failures are logged, never surfaced.
    pub fn clear(&self) {
        if let Err(e) = self.storage.delete(StorageKeys::SESSION_PROFILE) {
            tracing::warn!("Failed to clear session slot: {}", e);
        }
    }
}
