//! Storage key constants.

/// Storage keys used by the portal client
pub struct StorageKeys;

impl StorageKeys {
    /// Serialized current user profile (JSON)
    pub const SESSION_PROFILE: &'static str = "session_profile";
}
