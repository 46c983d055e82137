//! Session error types.

use thiserror::Error;

/// Session error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Email not found or password mismatch; deliberately does not say which.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A remote session names a user with no profile record
    #[error("No profile record for user {0}")]
    ProfileNotFound(String),

    /// A login or logout is already in flight (single-flight policy: reject)
    #[error("Another login or logout is already in progress")]
    OperationInFlight,

    /// Invalid transition in the session state machine
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] hub_storage::StorageError),

    /// Credential store (directory) error
    #[error("Credential store error: {0}")]
    Directory(String),

    /// Remote session service error
    #[error("Remote session error: {0}")]
    Remote(String),

    /// Any other failure during login/logout
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AuthError {
    /// Returns true for failures that must be shown as the generic
    /// "invalid email or password" message.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials)
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_message_is_generic() {
        // The user-visible message must not reveal whether the email or the
        // password was wrong.
        let message = AuthError::InvalidCredentials.to_string();
        assert_eq!(message, "Invalid email or password");
    }

    #[test]
    fn storage_error_converts() {
        let storage = hub_storage::StorageError::Encoding("bad json".to_string());
        let error: AuthError = storage.into();
        assert!(matches!(error, AuthError::Storage(_)));
    }

    #[test]
    fn is_invalid_credentials() {
        assert!(AuthError::InvalidCredentials.is_invalid_credentials());
        assert!(!AuthError::OperationInFlight.is_invalid_credentials());
    }
}
