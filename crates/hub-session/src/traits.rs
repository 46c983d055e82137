//! Collaborator traits for the session manager.
//!
//! Both collaborators are best-effort at the seams: the directory is
//! authoritative for profiles and credentials, while the remote session
//! service is an availability layer whose failures are tagged rather
//! than thrown.

use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use hub_types::UserRecord;

/// An authenticated session held by the remote session service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSession {
    /// Identifier of the user the session belongs to.
    pub user_id: String,
    /// Email associated with the session, when the service reports one.
    pub email: Option<String>,
}

/// Events pushed by the remote session service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSessionEvent {
    /// A session was established, possibly on another device.
    SignedIn { user_id: String },
    /// The session was revoked or signed out elsewhere.
    SignedOut,
}

/// Outcome of a best-effort remote operation.
///
/// `SoftFailure` covers degraded conditions the caller logs and moves
/// past (network down, service unreachable). `HardFailure` is a definite
/// answer from the service that the caller may need to act on.
#[derive(Debug)]
pub enum RemoteOutcome<T> {
    Ok(T),
    SoftFailure(String),
    HardFailure(AuthError),
}

impl<T> RemoteOutcome<T> {
    /// Returns true if the operation completed.
    pub fn is_ok(&self) -> bool {
        matches!(self, RemoteOutcome::Ok(_))
    }
}

/// Callback invoked for each pushed remote session event.
pub type RemoteEventListener = Box<dyn Fn(RemoteSessionEvent) + Send + Sync>;

/// Handle identifying a registered event listener.
pub type ListenerId = u64;

/// Read access to the user directory.
///
/// Lookups fail with [`AuthError::Directory`] on transport or backend
/// errors; an absent user is `Ok(None)`, never an error.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user record by exact email.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>>;

    /// Find a user record by identifier.
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<UserRecord>>;
}

/// The remote session layer.
///
/// Every async operation returns a [`RemoteOutcome`] so the session
/// manager can distinguish "service degraded" from "service said no".
#[async_trait]
pub trait RemoteSessionService: Send + Sync {
    /// Query the currently active remote session, if any.
    async fn active_session(&self) -> RemoteOutcome<Option<RemoteSession>>;

    /// Establish a remote session for the given credentials.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> RemoteOutcome<()>;

    /// Tear down the current remote session.
    async fn sign_out(&self) -> RemoteOutcome<()>;

    /// Register a listener for pushed session events.
    fn subscribe(&self, listener: RemoteEventListener) -> ListenerId;

    /// Remove a previously registered listener.
    fn unsubscribe(&self, id: ListenerId);
}
