//! Session state machine using rust-fsm.
//!
//! This module defines an explicit finite state machine for the client
//! session, replacing implicit state derivation from storage checks.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │    Restoring    │ (initial: startup reconciliation in progress)
//! └────────┬────────┘
//!          │ LocalProfileFound / RemoteProfileFound
//!          │                     NothingRestored
//!          ▼                           ▼
//! ┌─────────────────┐          ┌─────────────────┐
//! │    SignedIn     │◄─────────│    SignedOut    │
//! └────────┬────────┘  Login-  └─────────────────┘
//!          │           Succeeded        ▲
//!          │ (via LoggingIn)            │ LoginFailed
//!          │                            │
//!          │ LogoutRequested            │
//!          ▼                            │
//! ┌─────────────────┐  LogoutFinished   │
//! │   LoggingOut    │ ──────────────────┘
//! └─────────────────┘
//!
//! SignedIn additionally accepts:
//!   RemoteSignedOut   => SignedOut   (session revoked elsewhere)
//!   RemoteUserChanged => SignedIn    (profile refetched)
//! ```

use hub_types::{SessionSnapshot, UserProfile};
use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Define the FSM using rust-fsm's declarative macro.
// This generates a module `session_machine` with:
// - session_machine::State (enum)
// - session_machine::Input (enum)
// - session_machine::StateMachine (type alias)
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Restoring)

    Restoring => {
        // Persisted slot parsed; trusted without a remote round trip
        LocalProfileFound => SignedIn,
        // Slot empty/corrupt but the remote session resolved to a profile
        RemoteProfileFound => SignedIn,
        // Neither source produced a session
        NothingRestored => SignedOut
    },
    SignedOut => {
        LoginAttempt => LoggingIn
    },
    LoggingIn => {
        LoginSucceeded => SignedIn,
        LoginFailed => SignedOut
    },
    SignedIn => {
        LogoutRequested => LoggingOut,
        // Revocation pushed by the remote session service
        RemoteSignedOut => SignedOut,
        // Remote session re-established, possibly as a different user
        RemoteUserChanged => SignedIn
    },
    LoggingOut => {
        LogoutFinished => SignedOut
    }
}

// Re-export the generated types with clearer names
pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// User-friendly session state for external consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Startup reconciliation in progress.
    Restoring,
    /// No current session.
    SignedOut,
    /// Login in flight.
    LoggingIn,
    /// Authenticated with a current profile.
    SignedIn,
    /// Logout in flight.
    LoggingOut,
}

impl SessionState {
    /// Returns true if the user has a valid session (SignedIn state only).
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::SignedIn)
    }

    /// Returns true if the state is a transient/in-progress state.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            SessionState::Restoring | SessionState::LoggingIn | SessionState::LoggingOut
        )
    }

    /// Build the consumer-facing snapshot for this state.
    ///
    /// Only `SignedIn` carries a user; every other state maps to
    /// `(false, None, is_loading)`, which keeps the illegal snapshot
    /// combinations unreachable.
    pub fn snapshot(&self, user: Option<&UserProfile>) -> SessionSnapshot {
        match self {
            SessionState::SignedIn => SessionSnapshot {
                is_authenticated: true,
                user: user.cloned(),
                is_loading: false,
            },
            other => SessionSnapshot {
                is_authenticated: false,
                user: None,
                is_loading: other.is_loading(),
            },
        }
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Restoring => SessionState::Restoring,
            SessionMachineState::SignedOut => SessionState::SignedOut,
            SessionMachineState::LoggingIn => SessionState::LoggingIn,
            SessionMachineState::SignedIn => SessionState::SignedIn,
            SessionMachineState::LoggingOut => SessionState::LoggingOut,
        }
    }
}

/// Payload for session state change notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionChangedPayload {
    /// Current session state.
    pub state: SessionState,
    /// Consumer-facing snapshot at the time of the change.
    pub snapshot: SessionSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_types::Role;

    fn sample_profile() -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            name: "Test".to_string(),
            email: "t@anvik-soft.com".to_string(),
            role: Role::Employee,
            department: String::new(),
            position: String::new(),
            avatar_url: String::new(),
        }
    }

    #[test]
    fn test_initial_state_is_restoring() {
        let machine = SessionMachine::new();
        assert_eq!(*machine.state(), SessionMachineState::Restoring);
    }

    #[test]
    fn test_restore_local_fast_path() {
        let mut machine = SessionMachine::new();

        machine
            .consume(&SessionMachineInput::LocalProfileFound)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedIn);
    }

    #[test]
    fn test_restore_remote_fallback() {
        let mut machine = SessionMachine::new();

        machine
            .consume(&SessionMachineInput::RemoteProfileFound)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedIn);
    }

    #[test]
    fn test_restore_settles_signed_out() {
        let mut machine = SessionMachine::new();

        machine
            .consume(&SessionMachineInput::NothingRestored)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_login_flow() {
        let mut machine = SessionMachine::new();
        machine
            .consume(&SessionMachineInput::NothingRestored)
            .unwrap();

        let result = machine.consume(&SessionMachineInput::LoginAttempt);
        assert!(result.is_ok());
        assert_eq!(*machine.state(), SessionMachineState::LoggingIn);

        let result = machine.consume(&SessionMachineInput::LoginSucceeded);
        assert!(result.is_ok());
        assert_eq!(*machine.state(), SessionMachineState::SignedIn);
    }

    #[test]
    fn test_login_failure_returns_to_signed_out() {
        let mut machine = SessionMachine::new();
        machine
            .consume(&SessionMachineInput::NothingRestored)
            .unwrap();

        machine.consume(&SessionMachineInput::LoginAttempt).unwrap();
        machine.consume(&SessionMachineInput::LoginFailed).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_logout_flow() {
        let mut machine = SessionMachine::new();
        machine
            .consume(&SessionMachineInput::LocalProfileFound)
            .unwrap();

        machine
            .consume(&SessionMachineInput::LogoutRequested)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::LoggingOut);

        machine
            .consume(&SessionMachineInput::LogoutFinished)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_remote_revocation() {
        let mut machine = SessionMachine::new();
        machine
            .consume(&SessionMachineInput::LocalProfileFound)
            .unwrap();

        machine
            .consume(&SessionMachineInput::RemoteSignedOut)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_remote_user_change_keeps_signed_in() {
        let mut machine = SessionMachine::new();
        machine
            .consume(&SessionMachineInput::LocalProfileFound)
            .unwrap();

        machine
            .consume(&SessionMachineInput::RemoteUserChanged)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedIn);
    }

    #[test]
    fn test_cannot_login_before_reconciliation_settles() {
        let mut machine = SessionMachine::new();

        let result = machine.consume(&SessionMachineInput::LoginAttempt);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_transition_returns_error() {
        let mut machine = SessionMachine::new();
        machine
            .consume(&SessionMachineInput::NothingRestored)
            .unwrap();

        // Can't logout when signed out
        let result = machine.consume(&SessionMachineInput::LogoutRequested);
        assert!(result.is_err());

        // Can't claim LoginSucceeded without a LoginAttempt
        let result = machine.consume(&SessionMachineInput::LoginSucceeded);
        assert!(result.is_err());

        // A remote sign-in event is not a valid way to become authenticated
        let result = machine.consume(&SessionMachineInput::RemoteUserChanged);
        assert!(result.is_err());
    }

    #[test]
    fn test_session_state_conversion() {
        assert_eq!(
            SessionState::from(&SessionMachineState::Restoring),
            SessionState::Restoring
        );
        assert_eq!(
            SessionState::from(&SessionMachineState::SignedOut),
            SessionState::SignedOut
        );
        assert_eq!(
            SessionState::from(&SessionMachineState::LoggingIn),
            SessionState::LoggingIn
        );
        assert_eq!(
            SessionState::from(&SessionMachineState::SignedIn),
            SessionState::SignedIn
        );
        assert_eq!(
            SessionState::from(&SessionMachineState::LoggingOut),
            SessionState::LoggingOut
        );
    }

    #[test]
    fn test_session_state_is_authenticated() {
        assert!(!SessionState::Restoring.is_authenticated());
        assert!(!SessionState::SignedOut.is_authenticated());
        assert!(!SessionState::LoggingIn.is_authenticated());
        assert!(SessionState::SignedIn.is_authenticated());
        assert!(!SessionState::LoggingOut.is_authenticated());
    }

    #[test]
    fn test_session_state_is_loading() {
        assert!(SessionState::Restoring.is_loading());
        assert!(!SessionState::SignedOut.is_loading());
        assert!(SessionState::LoggingIn.is_loading());
        assert!(!SessionState::SignedIn.is_loading());
        assert!(SessionState::LoggingOut.is_loading());
    }

    #[test]
    fn test_snapshot_legal_combinations_only() {
        let profile = sample_profile();

        // Settled authenticated
        let snapshot = SessionState::SignedIn.snapshot(Some(&profile));
        assert!(snapshot.is_authenticated && snapshot.user.is_some() && !snapshot.is_loading);

        // Settled unauthenticated
        let snapshot = SessionState::SignedOut.snapshot(None);
        assert!(!snapshot.is_authenticated && snapshot.user.is_none() && !snapshot.is_loading);

        // Transient states never expose a user even if one is passed
        for state in [
            SessionState::Restoring,
            SessionState::LoggingIn,
            SessionState::LoggingOut,
        ] {
            let snapshot = state.snapshot(Some(&profile));
            assert!(!snapshot.is_authenticated);
            assert!(snapshot.user.is_none());
            assert!(snapshot.is_loading);
        }
    }
}
