//! Session lifecycle for the Skills Hub client.
//!
//! The session is an explicit finite state machine driven by the
//! [`SessionManager`], which reconciles the durable session slot with a
//! best-effort remote session service and exposes a role-based access
//! gate over the resulting snapshot.

pub mod error;
pub mod fsm;
pub mod gate;
pub mod manager;
pub mod password;
pub mod traits;

pub use error::{AuthError, AuthResult};
pub use fsm::{
    SessionChangedPayload, SessionMachine, SessionMachineInput, SessionMachineState, SessionState,
};
pub use gate::{authorize, GateDecision, DEFAULT_ALLOWED_ROLES};
pub use manager::{RemoteEventsGuard, SessionCallback, SessionManager};
pub use traits::{
    CredentialStore, ListenerId, RemoteEventListener, RemoteOutcome, RemoteSession,
    RemoteSessionEvent, RemoteSessionService,
};
