//! Session manager: login/logout orchestration and startup reconciliation.

use crate::error::{AuthError, AuthResult};
use crate::fsm::{
    SessionChangedPayload, SessionMachine, SessionMachineInput, SessionMachineState, SessionState,
};
use crate::gate::{self, GateDecision};
use crate::password;
use crate::traits::{
    CredentialStore, ListenerId, RemoteOutcome, RemoteSessionEvent, RemoteSessionService,
};
use hub_storage::SessionSlot;
use hub_types::{Role, SessionSnapshot, UserProfile};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, warn};

/// Callback invoked on every session state change.
pub type SessionCallback = Box<dyn Fn(SessionChangedPayload) + Send + Sync>;

/// Orchestrates the session lifecycle.
///
/// Owns the state machine, the durable session slot, and the two
/// collaborators: the user directory (authoritative for credentials and
/// profiles) and the remote session service (best-effort availability
/// layer). Locks are never held across an await.
pub struct SessionManager {
    slot: SessionSlot,
    directory: Arc<dyn CredentialStore>,
    remote: Arc<dyn RemoteSessionService>,
    fsm: Mutex<SessionMachine>,
    current: Mutex<Option<UserProfile>>,
    state_callback: Mutex<Option<SessionCallback>>,
    in_flight: AtomicBool,
}

impl SessionManager {
    /// Create a session manager in the `Restoring` state.
    ///
    /// Callers must run [`restore_session`](Self::restore_session) once
    /// before login or logout become legal.
    pub fn new(
        slot: SessionSlot,
        directory: Arc<dyn CredentialStore>,
        remote: Arc<dyn RemoteSessionService>,
    ) -> Self {
        Self {
            slot,
            directory,
            remote,
            fsm: Mutex::new(SessionMachine::new()),
            current: Mutex::new(None),
            state_callback: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Register the callback fired on every state change.
    pub fn set_state_callback(&self, callback: SessionCallback) {
        *self.state_callback.lock().unwrap() = Some(callback);
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        SessionState::from(&*self.fsm.lock().unwrap().state())
    }

    /// Consumer-facing snapshot of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        let user = self.current.lock().unwrap().clone();
        state.snapshot(user.as_ref())
    }

    /// Reconcile local and remote session sources at startup.
    ///
    /// Local-first: a parseable slot is trusted without any remote call.
    /// Only an empty or corrupt slot consults the remote session service,
    /// and every failure on that path settles the session as signed out
    /// rather than leaving it loading. Returns whether a session was
    /// restored.
    pub async fn restore_session(&self) -> AuthResult<bool> {
        match self.slot.read_profile() {
            Ok(Some(profile)) => {
                info!(user_id = %profile.id, "Restored session from local slot");
                *self.current.lock().unwrap() = Some(profile);
                self.transition(&SessionMachineInput::LocalProfileFound)?;
                return Ok(true);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Discarding corrupt session slot: {}", e);
                self.slot.clear();
            }
        }

        match self.remote.active_session().await {
            RemoteOutcome::Ok(Some(session)) => match self.directory.find_by_id(&session.user_id).await {
                Ok(Some(record)) => {
                    let profile = UserProfile::from(record);
                    if let Err(e) = self.slot.write_profile(&profile) {
                        warn!("Failed to persist restored session: {}", e);
                    }
                    info!(user_id = %profile.id, "Restored session from remote");
                    *self.current.lock().unwrap() = Some(profile);
                    self.transition(&SessionMachineInput::RemoteProfileFound)?;
                    return Ok(true);
                }
                Ok(None) => {
                    warn!(
                        user_id = %session.user_id,
                        "Remote session has no profile record; signing out remotely"
                    );
                    match self.remote.sign_out().await {
                        RemoteOutcome::Ok(()) => {}
                        RemoteOutcome::SoftFailure(reason) => {
                            debug!("Remote sign-out unavailable: {}", reason);
                        }
                        RemoteOutcome::HardFailure(e) => {
                            warn!("Remote sign-out rejected: {}", e);
                        }
                    }
                }
                Err(e) => {
                    warn!("Profile lookup failed during restore: {}", e);
                }
            },
            RemoteOutcome::Ok(None) => {}
            RemoteOutcome::SoftFailure(reason) => {
                debug!("Remote session check unavailable: {}", reason);
            }
            RemoteOutcome::HardFailure(e) => {
                warn!("Remote session check failed: {}", e);
            }
        }

        self.transition(&SessionMachineInput::NothingRestored)?;
        Ok(false)
    }

    /// Authenticate with email and password.
    ///
    /// The directory is the authority: the profile is persisted and the
    /// session published before the remote session layer is even
    /// contacted, and a remote failure degrades to a log line. Email or
    /// password mismatch both surface as the same
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password_input: &str) -> AuthResult<()> {
        let _guard = OperationGuard::acquire(&self.in_flight)?;
        self.transition(&SessionMachineInput::LoginAttempt)?;

        let record = match self.directory.find_by_email(email).await {
            Ok(record) => record,
            Err(e) => {
                let _ = self.transition(&SessionMachineInput::LoginFailed);
                return Err(e);
            }
        };

        let record = match record {
            Some(record) if password::verify(password_input, &record.password) => record,
            _ => {
                debug!(%email, "Login rejected");
                let _ = self.transition(&SessionMachineInput::LoginFailed);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let profile = UserProfile::from(record);

        // The slot must hold the profile before the session is observable.
        if let Err(e) = self.slot.write_profile(&profile) {
            warn!("Failed to persist session: {}", e);
            let _ = self.transition(&SessionMachineInput::LoginFailed);
            return Err(e.into());
        }

        info!(user_id = %profile.id, role = %profile.role.as_str(), "Login succeeded");
        *self.current.lock().unwrap() = Some(profile);
        self.transition(&SessionMachineInput::LoginSucceeded)?;

        match self.remote.sign_in_with_password(email, password_input).await {
            RemoteOutcome::Ok(()) => {}
            RemoteOutcome::SoftFailure(reason) => {
                debug!("Remote sign-in unavailable: {}", reason);
            }
            RemoteOutcome::HardFailure(e) => {
                warn!("Remote sign-in rejected: {}", e);
            }
        }

        Ok(())
    }

    /// Terminate the session.
    ///
    /// Local teardown cannot fail and the operation is idempotent; a
    /// remote sign-out failure is logged, never surfaced.
    pub async fn logout(&self) -> AuthResult<()> {
        let _guard = OperationGuard::acquire(&self.in_flight)?;

        // Ignored when not signed in, which makes logout safe to call twice.
        let _ = self.transition(&SessionMachineInput::LogoutRequested);

        self.slot.clear();
        *self.current.lock().unwrap() = None;
        let _ = self.transition(&SessionMachineInput::LogoutFinished);

        match self.remote.sign_out().await {
            RemoteOutcome::Ok(()) => {}
            RemoteOutcome::SoftFailure(reason) => {
                debug!("Remote sign-out unavailable: {}", reason);
            }
            RemoteOutcome::HardFailure(e) => {
                warn!("Remote sign-out rejected: {}", e);
            }
        }

        info!("Logout complete");
        Ok(())
    }

    /// Whether the current session holds one of the given roles.
    pub fn has_permission(&self, allowed: &[Role]) -> bool {
        matches!(self.authorize(allowed), GateDecision::Allow)
    }

    /// Run the access gate for a surface restricted to `allowed` roles.
    pub fn authorize(&self, allowed: &[Role]) -> GateDecision {
        gate::authorize(&self.snapshot(), allowed)
    }

    /// React to an event pushed by the remote session service.
    ///
    /// Events only matter while signed in; anything arriving in another
    /// state is dropped. A revocation evicts the local session. A remote
    /// sign-in refetches the named profile, and an unknown profile is
    /// treated as a revocation with a best-effort remote sign-out.
    ///
    /// Every mutation re-consults the state machine under its lock: a
    /// rejected transition means the session ended while the event (or
    /// its profile refetch) was in flight, and the slot and in-memory
    /// profile are left alone.
    pub async fn handle_remote_event(&self, event: RemoteSessionEvent) {
        match event {
            RemoteSessionEvent::SignedOut => {
                if self.evict_session() {
                    info!("Session revoked remotely");
                } else {
                    debug!("Ignoring remote sign-out outside an active session");
                }
            }
            RemoteSessionEvent::SignedIn { user_id } => {
                if !matches!(*self.fsm.lock().unwrap().state(), SessionMachineState::SignedIn) {
                    debug!(%user_id, "Ignoring remote sign-in outside an active session");
                    return;
                }
                match self.directory.find_by_id(&user_id).await {
                    Ok(Some(record)) => {
                        if self.apply_refetched_profile(UserProfile::from(record)) {
                            info!(%user_id, "Remote session user refreshed");
                        } else {
                            debug!(%user_id, "Session ended during profile refetch");
                        }
                    }
                    Ok(None) => {
                        warn!(%user_id, "Remote session names an unknown user; evicting");
                        if self.evict_session() {
                            match self.remote.sign_out().await {
                                RemoteOutcome::Ok(()) => {}
                                RemoteOutcome::SoftFailure(reason) => {
                                    debug!("Remote sign-out unavailable: {}", reason);
                                }
                                RemoteOutcome::HardFailure(e) => {
                                    warn!("Remote sign-out rejected: {}", e);
                                }
                            }
                        } else {
                            debug!(%user_id, "Session ended during profile refetch");
                        }
                    }
                    Err(e) => {
                        // Keep the existing session rather than evicting on
                        // a transient lookup failure.
                        warn!(%user_id, "Profile refetch failed: {}", e);
                    }
                }
            }
        }
    }

    /// Clear the session if the machine accepts the remote revocation.
    ///
    /// The slot and in-memory profile are only touched while the machine
    /// lock is held and the `RemoteSignedOut` transition has been
    /// accepted, so a concurrent logout cannot interleave.
    fn evict_session(&self) -> bool {
        let state = {
            let mut fsm = self.fsm.lock().unwrap();
            if fsm.consume(&SessionMachineInput::RemoteSignedOut).is_err() {
                return false;
            }
            self.slot.clear();
            *self.current.lock().unwrap() = None;
            SessionState::from(fsm.state())
        };
        self.notify(state);
        true
    }

    /// Install a refetched profile if the machine accepts the change.
    ///
    /// Same locking discipline as [`Self::evict_session`]: the slot is
    /// written only once `RemoteUserChanged` has been accepted, so a
    /// logout that finished during the refetch leaves the slot empty.
    fn apply_refetched_profile(&self, profile: UserProfile) -> bool {
        let state = {
            let mut fsm = self.fsm.lock().unwrap();
            if fsm.consume(&SessionMachineInput::RemoteUserChanged).is_err() {
                return false;
            }
            if let Err(e) = self.slot.write_profile(&profile) {
                warn!("Failed to persist refetched profile: {}", e);
            }
            *self.current.lock().unwrap() = Some(profile);
            SessionState::from(fsm.state())
        };
        self.notify(state);
        true
    }

    /// Subscribe this manager to pushed remote session events.
    ///
    /// The listener holds only a weak reference, so dropping the manager
    /// ends delivery even if the guard outlives it. Dropping the returned
    /// guard unsubscribes.
    pub fn attach_remote_events(self: &Arc<Self>) -> RemoteEventsGuard {
        let weak: Weak<SessionManager> = Arc::downgrade(self);
        let id = self.remote.subscribe(Box::new(move |event| {
            if let Some(manager) = weak.upgrade() {
                tokio::spawn(async move {
                    manager.handle_remote_event(event).await;
                });
            }
        }));
        RemoteEventsGuard {
            service: Arc::clone(&self.remote),
            id,
        }
    }

    /// Feed an input to the state machine and publish the new state.
    fn transition(&self, input: &SessionMachineInput) -> AuthResult<()> {
        let state = {
            let mut fsm = self.fsm.lock().unwrap();
            fsm.consume(input).map_err(|_| {
                AuthError::InvalidStateTransition(format!(
                    "{:?} rejected in state {:?}",
                    input,
                    fsm.state()
                ))
            })?;
            SessionState::from(fsm.state())
        };
        debug!(?state, "Session state changed");
        self.notify(state);
        Ok(())
    }

    fn notify(&self, state: SessionState) {
        let snapshot = {
            let user = self.current.lock().unwrap();
            state.snapshot(user.as_ref())
        };
        if let Some(callback) = self.state_callback.lock().unwrap().as_ref() {
            callback(SessionChangedPayload { state, snapshot });
        }
    }
}

/// Unsubscribes the session manager from remote events on drop.
pub struct RemoteEventsGuard {
    service: Arc<dyn RemoteSessionService>,
    id: ListenerId,
}

impl Drop for RemoteEventsGuard {
    fn drop(&mut self) {
        self.service.unsubscribe(self.id);
    }
}

/// Single-flight guard over login/logout.
///
/// A second operation starting while one is in flight is rejected with
/// [`AuthError::OperationInFlight`] instead of being queued.
struct OperationGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> OperationGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> AuthResult<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AuthError::OperationInFlight);
        }
        Ok(Self { flag })
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
