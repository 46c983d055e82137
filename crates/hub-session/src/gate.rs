//! Role-based access gate.
//!
//! A pure decision function over the session snapshot. The caller
//! (page shell, route guard) renders whatever the decision says.

use hub_types::{Role, SessionSnapshot};

/// Decision produced by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still reconciling; show nothing yet.
    Waiting,
    /// No session; send the user to the login screen.
    RedirectToLogin,
    /// Authenticated but the role is not in the allowed set.
    RedirectToForbidden,
    /// Authenticated with an allowed role.
    Allow,
}

/// Roles admitted when a protected surface does not name its own set.
pub const DEFAULT_ALLOWED_ROLES: &[Role] = &[Role::Employee, Role::Manager, Role::Director];

/// Decide whether the current session may enter a surface restricted to
/// `allowed` roles.
///
/// The checks are ordered: a loading session always yields `Waiting`,
/// an unauthenticated one `RedirectToLogin`, and only then is the role
/// compared. Role matching is exact, with no seniority ordering.
pub fn authorize(snapshot: &SessionSnapshot, allowed: &[Role]) -> GateDecision {
    if snapshot.is_loading {
        return GateDecision::Waiting;
    }
    if !snapshot.is_authenticated {
        return GateDecision::RedirectToLogin;
    }
    match &snapshot.user {
        Some(user) if allowed.contains(&user.role) => GateDecision::Allow,
        _ => GateDecision::RedirectToForbidden,
    }
}
