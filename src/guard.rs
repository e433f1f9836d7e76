use std::collections::HashSet;
use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    models::{Identity, Role, SessionState},
    routes::TreeKind,
    session::SessionManagerState,
};

/// Entry path of the public tree; where unauthenticated visitors are sent.
pub const PUBLIC_ENTRY_PATH: &str = "/auth";

/// Landing path of an identity with no role-specific tree.
pub const DEFAULT_LANDING_PATH: &str = "/";

/// GateDecision
///
/// The outcome of a single gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the wrapped content.
    Allow,
    /// The session is still loading: render a neutral placeholder, decide nothing.
    Defer,
    /// Send the visitor elsewhere.
    Redirect(String),
}

/// Root of the role tree an identity lands on after login or after being turned
/// away from a foreign tree.
/// Roles without a tree of their own land on the common root.
pub fn landing_path_for_role(role: Option<Role>) -> &'static str {
    role.and_then(TreeKind::for_role)
        .and_then(|kind| kind.root())
        .unwrap_or(DEFAULT_LANDING_PATH)
}

pub fn landing_path(identity: &Identity) -> &'static str {
    landing_path_for_role(identity.role)
}

/// Gate
///
/// A decision function over the current session. Gates hold no session state of
/// their own; callers pass a fresh snapshot on every navigation.
pub trait Gate: Send + Sync {
    fn evaluate(&self, state: &SessionState) -> GateDecision;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// PublicGate
///
/// Wraps screens meant only for visitors who are not logged in. A logged-in
/// identity is bounced to its own landing path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicGate;

impl Gate for PublicGate {
    fn evaluate(&self, state: &SessionState) -> GateDecision {
        if state.is_loading {
            return GateDecision::Defer;
        }
        match &state.user {
            Some(user) if state.is_authenticated => {
                GateDecision::Redirect(landing_path(user).to_string())
            }
            _ => GateDecision::Allow,
        }
    }

    fn name(&self) -> &'static str {
        "public"
    }
}

/// ProtectedGate
///
/// Wraps every authenticated-only screen, regardless of role.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtectedGate;

impl Gate for ProtectedGate {
    fn evaluate(&self, state: &SessionState) -> GateDecision {
        if state.is_loading {
            GateDecision::Defer
        } else if !state.is_authenticated {
            GateDecision::Redirect(PUBLIC_ENTRY_PATH.to_string())
        } else {
            GateDecision::Allow
        }
    }

    fn name(&self) -> &'static str {
        "protected"
    }
}

/// RoleGate
///
/// Narrows a subtree to a set of roles. A logged-in identity with the wrong role
/// (or no role at all) is a valid user, so it is sent home rather than shown an
/// error.
#[derive(Debug, Clone)]
pub struct RoleGate {
    allowed: HashSet<Role>,
}

impl RoleGate {
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn only(role: Role) -> Self {
        Self::new([role])
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

impl Gate for RoleGate {
    fn evaluate(&self, state: &SessionState) -> GateDecision {
        if state.is_loading {
            return GateDecision::Defer;
        }
        let user = match &state.user {
            Some(user) if state.is_authenticated => user,
            _ => return GateDecision::Redirect(PUBLIC_ENTRY_PATH.to_string()),
        };
        match user.role {
            Some(role) if self.allows(role) => GateDecision::Allow,
            _ => GateDecision::Redirect(landing_path(user).to_string()),
        }
    }

    fn name(&self) -> &'static str {
        "role"
    }
}

/// CurrentSession Extractor
///
/// Hands a handler the session snapshot as of this request. It never rejects:
/// deciding what a logged-out or loading session may see is the gates' job.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionState);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    SessionManagerState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let manager = SessionManagerState::from_ref(state);
        Ok(CurrentSession(manager.state()))
    }
}
