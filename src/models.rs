use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Identity (the Persisted Record) ---

/// Role
///
/// The closed set of principals the portal knows about. Every place that picks a
/// landing path or a route tree matches on this exhaustively, so a new role is a
/// compile error everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Student,
    Teacher,
    Admin,
    Parent,
}

impl Role {
    /// Wire spelling, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::Parent => "parent",
        }
    }

    /// Human readable label for headers and sidebars. Display only.
    pub fn display_label(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Admin => "Administrator",
            Role::Parent => "Parent",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity
///
/// One authenticated principal, exactly as it is persisted under the session key.
/// The profile attributes are carried for feature screens and never inspected by
/// the access-control core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    // Any JSON number; the value is passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    #[schema(value_type = Option<f64>)]
    pub semester: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,
}

impl Identity {
    /// Builds the minimal identity; profile attributes start empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Returns the first required attribute that is blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.id.trim().is_empty() {
            Some("id")
        } else if self.name.trim().is_empty() {
            Some("name")
        } else if self.email.trim().is_empty() {
            Some("email")
        } else {
            None
        }
    }

    /// Label shown by surrounding UI. A roleless identity reads as a student here,
    /// but gating never treats it as one.
    pub fn display_role(&self) -> &'static str {
        self.role.unwrap_or(Role::Student).display_label()
    }
}

// --- Session ---

/// Phase
///
/// `Loading` until the persisted record has been read once; `Resolved` forever after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Loading,
    Resolved,
}

/// SessionState
///
/// The accessor tuple every consumer reads: `{ user, isAuthenticated, isLoading }`.
/// It is a snapshot; holding one never observes later logins or logouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionState {
    pub user: Option<Identity>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl SessionState {
    pub fn loading() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            user: Some(identity),
            is_authenticated: true,
            is_loading: false,
        }
    }

    /// Role of the live identity, `None` when logged out or roleless.
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(|user| user.role)
    }
}

// --- Navigation payloads ---

/// ScreenView
///
/// What a successful navigation hands to the feature layer: which tree and screen
/// were reached, plus the identity the screen should render for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ScreenView {
    pub tree: String,
    pub screen: String,
    pub title: String,
    pub user: Option<Identity>,
}

/// NavigationOutcome
///
/// JSON description of a resolution, returned by `GET /api/navigate` so a client
/// can ask where a path leads without following it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "outcome", rename_all = "camelCase")]
#[ts(export)]
pub enum NavigationOutcome {
    Render { view: ScreenView },
    Redirect { location: String },
    Pending,
    NotFound,
}

/// NavigateQuery
///
/// Query parameters for `GET /api/navigate`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct NavigateQuery {
    /// The path to resolve, e.g. `/teacher/profile`.
    pub path: String,
}

/// ErrorResponse
///
/// Body of every non-navigation failure returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
