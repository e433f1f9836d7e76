//! Route Tree Dispatcher
//!
//! Partitions every navigable path into five trees and decides, for a path and the
//! current session, what the visitor ends up seeing. Four trees own a path prefix
//! (`/auth`, `/student`, `/teacher`, `/admin`); the `common` tree owns whatever is
//! left and is consulted last so it can never shadow a role tree.
//!
//! Each tree is wrapped by exactly one gate, chosen by its kind:
//! public → `PublicGate`, role trees → `RoleGate({that role})`, common → `ProtectedGate`.
use std::collections::HashSet;

use crate::{
    error::RouteTableError,
    guard::{Gate, GateDecision, ProtectedGate, PublicGate, RoleGate},
    models::{NavigationOutcome, Role, ScreenView, SessionState},
};

/// Screens reachable by visitors who are not logged in.
pub mod public;

/// Screens restricted to the 'student' role.
pub mod student;

/// Screens restricted to the 'teacher' role.
pub mod teacher;

/// Screens restricted to the 'admin' role.
pub mod admin;

/// Screens any logged-in role may reach. Evaluated last.
pub mod common;

/// TreeKind
///
/// The five route trees, listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Public,
    Student,
    Teacher,
    Admin,
    Common,
}

impl TreeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TreeKind::Public => "public",
            TreeKind::Student => "student",
            TreeKind::Teacher => "teacher",
            TreeKind::Admin => "admin",
            TreeKind::Common => "common",
        }
    }

    /// Position in the fixed evaluation order.
    fn precedence(&self) -> u8 {
        match self {
            TreeKind::Public => 0,
            TreeKind::Student => 1,
            TreeKind::Teacher => 2,
            TreeKind::Admin => 3,
            TreeKind::Common => 4,
        }
    }

    /// The gate every route of this tree sits behind.
    pub fn gate(&self) -> Box<dyn Gate> {
        match self {
            TreeKind::Public => Box::new(PublicGate),
            TreeKind::Student => Box::new(RoleGate::only(Role::Student)),
            TreeKind::Teacher => Box::new(RoleGate::only(Role::Teacher)),
            TreeKind::Admin => Box::new(RoleGate::only(Role::Admin)),
            TreeKind::Common => Box::new(ProtectedGate),
        }
    }

    /// The role tree owned by `role`, if it has one.
    pub fn for_role(role: Role) -> Option<TreeKind> {
        match role {
            Role::Student => Some(TreeKind::Student),
            Role::Teacher => Some(TreeKind::Teacher),
            Role::Admin => Some(TreeKind::Admin),
            Role::Parent => None,
        }
    }

    /// The prefix this tree owns, which doubles as its root screen. `common`
    /// owns no prefix.
    pub fn root(&self) -> Option<&'static str> {
        match self {
            TreeKind::Public => Some(public::PREFIX),
            TreeKind::Student => Some(student::PREFIX),
            TreeKind::Teacher => Some(teacher::PREFIX),
            TreeKind::Admin => Some(admin::PREFIX),
            TreeKind::Common => None,
        }
    }
}

/// Screen
///
/// One navigable leaf of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub path: String,
    pub title: String,
}

/// RouteTree
///
/// A named set of screens, optionally owning a path prefix, behind one gate.
pub struct RouteTree {
    kind: TreeKind,
    prefix: Option<String>,
    screens: Vec<Screen>,
    gate: Box<dyn Gate>,
}

impl std::fmt::Debug for RouteTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTree")
            .field("kind", &self.kind)
            .field("prefix", &self.prefix)
            .field("screens", &self.screens)
            .field("gate", &self.gate.name())
            .finish()
    }
}

impl RouteTree {
    pub fn new(kind: TreeKind, prefix: Option<&str>) -> Self {
        Self {
            kind,
            prefix: prefix.map(normalize_path),
            screens: Vec::new(),
            gate: kind.gate(),
        }
    }

    /// Adds a screen. The path is normalized; validation happens when the tree
    /// joins a `RouteTable`.
    pub fn screen(mut self, path: &str, title: &str) -> Self {
        self.screens.push(Screen {
            path: normalize_path(path),
            title: title.to_string(),
        });
        self
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Whether this tree's prefix covers `path`. The common tree claims nothing
    /// here; it is the fallback.
    fn claims(&self, path: &str) -> bool {
        self.prefix
            .as_deref()
            .is_some_and(|prefix| prefix_covers(prefix, path))
    }

    fn find_screen(&self, path: &str) -> Option<&Screen> {
        self.screens.iter().find(|screen| screen.path == path)
    }
}

/// Resolution
///
/// What a navigation ends in.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Render(ScreenView),
    Redirect(String),
    /// The session is still loading; show a neutral placeholder.
    Pending,
    NotFound,
}

impl From<Resolution> for NavigationOutcome {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Render(view) => NavigationOutcome::Render { view },
            Resolution::Redirect(location) => NavigationOutcome::Redirect { location },
            Resolution::Pending => NavigationOutcome::Pending,
            Resolution::NotFound => NavigationOutcome::NotFound,
        }
    }
}

/// RouteTable
///
/// A validated set of trees. Construction rejects overlapping prefixes, so at
/// runtime a path belongs to at most one prefixed tree.
#[derive(Debug)]
pub struct RouteTable {
    trees: Vec<RouteTree>,
}

impl RouteTable {
    /// new
    ///
    /// Validates and orders the trees:
    /// - the common tree has no prefix; every other tree has one, and it is not `/`.
    /// - no two prefixed trees share or nest prefixes.
    /// - every screen of a prefixed tree lies under that prefix.
    /// - no common screen lies under any prefixed tree.
    /// - no screen path or tree kind appears twice.
    pub fn new(mut trees: Vec<RouteTree>) -> Result<Self, RouteTableError> {
        trees.sort_by_key(|tree| tree.kind.precedence());

        let mut kinds = HashSet::new();
        for tree in &trees {
            if !kinds.insert(tree.kind) {
                return Err(RouteTableError::DuplicateTree {
                    tree: tree.kind.name().to_string(),
                });
            }
            match (tree.kind, tree.prefix()) {
                (TreeKind::Common, Some(prefix)) => {
                    return Err(RouteTableError::InvalidPath {
                        path: prefix.to_string(),
                        reason: "the common tree takes no prefix",
                    });
                }
                (TreeKind::Common, None) => {}
                (_, None) => {
                    return Err(RouteTableError::InvalidPath {
                        path: String::new(),
                        reason: "prefixed trees require a prefix",
                    });
                }
                (_, Some("/")) => {
                    return Err(RouteTableError::InvalidPath {
                        path: "/".to_string(),
                        reason: "a tree prefix cannot be the root",
                    });
                }
                (_, Some(_)) => {}
            }
        }

        for (i, first) in trees.iter().enumerate() {
            for second in &trees[i + 1..] {
                if let (Some(a), Some(b)) = (first.prefix(), second.prefix()) {
                    if prefix_covers(a, b) || prefix_covers(b, a) {
                        return Err(RouteTableError::Overlap {
                            first: first.kind.name().to_string(),
                            second: second.kind.name().to_string(),
                            prefix: if a.len() >= b.len() { a } else { b }.to_string(),
                        });
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        for tree in &trees {
            for screen in &tree.screens {
                if !seen.insert(screen.path.as_str()) {
                    return Err(RouteTableError::DuplicateScreen {
                        screen: screen.path.clone(),
                    });
                }
                if tree.kind == TreeKind::Common {
                    if let Some(owner) = trees.iter().find(|other| other.claims(&screen.path)) {
                        return Err(RouteTableError::ShadowedCommonScreen {
                            screen: screen.path.clone(),
                            owner: owner.kind.name().to_string(),
                        });
                    }
                } else if !tree.claims(&screen.path) {
                    return Err(RouteTableError::ScreenOutsideTree {
                        tree: tree.kind.name().to_string(),
                        screen: screen.path.clone(),
                    });
                }
            }
        }

        Ok(Self { trees })
    }

    /// The portal's own route table.
    pub fn standard() -> Result<Self, RouteTableError> {
        Self::new(vec![
            public::public_routes(),
            student::student_routes(),
            teacher::teacher_routes(),
            admin::admin_routes(),
            common::common_routes(),
        ])
    }

    pub fn trees(&self) -> &[RouteTree] {
        &self.trees
    }

    /// tree_for
    ///
    /// The tree a path belongs to: the prefixed tree with the longest matching
    /// prefix, or else the common tree.
    pub fn tree_for(&self, path: &str) -> Option<&RouteTree> {
        let path = normalize_path(path);
        self.trees
            .iter()
            .filter(|tree| tree.claims(&path))
            .max_by_key(|tree| tree.prefix().map_or(0, str::len))
            .or_else(|| self.trees.iter().find(|tree| tree.kind == TreeKind::Common))
    }

    /// resolve
    ///
    /// Runs the owning tree's gate against `state` and, if it allows, looks the
    /// screen up. A path no tree claims is handled as the common tree would: the
    /// protected gate decides between a redirect and NotFound.
    pub fn resolve(&self, path: &str, state: &SessionState) -> Resolution {
        let path = normalize_path(path);

        let Some(tree) = self.tree_for(&path) else {
            let resolution = match ProtectedGate.evaluate(state) {
                GateDecision::Defer => Resolution::Pending,
                GateDecision::Redirect(target) => Resolution::Redirect(target),
                GateDecision::Allow => Resolution::NotFound,
            };
            tracing::debug!(%path, tree = "none", ?resolution, "Navigation resolved");
            return resolution;
        };

        let decision = tree.gate.evaluate(state);
        let resolution = match decision {
            GateDecision::Defer => Resolution::Pending,
            GateDecision::Redirect(target) => Resolution::Redirect(target),
            GateDecision::Allow => match tree.find_screen(&path) {
                Some(screen) => Resolution::Render(ScreenView {
                    tree: tree.kind.name().to_string(),
                    screen: screen.path.clone(),
                    title: screen.title.clone(),
                    user: state.user.clone(),
                }),
                None => Resolution::NotFound,
            },
        };

        tracing::debug!(
            %path,
            tree = tree.kind.name(),
            gate = tree.gate.name(),
            ?resolution,
            "Navigation resolved"
        );
        resolution
    }
}

/// normalize_path
///
/// Canonical form used for every comparison: query and fragment dropped, empty
/// and `.` segments removed, `..` resolved, no trailing slash, root is `/`.
pub fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw[..end].split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Segment-aware prefix test: `/student` covers `/student` and `/student/x`,
/// but not `/students`.
fn prefix_covers(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
