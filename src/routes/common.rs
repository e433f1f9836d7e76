use super::{RouteTree, TreeKind};

/// Common Route Tree
///
/// Screens shared by every logged-in role, behind a single `ProtectedGate`. This
/// tree owns no prefix: it receives whatever the prefixed trees did not claim, so
/// it is always evaluated last. `/` doubles as the landing path for identities
/// without a role tree (parents, and identities with no role at all).
pub fn common_routes() -> RouteTree {
    RouteTree::new(TreeKind::Common, None)
        .screen("/", "Home")
        .screen("/music", "Music Player")
        .screen("/fitness", "Fitness")
        .screen("/community", "Community")
        // Read side of the feed authored under /admin/announcements.
        .screen("/announcements", "Announcements")
        .screen("/billing", "Billing")
        .screen("/settings", "Settings")
}
