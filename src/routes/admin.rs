use super::{RouteTree, TreeKind};

pub const PREFIX: &str = "/admin";

/// Admin Route Tree
///
/// Screens exclusively for the 'admin' role: user oversight and portal-wide
/// announcements. The tree is wrapped in `RoleGate({admin})`, so a student who
/// guesses `/admin/users` lands on `/student` and never sees the screen.
pub fn admin_routes() -> RouteTree {
    RouteTree::new(TreeKind::Admin, Some(PREFIX))
        // /admin
        // Landing path for the 'admin' role.
        .screen("/admin", "Admin Dashboard")
        // /admin/users
        // Directory of every registered account.
        .screen("/admin/users", "Users")
        // /admin/announcements
        // Authoring side of the announcements feed shown at /announcements.
        .screen("/admin/announcements", "Manage Announcements")
        .screen("/admin/profile", "Profile")
}
