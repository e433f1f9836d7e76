use super::{RouteTree, TreeKind};

pub const PREFIX: &str = "/auth";

/// Public Route Tree
///
/// Screens for visitors who are **not** logged in. The whole tree sits behind the
/// `PublicGate`: once a session resolves to an authenticated identity, every path
/// here bounces to that identity's landing path instead of showing the login form
/// again.
pub fn public_routes() -> RouteTree {
    RouteTree::new(TreeKind::Public, Some(PREFIX))
        // /auth
        // Entry screen; where every unauthenticated redirect points.
        .screen("/auth", "Sign In")
        // /auth/login
        .screen("/auth/login", "Sign In")
        // /auth/register
        // Account creation. Credentials go to the external identity provider.
        .screen("/auth/register", "Create Account")
}
