use super::{RouteTree, TreeKind};

pub const PREFIX: &str = "/teacher";

/// Teacher Route Tree
///
/// Restricted to the 'teacher' role via `RoleGate({teacher})`.
pub fn teacher_routes() -> RouteTree {
    RouteTree::new(TreeKind::Teacher, Some(PREFIX))
        // /teacher
        // Landing path for the 'teacher' role.
        .screen("/teacher", "Teacher Dashboard")
        // Class rosters and subject assignments.
        .screen("/teacher/classes", "Classes")
        // Marking attendance for a class session.
        .screen("/teacher/attendance", "Attendance Register")
        .screen("/teacher/profile", "Profile")
}
