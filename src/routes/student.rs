use super::{RouteTree, TreeKind};

pub const PREFIX: &str = "/student";

/// Student Route Tree
///
/// Everything under `/student` is wrapped in `RoleGate({student})`. A teacher or
/// admin who follows a link here is sent back to their own dashboard.
pub fn student_routes() -> RouteTree {
    RouteTree::new(TreeKind::Student, Some(PREFIX))
        // /student
        // Landing path for the 'student' role.
        .screen("/student", "Student Dashboard")
        .screen("/student/timetable", "Timetable")
        .screen("/student/attendance", "Attendance")
        .screen("/student/notes", "Notes")
        .screen("/student/expenses", "Expenses")
        .screen("/student/profile", "Profile")
}
