use portal_session::{
    error::RouteTableError,
    models::{Identity, Role, SessionState},
    routes::{Resolution, RouteTable, RouteTree, TreeKind, admin, student, teacher},
    session::SessionManager,
    storage::{MemorySessionStore, SessionStoreState},
};
use std::sync::Arc;

const ROLE_TREE_PATHS: [(Role, &[&str]); 3] = [
    (
        Role::Student,
        &["/student", "/student/notes", "/student/profile", "/student/unknown"],
    ),
    (
        Role::Teacher,
        &["/teacher", "/teacher/classes", "/teacher/profile", "/teacher/x/y"],
    ),
    (
        Role::Admin,
        &["/admin", "/admin/users", "/admin/profile", "/admin/nope"],
    ),
];

fn table() -> RouteTable {
    RouteTable::standard().expect("standard table is valid")
}

fn as_role(role: Role) -> SessionState {
    SessionState::authenticated(Identity::new("1", "A", "a@x.com").with_role(role))
}

fn redirect(path: &str) -> Resolution {
    Resolution::Redirect(path.to_string())
}

fn rendered_screen(resolution: Resolution) -> String {
    match resolution {
        Resolution::Render(view) => view.screen,
        other => panic!("expected Render, got {other:?}"),
    }
}

// --- Properties ---

#[test]
fn test_anonymous_is_sent_to_entry_from_every_role_tree() {
    let table = table();
    let anonymous = SessionState::anonymous();

    for (_, paths) in ROLE_TREE_PATHS {
        for path in paths {
            assert_eq!(table.resolve(path, &anonymous), redirect("/auth"), "{path}");
        }
    }
}

#[test]
fn test_foreign_role_tree_redirects_home() {
    let table = table();

    for (owner, paths) in ROLE_TREE_PATHS {
        for role in [Role::Student, Role::Teacher, Role::Admin, Role::Parent] {
            if role == owner {
                continue;
            }
            let home = portal_session::guard::landing_path_for_role(Some(role));
            for path in paths {
                assert_eq!(
                    table.resolve(path, &as_role(role)),
                    redirect(home),
                    "{role} at {path}"
                );
            }
        }
    }
}

#[test]
fn test_everything_is_pending_while_loading() {
    let table = table();
    let loading = SessionState::loading();

    for path in ["/", "/auth", "/student/notes", "/admin", "/music", "/no/such/page"] {
        assert_eq!(table.resolve(path, &loading), Resolution::Pending, "{path}");
    }
}

#[tokio::test]
async fn test_restored_teacher_scenario() {
    let store = MemorySessionStore::new();
    store.seed(
        "user",
        r#"{"id":"1","name":"A","email":"a@x.com","role":"teacher"}"#,
    );
    let manager = SessionManager::new(Arc::new(store) as SessionStoreState);
    let state = manager.initialize().await;
    let table = table();

    assert_eq!(table.resolve("/admin/profile", &state), redirect("/teacher"));
    assert_eq!(
        rendered_screen(table.resolve("/teacher/profile", &state)),
        "/teacher/profile"
    );
    assert_eq!(table.resolve("/auth", &state), redirect("/teacher"));
}

// --- Tree membership ---

#[test]
fn test_own_role_tree_renders() {
    let table = table();

    match table.resolve("/student/notes", &as_role(Role::Student)) {
        Resolution::Render(view) => {
            assert_eq!(view.tree, "student");
            assert_eq!(view.title, "Notes");
            assert_eq!(view.user.unwrap().role, Some(Role::Student));
        }
        other => panic!("expected Render, got {other:?}"),
    }
}

#[test]
fn test_common_tree_for_every_role() {
    let table = table();
    let mut roleless = as_role(Role::Student);
    roleless.user.as_mut().unwrap().role = None;

    for state in [
        as_role(Role::Student),
        as_role(Role::Teacher),
        as_role(Role::Admin),
        as_role(Role::Parent),
        roleless,
    ] {
        assert_eq!(rendered_screen(table.resolve("/music", &state)), "/music");
        assert_eq!(rendered_screen(table.resolve("/", &state)), "/");
    }

    assert_eq!(
        table.resolve("/music", &SessionState::anonymous()),
        redirect("/auth")
    );
}

#[test]
fn test_roleless_identity_is_confined_to_common() {
    let table = table();
    let mut state = as_role(Role::Student);
    state.user.as_mut().unwrap().role = None;

    assert_eq!(table.resolve("/student", &state), redirect("/"));
    assert_eq!(table.resolve("/auth", &state), redirect("/"));
}

#[test]
fn test_public_tree() {
    let table = table();
    let anonymous = SessionState::anonymous();

    assert_eq!(rendered_screen(table.resolve("/auth", &anonymous)), "/auth");
    assert_eq!(
        rendered_screen(table.resolve("/auth/register?next=/student", &anonymous)),
        "/auth/register"
    );
    assert_eq!(table.resolve("/auth/login", &as_role(Role::Admin)), redirect("/admin"));
    assert_eq!(table.resolve("/auth/nope", &anonymous), Resolution::NotFound);
}

#[test]
fn test_unmatched_paths() {
    let table = table();

    assert_eq!(
        table.resolve("/no/such/page", &as_role(Role::Teacher)),
        Resolution::NotFound
    );
    assert_eq!(
        table.resolve("/no/such/page", &SessionState::anonymous()),
        redirect("/auth")
    );
    // Inside a role tree, the role gate runs before the screen lookup.
    assert_eq!(
        table.resolve("/student/unknown", &as_role(Role::Student)),
        Resolution::NotFound
    );
}

#[test]
fn test_prefix_matching_is_segment_aware() {
    let table = table();

    assert_eq!(table.tree_for("/students").unwrap().kind(), TreeKind::Common);
    assert_eq!(table.tree_for("/student").unwrap().kind(), TreeKind::Student);
    assert_eq!(table.tree_for("/admin/").unwrap().kind(), TreeKind::Admin);
    // A student may not reach /students via the student tree, and it is not a screen.
    assert_eq!(
        table.resolve("/students", &as_role(Role::Student)),
        Resolution::NotFound
    );
}

#[test]
fn test_dot_segments_cannot_smuggle_into_foreign_tree() {
    let table = table();

    assert_eq!(
        table.resolve("/student/../admin/users", &as_role(Role::Student)),
        redirect("/student")
    );
}

#[test]
fn test_trees_are_ordered_with_common_last() {
    let table = RouteTable::new(vec![
        RouteTree::new(TreeKind::Common, None).screen("/", "Home"),
        admin::admin_routes(),
        student::student_routes(),
        teacher::teacher_routes(),
    ])
    .unwrap();

    let kinds: Vec<TreeKind> = table.trees().iter().map(|tree| tree.kind()).collect();
    assert_eq!(
        kinds,
        vec![TreeKind::Student, TreeKind::Teacher, TreeKind::Admin, TreeKind::Common]
    );
}

// --- Construction-time defects ---

#[test]
fn test_overlapping_prefixes_rejected() {
    let result = RouteTable::new(vec![
        RouteTree::new(TreeKind::Student, Some("/portal")),
        RouteTree::new(TreeKind::Teacher, Some("/portal/teacher")),
    ]);

    assert_eq!(
        result.unwrap_err(),
        RouteTableError::Overlap {
            first: "student".to_string(),
            second: "teacher".to_string(),
            prefix: "/portal/teacher".to_string(),
        }
    );
}

#[test]
fn test_identical_prefixes_rejected() {
    let result = RouteTable::new(vec![
        RouteTree::new(TreeKind::Admin, Some("/staff")),
        RouteTree::new(TreeKind::Teacher, Some("/staff/")),
    ]);

    assert!(matches!(result, Err(RouteTableError::Overlap { .. })));
}

#[test]
fn test_screen_outside_tree_rejected() {
    let result = RouteTable::new(vec![
        RouteTree::new(TreeKind::Teacher, Some("/teacher")).screen("/teachers/list", "List"),
    ]);

    assert!(matches!(
        result,
        Err(RouteTableError::ScreenOutsideTree { .. })
    ));
}

#[test]
fn test_common_screen_shadowed_by_role_tree_rejected() {
    let result = RouteTable::new(vec![
        student::student_routes(),
        RouteTree::new(TreeKind::Common, None).screen("/student/music", "Music"),
    ]);

    assert_eq!(
        result.unwrap_err(),
        RouteTableError::ShadowedCommonScreen {
            screen: "/student/music".to_string(),
            owner: "student".to_string(),
        }
    );
}

#[test]
fn test_duplicate_trees_and_screens_rejected() {
    let duplicate_tree = RouteTable::new(vec![
        RouteTree::new(TreeKind::Common, None),
        RouteTree::new(TreeKind::Common, None),
    ]);
    assert!(matches!(
        duplicate_tree,
        Err(RouteTableError::DuplicateTree { .. })
    ));

    let duplicate_screen = RouteTable::new(vec![
        RouteTree::new(TreeKind::Common, None)
            .screen("/music", "Music")
            .screen("/music/", "Music Again"),
    ]);
    assert!(matches!(
        duplicate_screen,
        Err(RouteTableError::DuplicateScreen { .. })
    ));
}

#[test]
fn test_invalid_prefixes_rejected() {
    assert!(matches!(
        RouteTable::new(vec![RouteTree::new(TreeKind::Common, Some("/common"))]),
        Err(RouteTableError::InvalidPath { .. })
    ));
    assert!(matches!(
        RouteTable::new(vec![RouteTree::new(TreeKind::Admin, None)]),
        Err(RouteTableError::InvalidPath { .. })
    ));
    assert!(matches!(
        RouteTable::new(vec![RouteTree::new(TreeKind::Admin, Some("/"))]),
        Err(RouteTableError::InvalidPath { .. })
    ));
}

#[test]
fn test_table_without_common_tree_still_resolves_unmatched() {
    let table = RouteTable::new(vec![student::student_routes()]).unwrap();

    assert!(table.tree_for("/music").is_none());
    assert_eq!(
        table.resolve("/music", &as_role(Role::Student)),
        Resolution::NotFound
    );
    assert_eq!(
        table.resolve("/music", &SessionState::anonymous()),
        redirect("/auth")
    );
}
