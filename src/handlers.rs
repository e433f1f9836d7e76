use crate::{
    AppState,
    error::ApiError,
    guard::CurrentSession,
    models::{Identity, NavigateQuery, NavigationOutcome, ScreenView, SessionState},
    routes::Resolution,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

// --- Session Accessor ---

/// get_session
///
/// Returns the `{ user, isAuthenticated, isLoading }` tuple as of this request.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Current session", body = SessionState))
)]
pub async fn get_session(CurrentSession(session): CurrentSession) -> Json<SessionState> {
    Json(session)
}

/// login
///
/// Replaces the live identity with the submitted one and persists it.
/// The identity payload is trusted: verifying credentials happened upstream.
#[utoipa::path(
    post,
    path = "/api/session/login",
    request_body = Identity,
    responses(
        (status = 200, description = "Logged in", body = SessionState),
        (status = 400, description = "Identity missing id, name or email", body = crate::models::ErrorResponse),
        (status = 500, description = "Session store failure", body = crate::models::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(identity): Json<Identity>,
) -> Result<Json<SessionState>, ApiError> {
    let session = state.sessions.login(identity).await?;
    Ok(Json(session))
}

/// logout
///
/// Clears the live identity and the persisted record. Safe to repeat.
#[utoipa::path(
    post,
    path = "/api/session/logout",
    responses(
        (status = 200, description = "Logged out", body = SessionState),
        (status = 500, description = "Session store failure", body = crate::models::ErrorResponse)
    )
)]
pub async fn logout(State(state): State<AppState>) -> Result<Json<SessionState>, ApiError> {
    let session = state.sessions.logout().await?;
    Ok(Json(session))
}

// --- Navigation ---

/// resolve_navigation
///
/// Describes where a path leads for the current session without following it.
#[utoipa::path(
    get,
    path = "/api/navigate",
    params(NavigateQuery),
    responses((status = 200, description = "Navigation outcome", body = NavigationOutcome))
)]
pub async fn resolve_navigation(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<NavigateQuery>,
) -> Json<NavigationOutcome> {
    let resolution = state.routes.resolve(&query.path, &session);
    Json(resolution.into())
}

/// navigate
///
/// Router fallback: every path not served by the API is a screen navigation.
/// The gate decision is re-evaluated against a fresh session snapshot each time.
pub async fn navigate(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    uri: Uri,
) -> Response {
    match state.routes.resolve(uri.path(), &session) {
        Resolution::Render(view) => (StatusCode::OK, Json::<ScreenView>(view)).into_response(),
        Resolution::Redirect(location) => {
            (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
        }
        // Session still loading: neutral placeholder, no redirect.
        Resolution::Pending => {
            (StatusCode::ACCEPTED, Json(NavigationOutcome::Pending)).into_response()
        }
        Resolution::NotFound => {
            (StatusCode::NOT_FOUND, Json(NavigationOutcome::NotFound)).into_response()
        }
    }
}
