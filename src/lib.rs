use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session core: identity model, durable store port, session lifecycle, gates.
pub mod models;
pub mod storage;
pub mod session;
pub mod guard;

// Route tree dispatcher (public, student, teacher, admin, common).
pub mod routes;

// HTTP shell around the core.
pub mod config;
pub mod error;
pub mod handlers;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use routes::{Resolution, RouteTable};
pub use session::{SessionManager, SessionManagerState};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStoreState};

/// Header carrying the per-request correlation id, set if the caller sent none.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// ApiDoc
///
/// OpenAPI document for the session endpoints, served at `/api-docs/openapi.json`.
/// Screen navigation goes through the router fallback and is not listed.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_session, handlers::login, handlers::logout,
        handlers::resolve_navigation
    ),
    components(
        schemas(
            models::Identity, models::Role, models::SessionState, models::ScreenView,
            models::NavigationOutcome, models::ErrorResponse,
        )
    ),
    tags(
        (name = "portal-session", description = "Student portal session and route access API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request needs, cloned cheaply per request. The session manager is
/// the single writer of session state; the route table is immutable. Configuration
/// is consumed at composition time in `main` and is not carried per request.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManagerState,
    pub routes: Arc<RouteTable>,
}

// Lets the `CurrentSession` extractor reach the manager from any handler.
impl FromRef<AppState> for SessionManagerState {
    fn from_ref(app_state: &AppState) -> SessionManagerState {
        app_state.sessions.clone()
    }
}

/// create_router
///
/// Assembles the API routes, the navigation fallback and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let api_routes = Router::new()
        .route("/session", get(handlers::get_session))
        .route("/session/login", post(handlers::login))
        .route("/session/logout", post(handlers::logout))
        .route("/navigate", get(handlers::resolve_navigation));

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api_routes)
        // Every other path is a screen navigation, decided by the route table.
        // Screens are only ever fetched; other methods get 405.
        .fallback(get(handlers::navigate))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(navigation_span)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Which part of the shell a request hit. Recorded on the request span so
/// navigation decisions can be filtered apart from API calls.
fn surface(path: &str) -> &'static str {
    if path == "/health" {
        "health"
    } else if path.starts_with("/api/") || path == "/api" {
        "api"
    } else if path.starts_with("/swagger-ui") || path.starts_with("/api-docs") {
        "docs"
    } else {
        "navigation"
    }
}

/// navigation_span
///
/// Span for every request. Carries the navigated path and the request id; the
/// query string is left out so `?path=` lookups show up under `api` only.
fn navigation_span(request: &axum::http::Request<axum::body::Body>) -> Span {
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "portal_request",
        surface = surface(path),
        method = %request.method(),
        path = %path,
        req_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::surface;

    #[test]
    fn surface_splits_api_docs_and_screens() {
        assert_eq!(surface("/api/session"), "api");
        assert_eq!(surface("/api-docs/openapi.json"), "docs");
        assert_eq!(surface("/swagger-ui/index.html"), "docs");
        assert_eq!(surface("/health"), "health");
        assert_eq!(surface("/student/notes"), "navigation");
        assert_eq!(surface("/apiary"), "navigation");
    }
}
