pub mod register;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::IntoResponse;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

pub fn router(config: &Config) -> Router<AppState> {
    Router::new().merge(register::router(config))
}

/// Build the complete application from `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .merge(router(&state.config))
        .fallback(redirect_to_login)
        // The query string carries the invite secret; keep it out of spans.
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!("request", method = %req.method(), path = %req.uri().path())
            }),
        )
        .with_state(state)
}

// Axum requires an async handler for fallback
#[allow(clippy::unused_async)]
async fn redirect_to_login() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/login")])
}
