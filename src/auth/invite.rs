use axum::extract::{FromRequestParts, Query};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Response;

use crate::state::AppState;
use crate::ui::{Page, PageData};

pub const FORBIDDEN_MESSAGE: &str = "Access forbidden. This server is invite only.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny,
}

/// Compare the first value of query parameter `name` with `expected`.
///
/// Exact, case-sensitive match. A missing parameter, or an empty `name`,
/// always denies.
pub fn decide(params: &[(String, String)], name: &str, expected: &str) -> GateDecision {
    if name.is_empty() {
        return GateDecision::Deny;
    }
    match params.iter().find(|(key, _)| key == name) {
        Some((_, value)) if value == expected => GateDecision::Allow,
        _ => GateDecision::Deny,
    }
}

/// Proof that the request carried the invite parameter.
///
/// Rejects with the rendered forbidden page, so handlers taking this
/// extractor never run for uninvited requests.
#[derive(Debug, Clone, Copy)]
pub struct Invited;

impl FromRequestParts<AppState> for Invited {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let params = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(params)| params)
            .unwrap_or_default();

        match decide(&params, &state.config.url_param, &state.config.expected_value) {
            GateDecision::Allow => Ok(Self),
            GateDecision::Deny => {
                tracing::debug!(method = %parts.method, "invite parameter missing or wrong");
                Err(state.pages.respond(
                    StatusCode::FORBIDDEN,
                    Page::Forbidden,
                    &PageData::error(FORBIDDEN_MESSAGE),
                ))
            }
        }
    }
}
