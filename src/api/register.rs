use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{Method, StatusCode, header};
use axum::response::Response;
use axum::routing::any;
use axum::{Form, Router};

use crate::auth::invite::Invited;
use crate::config::Config;
use crate::error::ApiError;
use crate::state::AppState;
use crate::ui::{self, Page, PageData};

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const SERVICE_UNAVAILABLE: &str =
    "Registration failed. The service might be under maintenance.";
pub const EMAIL_SENT: &str =
    "Registration email sent. Please check your email inbox, including the spam folder.";

const EMAIL_FIELD: &str = "email";

pub fn router(config: &Config) -> Router<AppState> {
    Router::new()
        .route("/register", any(register))
        .nest_service("/register/static", ui::static_files(&config.static_dir))
}

/// `/register`: the invite gate runs before method dispatch.
async fn register(
    _invited: Invited,
    State(state): State<AppState>,
    method: Method,
    request: Request,
) -> Result<Response, ApiError> {
    match method {
        Method::GET | Method::HEAD => Ok(state.pages.respond(
            StatusCode::OK,
            Page::Form,
            &PageData::default(),
        )),
        Method::POST => Ok(submit(&state, request).await),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

async fn submit(state: &AppState, request: Request) -> Response {
    let email = read_email(state, request).await;

    if email.is_empty() {
        return state
            .pages
            .respond(StatusCode::OK, Page::Form, &PageData::error(EMAIL_REQUIRED));
    }

    match state.automation.register(&email).await {
        Ok(_) => {
            tracing::info!(email = %email, "registration submitted");
            state
                .pages
                .respond(StatusCode::OK, Page::Success, &PageData::success(EMAIL_SENT))
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                kind = err.kind(),
                email = %email,
                "registration failed"
            );
            state.pages.respond(
                StatusCode::OK,
                Page::Form,
                &PageData::error(SERVICE_UNAVAILABLE),
            )
        }
    }
}

/// First `email` value of a url-encoded or multipart body.
///
/// An unreadable body yields an empty string, which the caller reports as a
/// missing email.
async fn read_email(state: &AppState, request: Request) -> String {
    let multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        });

    if multipart {
        let mut form = match Multipart::from_request(request, state).await {
            Ok(form) => form,
            Err(rejection) => {
                tracing::debug!(error = %rejection, "unreadable multipart registration form");
                return String::new();
            }
        };
        loop {
            match form.next_field().await {
                Ok(Some(field)) if field.name() == Some(EMAIL_FIELD) => {
                    return field.text().await.unwrap_or_else(|e| {
                        tracing::debug!(error = %e, "unreadable email field");
                        String::new()
                    });
                }
                Ok(Some(_)) => {}
                Ok(None) => return String::new(),
                Err(e) => {
                    tracing::debug!(error = %e, "unreadable multipart registration form");
                    return String::new();
                }
            }
        }
    }

    match Form::<Vec<(String, String)>>::from_request(request, state).await {
        Ok(Form(pairs)) => pairs
            .into_iter()
            .find(|(key, _)| key == EMAIL_FIELD)
            .map(|(_, value)| value)
            .unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable registration form");
            String::new()
        }
    }
}
