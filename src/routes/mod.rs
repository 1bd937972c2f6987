//! Router assembly and HTTP handlers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each browser is tied to a server-side session by an opaque cookie. The
//! handlers translate form posts into session operations and answer with
//! the rendered page; all lifecycle rules live in `form` and
//! `services::troubleshoot`.

pub mod page;

use axum::Router;
use axum::extract::{Form, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::form::FormFields;
use crate::services::troubleshoot::{self, TroubleshootError};
use crate::state::{AppState, SessionHandle, lock_session};

pub(crate) const SESSION_COOKIE: &str = "troubleshooter_session";

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/troubleshoot", post(submit))
        .route("/reset", post(reset))
        .route("/download", get(download))
        .route("/healthz", get(healthz))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SESSION COOKIE
// =============================================================================

/// Resolve the caller's session from the cookie, creating one (and setting
/// the cookie) when it is absent or no longer known to the store.
async fn resolve_session(state: &AppState, jar: CookieJar) -> (CookieJar, Uuid, SessionHandle) {
    let existing = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok());
    let (id, handle, created) = state.sessions.get_or_create(existing).await;
    if !created {
        return (jar, id, handle);
    }

    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.settings.cookie_secure);
    (jar.add(cookie), id, handle)
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /` — render the form, any stored result, and any recorded error.
async fn index(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, _, session) = resolve_session(&state, jar).await;
    let html = page::render(&lock_session(&session).form, None);
    (jar, Html(html)).into_response()
}

/// Posted body. Not `#[serde(flatten)]` over `FormFields`: flattened
/// url-encoded values arrive as strings and `form_id` would fail to parse.
#[derive(Deserialize)]
pub struct TroubleshootForm {
    form_id: u64,
    #[serde(default)]
    machine_model: String,
    #[serde(default)]
    alarm_code: String,
    #[serde(default)]
    problem_text: String,
}

impl TroubleshootForm {
    fn into_parts(self) -> (u64, FormFields) {
        let fields = FormFields {
            machine_model: self.machine_model,
            alarm_code: self.alarm_code,
            problem_text: self.problem_text,
        };
        (self.form_id, fields)
    }
}

/// `POST /troubleshoot` — apply the posted fields and dispatch once.
async fn submit(State(state): State<AppState>, jar: CookieJar, Form(form): Form<TroubleshootForm>) -> Response {
    let (jar, session_id, session) = resolve_session(&state, jar).await;
    let (form_id, fields) = form.into_parts();

    let outcome = troubleshoot::submit(&state, session_id, &session, form_id, fields).await;
    let (status, error) = match &outcome {
        Ok(_) => (StatusCode::OK, None),
        Err(e) => (troubleshoot_error_to_status(e), Some(e as &dyn ErrorCode)),
    };

    let html = page::render(&lock_session(&session).form, error);
    (status, jar, Html(html)).into_response()
}

/// `POST /reset` — clear fields and result, then show the fresh form.
async fn reset(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, session_id, session) = resolve_session(&state, jar).await;
    let form_id = {
        let mut guard = lock_session(&session);
        guard.form.reset();
        guard.form.form_id()
    };
    tracing::info!(%session_id, form_id, "session reset");
    (jar, Redirect::to("/")).into_response()
}

/// `GET /download` — the last result as a plain-text attachment.
async fn download(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, _, session) = resolve_session(&state, jar).await;
    let Some(text) = lock_session(&session).form.last_result().map(str::to_owned) else {
        return (StatusCode::NOT_FOUND, jar, "no troubleshooting plan to download").into_response();
    };

    let disposition = format!("attachment; filename=\"{}\"", page::DOWNLOAD_FILENAME);
    (
        jar,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()), (header::CONTENT_DISPOSITION, disposition)],
        text,
    )
        .into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub(crate) fn troubleshoot_error_to_status(err: &TroubleshootError) -> StatusCode {
    match err {
        TroubleshootError::MissingCredential { .. } => StatusCode::SERVICE_UNAVAILABLE,
        TroubleshootError::EmptyInput => StatusCode::UNPROCESSABLE_ENTITY,
        TroubleshootError::Service(_) => StatusCode::BAD_GATEWAY,
        TroubleshootError::Busy => StatusCode::CONFLICT,
        TroubleshootError::Aborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
