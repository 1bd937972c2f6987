//! Troubleshoot service — form fields → one completion call → last result.
//!
//! DESIGN
//! ======
//! `dispatch` is the single request/response exchange: credential check,
//! prompt assembly, one call, no retries. `submit` wraps it with the
//! session lifecycle: gate on usable input, single-flight per session,
//! record the outcome as a `FormEvent`.
//!
//! The call runs on a spawned task that writes the outcome back to the
//! session itself. If the browser disconnects mid-request the handler
//! future is dropped, but the session still leaves `Pending`.

use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::form::{self, FormEvent, FormFields};
use crate::llm::types::{LlmError, Message};
use crate::prompt::{SYSTEM_PROMPT, assemble_user_prompt};
use crate::state::{AppState, SessionHandle, lock_session};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TroubleshootError {
    #[error("no API key configured: set the {var} environment variable")]
    MissingCredential { var: String },
    #[error("nothing to troubleshoot: every field is empty")]
    EmptyInput,
    #[error("completion service error: {0}")]
    Service(#[from] LlmError),
    #[error("a troubleshooting request is already running")]
    Busy,
    #[error("troubleshooting task aborted: {0}")]
    Aborted(String),
}

impl ErrorCode for TroubleshootError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => "E_MISSING_CREDENTIAL",
            Self::EmptyInput => "E_EMPTY_INPUT",
            Self::Service(_) => "E_SERVICE",
            Self::Busy => "E_BUSY",
            Self::Aborted(_) => "E_ABORTED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Service(e) if e.retryable()) || matches!(self, Self::Busy | Self::Aborted(_))
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Send the current fields to the completion service once and return its text.
///
/// # Errors
///
/// - [`TroubleshootError::MissingCredential`] when no client is configured;
///   nothing is sent.
/// - [`TroubleshootError::EmptyInput`] when every field is blank.
/// - [`TroubleshootError::Service`] for transport, status, or parse failures.
pub async fn dispatch(state: &AppState, fields: &FormFields) -> Result<String, TroubleshootError> {
    let Some(llm) = state.llm.as_ref() else {
        return Err(TroubleshootError::MissingCredential { var: state.settings.llm.api_key_var.clone() });
    };

    let prompt = assemble_user_prompt(fields);
    if prompt.is_empty() {
        return Err(TroubleshootError::EmptyInput);
    }

    info!(model = llm.model(), prompt_len = prompt.len(), "troubleshoot: sending request");
    let started = Instant::now();
    let response = llm
        .chat(state.settings.max_tokens, SYSTEM_PROMPT, &[Message::user(prompt)])
        .await?;
    if response.text.trim().is_empty() {
        return Err(LlmError::EmptyCompletion.into());
    }

    info!(
        model = %response.model,
        stop_reason = %response.stop_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "troubleshoot: completion received"
    );
    Ok(response.text)
}

// =============================================================================
// SUBMIT
// =============================================================================

/// Apply the posted fields to the session and, when they hold usable input,
/// run one dispatch and record its outcome.
///
/// Returns `Ok(None)` when nothing was dispatched: the form belonged to an
/// older generation or every field was blank.
///
/// # Errors
///
/// [`TroubleshootError::Busy`] if this session already has a request in
/// flight; otherwise whatever [`dispatch`] returned. Failures never touch
/// the stored last result.
pub async fn submit(
    state: &AppState,
    session_id: Uuid,
    session: &SessionHandle,
    form_id: u64,
    fields: FormFields,
) -> Result<Option<String>, TroubleshootError> {
    let fields = {
        let mut guard = lock_session(session);
        guard.touch(Instant::now());
        if guard.form.is_pending() {
            warn!(%session_id, "troubleshoot: submit rejected, request already in flight");
            return Err(TroubleshootError::Busy);
        }
        if form_id != guard.form.form_id() {
            info!(%session_id, form_id, current = guard.form.form_id(), "troubleshoot: stale form ignored");
            return Ok(None);
        }

        let current = std::mem::take(&mut guard.form);
        guard.form = form::apply(current, FormEvent::Edit { form_id, fields });
        if !guard.form.has_usable_input() {
            return Ok(None);
        }

        let current = std::mem::take(&mut guard.form);
        guard.form = form::apply(current, FormEvent::DispatchStarted);
        guard.form.field_values().clone()
    };

    info!(%session_id, form_id, "troubleshoot: dispatch started");

    let task_state = state.clone();
    let task_session = session.clone();
    let task = tokio::spawn(async move {
        let result = dispatch(&task_state, &fields).await;
        record_outcome(&task_session, session_id, form_id, result.as_deref());
        result
    });

    match task.await {
        Ok(result) => result.map(Some),
        Err(e) => {
            let err = TroubleshootError::Aborted(e.to_string());
            record_outcome(session, session_id, form_id, Err(&err));
            Err(err)
        }
    }
}

fn record_outcome(
    session: &SessionHandle,
    session_id: Uuid,
    form_id: u64,
    outcome: Result<&str, &TroubleshootError>,
) {
    let event = match outcome {
        Ok(text) => {
            info!(%session_id, result_len = text.len(), "troubleshoot: result stored");
            FormEvent::DispatchSucceeded { form_id, text: text.to_string() }
        }
        Err(e) => {
            warn!(
                %session_id,
                code = e.error_code(),
                retryable = e.retryable(),
                error = %e,
                "troubleshoot: dispatch failed"
            );
            FormEvent::DispatchFailed { form_id, code: e.error_code(), message: e.to_string() }
        }
    };

    let mut guard = lock_session(session);
    let current = std::mem::take(&mut guard.form);
    guard.form = form::apply(current, event);
    guard.touch(Instant::now());
}

#[cfg(test)]
#[path = "troubleshoot_test.rs"]
mod tests;
