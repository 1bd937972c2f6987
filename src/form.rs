//! Form state controller.
//!
//! DESIGN
//! ======
//! One `FormState` per browser session. Every user action and every
//! dispatch outcome is a `FormEvent`; `apply` is the only way state
//! changes and it performs no I/O. The session layer owns the side
//! effect (the completion call) and feeds its outcome back as an event.
//!
//! `form_id` is a generation counter. A reset bumps it, so an edit posted
//! from a page rendered before the reset, or a completion that was in
//! flight when the user reset, is recognised as stale and dropped.

// =============================================================================
// FIELDS
// =============================================================================

/// The three user-editable inputs. All optional, all free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub machine_model: String,
    pub alarm_code: String,
    pub problem_text: String,
}

impl FormFields {
    /// True iff at least one field is non-empty after trimming.
    #[must_use]
    pub fn has_usable_input(&self) -> bool {
        [&self.machine_model, &self.alarm_code, &self.problem_text]
            .iter()
            .any(|field| !field.trim().is_empty())
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Where the session sits in the submit lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Pending,
    ResultShown,
    /// The last submit failed. Any earlier result is still held and shown.
    ErrorShown { code: &'static str, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    form_id: u64,
    fields: FormFields,
    last_result: Option<String>,
    phase: Phase,
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn form_id(&self) -> u64 {
        self.form_id
    }

    #[must_use]
    pub fn field_values(&self) -> &FormFields {
        &self.fields
    }

    #[must_use]
    pub fn has_usable_input(&self) -> bool {
        self.fields.has_usable_input()
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }

    /// Clear fields and result and start a new widget generation.
    pub fn reset(&mut self) {
        *self = apply(std::mem::take(self), FormEvent::Reset);
    }
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Field values posted from the form rendered for generation `form_id`.
    Edit { form_id: u64, fields: FormFields },
    Reset,
    DispatchStarted,
    DispatchSucceeded { form_id: u64, text: String },
    DispatchFailed { form_id: u64, code: &'static str, message: String },
}

/// Pure state transition.
#[must_use]
pub fn apply(mut state: FormState, event: FormEvent) -> FormState {
    match event {
        FormEvent::Edit { form_id, fields } => {
            if form_id == state.form_id {
                state.fields = fields;
            }
            state
        }
        FormEvent::Reset => FormState { form_id: state.form_id.wrapping_add(1), ..FormState::default() },
        FormEvent::DispatchStarted => {
            state.phase = Phase::Pending;
            state
        }
        FormEvent::DispatchSucceeded { form_id, text } => {
            if form_id == state.form_id {
                state.last_result = Some(text);
                state.phase = Phase::ResultShown;
            }
            state
        }
        FormEvent::DispatchFailed { form_id, code, message } => {
            if form_id == state.form_id {
                state.phase = Phase::ErrorShown { code, message };
            }
            state
        }
    }
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
