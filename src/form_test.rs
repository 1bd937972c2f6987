use super::*;

fn fields(machine_model: &str, alarm_code: &str, problem_text: &str) -> FormFields {
    FormFields {
        machine_model: machine_model.into(),
        alarm_code: alarm_code.into(),
        problem_text: problem_text.into(),
    }
}

fn edited(state: FormState, f: FormFields) -> FormState {
    let form_id = state.form_id();
    apply(state, FormEvent::Edit { form_id, fields: f })
}

// =============================================================================
// gating
// =============================================================================

#[test]
fn all_empty_is_not_usable() {
    assert!(!fields("", "", "").has_usable_input());
}

#[test]
fn whitespace_only_is_not_usable() {
    assert!(!fields("", "", "  ").has_usable_input());
    assert!(!fields(" \t", "\n", "   ").has_usable_input());
}

#[test]
fn any_single_field_is_usable() {
    assert!(fields("Haas VF2", "", "").has_usable_input());
    assert!(fields("", "SV0407", "").has_usable_input());
    assert!(fields("", "", "spindle noise").has_usable_input());
}

#[test]
fn gating_matches_trimmed_non_empty_for_every_combination() {
    let values = ["", "  ", "x"];
    for a in values {
        for b in values {
            for c in values {
                let expected = [a, b, c].iter().any(|v| !v.trim().is_empty());
                assert_eq!(fields(a, b, c).has_usable_input(), expected, "{a:?} {b:?} {c:?}");
            }
        }
    }
}

#[test]
fn new_state_is_idle_and_empty() {
    let state = FormState::new();
    assert_eq!(state.form_id(), 0);
    assert_eq!(state.field_values(), &FormFields::default());
    assert!(state.last_result().is_none());
    assert_eq!(state.phase(), &Phase::Idle);
    assert!(!state.has_usable_input());
}

// =============================================================================
// edits
// =============================================================================

#[test]
fn edit_for_current_generation_applies() {
    let state = edited(FormState::new(), fields("Fanuc 31i", "", ""));
    assert_eq!(state.field_values().machine_model, "Fanuc 31i");
    assert!(state.has_usable_input());
}

#[test]
fn edit_from_stale_generation_is_dropped() {
    let mut state = FormState::new();
    state.reset();
    let state = apply(state, FormEvent::Edit { form_id: 0, fields: fields("old", "", "") });
    assert_eq!(state.field_values(), &FormFields::default());
}

// =============================================================================
// reset
// =============================================================================

#[test]
fn reset_clears_fields_and_result_and_bumps_generation() {
    let state = edited(FormState::new(), fields("Haas VF2", "", "spindle"));
    let state = apply(state, FormEvent::DispatchStarted);
    let mut state = apply(state, FormEvent::DispatchSucceeded { form_id: 0, text: "A) ...".into() });
    assert_eq!(state.last_result(), Some("A) ..."));

    state.reset();
    assert_eq!(state.form_id(), 1);
    assert_eq!(state.field_values(), &FormFields::default());
    assert!(state.last_result().is_none());
    assert_eq!(state.phase(), &Phase::Idle);
}

#[test]
fn reset_is_idempotent_apart_from_generation() {
    let mut once = edited(FormState::new(), fields("a", "b", "c"));
    once.reset();
    let mut many = once.clone();
    for _ in 0..5 {
        many.reset();
    }
    assert_eq!(once.field_values(), many.field_values());
    assert_eq!(once.last_result(), many.last_result());
    assert_eq!(once.phase(), many.phase());
    assert!(many.form_id() > once.form_id());
}

// =============================================================================
// dispatch outcomes
// =============================================================================

#[test]
fn started_moves_to_pending() {
    let state = apply(FormState::new(), FormEvent::DispatchStarted);
    assert!(state.is_pending());
}

#[test]
fn failure_keeps_previous_result() {
    let state = apply(FormState::new(), FormEvent::DispatchSucceeded { form_id: 0, text: "first".into() });
    let state = apply(state, FormEvent::DispatchStarted);
    let state = apply(
        state,
        FormEvent::DispatchFailed { form_id: 0, code: "E_SERVICE", message: "boom".into() },
    );
    assert_eq!(state.last_result(), Some("first"));
    assert_eq!(state.phase(), &Phase::ErrorShown { code: "E_SERVICE", message: "boom".into() });
}

#[test]
fn success_overwrites_previous_result() {
    let state = apply(FormState::new(), FormEvent::DispatchSucceeded { form_id: 0, text: "first".into() });
    let state = apply(state, FormEvent::DispatchSucceeded { form_id: 0, text: "second".into() });
    assert_eq!(state.last_result(), Some("second"));
    assert_eq!(state.phase(), &Phase::ResultShown);
}

#[test]
fn result_arriving_after_reset_is_discarded() {
    let mut state = apply(FormState::new(), FormEvent::DispatchStarted);
    state.reset();
    let state = apply(state, FormEvent::DispatchSucceeded { form_id: 0, text: "late".into() });
    assert!(state.last_result().is_none());
    assert_eq!(state.phase(), &Phase::Idle);
}
