//! The patient-intake form state machine.
//!
//! A pure, single-threaded reducer over [`IntakeFormState`]: UI event
//! handlers feed [`IntakeEvent`]s in and read the resulting state back out.
//! Forward navigation is gated on the active step validating; backward
//! navigation is never blocked. Errors are recomputed per step on every
//! attempt and cleared per field on every edit, and only become visible once
//! the user has tried to leave the step that owns them.
//!
//! The reducer owns no I/O: submission hands a fully validated
//! [`IntakePayload`] back to the caller, which performs the network request
//! and owns the in-flight flag.

pub mod fields;
pub mod payload;
pub mod validation;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Utc};

pub use fields::{FieldChange, FieldKey, IntakeFields, Sexo};
pub use payload::{IntakePayload, PayloadError};
pub use validation::{validate_step, StepErrors};

/// The four steps of the intake flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    PersonalData,
    ContactLocation,
    MedicalInfo,
    Confirmation,
}

impl Step {
    /// All steps in flow order.
    pub const ALL: [Step; 4] = [
        Step::PersonalData,
        Step::ContactLocation,
        Step::MedicalInfo,
        Step::Confirmation,
    ];

    /// One-based position shown in the step indicator.
    pub fn number(&self) -> u8 {
        match self {
            Step::PersonalData => 1,
            Step::ContactLocation => 2,
            Step::MedicalInfo => 3,
            Step::Confirmation => 4,
        }
    }

    /// The following step, or `None` from the confirmation step.
    pub fn next(&self) -> Option<Step> {
        match self {
            Step::PersonalData => Some(Step::ContactLocation),
            Step::ContactLocation => Some(Step::MedicalInfo),
            Step::MedicalInfo => Some(Step::Confirmation),
            Step::Confirmation => None,
        }
    }

    /// The preceding step, or `None` from the first step.
    pub fn previous(&self) -> Option<Step> {
        match self {
            Step::PersonalData => None,
            Step::ContactLocation => Some(Step::PersonalData),
            Step::MedicalInfo => Some(Step::ContactLocation),
            Step::Confirmation => Some(Step::MedicalInfo),
        }
    }
}

/// Events the reducer accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeEvent {
    /// Attempt to advance past the current step.
    Next,
    /// Go back one step; never blocked, floor at step 1.
    Previous,
    /// A single field was edited.
    FieldChanged(FieldChange),
    /// Attempt to submit from the confirmation step. `in_flight` is the
    /// caller-owned submission flag; while true the event is ignored.
    Submit { in_flight: bool },
}

/// In-memory state of one intake form session.
#[derive(Debug, Clone)]
pub struct IntakeFormState {
    current_step: Step,
    fields: IntakeFields,
    field_errors: BTreeMap<FieldKey, String>,
    attempted: BTreeSet<Step>,
    current_year: i32,
    initial_condition: Option<String>,
}

impl IntakeFormState {
    /// Creates a fresh form, optionally pre-filling the primary-condition
    /// name supplied by the page that opened it. The current year (upper
    /// bound for the birth date) is captured once at construction.
    pub fn new(initial_condition: Option<&str>) -> Self {
        Self::with_current_year(initial_condition, Utc::now().year())
    }

    /// Like [`IntakeFormState::new`] with an explicit current year, so tests
    /// stay deterministic.
    pub fn with_current_year(initial_condition: Option<&str>, current_year: i32) -> Self {
        let initial_condition = initial_condition
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned);
        let mut fields = IntakeFields::default();
        if let Some(condition) = &initial_condition {
            fields.condicion_principal = condition.clone();
        }
        Self {
            current_step: Step::PersonalData,
            fields,
            field_errors: BTreeMap::new(),
            attempted: BTreeSet::new(),
            current_year,
            initial_condition,
        }
    }

    /// Applies one event and returns the payload when a submit is accepted.
    ///
    /// Every other event returns `None`; a blocked `Next` or `Submit` leaves
    /// its trace in the error map instead.
    pub fn apply(&mut self, event: IntakeEvent) -> Option<IntakePayload> {
        match event {
            IntakeEvent::Next => {
                self.advance();
                None
            }
            IntakeEvent::Previous => {
                if let Some(previous) = self.current_step.previous() {
                    self.current_step = previous;
                }
                None
            }
            IntakeEvent::FieldChanged(change) => {
                let key = change.key();
                change.apply_to(&mut self.fields);
                self.field_errors.remove(&key);
                None
            }
            IntakeEvent::Submit { in_flight } => self.submit(in_flight),
        }
    }

    fn advance(&mut self) {
        let Some(next) = self.current_step.next() else {
            return;
        };
        let errors = validate_step(self.current_step, &self.fields, self.current_year);
        self.replace_step_errors(self.current_step, errors.clone());
        if errors.is_empty() {
            self.attempted.remove(&self.current_step);
            self.current_step = next;
        } else {
            tracing::debug!(
                step = self.current_step.number(),
                errors = errors.len(),
                "step advancement blocked"
            );
            self.attempted.insert(self.current_step);
        }
    }

    fn submit(&mut self, in_flight: bool) -> Option<IntakePayload> {
        if self.current_step != Step::Confirmation || in_flight {
            return None;
        }

        // Back-navigation may have invalidated earlier steps after they were
        // first passed; re-check all of them before emitting.
        for step in Step::ALL {
            let errors = validate_step(step, &self.fields, self.current_year);
            if !errors.is_empty() {
                tracing::debug!(
                    step = step.number(),
                    errors = errors.len(),
                    "submission blocked by invalid step"
                );
                self.replace_step_errors(step, errors);
                self.attempted.insert(step);
                self.current_step = step;
                return None;
            }
        }

        match IntakePayload::from_fields(&self.fields) {
            Ok(payload) => Some(payload),
            Err(err) => {
                tracing::warn!(error = %err, "payload assembly failed after validation");
                None
            }
        }
    }

    /// Replaces the stored errors of `step` with a freshly computed set,
    /// leaving other steps' entries untouched.
    fn replace_step_errors(&mut self, step: Step, errors: StepErrors) {
        self.field_errors.retain(|key, _| key.step() != step);
        self.field_errors.extend(errors);
    }

    /// Resets the form to its initial state, keeping the pre-filled
    /// condition name. Called after a successful submission or when the
    /// form closes.
    pub fn reset(&mut self) {
        *self = Self::with_current_year(self.initial_condition.as_deref(), self.current_year);
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn fields(&self) -> &IntakeFields {
        &self.fields
    }

    /// All currently computed errors, including those on steps the user has
    /// not yet attempted to leave.
    pub fn field_errors(&self) -> &BTreeMap<FieldKey, String> {
        &self.field_errors
    }

    /// Errors eligible for display: the intersection of computed errors and
    /// attempted steps.
    pub fn visible_errors(&self) -> BTreeMap<FieldKey, &str> {
        self.field_errors
            .iter()
            .filter(|(key, _)| self.attempted.contains(&key.step()))
            .map(|(key, message)| (*key, message.as_str()))
            .collect()
    }

    /// Whether the user has tried to advance past `step` while it had
    /// errors.
    pub fn step_attempted(&self, step: Step) -> bool {
        self.attempted.contains(&step)
    }
}

impl Default for IntakeFormState {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_YEAR: i32 = 2026;

    fn new_form() -> IntakeFormState {
        IntakeFormState::with_current_year(None, TEST_YEAR)
    }

    fn fill_step1(form: &mut IntakeFormState) {
        form.apply(IntakeEvent::FieldChanged(FieldChange::Nombres("Ana".into())));
        form.apply(IntakeEvent::FieldChanged(FieldChange::Apellidos(
            "Soto".into(),
        )));
        form.apply(IntakeEvent::FieldChanged(FieldChange::Rut(
            "11.111.111-1".into(),
        )));
        form.apply(IntakeEvent::FieldChanged(FieldChange::FechaNacimiento(
            "1990-05-01".into(),
        )));
        form.apply(IntakeEvent::FieldChanged(FieldChange::Sexo(Some(
            Sexo::Femenino,
        ))));
    }

    fn fill_step2(form: &mut IntakeFormState) {
        form.apply(IntakeEvent::FieldChanged(FieldChange::TelefonoNumero(
            "912345678".into(),
        )));
        form.apply(IntakeEvent::FieldChanged(FieldChange::Email(
            "ana@example.com".into(),
        )));
        form.apply(IntakeEvent::FieldChanged(FieldChange::Region(Some(
            "Metropolitana".into(),
        ))));
        form.apply(IntakeEvent::FieldChanged(FieldChange::Comuna(Some(
            "Providencia".into(),
        ))));
    }

    fn fill_step3(form: &mut IntakeFormState) {
        form.apply(IntakeEvent::FieldChanged(FieldChange::CondicionPrincipal(
            "Diabetes tipo 2".into(),
        )));
    }

    #[test]
    fn test_next_on_empty_step1_blocks_and_reports_all_fields() {
        let mut form = new_form();
        form.apply(IntakeEvent::Next);
        assert_eq!(form.current_step(), Step::PersonalData);
        assert_eq!(form.field_errors().len(), 5);
        assert!(form.step_attempted(Step::PersonalData));
        assert_eq!(form.visible_errors().len(), 5);
    }

    #[test]
    fn test_errors_hidden_before_first_attempt() {
        let form = new_form();
        assert!(form.visible_errors().is_empty());
        assert!(!form.step_attempted(Step::PersonalData));
    }

    #[test]
    fn test_editing_a_field_clears_only_its_error() {
        let mut form = new_form();
        form.apply(IntakeEvent::Next);
        let before = form.field_errors().len();

        form.apply(IntakeEvent::FieldChanged(FieldChange::Nombres("Ana".into())));
        assert!(!form.field_errors().contains_key(&FieldKey::Nombres));
        assert_eq!(form.field_errors().len(), before - 1);
        assert!(form.field_errors().contains_key(&FieldKey::Apellidos));
    }

    #[test]
    fn test_reattempt_recomputes_instead_of_accumulating() {
        let mut form = new_form();
        form.apply(IntakeEvent::Next);
        fill_step1(&mut form);
        form.apply(IntakeEvent::Next);
        assert_eq!(form.current_step(), Step::ContactLocation);
        assert!(form.field_errors().is_empty());
        assert!(!form.step_attempted(Step::PersonalData));
    }

    #[test]
    fn test_previous_never_blocked_and_floors_at_step1() {
        let mut form = new_form();
        form.apply(IntakeEvent::Previous);
        assert_eq!(form.current_step(), Step::PersonalData);

        fill_step1(&mut form);
        form.apply(IntakeEvent::Next);
        assert_eq!(form.current_step(), Step::ContactLocation);

        // Step 2 is empty and invalid, but going back is unconditional.
        form.apply(IntakeEvent::Previous);
        assert_eq!(form.current_step(), Step::PersonalData);
        form.apply(IntakeEvent::Previous);
        assert_eq!(form.current_step(), Step::PersonalData);
    }

    #[test]
    fn test_full_flow_reaches_confirmation_with_no_errors() {
        let mut form = new_form();
        fill_step1(&mut form);
        form.apply(IntakeEvent::Next);
        fill_step2(&mut form);
        form.apply(IntakeEvent::Next);
        fill_step3(&mut form);
        form.apply(IntakeEvent::Next);

        assert_eq!(form.current_step(), Step::Confirmation);
        assert!(form.field_errors().is_empty());
    }

    #[test]
    fn test_submit_emits_payload_from_confirmation() {
        let mut form = new_form();
        fill_step1(&mut form);
        form.apply(IntakeEvent::Next);
        fill_step2(&mut form);
        form.apply(IntakeEvent::Next);
        fill_step3(&mut form);
        form.apply(IntakeEvent::Next);

        let payload = form
            .apply(IntakeEvent::Submit { in_flight: false })
            .expect("should emit payload");
        assert_eq!(payload.rut, "11.111.111-1");
        assert_eq!(payload.nombres.as_str(), "Ana");
    }

    #[test]
    fn test_submit_ignored_while_in_flight() {
        let mut form = new_form();
        fill_step1(&mut form);
        form.apply(IntakeEvent::Next);
        fill_step2(&mut form);
        form.apply(IntakeEvent::Next);
        fill_step3(&mut form);
        form.apply(IntakeEvent::Next);

        assert!(form
            .apply(IntakeEvent::Submit { in_flight: true })
            .is_none());
        assert_eq!(form.current_step(), Step::Confirmation);
    }

    #[test]
    fn test_submit_ignored_before_confirmation() {
        let mut form = new_form();
        fill_step1(&mut form);
        assert!(form
            .apply(IntakeEvent::Submit { in_flight: false })
            .is_none());
        assert_eq!(form.current_step(), Step::PersonalData);
    }

    #[test]
    fn test_submit_returns_to_step_invalidated_by_back_navigation() {
        let mut form = new_form();
        fill_step1(&mut form);
        form.apply(IntakeEvent::Next);
        fill_step2(&mut form);
        form.apply(IntakeEvent::Next);
        fill_step3(&mut form);
        form.apply(IntakeEvent::Next);
        assert_eq!(form.current_step(), Step::Confirmation);

        // Walk back to step 1, blank a required field, return to step 4
        // without revalidating (Previous never validates; Next would catch
        // it, so emulate stale state by editing from the confirmation step).
        form.apply(IntakeEvent::FieldChanged(FieldChange::Nombres(String::new())));
        let result = form.apply(IntakeEvent::Submit { in_flight: false });
        assert!(result.is_none());
        assert_eq!(form.current_step(), Step::PersonalData);
        assert!(form.visible_errors().contains_key(&FieldKey::Nombres));
    }

    #[test]
    fn test_initial_condition_prefills_step3() {
        let form = IntakeFormState::with_current_year(Some("Asma"), TEST_YEAR);
        assert_eq!(form.fields().condicion_principal, "Asma");
    }

    #[test]
    fn test_reset_restores_defaults_and_prefill() {
        let mut form = IntakeFormState::with_current_year(Some("Asma"), TEST_YEAR);
        fill_step1(&mut form);
        form.apply(IntakeEvent::Next);
        form.reset();
        assert_eq!(form.current_step(), Step::PersonalData);
        assert!(form.field_errors().is_empty());
        assert_eq!(form.fields().condicion_principal, "Asma");
        assert!(form.fields().nombres.is_empty());
    }
}
