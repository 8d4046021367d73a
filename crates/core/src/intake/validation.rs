//! Per-step validation rules.
//!
//! `validate_step` recomputes the full error set for one step from scratch;
//! the reducer replaces that step's previous errors with the result, so a
//! corrected field never keeps a stale message.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use yp_types::{EmailAddress, EmailError, PhoneNumber};

use crate::constants::{BIRTH_DATE_FORMAT, MIN_BIRTH_YEAR};
use crate::rut::{self, RutError};

use super::fields::{FieldKey, IntakeFields};
use super::Step;

/// Computed validation errors for a single step, keyed by field.
pub type StepErrors = BTreeMap<FieldKey, String>;

/// Validates the fields owned by `step`.
///
/// Returns an empty map when the step is valid. Step 4 (confirmation) has no
/// field constraints of its own and always validates.
pub fn validate_step(step: Step, fields: &IntakeFields, current_year: i32) -> StepErrors {
    let mut errors = StepErrors::new();
    match step {
        Step::PersonalData => validate_personal_data(fields, current_year, &mut errors),
        Step::ContactLocation => validate_contact_location(fields, &mut errors),
        Step::MedicalInfo => validate_medical_info(fields, &mut errors),
        Step::Confirmation => {}
    }
    errors
}

fn validate_personal_data(fields: &IntakeFields, current_year: i32, errors: &mut StepErrors) {
    if fields.nombres.trim().is_empty() {
        errors.insert(FieldKey::Nombres, "Ingresa tus nombres".into());
    }
    if fields.apellidos.trim().is_empty() {
        errors.insert(FieldKey::Apellidos, "Ingresa tus apellidos".into());
    }
    if let Err(err) = rut::validate(&fields.rut) {
        errors.insert(FieldKey::Rut, rut_message(&err).into());
    }
    if !birth_year_in_range(&fields.fecha_nacimiento, current_year) {
        errors.insert(
            FieldKey::FechaNacimiento,
            "Ingresa una fecha de nacimiento válida".into(),
        );
    }
    if fields.sexo.is_none() {
        errors.insert(FieldKey::Sexo, "Selecciona tu sexo".into());
    }
}

fn validate_contact_location(fields: &IntakeFields, errors: &mut StepErrors) {
    if PhoneNumber::parse(&fields.telefono_numero).is_err() {
        errors.insert(
            FieldKey::TelefonoNumero,
            "Ingresa un teléfono de 9 dígitos".into(),
        );
    }
    if let Err(err) = EmailAddress::parse(&fields.email) {
        let message = match err {
            EmailError::Empty => "Ingresa tu correo electrónico",
            _ => "Ingresa un correo electrónico válido",
        };
        errors.insert(FieldKey::Email, message.into());
    }
    if fields.region.as_deref().map_or(true, |r| r.trim().is_empty()) {
        errors.insert(FieldKey::Region, "Selecciona tu región".into());
    }
    if fields.comuna.as_deref().map_or(true, |c| c.trim().is_empty()) {
        errors.insert(FieldKey::Comuna, "Selecciona tu comuna".into());
    }
}

fn validate_medical_info(fields: &IntakeFields, errors: &mut StepErrors) {
    // The CIE-10 code, the prevalent-condition set, and the free-text field
    // are collected but impose no pass/fail constraint.
    if fields.condicion_principal.trim().is_empty() {
        errors.insert(
            FieldKey::CondicionPrincipal,
            "Ingresa tu condición principal".into(),
        );
    }
}

/// Parses the birth date and checks the year lies in
/// `[MIN_BIRTH_YEAR, current_year]`. Unparseable dates fail.
fn birth_year_in_range(raw: &str, current_year: i32) -> bool {
    match NaiveDate::parse_from_str(raw.trim(), BIRTH_DATE_FORMAT) {
        Ok(date) => (MIN_BIRTH_YEAR..=current_year).contains(&date.year()),
        Err(_) => false,
    }
}

/// Maps a RUT validation failure to its user-facing message.
fn rut_message(err: &RutError) -> &'static str {
    match err {
        RutError::EmptyInput => "Ingresa tu RUT",
        RutError::InvalidLength => "El RUT debe tener 7 u 8 dígitos más el dígito verificador",
        RutError::InvalidBodyChars => "El RUT solo puede contener números",
        RutError::InvalidCheckDigitChar => "El dígito verificador no es válido",
        RutError::CheckDigitMismatch => "El RUT ingresado no es válido",
    }
}
