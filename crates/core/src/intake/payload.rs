//! The submission payload handed to the network collaborator.
//!
//! Built only after every step validates, so construction re-parses the raw
//! fields into their typed forms and treats any failure as an internal
//! inconsistency rather than a user error. UI-only controls (the
//! "has other conditions" toggle) are excluded.

use chrono::NaiveDate;
use serde::Serialize;
use yp_types::{EmailAddress, EmailError, NonEmptyText, PhoneError, PhoneNumber, TextError};

use crate::constants::BIRTH_DATE_FORMAT;
use crate::rut::{self, RutError};

use super::fields::{IntakeFields, Sexo};

/// Failures while assembling the payload from raw fields.
///
/// These are unreachable when every step has been validated first; the
/// reducer logs and swallows them rather than emitting a bad payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid name field: {0}")]
    Name(#[from] TextError),
    #[error("invalid RUT: {0}")]
    Rut(#[from] RutError),
    #[error("invalid birth date: {0}")]
    BirthDate(#[from] chrono::ParseError),
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
    #[error("invalid phone: {0}")]
    Phone(#[from] PhoneError),
    #[error("missing required selection: {0}")]
    MissingSelection(&'static str),
}

/// The structured intake submission, serialized with the camelCase keys the
/// API expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakePayload {
    pub nombres: NonEmptyText,
    pub apellidos: NonEmptyText,
    /// Canonical dotted form, e.g. `12.345.678-5`.
    pub rut: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo: Sexo,
    /// Full `+56`-prefixed phone number.
    pub telefono: PhoneNumber,
    pub email: EmailAddress,
    pub region: String,
    pub comuna: String,
    pub direccion: String,
    pub condicion_principal: NonEmptyText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_cie10: Option<String>,
    pub condiciones_seleccionadas: Vec<String>,
    pub otras_condiciones: String,
    pub acepta_terminos: bool,
    pub acepta_ser_contactado: bool,
}

impl IntakePayload {
    /// Assembles the payload from validated raw fields.
    ///
    /// # Errors
    ///
    /// Returns a `PayloadError` if any field fails re-parsing; this indicates
    /// a bug in step validation, not bad user input.
    pub fn from_fields(fields: &IntakeFields) -> Result<Self, PayloadError> {
        rut::validate(&fields.rut)?;

        Ok(Self {
            nombres: NonEmptyText::new(&fields.nombres)?,
            apellidos: NonEmptyText::new(&fields.apellidos)?,
            rut: rut::format(&fields.rut),
            fecha_nacimiento: NaiveDate::parse_from_str(
                fields.fecha_nacimiento.trim(),
                BIRTH_DATE_FORMAT,
            )?,
            sexo: fields
                .sexo
                .ok_or(PayloadError::MissingSelection("sexo"))?,
            telefono: PhoneNumber::parse(&fields.telefono_numero)?,
            email: EmailAddress::parse(&fields.email)?,
            region: fields
                .region
                .clone()
                .ok_or(PayloadError::MissingSelection("region"))?,
            comuna: fields
                .comuna
                .clone()
                .ok_or(PayloadError::MissingSelection("comuna"))?,
            direccion: fields.direccion.trim().to_owned(),
            condicion_principal: NonEmptyText::new(&fields.condicion_principal)?,
            codigo_cie10: fields.codigo_cie10.clone(),
            condiciones_seleccionadas: fields
                .condiciones_seleccionadas
                .iter()
                .cloned()
                .collect(),
            // The toggle only gates visibility of the free-text field; when
            // it is off the text is dropped.
            otras_condiciones: if fields.tiene_otras_condiciones {
                fields.otras_condiciones.trim().to_owned()
            } else {
                String::new()
            },
            acepta_terminos: true,
            acepta_ser_contactado: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn complete_fields() -> IntakeFields {
        IntakeFields {
            nombres: "Ana".into(),
            apellidos: "Soto".into(),
            rut: "11111111-1".into(),
            fecha_nacimiento: "1990-05-01".into(),
            sexo: Some(Sexo::Femenino),
            telefono_numero: "912345678".into(),
            email: "ana@example.com".into(),
            region: Some("Metropolitana".into()),
            comuna: Some("Providencia".into()),
            direccion: "Av. Providencia 123".into(),
            condicion_principal: "Diabetes tipo 2".into(),
            codigo_cie10: Some("E11".into()),
            condiciones_seleccionadas: BTreeSet::from(["hipertensión".to_owned()]),
            otras_condiciones: "asma leve".into(),
            tiene_otras_condiciones: true,
        }
    }

    #[test]
    fn test_payload_formats_rut_and_phone() {
        let payload = IntakePayload::from_fields(&complete_fields()).expect("should build");
        assert_eq!(payload.rut, "11.111.111-1");
        assert_eq!(payload.telefono.to_string(), "+56912345678");
    }

    #[test]
    fn test_payload_drops_free_text_when_toggle_off() {
        let mut fields = complete_fields();
        fields.tiene_otras_condiciones = false;
        let payload = IntakePayload::from_fields(&fields).expect("should build");
        assert_eq!(payload.otras_condiciones, "");
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = IntakePayload::from_fields(&complete_fields()).expect("should build");
        let json = serde_json::to_value(&payload).expect("should serialize");
        assert_eq!(json["fechaNacimiento"], "1990-05-01");
        assert_eq!(json["condicionPrincipal"], "Diabetes tipo 2");
        assert_eq!(json["telefono"], "+56912345678");
        assert_eq!(json["codigoCie10"], "E11");
        assert_eq!(json["aceptaTerminos"], true);
        assert!(json.get("tieneOtrasCondiciones").is_none());
    }

    #[test]
    fn test_payload_rejects_missing_selection() {
        let mut fields = complete_fields();
        fields.region = None;
        let err = IntakePayload::from_fields(&fields).expect_err("should fail");
        assert!(matches!(err, PayloadError::MissingSelection("region")));
    }
}
