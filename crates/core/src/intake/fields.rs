//! Field storage for the intake form.
//!
//! The form collects raw user input (strings as typed, selections as made);
//! nothing here is validated. Validation happens in [`super::validation`]
//! when the user tries to advance, and typed values are only constructed when
//! the final payload is built.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Sex/gender options offered by the intake form. Fixed enumeration; the
/// form rejects step 1 until one is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sexo {
    Femenino,
    Masculino,
    Otro,
}

impl Sexo {
    /// Returns the lowercase wire form of the value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sexo::Femenino => "femenino",
            Sexo::Masculino => "masculino",
            Sexo::Otro => "otro",
        }
    }
}

/// Identifies a single form field for error bookkeeping.
///
/// Every field the user can edit has a key, even those that can never fail
/// validation; editing a field always clears that field's error entry and
/// nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Nombres,
    Apellidos,
    Rut,
    FechaNacimiento,
    Sexo,
    TelefonoNumero,
    Email,
    Region,
    Comuna,
    Direccion,
    CondicionPrincipal,
    CodigoCie10,
    CondicionesSeleccionadas,
    OtrasCondiciones,
    TieneOtrasCondiciones,
}

impl FieldKey {
    /// Returns the step that owns this field. Error visibility is gated on
    /// the owning step having been attempted.
    pub fn step(&self) -> super::Step {
        use super::Step;
        match self {
            FieldKey::Nombres
            | FieldKey::Apellidos
            | FieldKey::Rut
            | FieldKey::FechaNacimiento
            | FieldKey::Sexo => Step::PersonalData,
            FieldKey::TelefonoNumero
            | FieldKey::Email
            | FieldKey::Region
            | FieldKey::Comuna
            | FieldKey::Direccion => Step::ContactLocation,
            FieldKey::CondicionPrincipal
            | FieldKey::CodigoCie10
            | FieldKey::CondicionesSeleccionadas
            | FieldKey::OtrasCondiciones
            | FieldKey::TieneOtrasCondiciones => Step::MedicalInfo,
        }
    }
}

/// Raw field values for the whole form, as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeFields {
    pub nombres: String,
    pub apellidos: String,
    pub rut: String,
    pub fecha_nacimiento: String,
    pub sexo: Option<Sexo>,
    pub telefono_numero: String,
    pub email: String,
    pub region: Option<String>,
    pub comuna: Option<String>,
    pub direccion: String,
    pub condicion_principal: String,
    pub codigo_cie10: Option<String>,
    pub condiciones_seleccionadas: BTreeSet<String>,
    pub otras_condiciones: String,
    /// UI-only toggle gating the visibility of `otras_condiciones`; never
    /// part of the submission payload.
    pub tiene_otras_condiciones: bool,
}

/// A single field edit, carried by `IntakeEvent::FieldChanged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Nombres(String),
    Apellidos(String),
    Rut(String),
    FechaNacimiento(String),
    Sexo(Option<Sexo>),
    TelefonoNumero(String),
    Email(String),
    /// Selecting a region also clears any previously chosen comuna, since
    /// comuna choices are filtered by region.
    Region(Option<String>),
    Comuna(Option<String>),
    Direccion(String),
    CondicionPrincipal(String),
    CodigoCie10(Option<String>),
    /// Toggles membership of a known prevalent condition in the
    /// multi-select set.
    ToggleCondicion(String),
    OtrasCondiciones(String),
    TieneOtrasCondiciones(bool),
}

impl FieldChange {
    /// The key of the field this change edits.
    pub fn key(&self) -> FieldKey {
        match self {
            FieldChange::Nombres(_) => FieldKey::Nombres,
            FieldChange::Apellidos(_) => FieldKey::Apellidos,
            FieldChange::Rut(_) => FieldKey::Rut,
            FieldChange::FechaNacimiento(_) => FieldKey::FechaNacimiento,
            FieldChange::Sexo(_) => FieldKey::Sexo,
            FieldChange::TelefonoNumero(_) => FieldKey::TelefonoNumero,
            FieldChange::Email(_) => FieldKey::Email,
            FieldChange::Region(_) => FieldKey::Region,
            FieldChange::Comuna(_) => FieldKey::Comuna,
            FieldChange::Direccion(_) => FieldKey::Direccion,
            FieldChange::CondicionPrincipal(_) => FieldKey::CondicionPrincipal,
            FieldChange::CodigoCie10(_) => FieldKey::CodigoCie10,
            FieldChange::ToggleCondicion(_) => FieldKey::CondicionesSeleccionadas,
            FieldChange::OtrasCondiciones(_) => FieldKey::OtrasCondiciones,
            FieldChange::TieneOtrasCondiciones(_) => FieldKey::TieneOtrasCondiciones,
        }
    }

    /// Applies this change to the field storage.
    pub fn apply_to(self, fields: &mut IntakeFields) {
        match self {
            FieldChange::Nombres(value) => fields.nombres = value,
            FieldChange::Apellidos(value) => fields.apellidos = value,
            FieldChange::Rut(value) => fields.rut = value,
            FieldChange::FechaNacimiento(value) => fields.fecha_nacimiento = value,
            FieldChange::Sexo(value) => fields.sexo = value,
            FieldChange::TelefonoNumero(value) => fields.telefono_numero = value,
            FieldChange::Email(value) => fields.email = value,
            FieldChange::Region(value) => {
                if fields.region != value {
                    fields.comuna = None;
                }
                fields.region = value;
            }
            FieldChange::Comuna(value) => fields.comuna = value,
            FieldChange::Direccion(value) => fields.direccion = value,
            FieldChange::CondicionPrincipal(value) => fields.condicion_principal = value,
            FieldChange::CodigoCie10(value) => fields.codigo_cie10 = value,
            FieldChange::ToggleCondicion(name) => {
                if !fields.condiciones_seleccionadas.remove(&name) {
                    fields.condiciones_seleccionadas.insert(name);
                }
            }
            FieldChange::OtrasCondiciones(value) => fields.otras_condiciones = value,
            FieldChange::TieneOtrasCondiciones(value) => fields.tiene_otras_condiciones = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_change_clears_comuna() {
        let mut fields = IntakeFields {
            region: Some("rm".into()),
            comuna: Some("providencia".into()),
            ..Default::default()
        };
        FieldChange::Region(Some("valparaiso".into())).apply_to(&mut fields);
        assert_eq!(fields.region.as_deref(), Some("valparaiso"));
        assert_eq!(fields.comuna, None);
    }

    #[test]
    fn test_reselecting_same_region_keeps_comuna() {
        let mut fields = IntakeFields {
            region: Some("rm".into()),
            comuna: Some("providencia".into()),
            ..Default::default()
        };
        FieldChange::Region(Some("rm".into())).apply_to(&mut fields);
        assert_eq!(fields.comuna.as_deref(), Some("providencia"));
    }

    #[test]
    fn test_toggle_condicion_adds_then_removes() {
        let mut fields = IntakeFields::default();
        FieldChange::ToggleCondicion("diabetes".into()).apply_to(&mut fields);
        assert!(fields.condiciones_seleccionadas.contains("diabetes"));
        FieldChange::ToggleCondicion("diabetes".into()).apply_to(&mut fields);
        assert!(fields.condiciones_seleccionadas.is_empty());
    }
}
