//! # yoParticipo Core
//!
//! Validated core of the yoParticipo patient-recruitment flow:
//! - Chilean RUT cleaning, formatting, and modulo-11 validation
//! - The four-step intake form state machine (a pure reducer)
//! - Session token/inactivity expiry over an injected key-value store
//! - Read-only reference lookups (region/comuna directory, CIE-10 catalog)
//!
//! **No network or rendering concerns**: the REST client, page composition,
//! and visual components live in the host application. This crate only
//! computes; every operation is synchronous and deterministic, with clocks
//! and storage injected by the caller.

pub mod constants;
pub mod intake;
pub mod reference;
pub mod rut;
pub mod session;

pub use intake::{
    FieldChange, FieldKey, IntakeEvent, IntakeFields, IntakeFormState, IntakePayload, Sexo, Step,
};
pub use reference::{Cie10Entry, ConditionCatalog, ConditionLookup, Comuna, GeoDirectory, Region};
pub use rut::RutError;
pub use session::{
    KeyValueStore, MemoryStore, SessionConfig, SessionMonitor, SessionStatus, ThrottleGuard,
};
