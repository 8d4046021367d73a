//! Read-only reference data lookups.
//!
//! The form depends on two externally sourced datasets: the region/comuna
//! directory that drives the cascading location selects, and the CIE-10
//! catalog behind the primary-condition autocomplete. Both are modelled as
//! in-memory collections loaded from JSON; the fetch itself belongs to the
//! host. Lookups are ordered, finite, and restartable (each call runs the
//! search from scratch).

use serde::{Deserialize, Serialize};

/// A Chilean region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub nombre: String,
}

/// A comuna, nested under a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comuna {
    pub id: String,
    pub nombre: String,
    pub region_id: String,
}

/// The region/comuna directory backing the location selects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoDirectory {
    regions: Vec<Region>,
    comunas: Vec<Comuna>,
}

impl GeoDirectory {
    pub fn new(regions: Vec<Region>, comunas: Vec<Comuna>) -> Self {
        Self { regions, comunas }
    }

    /// Parses a directory from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error on malformed input.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// All regions in declaration order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Comunas belonging to `region_id`, in declaration order. Unknown
    /// regions yield an empty list.
    pub fn comunas_de(&self, region_id: &str) -> Vec<&Comuna> {
        self.comunas
            .iter()
            .filter(|comuna| comuna.region_id == region_id)
            .collect()
    }

    /// Whether `comuna_id` belongs to `region_id`.
    pub fn comuna_in_region(&self, comuna_id: &str, region_id: &str) -> bool {
        self.comunas
            .iter()
            .any(|comuna| comuna.id == comuna_id && comuna.region_id == region_id)
    }
}

/// One entry of the CIE-10 disease classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cie10Entry {
    /// Classification code, e.g. `E11`.
    pub codigo: String,
    /// Spanish-language description.
    pub descripcion: String,
}

/// Search over a condition catalog. The form injects an implementation so
/// the autocomplete can be exercised without the real dataset.
pub trait ConditionLookup {
    /// Returns matching entries in catalog order. Empty queries match
    /// nothing.
    fn search(&self, query: &str) -> Vec<Cie10Entry>;
}

/// In-memory CIE-10 catalog with case- and accent-insensitive substring
/// matching on the description and prefix matching on the code.
#[derive(Debug, Clone, Default)]
pub struct ConditionCatalog {
    entries: Vec<Cie10Entry>,
}

impl ConditionCatalog {
    pub fn new(entries: Vec<Cie10Entry>) -> Self {
        Self { entries }
    }

    /// Parses a catalog from a JSON array of entries.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error on malformed input.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConditionLookup for ConditionCatalog {
    fn search(&self, query: &str) -> Vec<Cie10Entry> {
        let needle = fold(query.trim());
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| {
                fold(&entry.descripcion).contains(&needle)
                    || fold(&entry.codigo).starts_with(&needle)
            })
            .cloned()
            .collect()
    }
}

/// Lowercases and strips the Spanish diacritics that differ between what
/// users type and what the catalog stores.
fn fold(input: &str) -> String {
    input
        .chars()
        .map(|c| match c.to_lowercase().next().unwrap_or(c) {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            lower => lower,
        })
        .collect()
}
