//! Normalization of polymorphic project field values.
//!
//! The remote returns field values as a typed union discriminated by
//! `__typename`; each variant nests the field's display name differently
//! and renders its value by its own rule (select label, literal text,
//! stringified number, iteration title). Variants this build does not know
//! are skipped silently so future field types never break item listing.

use crate::model::FieldValue;
use serde::Deserialize;

/// Nested path to the owning field's display name.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FieldRef {
    #[serde(default)]
    pub name: String,
}

/// Raw field value payload as returned by the remote.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "__typename")]
pub enum RawFieldValue {
    #[serde(rename = "ProjectV2ItemFieldSingleSelectValue")]
    SingleSelect {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        field: FieldRef,
    },
    #[serde(rename = "ProjectV2ItemFieldTextValue")]
    Text {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        field: FieldRef,
    },
    #[serde(rename = "ProjectV2ItemFieldNumberValue")]
    Number {
        #[serde(default)]
        number: Option<f64>,
        #[serde(default)]
        field: FieldRef,
    },
    #[serde(rename = "ProjectV2ItemFieldIterationValue")]
    Iteration {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        field: FieldRef,
    },
    #[serde(other)]
    Unknown,
}

impl RawFieldValue {
    /// Convert into the canonical (field name, value) pair.
    ///
    /// Returns `None` for unknown variants and for variants whose payload
    /// or field name is absent; callers skip those entries. Field names
    /// are preserved verbatim — duplicate names differing only by case
    /// stay independent entries.
    #[must_use]
    pub fn normalize(self) -> Option<FieldValue> {
        let (field, value) = match self {
            Self::SingleSelect { name, field } => (field.name, name?),
            Self::Text { text, field } => (field.name, text?),
            Self::Number { number, field } => (field.name, render_number(number?)),
            Self::Iteration { title, field } => (field.name, title?),
            Self::Unknown => return None,
        };
        if field.is_empty() {
            return None;
        }
        Some(FieldValue { field, value })
    }
}

/// Render a numeric field value, dropping a trailing `.0` for integral
/// numbers.
#[allow(clippy::cast_possible_truncation)]
fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
