//! Artifact metadata schema registry.
//!
//! Every artifact type owns a declarative schema (required fields, value
//! kinds, defaults, and key renames). [`normalize_and_validate`] turns the
//! raw metadata of one artifact into its canonical form plus a validation
//! result. It is pure and never fails: problems are collected as messages
//! so the importer can report every broken artifact of a game in one pass.
//!
//! # Example
//!
//! ```
//! use playkit_domain::normalize_and_validate;
//! use serde_json::json;
//!
//! let raw = json!({"correctCode": "0451", "max_attempts": 3});
//! let normalized = normalize_and_validate("keypad", raw.as_object().unwrap());
//! assert!(normalized.validation.ok);
//! assert_eq!(normalized.canonical["code"], "0451");
//! assert_eq!(normalized.canonical["codeLength"], 4);
//! ```

mod artifact_type;
mod schema;
mod schemas;

use serde::Serialize;
use serde_json::{Map, Value};

pub use artifact_type::ArtifactType;
pub use schema::{ArtifactSchema, DefaultValue, FieldKind, FieldSpec, SchemaCheck};

/// Outcome of validating one artifact's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataValidation {
    pub ok: bool,
    pub errors: Vec<String>,
}

impl MetadataValidation {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }
}

/// Canonical metadata together with its validation result.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedArtifactMetadata {
    /// `None` when the artifact type is not in the registry
    pub artifact_type: Option<ArtifactType>,
    pub canonical: Map<String, Value>,
    pub validation: MetadataValidation,
}

/// Normalize and validate raw metadata for the given artifact type string.
///
/// Unknown types fail validation and hand back the raw metadata unchanged.
pub fn normalize_and_validate(
    artifact_type: &str,
    raw: &Map<String, Value>,
) -> NormalizedArtifactMetadata {
    let parsed = match artifact_type.parse::<ArtifactType>() {
        Ok(parsed) => parsed,
        Err(_) => {
            return NormalizedArtifactMetadata {
                artifact_type: None,
                canonical: raw.clone(),
                validation: MetadataValidation::from_errors(vec![format!(
                    "Unknown artifact type: \"{}\"",
                    artifact_type
                )]),
            };
        }
    };

    let (canonical, errors) = parsed.schema().normalize(raw);
    NormalizedArtifactMetadata {
        artifact_type: Some(parsed),
        canonical,
        validation: MetadataValidation::from_errors(errors),
    }
}
