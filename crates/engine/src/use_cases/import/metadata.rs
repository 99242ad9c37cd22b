//! Per-artifact metadata validation for one game.

use serde_json::{Map, Value};

use playkit_domain::{normalize_and_validate, Artifact, ArtifactType};

use super::types::{ImportIssue, IssueLog};

/// Canonical metadata of an artifact that passed its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidArtifactMetadata {
    pub artifact_type: ArtifactType,
    pub canonical: Map<String, Value>,
}

/// Outcome for every artifact of a game, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataReport {
    /// `None` at the index of every artifact that failed validation
    pub artifacts: Vec<Option<ValidArtifactMetadata>>,
    pub issues: IssueLog,
}

/// Run every artifact through the schema registry. Failures are collected
/// so a game with several broken artifacts reports all of them.
pub fn validate_artifact_metadata(artifacts: &[Artifact], game_label: &str) -> MetadataReport {
    let mut report = MetadataReport {
        artifacts: Vec::with_capacity(artifacts.len()),
        issues: IssueLog::default(),
    };

    for (index, artifact) in artifacts.iter().enumerate() {
        let normalized = normalize_and_validate(&artifact.artifact_type, &artifact.metadata);

        let column = match normalized.artifact_type {
            Some(_) => format!("artifacts[{}].metadata", index),
            None => format!("artifacts[{}].artifact_type", index),
        };
        for error in &normalized.validation.errors {
            report.issues.push(
                ImportIssue::error(
                    column.clone(),
                    format!("{} \"{}\": {}", artifact.artifact_type, artifact.title, error),
                )
                .labelled(game_label),
            );
        }

        report.artifacts.push(match normalized.artifact_type {
            Some(artifact_type) if normalized.validation.ok => Some(ValidArtifactMetadata {
                artifact_type,
                canonical: normalized.canonical,
            }),
            _ => None,
        });
    }

    tracing::debug!(
        game = game_label,
        artifacts = artifacts.len(),
        errors = report.issues.errors.len(),
        "Validated artifact metadata"
    );
    report
}
