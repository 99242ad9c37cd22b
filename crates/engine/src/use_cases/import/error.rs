//! Import operation errors.

use crate::infrastructure::importers::PayloadParseError;
use crate::infrastructure::ports::RepoError;

/// Errors that abort an import run.
///
/// Data problems inside a game are not errors: they are reported as
/// [`super::ImportIssue`]s and only reject that game.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Payload parse error: {0}")]
    Parse(#[from] PayloadParseError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
