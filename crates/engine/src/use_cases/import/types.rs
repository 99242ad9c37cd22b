//! Import issue and report types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use playkit_domain::{GameId, ImportRunId};

use crate::infrastructure::app_settings::ImportMode;
use crate::infrastructure::ports::UpsertCounts;

// =============================================================================
// Issues
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem found in a game, addressed by its JSON path (`column`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportIssue {
    pub column: String,
    pub message: String,
    pub severity: Severity,
}

impl ImportIssue {
    pub fn error(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Prefix the message with a game label, e.g. `[escape-the-lab] ...`.
    pub fn labelled(mut self, label: &str) -> Self {
        self.message = format!("[{}] {}", label, self.message);
        self
    }
}

/// Issues collected by one stage, split by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueLog {
    pub errors: Vec<ImportIssue>,
    pub warnings: Vec<ImportIssue>,
}

impl IssueLog {
    pub fn push(&mut self, issue: ImportIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    pub fn extend(&mut self, other: IssueLog) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// =============================================================================
// Report
// =============================================================================

/// Outcome of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameImportStatus {
    /// Written by the gateway
    Imported,
    /// Dry run: valid, nothing written
    Validated,
    /// Import issues with severity error; nothing sent
    Rejected,
    /// The gateway refused the write
    GatewayRejected {
        error: Option<String>,
        code: Option<String>,
    },
}

impl GameImportStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Rejected | Self::GatewayRejected { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameImportReport {
    pub game_key: String,
    pub game_id: GameId,
    pub is_update: bool,
    #[serde(flatten)]
    pub status: GameImportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<UpsertCounts>,
    pub errors: Vec<ImportIssue>,
    pub warnings: Vec<ImportIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// Report of one import run, one entry per game in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub import_run_id: ImportRunId,
    pub mode: ImportMode,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub games: Vec<GameImportReport>,
}

impl ImportReport {
    pub fn has_failures(&self) -> bool {
        self.games.iter().any(|game| game.status.is_failure())
    }

    pub fn count(&self, predicate: impl Fn(&GameImportStatus) -> bool) -> usize {
        self.games.iter().filter(|game| predicate(&game.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_log_splits_by_severity() {
        let mut log = IssueLog::default();
        log.push(ImportIssue::error("triggers[0].condition.type", "Condition missing type field"));
        log.push(ImportIssue::warning("triggers[0].condition.extra", "Ignoring unknown field"));

        assert!(log.has_errors());
        assert_eq!(log.errors.len(), 1);
        assert_eq!(log.warnings.len(), 1);
        assert!(log.errors[0].is_error());
    }

    #[test]
    fn labelled_prefixes_message() {
        let issue = ImportIssue::error("triggers[2]", "Missing step reference").labelled("lab");
        assert_eq!(issue.message, "[lab] Missing step reference");
        assert_eq!(issue.column, "triggers[2]");
    }

    #[test]
    fn gateway_rejection_serializes_flat() {
        let status = GameImportStatus::GatewayRejected {
            error: Some("exists".to_string()),
            code: Some("GAME_EXISTS".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({"status": "gateway_rejected", "error": "exists", "code": "GAME_EXISTS"})
        );
        assert!(status.is_failure());
        assert!(!GameImportStatus::Validated.is_failure());
    }
}
