//! Helper types for port operations.
//!
//! The upsert payload is the fully resolved form of one game: every entity
//! carries its final ID and every cross-reference points at an ID, so the
//! gateway never has to interpret orders or source IDs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use playkit_domain::{
    ArtifactId, ArtifactType, ArtifactVariantId, AssignmentStrategy, GameId, GameStatus,
    ImportRunId, PhaseId, PhaseType, PlayMode, RoleId, StepId, TriggerAction, TriggerCondition,
    TriggerId, Visibility,
};

// =============================================================================
// Upsert Payload
// =============================================================================

/// One game, resolved and ready for a single atomic write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameUpsertPayload {
    pub game_id: GameId,
    /// Replace an existing game's content instead of creating a new game
    pub is_update: bool,
    pub import_run_id: ImportRunId,
    pub game: GameRow,
    pub phases: Vec<PhaseRow>,
    pub steps: Vec<StepRow>,
    pub roles: Vec<RoleRow>,
    pub artifacts: Vec<ArtifactRow>,
    pub artifact_variants: Vec<ArtifactVariantRow>,
    pub triggers: Vec<ResolvedTrigger>,
}

impl GameUpsertPayload {
    /// Row counts the gateway is expected to report back.
    pub fn expected_counts(&self) -> UpsertCounts {
        UpsertCounts {
            steps: self.steps.len() as u64,
            phases: self.phases.len() as u64,
            artifacts: self.artifacts.len() as u64,
            variants: self.artifact_variants.len() as u64,
            triggers: self.triggers.len() as u64,
            roles: self.roles.len() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    pub game_key: String,
    pub name: String,
    pub description: Option<String>,
    pub play_mode: PlayMode,
    pub status: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRow {
    pub id: PhaseId,
    pub order: u32,
    pub phase_type: PhaseType,
    pub name: String,
    pub description: String,
    pub duration_seconds: Option<u32>,
    pub timer_visible: bool,
    pub auto_advance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRow {
    pub id: StepId,
    pub phase_id: Option<PhaseId>,
    pub order: u32,
    pub title: String,
    pub body: String,
    pub duration_seconds: Option<u32>,
    pub leader_script: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRow {
    pub id: RoleId,
    pub order: u32,
    pub name: String,
    pub public_description: String,
    pub private_instructions: String,
    pub min_count: u32,
    pub max_count: Option<u32>,
    pub assignment_strategy: AssignmentStrategy,
}

/// Artifact with canonical (normalized) metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRow {
    pub id: ArtifactId,
    pub order: u32,
    pub artifact_type: ArtifactType,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactVariantRow {
    pub id: ArtifactVariantId,
    pub artifact_id: ArtifactId,
    pub order: u32,
    pub title: String,
    pub body: String,
    pub visibility: Visibility,
    pub visible_to_role_id: Option<RoleId>,
}

/// Trigger whose condition and actions reference only resolved IDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTrigger {
    pub id: TriggerId,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub condition: TriggerCondition,
    pub actions: Vec<TriggerAction>,
    pub delay_seconds: u32,
    pub execute_once: bool,
    pub sort_order: i32,
}

// =============================================================================
// Gateway Response
// =============================================================================

/// Rows written per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertCounts {
    pub steps: u64,
    pub phases: u64,
    pub artifacts: u64,
    pub variants: u64,
    pub triggers: u64,
    pub roles: u64,
}

/// Result reported by the gateway. `ok: false` is a business outcome, not a
/// transport failure, and is passed to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub counts: UpsertCounts,
}

impl UpsertResponse {
    pub fn success(counts: UpsertCounts) -> Self {
        Self {
            ok: true,
            error: None,
            code: None,
            counts,
        }
    }

    pub fn failure(code: &str, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            code: Some(code.to_string()),
            counts: UpsertCounts::default(),
        }
    }
}
