//! Resolved trigger conditions and actions.
//!
//! These are the closed vocabularies a trigger may use once every symbolic
//! reference has been rewritten into an ID. They serialize back into the
//! `{type, ...fields}` shape the runtime reads, with camelCase ID fields.

use serde::{Deserialize, Serialize};

use crate::ids::{ArtifactId, PhaseId, StepId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerCondition {
    /// Fired by the leader
    Manual,
    #[serde(rename_all = "camelCase")]
    StepStarted { step_id: StepId },
    #[serde(rename_all = "camelCase")]
    PhaseStarted { phase_id: PhaseId },
    #[serde(rename_all = "camelCase")]
    PhaseCompleted { phase_id: PhaseId },
    #[serde(rename_all = "camelCase")]
    KeypadCorrect { keypad_id: ArtifactId },
    #[serde(rename_all = "camelCase")]
    RiddleCorrect { riddle_id: ArtifactId },
    /// Fires after a delay; carries no reference
    #[serde(rename_all = "camelCase")]
    Time {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delay_seconds: Option<u32>,
    },
}

impl TriggerCondition {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::StepStarted { .. } => "step_started",
            Self::PhaseStarted { .. } => "phase_started",
            Self::PhaseCompleted { .. } => "phase_completed",
            Self::KeypadCorrect { .. } => "keypad_correct",
            Self::RiddleCorrect { .. } => "riddle_correct",
            Self::Time { .. } => "time",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerAction {
    #[serde(rename_all = "camelCase")]
    RevealArtifact { artifact_id: ArtifactId },
    #[serde(rename_all = "camelCase")]
    HideArtifact { artifact_id: ArtifactId },
    Notify { message: String },
}

impl TriggerAction {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RevealArtifact { .. } => "reveal_artifact",
            Self::HideArtifact { .. } => "hide_artifact",
            Self::Notify { .. } => "notify",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn conditions_serialize_with_type_tag_and_camel_case_ids() {
        let id = Uuid::parse_str("00000000-0000-0000-0000-000000000003").unwrap();
        let condition = TriggerCondition::StepStarted {
            step_id: StepId::from_uuid(id),
        };

        assert_eq!(
            serde_json::to_value(&condition).unwrap(),
            json!({"type": "step_started", "stepId": "00000000-0000-0000-0000-000000000003"})
        );
        assert_eq!(
            serde_json::to_value(TriggerCondition::Manual).unwrap(),
            json!({"type": "manual"})
        );
        assert_eq!(
            serde_json::to_value(TriggerCondition::Time { delay_seconds: None }).unwrap(),
            json!({"type": "time"})
        );
    }

    #[test]
    fn actions_serialize_with_type_tag() {
        let action = TriggerAction::Notify {
            message: "The vault is open".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "notify", "message": "The vault is open"})
        );
        assert_eq!(action.type_name(), "notify");
    }
}
