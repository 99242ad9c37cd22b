//! Step entity - the unit a leader walks through during play

use crate::ids::StepId;
use crate::value_objects::EntityRef;

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: Option<StepId>,
    pub source_id: Option<String>,
    /// Global 1-based position across the whole game
    pub order: u32,
    /// Phase this step belongs to, resolved at import time
    pub phase: Option<EntityRef>,
    pub title: String,
    pub body: String,
    pub duration_seconds: Option<u32>,
    /// Notes only the leader sees
    pub leader_script: Option<String>,
}

impl Step {
    pub fn new(order: u32, title: impl Into<String>) -> Self {
        Self {
            id: None,
            source_id: None,
            order,
            phase: None,
            title: title.into(),
            body: String::new(),
            duration_seconds: None,
            leader_script: None,
        }
    }

    pub fn in_phase(mut self, phase: EntityRef) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}
