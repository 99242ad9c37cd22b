//! Trigger entity - condition/action rules evaluated during play
//!
//! At import time the condition and the actions are still free-form JSON
//! objects tagged by a `type` field. They may carry order-based or
//! source-ID references that are rewritten into resolved IDs before the
//! game is written; see the engine's trigger reference rewriter.

use serde_json::{Map, Value};

use crate::ids::TriggerId;

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub id: Option<TriggerId>,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    /// Tagged object `{type, ...fields}`
    pub condition: Map<String, Value>,
    /// Ordered list of tagged objects `{type, ...fields}`
    pub actions: Vec<Map<String, Value>>,
    pub delay_seconds: u32,
    pub execute_once: bool,
    pub sort_order: i32,
}

impl Trigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            enabled: true,
            condition: Map::new(),
            actions: Vec::new(),
            delay_seconds: 0,
            execute_once: false,
            sort_order: 0,
        }
    }

    pub fn with_condition(mut self, condition: Map<String, Value>) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_action(mut self, action: Map<String, Value>) -> Self {
        self.actions.push(action);
        self
    }

    /// The declared condition type, if any.
    pub fn condition_type(&self) -> Option<&str> {
        self.condition.get("type").and_then(Value::as_str)
    }
}
