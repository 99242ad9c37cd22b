//! Value objects - Immutable objects defined by their attributes

mod entity_ref;
mod trigger_rules;

pub use entity_ref::{EntityKind, EntityRef};
pub use trigger_rules::{TriggerAction, TriggerCondition};
