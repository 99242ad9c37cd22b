//! Trigger reference rewriting.
//!
//! Turns a parsed trigger, whose condition and actions still carry orders
//! or source IDs, into a [`ResolvedTrigger`] that only holds IDs. Problems
//! are collected as [`ImportIssue`]s; nothing here aborts the batch.

use serde_json::{Map, Value};

use playkit_domain::{Trigger, TriggerAction, TriggerCondition, TriggerId};

use crate::infrastructure::ports::ResolvedTrigger;

use super::id_map::TriggerIdMap;
use super::trigger_registry::{
    action_resolver, action_types, condition_resolver, condition_types, FieldReader,
};
use super::types::{ImportIssue, IssueLog};

/// Result of rewriting one trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRewrite {
    /// `None` when any error was recorded
    pub trigger: Option<ResolvedTrigger>,
    pub errors: Vec<ImportIssue>,
    pub warnings: Vec<ImportIssue>,
}

/// Result of rewriting every trigger of one game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerBatchRewrite {
    pub triggers: Vec<ResolvedTrigger>,
    pub errors: Vec<ImportIssue>,
    pub warnings: Vec<ImportIssue>,
}

impl TriggerBatchRewrite {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn rewrite_trigger_refs(
    trigger: &Trigger,
    id_map: &TriggerIdMap,
    trigger_index: usize,
) -> TriggerRewrite {
    let path = format!("triggers[{}]", trigger_index);
    let mut issues = IssueLog::default();

    let condition = rewrite_condition(
        &trigger.condition,
        id_map,
        &format!("{}.condition", path),
        &mut issues,
    );

    // Every action is visited even after a failure so all problems surface at once
    let mut actions = Vec::with_capacity(trigger.actions.len());
    for (action_index, action) in trigger.actions.iter().enumerate() {
        let action_path = format!("{}.actions[{}]", path, action_index);
        if let Some(resolved) = rewrite_action(action, id_map, &action_path, &mut issues) {
            actions.push(resolved);
        }
    }

    let resolved = match condition {
        Some(condition) if !issues.has_errors() => Some(ResolvedTrigger {
            id: trigger
                .id
                .unwrap_or_else(|| TriggerId::from_uuid(id_map.derive_id("trigger", trigger_index))),
            name: trigger.name.clone(),
            description: trigger.description.clone(),
            enabled: trigger.enabled,
            condition,
            actions,
            delay_seconds: trigger.delay_seconds,
            execute_once: trigger.execute_once,
            sort_order: trigger.sort_order,
        }),
        _ => None,
    };

    TriggerRewrite {
        trigger: resolved,
        errors: issues.errors,
        warnings: issues.warnings,
    }
}

pub fn rewrite_all_trigger_refs(
    triggers: &[Trigger],
    id_map: &TriggerIdMap,
    game_label: &str,
) -> TriggerBatchRewrite {
    let mut batch = TriggerBatchRewrite::default();

    for (index, trigger) in triggers.iter().enumerate() {
        let rewrite = rewrite_trigger_refs(trigger, id_map, index);
        batch.triggers.extend(rewrite.trigger);
        batch
            .errors
            .extend(rewrite.errors.into_iter().map(|issue| issue.labelled(game_label)));
        batch
            .warnings
            .extend(rewrite.warnings.into_iter().map(|issue| issue.labelled(game_label)));
    }

    tracing::debug!(
        game = game_label,
        resolved = batch.triggers.len(),
        total = triggers.len(),
        errors = batch.errors.len(),
        warnings = batch.warnings.len(),
        "Rewrote trigger references"
    );
    batch
}

fn rewrite_condition(
    fields: &Map<String, Value>,
    id_map: &TriggerIdMap,
    path: &str,
    issues: &mut IssueLog,
) -> Option<TriggerCondition> {
    let type_name = read_type(fields, path, "Condition", issues)?;
    let Some(resolve) = condition_resolver(type_name) else {
        issues.push(ImportIssue::error(
            format!("{}.type", path),
            format!(
                "Unknown condition type: \"{}\" (POLICY: unknown condition types are rejected; supported: {})",
                type_name,
                condition_types().join(", ")
            ),
        ));
        return None;
    };

    let mut reader = FieldReader::new(fields, path, type_name, id_map);
    let resolved = resolve(&mut reader);
    issues.extend(reader.finish());
    resolved.ok()
}

fn rewrite_action(
    fields: &Map<String, Value>,
    id_map: &TriggerIdMap,
    path: &str,
    issues: &mut IssueLog,
) -> Option<TriggerAction> {
    let type_name = read_type(fields, path, "Action", issues)?;
    let Some(resolve) = action_resolver(type_name) else {
        issues.push(ImportIssue::error(
            format!("{}.type", path),
            format!(
                "Unknown action type: \"{}\" (POLICY: unknown action types are rejected; supported: {})",
                type_name,
                action_types().join(", ")
            ),
        ));
        return None;
    };

    let mut reader = FieldReader::new(fields, path, type_name, id_map);
    let resolved = resolve(&mut reader);
    issues.extend(reader.finish());
    resolved.ok()
}

fn read_type<'a>(
    fields: &'a Map<String, Value>,
    path: &str,
    label: &str,
    issues: &mut IssueLog,
) -> Option<&'a str> {
    let column = format!("{}.type", path);
    match fields.get("type") {
        None | Some(Value::Null) => {
            issues.push(ImportIssue::error(column, format!("{} missing type field", label)));
            None
        }
        Some(Value::String(type_name)) if !type_name.trim().is_empty() => Some(type_name.trim()),
        Some(Value::String(_)) => {
            issues.push(ImportIssue::error(column, format!("{} missing type field", label)));
            None
        }
        Some(other) => {
            issues.push(ImportIssue::error(
                column,
                format!("{} type must be a string, got {}", label, other),
            ));
            None
        }
    }
}
