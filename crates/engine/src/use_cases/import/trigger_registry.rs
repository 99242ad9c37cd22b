//! Closed registries of trigger condition and action types.
//!
//! Each type name maps to one resolver function that reads the type's
//! fields, resolves its references and produces the typed variant. A type
//! missing from the registry is rejected; there is no passthrough.

use serde_json::{Map, Value};
use uuid::Uuid;

use playkit_domain::{
    ArtifactId, EntityKind, EntityRef, PhaseId, StepId, TriggerAction, TriggerCondition,
};

use super::id_map::TriggerIdMap;
use super::refs::resolve_ref;
use super::types::{ImportIssue, IssueLog};

/// Marker for a failure whose issue has already been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reported;

pub type ConditionResolver = fn(&mut FieldReader<'_>) -> Result<TriggerCondition, Reported>;
pub type ActionResolver = fn(&mut FieldReader<'_>) -> Result<TriggerAction, Reported>;

/// Where a reference lives in a condition or action, and where it goes.
#[derive(Debug, Clone, Copy)]
pub struct RefField {
    pub kind: EntityKind,
    pub order_key: &'static str,
    /// Accepted ID keys; more than one means aliases of the same reference
    pub id_keys: &'static [&'static str],
    pub output: &'static str,
}

const STEP_REF: RefField = RefField {
    kind: EntityKind::Step,
    order_key: "stepOrder",
    id_keys: &["stepId"],
    output: "stepId",
};

const PHASE_REF: RefField = RefField {
    kind: EntityKind::Phase,
    order_key: "phaseOrder",
    id_keys: &["phaseId"],
    output: "phaseId",
};

const KEYPAD_REF: RefField = RefField {
    kind: EntityKind::Artifact,
    order_key: "artifactOrder",
    id_keys: &["artifactId", "keypadId"],
    output: "keypadId",
};

const RIDDLE_REF: RefField = RefField {
    kind: EntityKind::Artifact,
    order_key: "artifactOrder",
    id_keys: &["artifactId", "riddleId"],
    output: "riddleId",
};

const ARTIFACT_REF: RefField = RefField {
    kind: EntityKind::Artifact,
    order_key: "artifactOrder",
    id_keys: &["artifactId"],
    output: "artifactId",
};

// =============================================================================
// Registries
// =============================================================================

static CONDITIONS: [(&str, ConditionResolver); 7] = [
    ("manual", resolve_manual),
    ("step_started", resolve_step_started),
    ("phase_started", resolve_phase_started),
    ("phase_completed", resolve_phase_completed),
    ("keypad_correct", resolve_keypad_correct),
    ("riddle_correct", resolve_riddle_correct),
    ("time", resolve_time),
];

static ACTIONS: [(&str, ActionResolver); 3] = [
    ("reveal_artifact", resolve_reveal_artifact),
    ("hide_artifact", resolve_hide_artifact),
    ("notify", resolve_notify),
];

pub fn condition_resolver(type_name: &str) -> Option<ConditionResolver> {
    CONDITIONS
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, resolver)| *resolver)
}

pub fn action_resolver(type_name: &str) -> Option<ActionResolver> {
    ACTIONS
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, resolver)| *resolver)
}

pub fn condition_types() -> Vec<&'static str> {
    CONDITIONS.iter().map(|(name, _)| *name).collect()
}

pub fn action_types() -> Vec<&'static str> {
    ACTIONS.iter().map(|(name, _)| *name).collect()
}

fn resolve_manual(_: &mut FieldReader<'_>) -> Result<TriggerCondition, Reported> {
    Ok(TriggerCondition::Manual)
}

fn resolve_step_started(reader: &mut FieldReader<'_>) -> Result<TriggerCondition, Reported> {
    let step_id = StepId::from_uuid(reader.reference(&STEP_REF)?);
    Ok(TriggerCondition::StepStarted { step_id })
}

fn resolve_phase_started(reader: &mut FieldReader<'_>) -> Result<TriggerCondition, Reported> {
    let phase_id = PhaseId::from_uuid(reader.reference(&PHASE_REF)?);
    Ok(TriggerCondition::PhaseStarted { phase_id })
}

fn resolve_phase_completed(reader: &mut FieldReader<'_>) -> Result<TriggerCondition, Reported> {
    let phase_id = PhaseId::from_uuid(reader.reference(&PHASE_REF)?);
    Ok(TriggerCondition::PhaseCompleted { phase_id })
}

fn resolve_keypad_correct(reader: &mut FieldReader<'_>) -> Result<TriggerCondition, Reported> {
    let keypad_id = ArtifactId::from_uuid(reader.reference(&KEYPAD_REF)?);
    Ok(TriggerCondition::KeypadCorrect { keypad_id })
}

fn resolve_riddle_correct(reader: &mut FieldReader<'_>) -> Result<TriggerCondition, Reported> {
    let riddle_id = ArtifactId::from_uuid(reader.reference(&RIDDLE_REF)?);
    Ok(TriggerCondition::RiddleCorrect { riddle_id })
}

fn resolve_time(reader: &mut FieldReader<'_>) -> Result<TriggerCondition, Reported> {
    let delay_seconds = reader.optional_u32("delaySeconds")?;
    Ok(TriggerCondition::Time { delay_seconds })
}

fn resolve_reveal_artifact(reader: &mut FieldReader<'_>) -> Result<TriggerAction, Reported> {
    let artifact_id = ArtifactId::from_uuid(reader.reference(&ARTIFACT_REF)?);
    Ok(TriggerAction::RevealArtifact { artifact_id })
}

fn resolve_hide_artifact(reader: &mut FieldReader<'_>) -> Result<TriggerAction, Reported> {
    let artifact_id = ArtifactId::from_uuid(reader.reference(&ARTIFACT_REF)?);
    Ok(TriggerAction::HideArtifact { artifact_id })
}

fn resolve_notify(reader: &mut FieldReader<'_>) -> Result<TriggerAction, Reported> {
    let message = reader.required_text("message")?;
    Ok(TriggerAction::Notify { message })
}

// =============================================================================
// Field reader
// =============================================================================

/// Reads the fields of one condition or action and records issues against
/// their JSON path. Fields never read are reported as unknown in `finish`.
pub struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    path: &'a str,
    type_name: &'a str,
    id_map: &'a TriggerIdMap,
    known: Vec<&'static str>,
    issues: IssueLog,
}

impl<'a> FieldReader<'a> {
    pub fn new(
        fields: &'a Map<String, Value>,
        path: &'a str,
        type_name: &'a str,
        id_map: &'a TriggerIdMap,
    ) -> Self {
        Self {
            fields,
            path,
            type_name,
            id_map,
            known: vec!["type"],
            issues: IssueLog::default(),
        }
    }

    fn column(&self, key: &str) -> String {
        format!("{}.{}", self.path, key)
    }

    fn error(&mut self, key: &str, message: String) -> Reported {
        let column = self.column(key);
        self.issues.push(ImportIssue::error(column, message));
        Reported
    }

    /// Field value, with `null` treated as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    /// Resolve the reference described by `field` to an ID.
    pub fn reference(&mut self, field: &RefField) -> Result<Uuid, Reported> {
        self.known.push(field.order_key);
        self.known.extend(field.id_keys.iter().copied());
        let kind = field.kind;

        let order = match self.get(field.order_key) {
            None => None,
            Some(value) => match parse_order(value) {
                Some(order) => Some(order),
                None => {
                    return Err(self.error(
                        field.order_key,
                        format!("Invalid {} value: {}", field.order_key, value),
                    ))
                }
            },
        };

        let mut ids: Vec<(&'static str, &'a str)> = Vec::new();
        for key in field.id_keys.iter().copied() {
            if let Some(value) = self.get(key) {
                match value.as_str().map(str::trim) {
                    Some(id) if !id.is_empty() => ids.push((key, id)),
                    _ => return Err(self.error(key, format!("Invalid {} value: {}", key, value))),
                }
            }
        }

        if let Some(((first_key, first_id), rest)) = ids.split_first() {
            if let Some((key, _)) = rest.iter().find(|(_, id)| id != first_id) {
                return Err(self.error(
                    key,
                    format!(
                        "Ambiguous {} reference: {} and {} point at different entities",
                        kind, first_key, key
                    ),
                ));
            }
        }

        let (key, reference) = match (order, ids.first()) {
            (Some(_), Some((id_key, _))) => {
                return Err(self.error(
                    field.order_key,
                    format!(
                        "Ambiguous {} reference: both {} and {} supplied",
                        kind, field.order_key, id_key
                    ),
                ))
            }
            (Some(order), None) => (field.order_key, EntityRef::Order(order)),
            (None, Some((id_key, id))) => (*id_key, EntityRef::id(*id)),
            (None, None) => {
                return Err(self.error(field.output, format!("Missing {} reference", kind)))
            }
        };

        match resolve_ref(self.id_map, kind, &reference) {
            Ok(resolved) => {
                if let Some(warning) = resolved.warning {
                    let column = self.column(key);
                    self.issues.push(ImportIssue::warning(column, warning));
                }
                Ok(resolved.id)
            }
            Err(message) => Err(self.error(key, message)),
        }
    }

    pub fn optional_u32(&mut self, key: &'static str) -> Result<Option<u32>, Reported> {
        self.known.push(key);
        match self.get(key) {
            None => Ok(None),
            Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(n) => Ok(Some(n)),
                None => Err(self.error(key, format!("Invalid {} value: {}", key, value))),
            },
        }
    }

    pub fn required_text(&mut self, key: &'static str) -> Result<String, Reported> {
        self.known.push(key);
        match self.get(key).and_then(Value::as_str).map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => {
                let message = format!("{} requires a non-empty {}", self.type_name, key);
                Err(self.error(key, message))
            }
        }
    }

    /// Report unread fields and hand back every issue recorded.
    pub fn finish(mut self) -> IssueLog {
        let fields = self.fields;
        for key in fields.keys() {
            if !self.known.iter().any(|known| *known == key.as_str()) {
                let column = self.column(key);
                self.issues.push(ImportIssue::warning(
                    column,
                    format!("Ignoring unknown field \"{}\" on {}", key, self.type_name),
                ));
            }
        }
        self.issues
    }
}

/// Positive integer order, as a number or a numeric string.
fn parse_order(value: &Value) -> Option<u32> {
    let order = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(order).ok().filter(|order| *order >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn registries_are_closed() {
        assert_eq!(
            condition_types(),
            vec![
                "manual",
                "step_started",
                "phase_started",
                "phase_completed",
                "keypad_correct",
                "riddle_correct",
                "time"
            ]
        );
        assert_eq!(action_types(), vec!["reveal_artifact", "hide_artifact", "notify"]);
        assert!(condition_resolver("teleport").is_none());
        assert!(action_resolver("explode").is_none());
    }

    #[test]
    fn keypad_accepts_matching_aliases() {
        let keypad = Uuid::new_v4();
        let map = TriggerIdMap::builder()
            .insert(EntityKind::Artifact, 2, Some("vault"), keypad)
            .build();
        let fields = fields(json!({"type": "keypad_correct", "artifactId": "vault", "keypadId": "vault"}));

        let mut reader = FieldReader::new(&fields, "triggers[0].condition", "keypad_correct", &map);
        let resolved = resolve_keypad_correct(&mut reader);
        let issues = reader.finish();

        assert_eq!(
            resolved,
            Ok(TriggerCondition::KeypadCorrect {
                keypad_id: ArtifactId::from_uuid(keypad)
            })
        );
        assert_eq!(issues, IssueLog::default());
    }

    #[test]
    fn order_must_be_a_positive_integer() {
        assert_eq!(parse_order(&json!(3)), Some(3));
        assert_eq!(parse_order(&json!("4")), Some(4));
        assert_eq!(parse_order(&json!(0)), None);
        assert_eq!(parse_order(&json!(-1)), None);
        assert_eq!(parse_order(&json!(1.5)), None);
        assert_eq!(parse_order(&json!(true)), None);
    }

    #[test]
    fn time_condition_validates_delay() {
        let map = TriggerIdMap::builder().build();
        let fields = fields(json!({"type": "time", "delaySeconds": "soon"}));

        let mut reader = FieldReader::new(&fields, "triggers[4].condition", "time", &map);
        assert_eq!(resolve_time(&mut reader), Err(Reported));
        let issues = reader.finish();

        assert_eq!(issues.errors.len(), 1);
        assert_eq!(issues.errors[0].column, "triggers[4].condition.delaySeconds");
    }
}
