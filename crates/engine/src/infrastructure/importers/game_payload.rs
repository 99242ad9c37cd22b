//! Game import document parser.
//!
//! Converts raw import JSON into domain [`Game`]s. The parser is strict
//! about shape (required fields, enum values, contiguous orders, unique
//! identifiers) and fails with a message naming the game and field path.
//! It does not resolve references: that happens once IDs are known.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use playkit_domain::{
    Artifact, ArtifactVariant, AssignmentStrategy, EntityRef, Game, GameStatus, Phase, PhaseType,
    PlayMode, Role, Step, Trigger, Visibility,
};

use super::game_payload_types::*;

/// Errors raised while parsing an import document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadParseError {
    #[error("Invalid JSON payload: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("Unsupported payload shape: {0}")]
    UnsupportedShape(String),
    #[error("Payload contains no games")]
    Empty,
    #[error("Game {location}: {message}")]
    InvalidGame { location: String, message: String },
}

/// Where in the document a game sits, for error messages.
struct GameLocation {
    index: usize,
    key: Option<String>,
}

impl GameLocation {
    fn error(&self, message: impl Into<String>) -> PayloadParseError {
        PayloadParseError::InvalidGame {
            location: self.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for GameLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "#{} (\"{}\")", self.index, key),
            None => write!(f, "#{}", self.index),
        }
    }
}

/// Parse an import document into games, preserving document order.
///
/// Accepts `{"games": [...]}`, a bare array of games, or a single game.
pub fn parse_games_from_json_payload(raw: &str) -> Result<Vec<Game>, PayloadParseError> {
    let document: Value =
        serde_json::from_str(raw).map_err(|e| PayloadParseError::InvalidJson {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?;

    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut map) if map.contains_key("games") => match map.remove("games") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(PayloadParseError::UnsupportedShape(
                    "\"games\" must be an array".to_string(),
                ))
            }
        },
        Value::Object(map) => vec![Value::Object(map)],
        other => {
            return Err(PayloadParseError::UnsupportedShape(format!(
                "expected an object or array, got {}",
                json_type_name(&other)
            )))
        }
    };

    if items.is_empty() {
        return Err(PayloadParseError::Empty);
    }

    let mut games = Vec::with_capacity(items.len());
    let mut seen_keys: HashMap<String, usize> = HashMap::new();

    for (index, item) in items.into_iter().enumerate() {
        let location = GameLocation {
            index,
            key: item
                .get("game_key")
                .and_then(Value::as_str)
                .map(str::to_string),
        };

        if !item.is_object() {
            return Err(location.error(format!(
                "must be a JSON object, got {}",
                json_type_name(&item)
            )));
        }

        let raw: RawGame = serde_json::from_value(item).map_err(|e| location.error(e.to_string()))?;
        let game = convert_game(raw).map_err(|message| location.error(message))?;

        if let Some(first) = seen_keys.insert(game.game_key.clone(), index) {
            return Err(location.error(format!(
                "game_key \"{}\" already used by game #{}",
                game.game_key, first
            )));
        }
        games.push(game);
    }

    tracing::debug!(games = games.len(), "Parsed import payload");
    Ok(games)
}

/// Export games in the import format; parsing the result yields the same games.
pub fn serialize_games(games: &[Game]) -> Result<String, serde_json::Error> {
    let document = RawGameDocument {
        games: games.iter().map(export_game).collect(),
    };
    serde_json::to_string_pretty(&document)
}

// =============================================================================
// Conversion: raw -> domain
// =============================================================================

fn convert_game(raw: RawGame) -> Result<Game, String> {
    let game_key = required(raw.game_key, "game_key")?;
    let name = required(raw.name, "name")?;

    let mut game = Game::new(game_key, name)
        .with_play_mode(parse_enum::<PlayMode>(raw.play_mode, "play_mode")?)
        .with_status(parse_enum::<GameStatus>(raw.status, "status")?);
    game.description = raw.description;

    let phase_orders = resolve_orders(raw.phases.iter().map(|p| p.order), "phases")?;
    let mut phase_ids = UniqueIds::new("phases");
    for (index, (raw_phase, order)) in raw.phases.into_iter().zip(phase_orders).enumerate() {
        let path = format!("phases[{}]", index);
        let id = parse_uuid(raw_phase.id.as_deref(), &path)?;
        phase_ids.check(index, id, raw_phase.source_id.as_deref())?;
        game.phases.push(Phase {
            id: id.map(From::from),
            source_id: raw_phase.source_id,
            order,
            phase_type: parse_enum::<PhaseType>(raw_phase.phase_type, &format!("{}.phase_type", path))?,
            name: required(raw_phase.name, &format!("{}.name", path))?,
            description: raw_phase.description.unwrap_or_default(),
            duration_seconds: raw_phase.duration_seconds,
            timer_visible: raw_phase.timer_visible.unwrap_or(false),
            auto_advance: raw_phase.auto_advance.unwrap_or(false),
        });
    }

    let step_orders = resolve_orders(raw.steps.iter().map(|s| s.order), "steps")?;
    let mut step_ids = UniqueIds::new("steps");
    for (index, (raw_step, order)) in raw.steps.into_iter().zip(step_orders).enumerate() {
        let path = format!("steps[{}]", index);
        let id = parse_uuid(raw_step.id.as_deref(), &path)?;
        step_ids.check(index, id, raw_step.source_id.as_deref())?;
        game.steps.push(Step {
            id: id.map(From::from),
            source_id: raw_step.source_id,
            order,
            phase: entity_ref(raw_step.phase_order, raw_step.phase_id, &path, "phase_order", "phase_id")?,
            title: required(raw_step.title, &format!("{}.title", path))?,
            body: raw_step.body.unwrap_or_default(),
            duration_seconds: raw_step.duration_seconds,
            leader_script: raw_step.leader_script,
        });
    }

    let role_orders = resolve_orders(raw.roles.iter().map(|r| r.order), "roles")?;
    let mut role_ids = UniqueIds::new("roles");
    for (index, (raw_role, order)) in raw.roles.into_iter().zip(role_orders).enumerate() {
        let path = format!("roles[{}]", index);
        let id = parse_uuid(raw_role.id.as_deref(), &path)?;
        role_ids.check(index, id, raw_role.source_id.as_deref())?;
        let role = Role {
            id: id.map(From::from),
            source_id: raw_role.source_id,
            order,
            name: required(raw_role.name, &format!("{}.name", path))?,
            public_description: raw_role.public_description.unwrap_or_default(),
            private_instructions: raw_role.private_instructions.unwrap_or_default(),
            min_count: raw_role.min_count.unwrap_or(1),
            max_count: raw_role.max_count,
            assignment_strategy: parse_enum::<AssignmentStrategy>(
                raw_role.assignment_strategy,
                &format!("{}.assignment_strategy", path),
            )?,
        };
        role.validate_counts().map_err(|e| format!("{}: {}", path, e))?;
        game.roles.push(role);
    }

    let artifact_orders = resolve_orders(raw.artifacts.iter().map(|a| a.order), "artifacts")?;
    let mut artifact_ids = UniqueIds::new("artifacts");
    let mut variant_ids: HashSet<Uuid> = HashSet::new();
    for (index, (raw_artifact, order)) in raw.artifacts.into_iter().zip(artifact_orders).enumerate() {
        let path = format!("artifacts[{}]", index);
        let artifact_id = parse_uuid(raw_artifact.id.as_deref(), &path)?;
        artifact_ids.check(index, artifact_id, raw_artifact.source_id.as_deref())?;

        let metadata = match raw_artifact.metadata {
            None => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(format!(
                    "{}.metadata must be a JSON object, got {}",
                    path,
                    json_type_name(&other)
                ))
            }
        };

        let variant_orders = resolve_orders(
            raw_artifact.variants.iter().map(|v| v.order),
            &format!("{}.variants", path),
        )?;
        let mut variants = Vec::with_capacity(raw_artifact.variants.len());
        for (variant_index, (raw_variant, variant_order)) in
            raw_artifact.variants.into_iter().zip(variant_orders).enumerate()
        {
            let variant_path = format!("{}.variants[{}]", path, variant_index);
            let variant_id = parse_uuid(raw_variant.id.as_deref(), &variant_path)?;
            if let Some(id) = variant_id {
                if !variant_ids.insert(id) {
                    return Err(format!("{}.id \"{}\" is used by another variant", variant_path, id));
                }
            }
            variants.push(ArtifactVariant {
                id: variant_id.map(From::from),
                order: variant_order,
                title: raw_variant.title.unwrap_or_default(),
                body: raw_variant.body.unwrap_or_default(),
                visibility: parse_enum::<Visibility>(
                    raw_variant.visibility,
                    &format!("{}.visibility", variant_path),
                )?,
                visible_to_role: entity_ref(
                    raw_variant.visible_to_role_order,
                    raw_variant.visible_to_role_id,
                    &variant_path,
                    "visible_to_role_order",
                    "visible_to_role_id",
                )?,
            });
        }

        game.artifacts.push(Artifact {
            id: artifact_id.map(From::from),
            source_id: raw_artifact.source_id,
            order,
            artifact_type: required(raw_artifact.artifact_type, &format!("{}.artifact_type", path))?,
            title: required(raw_artifact.title, &format!("{}.title", path))?,
            description: raw_artifact.description.unwrap_or_default(),
            tags: raw_artifact.tags,
            metadata,
            variants,
        });
    }

    let mut trigger_ids: HashSet<Uuid> = HashSet::new();
    for (index, raw_trigger) in raw.triggers.into_iter().enumerate() {
        let path = format!("triggers[{}]", index);
        let trigger_id = parse_uuid(raw_trigger.id.as_deref(), &path)?;
        if let Some(id) = trigger_id {
            if !trigger_ids.insert(id) {
                return Err(format!("{}.id \"{}\" is used by another trigger", path, id));
            }
        }

        let condition = match raw_trigger.condition {
            None => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(format!(
                    "{}.condition must be a JSON object, got {}",
                    path,
                    json_type_name(&other)
                ))
            }
        };

        let actions = match raw_trigger.actions {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(action_index, item)| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(format!(
                        "{}.actions[{}] must be a JSON object, got {}",
                        path,
                        action_index,
                        json_type_name(&other)
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(format!(
                    "{}.actions must be an array, got {}",
                    path,
                    json_type_name(&other)
                ))
            }
        };

        game.triggers.push(Trigger {
            id: trigger_id.map(From::from),
            name: required(raw_trigger.name, &format!("{}.name", path))?,
            description: raw_trigger.description.unwrap_or_default(),
            enabled: raw_trigger.enabled.unwrap_or(true),
            condition,
            actions,
            delay_seconds: raw_trigger.delay_seconds.unwrap_or(0),
            execute_once: raw_trigger.execute_once.unwrap_or(false),
            sort_order: raw_trigger.sort_order.unwrap_or(index as i32),
        });
    }

    Ok(game)
}

/// Required, non-blank string. The value itself is kept as written.
fn required(value: Option<String>, path: &str) -> Result<String, String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(format!("{} must not be blank", path)),
        None => Err(format!("{} is required", path)),
    }
}

fn parse_enum<T>(value: Option<String>, path: &str) -> Result<T, String>
where
    T: FromStr + Default,
    T::Err: fmt::Display,
{
    match value {
        None => Ok(T::default()),
        Some(value) => value
            .parse::<T>()
            .map_err(|e| format!("{} has an invalid value: {}", path, e)),
    }
}

/// Provided IDs are compared as parsed UUIDs, so spelling differences
/// (case, surrounding whitespace) cannot hide a duplicate.
fn parse_uuid(value: Option<&str>, path: &str) -> Result<Option<Uuid>, String> {
    value
        .map(|value| {
            Uuid::parse_str(value.trim())
                .map_err(|_| format!("{}.id is not a valid UUID: \"{}\"", path, value))
        })
        .transpose()
}

/// Build an optional reference from an order field and an ID field.
fn entity_ref(
    order: Option<u32>,
    id: Option<String>,
    path: &str,
    order_field: &str,
    id_field: &str,
) -> Result<Option<EntityRef>, String> {
    match (order, id) {
        (Some(_), Some(_)) => Err(format!(
            "{} sets both {} and {}; use one",
            path, order_field, id_field
        )),
        (Some(0), None) => Err(format!("{}.{} must be at least 1", path, order_field)),
        (Some(order), None) => Ok(Some(EntityRef::Order(order))),
        (None, Some(id)) if id.trim().is_empty() => {
            Err(format!("{}.{} must not be blank", path, id_field))
        }
        (None, Some(id)) => Ok(Some(EntityRef::Id(id))),
        (None, None) => Ok(None),
    }
}

/// Fill missing orders with position + 1 and require the result to be a
/// permutation of `1..=n`.
fn resolve_orders(
    orders: impl Iterator<Item = Option<u32>>,
    collection: &str,
) -> Result<Vec<u32>, String> {
    let resolved: Vec<u32> = orders
        .enumerate()
        .map(|(index, order)| order.unwrap_or(index as u32 + 1))
        .collect();

    let mut sorted = resolved.clone();
    sorted.sort_unstable();
    let contiguous = sorted
        .iter()
        .enumerate()
        .all(|(index, order)| *order == index as u32 + 1);

    if !contiguous {
        return Err(format!(
            "{} orders must be contiguous from 1 to {}, got {:?}",
            collection,
            resolved.len(),
            resolved
        ));
    }

    Ok(resolved)
}

/// Tracks provided IDs and source IDs of one entity kind.
struct UniqueIds<'a> {
    collection: &'a str,
    ids: HashMap<Uuid, usize>,
    source_ids: HashMap<String, usize>,
}

impl<'a> UniqueIds<'a> {
    fn new(collection: &'a str) -> Self {
        Self {
            collection,
            ids: HashMap::new(),
            source_ids: HashMap::new(),
        }
    }

    fn check(&mut self, index: usize, id: Option<Uuid>, source_id: Option<&str>) -> Result<(), String> {
        if let Some(id) = id {
            if let Some(first) = self.ids.insert(id, index) {
                return Err(format!(
                    "{}[{}].id \"{}\" duplicates {}[{}]",
                    self.collection, index, id, self.collection, first
                ));
            }
        }
        if let Some(source_id) = source_id {
            if source_id.trim().is_empty() {
                return Err(format!(
                    "{}[{}].source_id must not be blank",
                    self.collection, index
                ));
            }
            if let Some(first) = self.source_ids.insert(source_id.to_string(), index) {
                return Err(format!(
                    "{}[{}].source_id \"{}\" duplicates {}[{}]",
                    self.collection, index, source_id, self.collection, first
                ));
            }
        }
        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Conversion: domain -> raw
// =============================================================================

fn export_game(game: &Game) -> RawGame {
    RawGame {
        game_key: Some(game.game_key.clone()),
        name: Some(game.name.clone()),
        description: game.description.clone(),
        play_mode: Some(game.play_mode.to_string()),
        status: Some(game.status.to_string()),
        phases: game
            .phases
            .iter()
            .map(|phase| RawPhase {
                id: phase.id.map(|id| id.to_string()),
                source_id: phase.source_id.clone(),
                order: Some(phase.order),
                phase_type: Some(phase.phase_type.to_string()),
                name: Some(phase.name.clone()),
                description: Some(phase.description.clone()),
                duration_seconds: phase.duration_seconds,
                timer_visible: Some(phase.timer_visible),
                auto_advance: Some(phase.auto_advance),
            })
            .collect(),
        steps: game
            .steps
            .iter()
            .map(|step| {
                let (phase_order, phase_id) = export_ref(step.phase.as_ref());
                RawStep {
                    id: step.id.map(|id| id.to_string()),
                    source_id: step.source_id.clone(),
                    order: Some(step.order),
                    phase_order,
                    phase_id,
                    title: Some(step.title.clone()),
                    body: Some(step.body.clone()),
                    duration_seconds: step.duration_seconds,
                    leader_script: step.leader_script.clone(),
                }
            })
            .collect(),
        roles: game
            .roles
            .iter()
            .map(|role| RawRole {
                id: role.id.map(|id| id.to_string()),
                source_id: role.source_id.clone(),
                order: Some(role.order),
                name: Some(role.name.clone()),
                public_description: Some(role.public_description.clone()),
                private_instructions: Some(role.private_instructions.clone()),
                min_count: Some(role.min_count),
                max_count: role.max_count,
                assignment_strategy: Some(role.assignment_strategy.to_string()),
            })
            .collect(),
        artifacts: game
            .artifacts
            .iter()
            .map(|artifact| RawArtifact {
                id: artifact.id.map(|id| id.to_string()),
                source_id: artifact.source_id.clone(),
                order: Some(artifact.order),
                artifact_type: Some(artifact.artifact_type.clone()),
                title: Some(artifact.title.clone()),
                description: Some(artifact.description.clone()),
                tags: artifact.tags.clone(),
                metadata: Some(Value::Object(artifact.metadata.clone())),
                variants: artifact
                    .variants
                    .iter()
                    .map(|variant| {
                        let (visible_to_role_order, visible_to_role_id) =
                            export_ref(variant.visible_to_role.as_ref());
                        RawVariant {
                            id: variant.id.map(|id| id.to_string()),
                            order: Some(variant.order),
                            title: Some(variant.title.clone()),
                            body: Some(variant.body.clone()),
                            visibility: Some(variant.visibility.to_string()),
                            visible_to_role_order,
                            visible_to_role_id,
                        }
                    })
                    .collect(),
            })
            .collect(),
        triggers: game
            .triggers
            .iter()
            .map(|trigger| RawTrigger {
                id: trigger.id.map(|id| id.to_string()),
                name: Some(trigger.name.clone()),
                description: Some(trigger.description.clone()),
                enabled: Some(trigger.enabled),
                condition: Some(Value::Object(trigger.condition.clone())),
                actions: Some(Value::Array(
                    trigger.actions.iter().cloned().map(Value::Object).collect(),
                )),
                delay_seconds: Some(trigger.delay_seconds),
                execute_once: Some(trigger.execute_once),
                sort_order: Some(trigger.sort_order),
            })
            .collect(),
    }
}

fn export_ref(reference: Option<&EntityRef>) -> (Option<u32>, Option<String>) {
    match reference {
        Some(EntityRef::Order(order)) => (Some(*order), None),
        Some(EntityRef::Id(id)) => (None, Some(id.clone())),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playkit_domain::{normalize_and_validate, PhaseId};
    use serde_json::json;

    const ESCAPE_LAB: &str = include_str!("fixtures/escape_lab.json");

    fn parse_one(value: Value) -> Result<Game, PayloadParseError> {
        parse_games_from_json_payload(&value.to_string()).map(|mut games| games.remove(0))
    }

    fn game_error(result: Result<Game, PayloadParseError>) -> String {
        match result {
            Err(PayloadParseError::InvalidGame { message, .. }) => message,
            other => panic!("expected InvalidGame, got {:?}", other),
        }
    }

    #[test]
    fn fixture_game_parses_with_expected_counts() {
        let games = parse_games_from_json_payload(ESCAPE_LAB).unwrap();
        assert_eq!(games.len(), 1);

        let game = &games[0];
        assert_eq!(game.phases.len(), 4);
        assert_eq!(game.steps.len(), 4);
        assert_eq!(game.roles.len(), 3);
        assert_eq!(game.artifacts.len(), 4);
        assert_eq!(game.triggers.len(), 3);

        let types: Vec<&str> = game.artifacts.iter().map(|a| a.artifact_type.as_str()).collect();
        assert_eq!(types, vec!["document", "keypad", "riddle", "hint_container"]);

        for artifact in &game.artifacts {
            let normalized = normalize_and_validate(&artifact.artifact_type, &artifact.metadata);
            assert!(
                normalized.validation.ok,
                "{}: {:?}",
                artifact.title,
                normalized.validation.errors
            );
            if artifact.artifact_type == "hint_container" {
                assert_eq!(normalized.canonical["hints"].as_array().unwrap().len(), 3);
            }
        }
    }

    #[test]
    fn accepts_all_document_shapes() {
        let game = json!({"game_key": "a", "name": "A"});

        let single = parse_games_from_json_payload(&game.to_string()).unwrap();
        let array = parse_games_from_json_payload(&json!([game.clone()]).to_string()).unwrap();
        let wrapped = parse_games_from_json_payload(&json!({"games": [game]}).to_string()).unwrap();

        assert_eq!(single, array);
        assert_eq!(array, wrapped);
        assert_eq!(single[0].play_mode, PlayMode::Basic);
        assert_eq!(single[0].status, GameStatus::Draft);
    }

    #[test]
    fn invalid_json_reports_position() {
        let err = parse_games_from_json_payload("{\n  \"game_key\": }").unwrap_err();

        match &err {
            PayloadParseError::InvalidJson { line, column, .. } => {
                assert_eq!(*line, 2);
                assert!(*column > 0);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(err.to_string().starts_with("Invalid JSON payload"));
    }

    #[test]
    fn empty_and_scalar_payloads_are_rejected() {
        assert_eq!(parse_games_from_json_payload("[]"), Err(PayloadParseError::Empty));
        assert!(matches!(
            parse_games_from_json_payload("42"),
            Err(PayloadParseError::UnsupportedShape(_))
        ));
        assert!(matches!(
            parse_games_from_json_payload(r#"{"games": {}}"#),
            Err(PayloadParseError::UnsupportedShape(_))
        ));
    }

    #[test]
    fn missing_required_fields_name_the_path() {
        let err = parse_games_from_json_payload(&json!([{"game_key": "lab"}]).to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Game #0 (\"lab\"): name is required");

        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "steps": [{"title": "Intro"}, {"title": "  "}]
        })));
        assert_eq!(message, "steps[1].title must not be blank");

        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "artifacts": [{"title": "Safe"}]
        })));
        assert_eq!(message, "artifacts[0].artifact_type is required");
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab", "play_mode": "chaotic"
        })));
        assert!(message.starts_with("play_mode has an invalid value"), "{}", message);

        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "phases": [{"name": "One", "phase_type": "epilogue"}]
        })));
        assert!(message.starts_with("phases[0].phase_type"), "{}", message);
    }

    #[test]
    fn missing_orders_default_to_position() {
        let game = parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "phases": [{"name": "One"}, {"name": "Two"}, {"name": "Three"}]
        }))
        .unwrap();

        let orders: Vec<u32> = game.phases.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn explicit_orders_keep_input_order_but_must_be_contiguous() {
        let game = parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "steps": [{"title": "B", "order": 2}, {"title": "A", "order": 1}]
        }))
        .unwrap();
        assert_eq!(game.steps[0].title, "B");
        assert_eq!(game.steps[0].order, 2);

        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "steps": [{"title": "A", "order": 1}, {"title": "B", "order": 3}]
        })));
        assert!(message.starts_with("steps orders must be contiguous"), "{}", message);
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "roles": [{"name": "A", "source_id": "r"}, {"name": "B", "source_id": "r"}]
        })));
        assert_eq!(message, "roles[1].source_id \"r\" duplicates roles[0]");

        let err = parse_games_from_json_payload(
            &json!([{"game_key": "a", "name": "A"}, {"game_key": "a", "name": "B"}]).to_string(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("already used by game #0"));
    }

    #[test]
    fn variant_orders_must_be_contiguous_per_artifact() {
        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "artifacts": [{"artifact_type": "card", "title": "Ace", "variants": [{"order": 2}, {}]}]
        })));
        assert_eq!(
            message,
            "artifacts[0].variants orders must be contiguous from 1 to 2, got [2, 2]"
        );

        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "artifacts": [{"artifact_type": "card", "title": "Ace", "variants": [{"order": 0}]}]
        })));
        assert!(message.starts_with("artifacts[0].variants orders must be contiguous"), "{}", message);

        let game = parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "artifacts": [
                {"artifact_type": "card", "title": "Ace", "variants": [{"order": 2}, {"order": 1}]},
                {"artifact_type": "card", "title": "King", "variants": [{}]}
            ]
        }))
        .unwrap();
        let orders: Vec<u32> = game.artifacts[0].variants.iter().map(|v| v.order).collect();
        assert_eq!(orders, vec![2, 1]);
        assert_eq!(game.artifacts[1].variants[0].order, 1);
    }

    #[test]
    fn provided_ids_are_compared_as_uuids() {
        let lower = "6f1c2a7e-4b1d-4c3e-9f0a-1b2c3d4e5f60";
        let upper = lower.to_uppercase();

        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "phases": [{"name": "One", "id": lower}, {"name": "Two", "id": upper}]
        })));
        assert_eq!(message, format!("phases[1].id \"{}\" duplicates phases[0]", lower));

        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "artifacts": [
                {"artifact_type": "card", "title": "Ace", "variants": [{"id": lower}]},
                {"artifact_type": "card", "title": "King", "variants": [{"id": format!(" {} ", upper)}]}
            ]
        })));
        assert!(message.starts_with("artifacts[1].variants[0].id"), "{}", message);

        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "triggers": [{"name": "A", "id": lower}, {"name": "B", "id": upper}]
        })));
        assert!(message.starts_with("triggers[1].id"), "{}", message);
    }

    #[test]
    fn malformed_trigger_shape_is_a_parse_error() {
        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "triggers": [{"name": "T", "condition": "manual"}]
        })));
        assert_eq!(message, "triggers[0].condition must be a JSON object, got a string");

        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "triggers": [{"name": "T", "actions": [{"type": "notify"}, 3]}]
        })));
        assert_eq!(message, "triggers[0].actions[1] must be a JSON object, got a number");
    }

    #[test]
    fn step_with_two_phase_references_is_rejected() {
        let message = game_error(parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "phases": [{"name": "One", "source_id": "p1"}],
            "steps": [{"title": "A", "phase_order": 1, "phase_id": "p1"}]
        })));
        assert_eq!(message, "steps[0] sets both phase_order and phase_id; use one");
    }

    #[test]
    fn defaults_are_explicit() {
        let game = parse_one(json!({
            "game_key": "lab", "name": "Lab",
            "roles": [{"name": "Spy"}],
            "artifacts": [{"artifact_type": "card", "title": "Ace", "variants": [{}, {}]}],
            "triggers": [{"name": "First"}, {"name": "Second"}]
        }))
        .unwrap();

        assert_eq!(game.roles[0].min_count, 1);
        assert_eq!(game.roles[0].assignment_strategy, AssignmentStrategy::Random);
        assert!(game.artifacts[0].metadata.is_empty());
        assert_eq!(game.artifacts[0].variants[1].order, 2);
        assert_eq!(game.artifacts[0].variants[0].visibility, Visibility::Public);
        assert!(game.triggers[0].enabled);
        assert_eq!(game.triggers[1].sort_order, 1);
        assert!(game.triggers[1].condition.is_empty());
    }

    #[test]
    fn serialize_then_parse_round_trips() {
        let mut games = parse_games_from_json_payload(ESCAPE_LAB).unwrap();
        games[0].description = None;
        games[0].phases[0].id = Some(PhaseId::new());
        games.push(Game::new("second", "Second").with_status(GameStatus::Published));

        let exported = serialize_games(&games).unwrap();
        let reparsed = parse_games_from_json_payload(&exported).unwrap();

        assert_eq!(reparsed, games);
    }
}
