//! Declarative metadata schemas and the generic normalizer that applies them.

use std::collections::HashSet;

use serde_json::{Map, Number, Value};

use super::ArtifactType;

/// The value shape a metadata field is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any string; numbers and booleans are stringified
    String,
    /// A string that is non-blank after trimming; stored trimmed
    NonEmptyString,
    Bool,
    UnsignedInt,
    Integer,
    /// A list of strings; a single string becomes a one-item list
    StringList,
    /// One of a fixed set of lowercase options
    Enum(&'static [&'static str]),
    /// Ordered hint items, each a string or `{text, penaltySeconds?}`
    HintList,
}

/// Default written to the canonical form when an optional field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    fn to_value(self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(b),
            Self::Int(n) => Value::Number(Number::from(n)),
            Self::Str(s) => Value::String(s.to_string()),
        }
    }
}

/// One field of an artifact type's metadata.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Canonical camelCase key
    pub key: &'static str,
    /// Input keys renamed onto `key`
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<DefaultValue>,
}

impl FieldSpec {
    pub const fn required(
        key: &'static str,
        aliases: &'static [&'static str],
        kind: FieldKind,
    ) -> Self {
        Self {
            key,
            aliases,
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(
        key: &'static str,
        aliases: &'static [&'static str],
        kind: FieldKind,
    ) -> Self {
        Self {
            key,
            aliases,
            kind,
            required: false,
            default: None,
        }
    }

    pub const fn with_default(self, default: DefaultValue) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.key).chain(self.aliases.iter().copied())
    }
}

/// Cross-field rule run after field normalization. May fill derived fields.
pub type SchemaCheck = fn(&mut Map<String, Value>, &mut Vec<String>);

/// Schema owned by one artifact type.
#[derive(Debug)]
pub struct ArtifactSchema {
    pub artifact_type: ArtifactType,
    pub fields: &'static [FieldSpec],
    pub check: Option<SchemaCheck>,
}

impl ArtifactSchema {
    /// Apply renames, coercions and defaults, then the cross-field check.
    ///
    /// Keys the schema does not know are copied into the canonical form
    /// unchanged. Every problem is reported; nothing short-circuits.
    pub fn normalize(&self, raw: &Map<String, Value>) -> (Map<String, Value>, Vec<String>) {
        let mut canonical = Map::new();
        let mut errors = Vec::new();
        let mut consumed: HashSet<&str> = HashSet::new();

        for field in self.fields {
            let mut found: Option<(&str, &Value)> = None;

            for name in field.names() {
                let Some(value) = raw.get(name) else {
                    continue;
                };
                consumed.insert(name);
                if value.is_null() {
                    continue;
                }
                match found {
                    None => found = Some((name, value)),
                    Some((first, first_value)) if first_value != value => errors.push(format!(
                        "{} has conflicting values under \"{}\" and \"{}\"",
                        field.key, first, name
                    )),
                    Some(_) => {}
                }
            }

            match found {
                Some((_, value)) => match coerce(field.kind, value) {
                    Ok(coerced) => {
                        canonical.insert(field.key.to_string(), coerced);
                    }
                    Err(reason) => errors.push(format!("{} {}", field.key, reason)),
                },
                None if field.required => errors.push(format!("{} is required", field.key)),
                None => {
                    if let Some(default) = field.default {
                        canonical.insert(field.key.to_string(), default.to_value());
                    }
                }
            }
        }

        for (key, value) in raw {
            if !consumed.contains(key.as_str()) && !canonical.contains_key(key) {
                canonical.insert(key.clone(), value.clone());
            }
        }

        if let Some(check) = self.check {
            check(&mut canonical, &mut errors);
        }

        (canonical, errors)
    }
}

fn coerce(kind: FieldKind, value: &Value) -> Result<Value, String> {
    match kind {
        FieldKind::String => coerce_string(value).map(Value::String),
        FieldKind::NonEmptyString => {
            let s = coerce_string(value)?;
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err("must not be empty".to_string());
            }
            Ok(Value::String(trimmed.to_string()))
        }
        FieldKind::Bool => coerce_bool(value).map(Value::Bool),
        FieldKind::UnsignedInt => coerce_unsigned(value).map(|n| Value::Number(Number::from(n))),
        FieldKind::Integer => coerce_integer(value).map(|n| Value::Number(Number::from(n))),
        FieldKind::StringList => coerce_string_list(value),
        FieldKind::Enum(options) => {
            let s = coerce_string(value)?;
            let normalized = s.trim().to_lowercase().replace('-', "_");
            if options.contains(&normalized.as_str()) {
                Ok(Value::String(normalized))
            } else {
                Err(format!(
                    "must be one of {} (got \"{}\")",
                    options.join(", "),
                    s
                ))
            }
        }
        FieldKind::HintList => coerce_hint_list(value),
    }
}

fn coerce_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err("must be a string".to_string()),
    }
}

fn coerce_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(format!("must be a boolean (got {})", n)),
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(format!("must be a boolean (got \"{}\")", s)),
        },
        _ => Err("must be a boolean".to_string()),
    }
}

fn coerce_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(format!("must be an integer (got {})", n)),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("must be an integer (got \"{}\")", s)),
        _ => Err("must be an integer".to_string()),
    }
}

fn coerce_unsigned(value: &Value) -> Result<u64, String> {
    let n = coerce_integer(value)
        .map_err(|_| format!("must be a non-negative integer (got {})", value))?;
    u64::try_from(n).map_err(|_| format!("must be a non-negative integer (got {})", n))
}

fn coerce_string_list(value: &Value) -> Result<Value, String> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let s = coerce_string(item).map_err(|_| format!("item {} must be a string", index))?;
                out.push(Value::String(s));
            }
            Ok(Value::Array(out))
        }
        Value::String(_) | Value::Number(_) => {
            Ok(Value::Array(vec![Value::String(coerce_string(value)?)]))
        }
        _ => Err("must be a string or a list of strings".to_string()),
    }
}

fn coerce_hint_list(value: &Value) -> Result<Value, String> {
    let Value::Array(items) = value else {
        return Err("must be a list of hints".to_string());
    };

    let mut hints = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let hint = match item {
            Value::String(text) if !text.trim().is_empty() => {
                let mut hint = Map::new();
                hint.insert("text".to_string(), Value::String(text.trim().to_string()));
                hint
            }
            Value::Object(fields) => normalize_hint_object(index, fields)?,
            _ => return Err(format!("item {} must be a non-empty string or an object", index)),
        };
        hints.push(Value::Object(hint));
    }
    Ok(Value::Array(hints))
}

fn normalize_hint_object(index: usize, fields: &Map<String, Value>) -> Result<Map<String, Value>, String> {
    const TEXT_KEYS: [&str; 3] = ["text", "hint", "body"];
    const PENALTY_KEYS: [&str; 2] = ["penaltySeconds", "penalty_seconds"];

    let text = TEXT_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| format!("item {} must have text", index))?;

    let mut hint = Map::new();
    hint.insert("text".to_string(), Value::String(text.to_string()));

    if let Some(penalty) = PENALTY_KEYS.iter().find_map(|key| fields.get(*key)) {
        let seconds = coerce_unsigned(penalty).map_err(|reason| format!("item {} penaltySeconds {}", index, reason))?;
        hint.insert("penaltySeconds".to_string(), Value::Number(Number::from(seconds)));
    }

    for (key, value) in fields {
        let known = TEXT_KEYS.contains(&key.as_str()) || PENALTY_KEYS.contains(&key.as_str());
        if !known {
            hint.insert(key.clone(), value.clone());
        }
    }

    Ok(hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static FIELDS: [FieldSpec; 3] = [
        FieldSpec::required("code", &["correctCode"], FieldKind::NonEmptyString),
        FieldSpec::optional("maxAttempts", &["max_attempts"], FieldKind::UnsignedInt),
        FieldSpec::optional("lockOnFail", &[], FieldKind::Bool).with_default(DefaultValue::Bool(false)),
    ];

    static SCHEMA: ArtifactSchema = ArtifactSchema {
        artifact_type: ArtifactType::Keypad,
        fields: &FIELDS,
        check: None,
    };

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn renames_coerces_and_defaults() {
        let (canonical, errors) =
            SCHEMA.normalize(&object(json!({"correctCode": 1234, "max_attempts": "3"})));

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(
            Value::Object(canonical),
            json!({"code": "1234", "maxAttempts": 3, "lockOnFail": false})
        );
    }

    #[test]
    fn reports_every_problem() {
        let (_, errors) = SCHEMA.normalize(&object(json!({"maxAttempts": -1, "lockOnFail": "maybe"})));

        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors.iter().any(|e| e == "code is required"));
        assert!(errors.iter().any(|e| e.starts_with("maxAttempts must be a non-negative integer")));
        assert!(errors.iter().any(|e| e.starts_with("lockOnFail must be a boolean")));
    }

    #[test]
    fn conflicting_aliases_are_rejected() {
        let (_, errors) = SCHEMA.normalize(&object(json!({"code": "1", "correctCode": "2"})));
        assert_eq!(errors, vec!["code has conflicting values under \"code\" and \"correctCode\""]);
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let (canonical, errors) = SCHEMA.normalize(&object(json!({"code": "42", "theme": "neon"})));
        assert!(errors.is_empty());
        assert_eq!(canonical.get("theme"), Some(&json!("neon")));
    }

    #[test]
    fn hint_list_accepts_strings_and_objects() {
        let hints = coerce_hint_list(&json!([
            "Look under the desk",
            {"hint": "Count the candles", "penalty_seconds": "30"},
            {"text": "It is 1847", "icon": "bulb"}
        ]))
        .unwrap();

        assert_eq!(
            hints,
            json!([
                {"text": "Look under the desk"},
                {"text": "Count the candles", "penaltySeconds": 30},
                {"text": "It is 1847", "icon": "bulb"}
            ])
        );
    }

    #[test]
    fn hint_list_rejects_blank_items() {
        let err = coerce_hint_list(&json!(["ok", "  "])).unwrap_err();
        assert_eq!(err, "item 1 must be a non-empty string or an object");
    }
}
