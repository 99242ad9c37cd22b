//! Built-in schemas, one per artifact type.

use serde_json::{Map, Number, Value};

use super::schema::{ArtifactSchema, DefaultValue, FieldKind, FieldSpec};
use super::ArtifactType;

const DOCUMENT_FORMATS: &[&str] = &["markdown", "plain", "html"];
const RIDDLE_NORMALIZE_MODES: &[&str] = &["exact", "case_insensitive", "fuzzy"];

static DOCUMENT_FIELDS: [FieldSpec; 4] = [
    FieldSpec::optional("content", &["body", "text"], FieldKind::String),
    FieldSpec::optional("format", &["content_format"], FieldKind::Enum(DOCUMENT_FORMATS))
        .with_default(DefaultValue::Str("markdown")),
    FieldSpec::optional("fileUrl", &["file_url", "url"], FieldKind::NonEmptyString),
    FieldSpec::optional("pageCount", &["page_count"], FieldKind::UnsignedInt),
];

pub(super) static DOCUMENT: ArtifactSchema = ArtifactSchema {
    artifact_type: ArtifactType::Document,
    fields: &DOCUMENT_FIELDS,
    check: None,
};

static KEYPAD_FIELDS: [FieldSpec; 7] = [
    FieldSpec::required("code", &["correctCode", "correct_code"], FieldKind::NonEmptyString),
    FieldSpec::optional("codeLength", &["code_length"], FieldKind::UnsignedInt),
    FieldSpec::optional("maxAttempts", &["max_attempts"], FieldKind::UnsignedInt),
    FieldSpec::optional("caseSensitive", &["case_sensitive"], FieldKind::Bool)
        .with_default(DefaultValue::Bool(false)),
    FieldSpec::optional("lockOnFail", &["lock_on_fail"], FieldKind::Bool)
        .with_default(DefaultValue::Bool(false)),
    FieldSpec::optional("successMessage", &["success_message"], FieldKind::String),
    FieldSpec::optional(
        "failMessage",
        &["failureMessage", "fail_message", "failure_message"],
        FieldKind::String,
    ),
];

pub(super) static KEYPAD: ArtifactSchema = ArtifactSchema {
    artifact_type: ArtifactType::Keypad,
    fields: &KEYPAD_FIELDS,
    check: Some(check_keypad),
};

static RIDDLE_FIELDS: [FieldSpec; 5] = [
    FieldSpec::required("prompt", &["question"], FieldKind::NonEmptyString),
    FieldSpec::required(
        "correctAnswers",
        &["answers", "answer", "correct_answer", "correct_answers", "correctAnswer"],
        FieldKind::StringList,
    ),
    FieldSpec::optional(
        "normalizeMode",
        &["normalize_mode"],
        FieldKind::Enum(RIDDLE_NORMALIZE_MODES),
    )
    .with_default(DefaultValue::Str("case_insensitive")),
    FieldSpec::optional("maxAttempts", &["max_attempts"], FieldKind::UnsignedInt),
    FieldSpec::optional("successMessage", &["success_message"], FieldKind::String),
];

pub(super) static RIDDLE: ArtifactSchema = ArtifactSchema {
    artifact_type: ArtifactType::Riddle,
    fields: &RIDDLE_FIELDS,
    check: Some(check_riddle),
};

static HINT_CONTAINER_FIELDS: [FieldSpec; 3] = [
    FieldSpec::required("hints", &[], FieldKind::HintList),
    FieldSpec::optional("cooldownSeconds", &["cooldown_seconds"], FieldKind::UnsignedInt)
        .with_default(DefaultValue::Int(0)),
    FieldSpec::optional("penaltySeconds", &["penalty_seconds"], FieldKind::UnsignedInt)
        .with_default(DefaultValue::Int(0)),
];

pub(super) static HINT_CONTAINER: ArtifactSchema = ArtifactSchema {
    artifact_type: ArtifactType::HintContainer,
    fields: &HINT_CONTAINER_FIELDS,
    check: Some(check_hint_container),
};

static TOKEN_FIELDS: [FieldSpec; 3] = [
    FieldSpec::optional("label", &[], FieldKind::String),
    FieldSpec::optional("value", &["amount"], FieldKind::Integer).with_default(DefaultValue::Int(1)),
    FieldSpec::optional("tokenType", &["token_type"], FieldKind::NonEmptyString),
];

pub(super) static TOKEN: ArtifactSchema = ArtifactSchema {
    artifact_type: ArtifactType::Token,
    fields: &TOKEN_FIELDS,
    check: None,
};

static CARD_FIELDS: [FieldSpec; 3] = [
    FieldSpec::required("front", &["text"], FieldKind::NonEmptyString),
    FieldSpec::optional("back", &[], FieldKind::String),
    FieldSpec::optional("imageUrl", &["image_url"], FieldKind::NonEmptyString),
];

pub(super) static CARD: ArtifactSchema = ArtifactSchema {
    artifact_type: ArtifactType::Card,
    fields: &CARD_FIELDS,
    check: None,
};

static IMAGE_FIELDS: [FieldSpec; 2] = [
    FieldSpec::required("url", &["src", "image_url", "imageUrl"], FieldKind::NonEmptyString),
    FieldSpec::optional("altText", &["alt", "alt_text"], FieldKind::String),
];

pub(super) static IMAGE: ArtifactSchema = ArtifactSchema {
    artifact_type: ArtifactType::Image,
    fields: &IMAGE_FIELDS,
    check: None,
};

static AUDIO_FIELDS: [FieldSpec; 3] = [
    FieldSpec::required("url", &["src", "audio_url", "audioUrl"], FieldKind::NonEmptyString),
    FieldSpec::optional("autoplay", &[], FieldKind::Bool).with_default(DefaultValue::Bool(false)),
    FieldSpec::optional("loop", &[], FieldKind::Bool).with_default(DefaultValue::Bool(false)),
];

pub(super) static AUDIO: ArtifactSchema = ArtifactSchema {
    artifact_type: ArtifactType::Audio,
    fields: &AUDIO_FIELDS,
    check: None,
};

/// `codeLength` is derived from the code when absent and must agree with it
/// when present.
fn check_keypad(canonical: &mut Map<String, Value>, errors: &mut Vec<String>) {
    if let Some(attempts) = canonical.get("maxAttempts").and_then(Value::as_u64) {
        if attempts == 0 {
            errors.push("maxAttempts must be at least 1".to_string());
        }
    }

    let Some(code_len) = canonical
        .get("code")
        .and_then(Value::as_str)
        .map(|code| code.chars().count() as u64)
    else {
        return;
    };

    match canonical.get("codeLength").and_then(Value::as_u64) {
        Some(declared) if declared != code_len => errors.push(format!(
            "codeLength {} does not match code length {}",
            declared, code_len
        )),
        Some(_) => {}
        None => {
            canonical.insert("codeLength".to_string(), Value::Number(Number::from(code_len)));
        }
    }
}

fn check_riddle(canonical: &mut Map<String, Value>, errors: &mut Vec<String>) {
    let Some(answers) = canonical.get_mut("correctAnswers").and_then(Value::as_array_mut) else {
        return;
    };

    if answers.is_empty() {
        errors.push("correctAnswers must contain at least one answer".to_string());
        return;
    }

    for (index, answer) in answers.iter_mut().enumerate() {
        let trimmed = answer.as_str().map(|s| s.trim().to_string());
        match trimmed {
            Some(text) if !text.is_empty() => *answer = Value::String(text),
            _ => errors.push(format!("correctAnswers item {} must not be blank", index)),
        }
    }
}

fn check_hint_container(canonical: &mut Map<String, Value>, errors: &mut Vec<String>) {
    let empty = canonical
        .get("hints")
        .and_then(Value::as_array)
        .is_some_and(|hints| hints.is_empty());
    if empty {
        errors.push("hints must contain at least one hint".to_string());
    }
}
