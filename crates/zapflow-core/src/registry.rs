//! The node type registry: default data synthesis and per-kind validation.
//!
//! [`default_data`] is a pure, deterministic, total function over the closed
//! [`NodeKind`] enumeration. [`validate`] checks a data record against its
//! kind's schema without assuming shape: declared fields are type-checked,
//! ranges and enum memberships are enforced, and unknown extra keys are
//! ignored (preserved elsewhere for forward compatibility, never flagged).

use serde_json::{json, Value};

use crate::error::FieldViolation;
use crate::kind::NodeKind;
use crate::node::NodeData;

/// Default greeting for new message nodes.
pub const DEFAULT_MESSAGE: &str = "Olá! Como posso ajudá-lo?";

/// Default label for trigger nodes.
pub const DEFAULT_TRIGGER_LABEL: &str = "Início";

/// Default system prompt for AI nodes.
pub const DEFAULT_AI_PROMPT: &str =
    "Você é um assistente inteligente. Analise o sentimento da mensagem e responda de forma apropriada.";

/// Valid range for delay seconds, inclusive.
pub const DELAY_SECONDS_RANGE: (i64, i64) = (1, 3600);

const MEDIA_TYPES: [&str; 4] = ["image", "video", "audio", "document"];
const AI_MODELS: [&str; 2] = ["gpt-4", "gpt-3.5-turbo"];
const CONDITIONS: [&str; 3] = ["sentiment", "keyword", "intent"];
const SENTIMENT_TYPES: [&str; 4] = ["negative", "positive", "neutral", "confused"];
const RESPONSE_TYPES: [&str; 3] = ["media", "message", "transfer"];

/// Synthesizes the default data record for a node kind.
///
/// Pure and deterministic: repeated calls produce value-equal records.
/// Every default satisfies `validate(kind, &default_data(kind)).is_empty()`.
pub fn default_data(kind: NodeKind) -> NodeData {
    let value = match kind {
        NodeKind::Trigger => json!({ "label": DEFAULT_TRIGGER_LABEL }),
        NodeKind::Message => json!({ "message": DEFAULT_MESSAGE }),
        NodeKind::Media => json!({
            "mediaType": "image",
            "caption": "",
            "mediaUrl": "",
        }),
        NodeKind::Delay => json!({ "seconds": 5 }),
        NodeKind::Ai => json!({
            "model": "gpt-4",
            "prompt": DEFAULT_AI_PROMPT,
            "sentiment": true,
            "language": "pt-BR",
        }),
        NodeKind::Conditional => json!({
            "condition": "sentiment",
            "sentimentType": "negative",
            "keywords": "",
            "responseType": "media",
        }),
    };
    match value {
        Value::Object(map) => map,
        _ => unreachable!("default data literals are objects"),
    }
}

/// Validates a data record against its kind's schema.
///
/// Returns field-level violations; an empty list means the record is valid.
/// Used before save. Blocks persistence, never editing.
pub fn validate(kind: NodeKind, data: &NodeData) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    match kind {
        NodeKind::Trigger => {
            require_string(data, "label", &mut violations);
        }
        NodeKind::Message => {
            require_string(data, "message", &mut violations);
        }
        NodeKind::Media => {
            require_enum(data, "mediaType", &MEDIA_TYPES, &mut violations);
            optional_string(data, "caption", &mut violations);
            optional_string(data, "mediaUrl", &mut violations);
        }
        NodeKind::Delay => {
            let (min, max) = DELAY_SECONDS_RANGE;
            match data.get("seconds") {
                Some(value) => match value.as_i64() {
                    Some(seconds) if (min..=max).contains(&seconds) => {}
                    Some(seconds) => violations.push(FieldViolation::new(
                        "seconds",
                        format!("{} is out of range {}..{}", seconds, min, max),
                    )),
                    None => violations
                        .push(FieldViolation::new("seconds", "expected an integer")),
                },
                None => violations.push(FieldViolation::new("seconds", "missing required field")),
            }
        }
        NodeKind::Ai => {
            require_enum(data, "model", &AI_MODELS, &mut violations);
            optional_string(data, "prompt", &mut violations);
            optional_string(data, "language", &mut violations);
            if let Some(value) = data.get("sentiment") {
                if !value.is_boolean() {
                    violations.push(FieldViolation::new("sentiment", "expected a boolean"));
                }
            }
        }
        NodeKind::Conditional => {
            require_enum(data, "condition", &CONDITIONS, &mut violations);
            // sentimentType and keywords are each meaningful only for their
            // own condition value, but are type-checked whenever present.
            optional_enum(data, "sentimentType", &SENTIMENT_TYPES, &mut violations);
            optional_string(data, "keywords", &mut violations);
            require_enum(data, "responseType", &RESPONSE_TYPES, &mut violations);
        }
    }
    violations
}

/// Convenience wrapper: `true` when `validate` reports no violations.
pub fn is_valid(kind: NodeKind, data: &NodeData) -> bool {
    validate(kind, data).is_empty()
}

fn require_string(data: &NodeData, field: &str, out: &mut Vec<FieldViolation>) {
    match data.get(field) {
        Some(value) if value.is_string() => {}
        Some(_) => out.push(FieldViolation::new(field, "expected a string")),
        None => out.push(FieldViolation::new(field, "missing required field")),
    }
}

fn optional_string(data: &NodeData, field: &str, out: &mut Vec<FieldViolation>) {
    if let Some(value) = data.get(field) {
        if !value.is_string() {
            out.push(FieldViolation::new(field, "expected a string"));
        }
    }
}

fn require_enum(data: &NodeData, field: &str, allowed: &[&str], out: &mut Vec<FieldViolation>) {
    match data.get(field) {
        Some(value) => check_enum(field, value, allowed, out),
        None => out.push(FieldViolation::new(field, "missing required field")),
    }
}

fn optional_enum(data: &NodeData, field: &str, allowed: &[&str], out: &mut Vec<FieldViolation>) {
    if let Some(value) = data.get(field) {
        check_enum(field, value, allowed, out);
    }
}

fn check_enum(field: &str, value: &Value, allowed: &[&str], out: &mut Vec<FieldViolation>) {
    match value.as_str() {
        Some(s) if allowed.contains(&s) => {}
        Some(s) => out.push(FieldViolation::new(
            field,
            format!("'{}' is not one of: {}", s, allowed.join(", ")),
        )),
        None => out.push(FieldViolation::new(field, "expected a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_deterministic_and_self_valid() {
        for kind in NodeKind::ALL {
            let a = default_data(kind);
            let b = default_data(kind);
            assert_eq!(a, b, "default_data({}) is not deterministic", kind);
            assert!(
                is_valid(kind, &a),
                "default_data({}) fails its own schema: {:?}",
                kind,
                validate(kind, &a)
            );
        }
    }

    #[test]
    fn trigger_default_label() {
        let data = default_data(NodeKind::Trigger);
        assert_eq!(data["label"], "Início");
    }

    #[test]
    fn delay_range_is_enforced() {
        let mut data = default_data(NodeKind::Delay);

        data.insert("seconds".into(), json!(4000));
        let violations = validate(NodeKind::Delay, &data);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "seconds");

        data.insert("seconds".into(), json!(3600));
        assert!(is_valid(NodeKind::Delay, &data));

        data.insert("seconds".into(), json!(0));
        assert!(!is_valid(NodeKind::Delay, &data));

        data.insert("seconds".into(), json!(1));
        assert!(is_valid(NodeKind::Delay, &data));
    }

    #[test]
    fn delay_rejects_non_integer_seconds() {
        let mut data = NodeData::new();
        data.insert("seconds".into(), json!("5"));
        assert!(!is_valid(NodeKind::Delay, &data));

        data.insert("seconds".into(), json!(2.5));
        assert!(!is_valid(NodeKind::Delay, &data));
    }

    #[test]
    fn media_type_enum_membership() {
        let mut data = default_data(NodeKind::Media);
        data.insert("mediaType".into(), json!("sticker"));
        let violations = validate(NodeKind::Media, &data);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("sticker"));
    }

    #[test]
    fn ai_model_enum_membership() {
        let mut data = default_data(NodeKind::Ai);
        data.insert("model".into(), json!("gpt-5"));
        assert!(!is_valid(NodeKind::Ai, &data));

        data.insert("model".into(), json!("gpt-3.5-turbo"));
        assert!(is_valid(NodeKind::Ai, &data));
    }

    #[test]
    fn conditional_sentiment_type_checked_when_present() {
        let mut data = default_data(NodeKind::Conditional);
        data.insert("sentimentType".into(), json!("angry"));
        assert!(!is_valid(NodeKind::Conditional, &data));

        // keywords is optional: a keyword condition without keywords loads
        // and saves; the interpreter treats it as matching nothing.
        let mut data = default_data(NodeKind::Conditional);
        data.insert("condition".into(), json!("keyword"));
        data.remove("keywords");
        assert!(is_valid(NodeKind::Conditional, &data));
    }

    #[test]
    fn unknown_extra_keys_are_never_violations() {
        let mut data = default_data(NodeKind::Message);
        data.insert("futureKey".into(), json!({"nested": true}));
        assert!(is_valid(NodeKind::Message, &data));
    }

    #[test]
    fn message_text_is_type_checked_not_content_checked() {
        // An empty message is a valid string; only non-string values fail.
        let mut data = default_data(NodeKind::Message);
        data.insert("message".into(), json!(""));
        assert!(is_valid(NodeKind::Message, &data));

        data.insert("message".into(), json!(123));
        let violations = validate(NodeKind::Message, &data);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "expected a string");
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let data = NodeData::new();
        let violations = validate(NodeKind::Message, &data);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "message");
        assert_eq!(violations[0].message, "missing required field");
    }
}
