//! Oracle response parsing into a sanitized [`Decision`].
//!
//! Small models rarely return clean JSON. Recovery runs in this order:
//! 1. Strip markdown code fences.
//! 2. Take the first balanced `{...}` object.
//! 3. Parse it, retrying once with trailing commas removed.
//! 4. Failing that, pull `intention`, `internal_monologue` and
//!    `public_message` out of the raw text by key.
//! 5. Failing that, a random fallback decision.
//!
//! Whatever survives is sanitized field by field, so every path ends in a
//! valid [`Decision`].

use abyss_types::{Decision, DecisionIntent, MoveDirection};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Monologue used when a parsed response has none.
pub const DEFAULT_MONOLOGUE: &str = "Thinking...";
/// Public message used when a response has none.
pub const DEFAULT_MESSAGE: &str = "...";
/// Monologue of a random fallback decision.
pub const FALLBACK_MONOLOGUE: &str = "Processing...";

/// How a raw response became a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A JSON object was found and sanitized.
    Clean(Decision),
    /// No usable JSON, but an intention could be read from the text.
    Salvaged(Decision),
    /// Nothing usable. The decision is a random fallback.
    Unparsable(Decision),
}

impl ParseOutcome {
    /// The decision, however it was obtained.
    pub fn into_decision(self) -> Decision {
        match self {
            Self::Clean(decision) | Self::Salvaged(decision) | Self::Unparsable(decision) => {
                decision
            }
        }
    }

    /// Whether the payload counts as a parse failure for diagnostics.
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Clean(_))
    }
}

/// Parse a raw oracle response. Never fails.
pub fn parse_response(raw: &str, rng: &mut dyn RngCore) -> ParseOutcome {
    if let Some(object) = parse_object(raw) {
        return ParseOutcome::Clean(sanitize(&object, rng));
    }
    debug!(raw_response = raw, "no JSON object in oracle response, extracting fields");
    if let Some(decision) = extract_fields(raw, rng) {
        return ParseOutcome::Salvaged(decision);
    }
    warn!(raw_response = raw, "unparsable oracle response, using fallback decision");
    ParseOutcome::Unparsable(fallback_decision(rng))
}

/// A valid but unguided decision: random intention and direction.
pub fn fallback_decision(rng: &mut dyn RngCore) -> Decision {
    Decision::new(
        random_intention(rng),
        FALLBACK_MONOLOGUE,
        DEFAULT_MESSAGE,
        random_direction(rng),
    )
}

fn random_intention(rng: &mut dyn RngCore) -> DecisionIntent {
    DecisionIntent::ALL
        .choose(rng)
        .copied()
        .unwrap_or(DecisionIntent::Hunt)
}

fn random_direction(rng: &mut dyn RngCore) -> MoveDirection {
    MoveDirection::clamped(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
}

// ---------------------------------------------------------------------------
// JSON recovery
// ---------------------------------------------------------------------------

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    let cleaned = strip_code_fences(raw);
    let candidate = balanced_object(&cleaned)?;
    let value = serde_json::from_str::<Value>(candidate)
        .ok()
        .or_else(|| serde_json::from_str::<Value>(&strip_trailing_commas(candidate)).ok())?;
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Remove every ```` ``` ```` fence, along with a `json` tag and the
/// whitespace that follows it.
fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("```") {
        out.push_str(rest.get(..start).unwrap_or_default());
        let mut after = rest.get(start.saturating_add(3)..).unwrap_or_default();
        if after
            .get(..4)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
        {
            after = after.get(4..).unwrap_or_default();
        }
        rest = after.trim_start();
    }
    out.push_str(rest);
    out
}

/// The first `{...}` span whose braces balance, ignoring braces inside
/// string literals.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let body = text.get(start..)?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth = depth.saturating_add(1),
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return body.get(..=offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip trailing commas before closing braces and brackets (common LLM
/// error).
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ',' {
            let upcoming = chars.clone().find(|next| !next.is_whitespace());
            if matches!(upcoming, Some('}' | ']')) {
                continue;
            }
        }
        result.push(c);
    }
    result
}

fn sanitize(object: &Map<String, Value>, rng: &mut dyn RngCore) -> Decision {
    let intention = object
        .get("intention")
        .and_then(Value::as_str)
        .and_then(DecisionIntent::parse)
        .unwrap_or_else(|| random_intention(rng));
    let monologue = text_field(object, "internal_monologue").unwrap_or(DEFAULT_MONOLOGUE);
    let message = text_field(object, "public_message").unwrap_or(DEFAULT_MESSAGE);
    let direction = object
        .get("move_direction")
        .and_then(Value::as_object)
        .map_or_else(MoveDirection::default, |dir| {
            MoveDirection::clamped(axis(dir.get("x")), axis(dir.get("y")))
        });
    Decision::new(intention, monologue, message, direction)
}

fn text_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// A direction component: a number or a numeric string, else 0.
fn axis(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Field extraction from free text
// ---------------------------------------------------------------------------

fn extract_fields(raw: &str, rng: &mut dyn RngCore) -> Option<Decision> {
    let lowered = raw.to_ascii_lowercase();
    let intention = extract_intention(raw, &lowered)?;
    let monologue = extract_quoted(raw, &lowered, "internal_monologue").unwrap_or(DEFAULT_MONOLOGUE);
    let message = extract_quoted(raw, &lowered, "public_message").unwrap_or(DEFAULT_MESSAGE);
    Some(Decision::new(
        intention,
        monologue,
        message,
        random_direction(rng),
    ))
}

/// The text right after the first case-insensitive occurrence of `key`.
/// `lowered` is `text` with ASCII lowercased, so byte offsets line up.
fn after_key<'a>(text: &'a str, lowered: &str, key: &str) -> Option<&'a str> {
    let at = lowered.find(key)?;
    text.get(at.saturating_add(key.len())..)
}

fn extract_intention(text: &str, lowered: &str) -> Option<DecisionIntent> {
    let rest = after_key(text, lowered, "intention")?;
    let value = rest.trim_start_matches(|c: char| c == '"' || c == '\'' || c == ':' || c.is_whitespace());
    let word: String = value.chars().take_while(char::is_ascii_alphabetic).collect();
    DecisionIntent::parse(&word)
}

/// A quoted value following `key`, e.g. `key": "value"` or `key: 'value'`.
fn extract_quoted<'a>(text: &'a str, lowered: &str, key: &str) -> Option<&'a str> {
    let rest = after_key(text, lowered, key)?;
    let value_start =
        rest.find(|c: char| !(c == '"' || c == '\'' || c == ':' || c.is_whitespace()))?;
    if !rest.get(..value_start)?.ends_with(['"', '\'']) {
        return None;
    }
    let value = rest.get(value_start..)?;
    let end = value.find(['"', '\''])?;
    value.get(..end)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn parse(raw: &str) -> ParseOutcome {
        let mut rng = StdRng::seed_from_u64(7);
        parse_response(raw, &mut rng)
    }

    #[test]
    fn parse_clean_json() {
        let raw = r#"{"intention":"attack","internal_monologue":"I will steal from them","public_message":"Hello friend!","move_direction":{"x":0,"y":1}}"#;
        let outcome = parse(raw);
        assert!(!outcome.is_failure());
        let decision = outcome.into_decision();
        assert_eq!(decision.intention, DecisionIntent::Attack);
        assert_eq!(decision.internal_monologue, "I will steal from them");
        assert_eq!(decision.public_message, "Hello friend!");
        assert!((decision.move_direction.y - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_fenced_json_with_prose() {
        let raw = "Sure! Here is my answer:\n```JSON\n{\"intention\": \"Flee\", \"internal_monologue\": \"run\"}\n```\nGood luck.";
        let outcome = parse(raw);
        assert!(matches!(outcome, ParseOutcome::Clean(_)));
        let decision = outcome.into_decision();
        assert_eq!(decision.intention, DecisionIntent::Flee);
        assert_eq!(decision.public_message, DEFAULT_MESSAGE);
    }

    #[test]
    fn parse_repairs_trailing_commas() {
        let raw = r#"{"intention":"socialize","move_direction":{"x":0.5,"y":-0.5,},}"#;
        let decision = parse(raw).into_decision();
        assert_eq!(decision.intention, DecisionIntent::Socialize);
        assert!((decision.move_direction.x - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn braces_inside_strings_do_not_end_object() {
        let raw = r#"{"intention":"hunt","internal_monologue":"food } please"} trailing"#;
        let decision = parse(raw).into_decision();
        assert_eq!(decision.internal_monologue, "food } please");
    }

    #[test]
    fn sanitize_defaults_and_clamps() {
        let raw = r#"{"intention":"dance","internal_monologue":"","move_direction":{"x":"7","y":null}}"#;
        let decision = parse(raw).into_decision();
        assert!(DecisionIntent::ALL.contains(&decision.intention));
        assert_eq!(decision.internal_monologue, DEFAULT_MONOLOGUE);
        assert_eq!(decision.public_message, DEFAULT_MESSAGE);
        assert!((decision.move_direction.x - 1.0).abs() < f64::EPSILON);
        assert!(decision.move_direction.y.abs() < f64::EPSILON);
    }

    #[test]
    fn non_object_direction_is_zero() {
        let decision = parse(r#"{"intention":"hunt","move_direction":"north"}"#).into_decision();
        assert!(decision.move_direction.x.abs() < f64::EPSILON);
        assert!(decision.move_direction.y.abs() < f64::EPSILON);
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "a".repeat(400);
        let raw = format!(r#"{{"intention":"hunt","internal_monologue":"{long}","public_message":"{long}"}}"#);
        let decision = parse(&raw).into_decision();
        assert_eq!(decision.internal_monologue.chars().count(), 100);
        assert_eq!(decision.public_message.chars().count(), 50);
    }

    #[test]
    fn fields_salvaged_from_free_text() {
        let raw = r#"intention: "ATTACK", internal_monologue: 'They are weak' and public_message"#;
        let outcome = parse(raw);
        assert!(outcome.is_failure());
        assert!(matches!(outcome, ParseOutcome::Salvaged(_)));
        let decision = outcome.into_decision();
        assert_eq!(decision.intention, DecisionIntent::Attack);
        assert_eq!(decision.internal_monologue, "They are weak");
        assert_eq!(decision.public_message, DEFAULT_MESSAGE);
    }

    #[test]
    fn broken_json_falls_back_to_fields() {
        let raw = r#"{"intention": "flee", "internal_monologue": "scared"#;
        let outcome = parse(raw);
        assert!(matches!(outcome, ParseOutcome::Salvaged(_)));
        assert_eq!(outcome.into_decision().intention, DecisionIntent::Flee);
    }

    #[test]
    fn garbage_yields_fallback() {
        let outcome = parse("I am a small language model and I like turtles.");
        assert!(matches!(outcome, ParseOutcome::Unparsable(_)));
        let decision = outcome.into_decision();
        assert_eq!(decision.internal_monologue, FALLBACK_MONOLOGUE);
        assert_eq!(decision.public_message, DEFAULT_MESSAGE);
        assert!(decision.move_direction.x.abs() <= 1.0);
        assert!(decision.move_direction.y.abs() <= 1.0);
    }

    #[test]
    fn strip_trailing_commas_basic() {
        assert_eq!(strip_trailing_commas(r#"{"a": 1, "b": 2,}"#), r#"{"a": 1, "b": 2}"#);
        assert_eq!(strip_trailing_commas("[1, 2, 3,\n]"), "[1, 2, 3\n]");
    }

    #[test]
    fn code_fences_removed() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}\n");
        assert_eq!(strip_code_fences("no fences"), "no fences");
    }
}
