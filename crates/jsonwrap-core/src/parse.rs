//! JSON text parsing with boundary limits.
//!
//! Core crate performs no I/O; this module only turns in-memory text into a
//! `serde_json::Value`. Two limits apply before any value is built:
//! - total text size (`max_input_bytes`)
//! - bracket nesting depth (`max_depth`), measured by a scan that skips
//!   string literals
//!
//! Once the depth is known to be bounded, serde_json's own recursion guard
//! is lifted so configured depths above its built-in cap are honored, and
//! the parse runs on a stack sized for that depth.

use serde::Deserialize;
use serde_json::Value;

use crate::config::LimitsConfig;
use crate::errors::{WrapError, WrapResult};
use crate::stack;

/// Parse JSON text under `limits`.
///
/// Malformed text is a [`WrapError::Syntax`]; oversized or overly nested
/// text is a [`WrapError::LimitExceeded`].
pub fn parse_json_str(text: &str, limits: &LimitsConfig) -> WrapResult<Value> {
    if text.len() > limits.max_input_bytes {
        return Err(WrapError::limit_exceeded(format!(
            "JSON payload too large ({} bytes > limit {})",
            text.len(),
            limits.max_input_bytes
        )));
    }

    let depth = nesting_depth(text);
    if depth > limits.max_depth {
        return Err(WrapError::limit_exceeded(format!(
            "JSON nesting depth {depth} exceeds limit {}",
            limits.max_depth
        )));
    }

    stack::for_depth(depth, || -> WrapResult<Value> {
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let value = Value::deserialize(&mut de)?;
        de.end()?;
        Ok(value)
    })
}

/// Maximum bracket nesting of `text`, ignoring brackets inside strings.
/// Unbalanced closers are clamped at zero; the parser reports them.
pub fn nesting_depth(text: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for b in text.bytes() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                max = max.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn parses_valid_json() {
        let v = parse_json_str(r#"{"a": [1, {"b": "x"}]}"#, &LimitsConfig::default()).unwrap();
        assert_eq!(v, json!({"a": [1, {"b": "x"}]}));
    }

    #[test]
    fn malformed_text_is_syntax_error() {
        let err = parse_json_str("{]", &LimitsConfig::default()).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn trailing_garbage_is_syntax_error() {
        let err = parse_json_str("{} x", &LimitsConfig::default()).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn size_limit_enforced() {
        let limits = LimitsConfig {
            max_input_bytes: 4,
            ..LimitsConfig::default()
        };
        assert_matches!(parse_json_str("[1, 2]", &limits), Err(WrapError::LimitExceeded(_)));
    }

    #[test]
    fn depth_ignores_brackets_in_strings() {
        assert_eq!(nesting_depth(r#"{"a": "[[[{{{\"]]"}"#), 1);
        assert_eq!(nesting_depth("[[[]], []]"), 3);
        assert_eq!(nesting_depth("42"), 0);
    }

    #[test]
    fn deep_input_beyond_serde_default_parses() {
        let text = format!("{}{}", "[".repeat(300), "]".repeat(300));
        let v = parse_json_str(&text, &LimitsConfig::default()).unwrap();
        assert!(v.is_array());

        let limits = LimitsConfig {
            max_depth: 100,
            ..LimitsConfig::default()
        };
        assert_matches!(parse_json_str(&text, &limits), Err(WrapError::LimitExceeded(_)));
    }
}
