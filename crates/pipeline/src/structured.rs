//! Decode-with-validation for structured LLM output.
//!
//! Every node asks the model for a JSON document of a known shape. Turning
//! that text into a domain value is an explicit two-step process: parse with
//! `serde_json`, then run the shape's own [`StructuredOutput::validate`]. Either
//! failure is a [`DecodeError`], which nodes report as a schema mismatch rather
//! than a transport failure.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// A value the LLM is asked to emit as JSON.
pub trait StructuredOutput: DeserializeOwned {
    /// Shape name used in prompts and error messages (e.g. `"EvaluationReport"`).
    const SHAPE: &'static str;

    /// Checks invariants that the JSON schema alone cannot express.
    fn validate(&self) -> Result<(), String>;
}

/// Why a completion could not be turned into a [`StructuredOutput`] value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The completion was empty after trimming.
    #[error("response was empty")]
    Empty,

    /// The completion was not valid JSON for the requested shape.
    #[error("response is not a valid {shape}: {source}")]
    Json {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON parsed but violated a shape invariant.
    #[error("{shape} failed validation: {reason}")]
    Invalid { shape: &'static str, reason: String },
}

/// Parses and validates a raw completion as `T`.
///
/// A surrounding Markdown code fence (```` ```json ... ``` ````) is tolerated,
/// since models occasionally add one even in JSON mode.
pub fn decode_structured<T: StructuredOutput>(raw: &str) -> Result<T, DecodeError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(DecodeError::Empty);
    }

    let value: T = serde_json::from_str(body).map_err(|source| DecodeError::Json {
        shape: T::SHAPE,
        source,
    })?;

    value.validate().map_err(|reason| DecodeError::Invalid {
        shape: T::SHAPE,
        reason,
    })?;

    Ok(value)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Info string ("json"), whether or not a newline follows it.
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Fails with `"<field> must not be empty"` when `value` is blank.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
    }

    impl StructuredOutput for Sample {
        const SHAPE: &'static str = "Sample";

        fn validate(&self) -> Result<(), String> {
            require_text("name", &self.name)
        }
    }

    #[test]
    fn decodes_plain_json() {
        let sample: Sample = decode_structured(r#"{"name":"ok"}"#).unwrap();
        assert_eq!(sample.name, "ok");
    }

    #[test]
    fn decodes_fenced_json() {
        let raw = "```json\n{\"name\": \"fenced\"}\n```";
        let sample: Sample = decode_structured(raw).unwrap();
        assert_eq!(sample.name, "fenced");
    }

    #[test]
    fn decodes_single_line_fence_with_info_string() {
        let sample: Sample = decode_structured("```json{\"name\": \"inline\"}```").unwrap();
        assert_eq!(sample.name, "inline");

        let sample: Sample = decode_structured("```{\"name\": \"bare\"}```").unwrap();
        assert_eq!(sample.name, "bare");
    }

    #[test]
    fn empty_completion_is_reported() {
        assert!(matches!(decode_structured::<Sample>("   "), Err(DecodeError::Empty)));
    }

    #[test]
    fn malformed_json_names_the_shape() {
        let err = decode_structured::<Sample>("{\"name\":").unwrap_err();
        assert!(matches!(err, DecodeError::Json { shape: "Sample", .. }));
    }

    #[test]
    fn validation_failures_are_distinct_from_parse_failures() {
        let err = decode_structured::<Sample>(r#"{"name":"  "}"#).unwrap_err();
        match err {
            DecodeError::Invalid { shape, reason } => {
                assert_eq!(shape, "Sample");
                assert_eq!(reason, "name must not be empty");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
