//! Assessment parsing for LLM-backed plugins.
//!
//! These functions extract a structured [`Assessment`] from free-form model
//! output. They are pure text handling with no I/O.
//!
//! | Input | Result |
//! |-------|--------|
//! | JSON object (possibly wrapped in prose or a code fence) | fields read, missing ones defaulted |
//! | confidence missing or outside 0..=1 | confidence 0.5 |
//! | no JSON at all | confidence 0.3, generic reasoning |

use super::decision::{Assessment, Decision};
use serde_json::Value;

/// Confidence used when a response has no usable confidence field
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Confidence used when a response cannot be parsed at all
pub const UNPARSEABLE_CONFIDENCE: f64 = 0.3;

/// Parse a model response into an [`Assessment`].
///
/// The preferred shape is
/// `{"observation": ..., "reasoning": ..., "conclusion": ..., "confidence": 0.8}`
/// with an optional `"decision": "approve" | "reject" | "abstain"`.
///
/// # Examples
///
/// ```
/// use swarm_domain::quorum::parsing::parse_assessment;
///
/// let a = parse_assessment(r#"{"reasoning": "Deep liquidity", "confidence": 0.85}"#);
/// assert_eq!(a.confidence, 0.85);
/// assert_eq!(a.reasoning, "Deep liquidity");
///
/// let fallback = parse_assessment("I think this is fine");
/// assert_eq!(fallback.confidence, 0.3);
/// ```
pub fn parse_assessment(response: &str) -> Assessment {
    let Some(parsed) = extract_json_object(response) else {
        return Assessment::scored(
            UNPARSEABLE_CONFIDENCE,
            "LLM response could not be parsed as JSON",
        );
    };

    let confidence = parsed
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| (0.0..=1.0).contains(c))
        .unwrap_or(DEFAULT_CONFIDENCE);

    let decision = parsed
        .get("decision")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Decision>().ok());

    let field = |name: &str| {
        parsed
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let reasoning = match (field("reasoning"), field("conclusion")) {
        (Some(r), Some(c)) => format!("{} Conclusion: {}", r, c),
        (Some(r), None) => r,
        (None, Some(c)) => c,
        (None, None) => "No reasoning provided".to_string(),
    };

    Assessment {
        decision,
        confidence,
        reasoning,
    }
}

/// Find the outermost JSON object in `response`.
fn extract_json_object(response: &str) -> Option<Value> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<Value>(&response[start..=end])
        .ok()
        .filter(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let response = r#"{
            "observation": "SOL/USDC pool is deep",
            "reasoning": "Slippage under 0.1%",
            "conclusion": "Proceed",
            "confidence": 0.9
        }"#;
        let a = parse_assessment(response);
        assert_eq!(a.confidence, 0.9);
        assert_eq!(a.reasoning, "Slippage under 0.1% Conclusion: Proceed");
        assert!(a.decision.is_none());
    }

    #[test]
    fn test_parse_with_fence_and_decision() {
        let response = "Here is my analysis:\n```json\n{\"decision\": \"reject\", \"confidence\": 0.8, \"reasoning\": \"MEV risk\"}\n```";
        let a = parse_assessment(response);
        assert_eq!(a.decision, Some(Decision::Reject));
        assert_eq!(a.confidence, 0.8);
        assert_eq!(a.reasoning, "MEV risk");
    }

    #[test]
    fn test_out_of_range_confidence_defaults() {
        let a = parse_assessment(r#"{"confidence": 7, "reasoning": "x"}"#);
        assert_eq!(a.confidence, DEFAULT_CONFIDENCE);

        let b = parse_assessment(r#"{"confidence": "high", "reasoning": "x"}"#);
        assert_eq!(b.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_missing_fields_defaulted() {
        let a = parse_assessment("{}");
        assert_eq!(a.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(a.reasoning, "No reasoning provided");
    }

    #[test]
    fn test_unparseable() {
        let a = parse_assessment("approve, looks great");
        assert_eq!(a.confidence, UNPARSEABLE_CONFIDENCE);
        assert!(a.decision.is_none());

        let b = parse_assessment("} broken {");
        assert_eq!(b.confidence, UNPARSEABLE_CONFIDENCE);
    }

    #[test]
    fn test_unknown_decision_ignored() {
        let a = parse_assessment(r#"{"decision": "maybe", "confidence": 0.6}"#);
        assert!(a.decision.is_none());
        assert_eq!(a.confidence, 0.6);
    }
}
