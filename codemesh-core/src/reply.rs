//! Response normalizer: from raw agent replies to display-ready outcomes.
//!
//! Replies from the analysis service are loosely typed. Non-Architect agents
//! always answer in free-form markdown. The Architect is instructed to answer
//! with a JSON object, usually wrapped in a ```json fence inside otherwise
//! free-form text, but nothing guarantees it complied.
//!
//! # Error Handling
//!
//! The normalizer never raises a fault to its caller. Interpretation is a
//! total function: any parse failure degrades to narrative display of the
//! entire original reply, logged for diagnostics. Shape errors (a fenced
//! payload that parses as JSON but not as [`StructuredAnalysis`]) are treated
//! the same as malformed JSON. Field values that do parse are passed through
//! unvalidated; range checks belong to the renderer.

use crate::error::Result;
use crate::types::{AgentKind, StructuredAnalysis};

/// Opening fence tag the Architect is instructed to use.
const FENCE_OPEN: &str = "```json";
/// Closing fence, which must start on its own line.
const FENCE_CLOSE: &str = "\n```";

/// Interpretation of one raw reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// Free-form markdown for the response panel; structured panels untouched.
    Narrative(String),
    /// Parsed Architect payload, applied as a field-by-field partial update.
    Structured(StructuredAnalysis),
}

/// Interpret a raw reply according to the agent that produced it.
///
/// Non-Architect replies are narrative unconditionally, even when they happen
/// to be valid JSON. Architect replies go through [`parse_structured`]; on
/// any failure the whole original text becomes the narrative.
pub fn interpret(agent: AgentKind, raw: &str) -> ReplyOutcome {
    if agent != AgentKind::Architect {
        return ReplyOutcome::Narrative(raw.to_string());
    }

    match parse_structured(raw) {
        Ok(parsed) => ReplyOutcome::Structured(parsed),
        Err(e) => {
            tracing::debug!(error = %e, "Architect reply is not structured, falling back to narrative");
            ReplyOutcome::Narrative(raw.to_string())
        }
    }
}

/// Strictly parse an Architect reply into a [`StructuredAnalysis`].
///
/// The candidate payload is the interior of the first ```json fence when one
/// is present, otherwise the entire reply. Returns an explicit `Err` for
/// malformed JSON or a non-conforming shape; callers decide the fallback.
pub fn parse_structured(raw: &str) -> Result<StructuredAnalysis> {
    let candidate = extract_fenced_json(raw).unwrap_or(raw);
    let parsed = serde_json::from_str(candidate)?;
    Ok(parsed)
}

/// Extract the interior of the first well-formed ```json fenced block.
///
/// A well-formed fence tag is followed by a newline and closed by a ``` on
/// its own line. Occurrences that fail either condition (an inline mention
/// of the tag, an unclosed fence) are skipped, and a later well-formed block
/// still matches. Returns `None` when no block in the reply qualifies; the
/// caller then treats the whole reply as the candidate payload.
pub fn extract_fenced_json(raw: &str) -> Option<&str> {
    for (start, _) in raw.match_indices(FENCE_OPEN) {
        let after_tag = &raw[start + FENCE_OPEN.len()..];
        let Some(body) = after_tag
            .strip_prefix("\r\n")
            .or_else(|| after_tag.strip_prefix('\n'))
        else {
            continue;
        };
        if let Some(end) = body.find(FENCE_CLOSE) {
            return Some(&body[..end]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HealthMetric, RefactorItem};

    // Four-hash delimiter: the summary text itself contains `"###`
    const FULL_PAYLOAD: &str = r####"```json
{
  "summary": "### Analysis\n\nThe auth module is tightly coupled.",
  "healthScores": [
    {"metric": "Modularity", "score": "A-", "value": 90},
    {"metric": "Documentation", "score": "C+", "value": 65}
  ],
  "refactorSuggestions": [
    {"file": "AuthService.ts", "issue": "High Coupling", "severity": "High"}
  ]
}
```"####;

    #[test]
    fn test_non_architect_is_always_narrative() {
        // Even valid JSON stays narrative for the other personas
        let json = r#"{"summary":"would parse fine"}"#;
        for agent in [AgentKind::Refactorer, AgentKind::Documentarian] {
            assert_eq!(
                interpret(agent, json),
                ReplyOutcome::Narrative(json.to_string())
            );
        }
    }

    #[test]
    fn test_architect_full_payload_maps_one_to_one() {
        let outcome = interpret(AgentKind::Architect, FULL_PAYLOAD);
        let ReplyOutcome::Structured(parsed) = outcome else {
            panic!("expected structured outcome");
        };
        assert_eq!(
            parsed.summary.as_deref(),
            Some("### Analysis\n\nThe auth module is tightly coupled.")
        );
        let scores = parsed.health_scores.unwrap();
        assert_eq!(scores.len(), 2);
        // Sequence order preserved
        assert_eq!(scores[0].metric, "Modularity");
        assert_eq!(scores[0].score, "A-");
        assert_eq!(scores[0].value, 90.0);
        assert_eq!(scores[1].metric, "Documentation");
        let suggestions = parsed.refactor_suggestions.unwrap();
        assert_eq!(suggestions[0].file, "AuthService.ts");
        assert_eq!(suggestions[0].severity, "High");
    }

    #[test]
    fn test_architect_prose_around_fence_is_ignored() {
        let raw = format!("Here is my assessment:\n\n{}\n\nLet me know!", FULL_PAYLOAD);
        let outcome = interpret(AgentKind::Architect, &raw);
        assert!(matches!(outcome, ReplyOutcome::Structured(_)));
    }

    #[test]
    fn test_architect_bare_json_without_fence() {
        let raw = r#"{"summary": "ok"}"#;
        let outcome = interpret(AgentKind::Architect, raw);
        assert_eq!(
            outcome,
            ReplyOutcome::Structured(StructuredAnalysis {
                summary: Some("ok".to_string()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_architect_invalid_fence_interior_falls_back_to_full_reply() {
        let raw = "Preamble\n```json\n{not valid json\n```\nPostamble";
        let outcome = interpret(AgentKind::Architect, raw);
        // The entire original text, not just the fence interior
        assert_eq!(outcome, ReplyOutcome::Narrative(raw.to_string()));
    }

    #[test]
    fn test_architect_plain_prose_is_narrative() {
        let raw = "The architecture looks reasonable overall.";
        assert_eq!(
            interpret(AgentKind::Architect, raw),
            ReplyOutcome::Narrative(raw.to_string())
        );
    }

    #[test]
    fn test_unclosed_fence_yields_no_extraction() {
        let raw = "```json\n{\"summary\": \"never closed\"";
        assert_eq!(extract_fenced_json(raw), None);
        // And the whole reply is not valid JSON either, so narrative fallback
        assert_eq!(
            interpret(AgentKind::Architect, raw),
            ReplyOutcome::Narrative(raw.to_string())
        );
    }

    #[test]
    fn test_fence_requires_newline_after_tag() {
        assert_eq!(extract_fenced_json("```json{\"a\":1}\n```"), None);
        assert_eq!(
            extract_fenced_json("```json\n{\"a\":1}\n```"),
            Some("{\"a\":1}")
        );
        assert_eq!(
            extract_fenced_json("```json\r\n{\"a\":1}\n```"),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_inline_tag_mention_does_not_mask_a_later_fence() {
        // An inline mention of the tag is not a fence; the real block after
        // it must still be found
        let raw = "I used ```json fences.\n```json\n{\"summary\":\"ok\"}\n```";
        assert_eq!(extract_fenced_json(raw), Some("{\"summary\":\"ok\"}"));
        assert_eq!(
            interpret(AgentKind::Architect, raw),
            ReplyOutcome::Structured(StructuredAnalysis {
                summary: Some("ok".to_string()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_first_fence_wins() {
        let raw = "```json\n{\"summary\":\"first\"}\n```\n```json\n{\"summary\":\"second\"}\n```";
        assert_eq!(extract_fenced_json(raw), Some("{\"summary\":\"first\"}"));
    }

    #[test]
    fn test_wrong_shape_is_a_parse_error() {
        // Parses as JSON but healthScores is not a sequence of metrics
        let raw = "```json\n{\"healthScores\": \"great\"}\n```";
        assert!(parse_structured(raw).is_err());
        assert_eq!(
            interpret(AgentKind::Architect, raw),
            ReplyOutcome::Narrative(raw.to_string())
        );
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let raw = "```json\n{\"summary\":\"ok\",\"confidence\":0.9}\n```";
        let parsed = parse_structured(raw).unwrap();
        assert_eq!(parsed.summary.as_deref(), Some("ok"));
    }

    #[test]
    fn test_round_trip_through_fence() {
        let original = StructuredAnalysis {
            summary: Some("ok".to_string()),
            health_scores: Some(vec![
                HealthMetric {
                    metric: "Modularity".to_string(),
                    score: "A-".to_string(),
                    value: 90.0,
                },
                HealthMetric {
                    metric: "Test Coverage".to_string(),
                    score: "B".to_string(),
                    value: 78.0,
                },
            ]),
            refactor_suggestions: Some(vec![RefactorItem {
                file: "src/auth.rs".to_string(),
                issue: "God object".to_string(),
                severity: "High".to_string(),
            }]),
        };
        let wrapped = format!(
            "```json\n{}\n```",
            serde_json::to_string_pretty(&original).unwrap()
        );
        let outcome = interpret(AgentKind::Architect, &wrapped);
        assert_eq!(outcome, ReplyOutcome::Structured(original));
    }

    #[test]
    fn test_out_of_range_value_passes_through() {
        let raw = "```json\n{\"healthScores\":[{\"metric\":\"X\",\"score\":\"A\",\"value\":150}]}\n```";
        let parsed = parse_structured(raw).unwrap();
        assert_eq!(parsed.health_scores.unwrap()[0].value, 150.0);
    }
}
