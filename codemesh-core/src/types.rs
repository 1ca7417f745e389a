//! Core domain types for codemesh
//!
//! These types model the two flows the dashboard cares about:
//!
//! | Term | Definition |
//! |------|------------|
//! | **Agent kind** | The analysis persona (Architect, Refactorer, Documentarian) |
//! | **Analysis request** | One prompt submission; ephemeral, immutable once sent |
//! | **Structured analysis** | The Architect's optional JSON payload; all fields optional |
//! | **Event record** | One entry in the live feed, owned wholesale by the sync loop |
//!
//! Only the Architect emits structured payloads; the other two personas always
//! reply with free-form markdown. Structured fields are deliberately loose:
//! `HealthMetric::value` is not range-checked and `RefactorItem::severity` is
//! not an enum, matching what the service actually sends.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ============================================
// Agent kinds
// ============================================

/// The analysis persona a prompt is addressed to.
///
/// Determines response interpretation: only [`AgentKind::Architect`] replies
/// are scanned for an embedded JSON payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// High-level patterns and architectural health; replies in JSON.
    #[default]
    Architect,
    /// Technical-debt hunting; replies in markdown.
    Refactorer,
    /// Documentation generation; replies in markdown.
    Documentarian,
}

impl AgentKind {
    /// All selectable kinds, in UI order.
    pub const ALL: [AgentKind; 3] = [
        AgentKind::Architect,
        AgentKind::Refactorer,
        AgentKind::Documentarian,
    ];

    /// Display label for the agent selector.
    pub fn label(&self) -> &'static str {
        match self {
            AgentKind::Architect => "Architect",
            AgentKind::Refactorer => "Refactorer",
            AgentKind::Documentarian => "Documentarian",
        }
    }

    /// Cycle to the next kind (agent selector Tab key).
    pub fn next(self) -> Self {
        match self {
            AgentKind::Architect => AgentKind::Refactorer,
            AgentKind::Refactorer => AgentKind::Documentarian,
            AgentKind::Documentarian => AgentKind::Architect,
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================
// Analysis flow
// ============================================

/// One prompt submission to `POST /analyze`.
///
/// Constructed fresh per submission and immutable once sent. The caller
/// guarantees `prompt` is non-empty (an empty prompt is a no-op upstream,
/// never an error).
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    /// Repository path the service should ingest
    pub repo_path: String,
    /// The natural-language prompt
    pub prompt: String,
    /// Selected persona, serialized as `agent_type` on the wire
    #[serde(rename = "agent_type")]
    pub agent: AgentKind,
}

/// The Architect's structured payload, embedded in a reply as fenced JSON.
///
/// Every field is optional: absent fields leave the corresponding panel at
/// its prior value (partial update, not replace). Field types beyond
/// parseability are not validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    /// Markdown narrative, shown in the response panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Health metrics for the sidebar gauges
    #[serde(
        default,
        rename = "healthScores",
        alias = "health_scores",
        skip_serializing_if = "Option::is_none"
    )]
    pub health_scores: Option<Vec<HealthMetric>>,
    /// Refactor queue entries
    #[serde(
        default,
        rename = "refactorSuggestions",
        alias = "refactor_suggestions",
        skip_serializing_if = "Option::is_none"
    )]
    pub refactor_suggestions: Option<Vec<RefactorItem>>,
}

impl StructuredAnalysis {
    /// True when no field is present (a payload that would update nothing).
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.health_scores.is_none() && self.refactor_suggestions.is_none()
    }
}

/// One codebase-health metric row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    /// Metric name ("Modularity", "Test Coverage", ...)
    pub metric: String,
    /// Letter-grade token; the first character ranks A > B > C
    pub score: String,
    /// Percentage driving the gauge width. Passed through unvalidated;
    /// renderers clamp to [0, 100].
    pub value: f64,
}

impl HealthMetric {
    /// Grade band from the first character of the score token.
    pub fn grade(&self) -> Grade {
        match self.score.chars().next() {
            Some('A') | Some('a') => Grade::A,
            Some('B') | Some('b') => Grade::B,
            _ => Grade::Other,
        }
    }

    /// Gauge ratio in [0.0, 1.0]; out-of-range values clamp here, at the
    /// rendering edge only.
    pub fn ratio(&self) -> f64 {
        (self.value / 100.0).clamp(0.0, 1.0)
    }
}

/// Coarse grade band used for coloring health rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    A,
    B,
    Other,
}

/// One refactor-queue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefactorItem {
    /// File or area the suggestion targets
    pub file: String,
    /// Short issue description
    pub issue: String,
    /// Conventionally "High" / "Medium" / "Low"; not validated
    pub severity: String,
}

impl RefactorItem {
    pub fn is_high_severity(&self) -> bool {
        self.severity.eq_ignore_ascii_case("high")
    }
}

// ============================================
// Event feed
// ============================================

/// One entry in the live event feed (`GET /events`).
///
/// The whole list is replaced on every successful poll; records are never
/// merged or deduplicated client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Server-assigned id, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Event type tag ("webhook_pr", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// ISO-8601 timestamp, kept verbatim; display parsing is best-effort
    pub timestamp: String,
    /// Event payload details
    pub details: EventDetails,
    /// Analysis text the server attached to the event, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

impl EventRecord {
    /// Local wall-clock time for display. Unparseable timestamps are shown
    /// raw rather than dropped.
    pub fn local_time(&self) -> String {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|_| {
                // Naive ISO-8601 without offset (the reference server emits these)
                self.timestamp
                    .split('T')
                    .nth(1)
                    .map(|t| t.chars().take(8).collect())
                    .unwrap_or_else(|| self.timestamp.clone())
            })
    }
}

/// Details attached to an event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Title (e.g. a pull-request title)
    #[serde(default)]
    pub title: String,
    /// Actor login
    #[serde(default)]
    pub user: String,
    /// Action verb ("opened", "synchronize", ...), when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&AgentKind::Architect).unwrap(),
            "\"architect\""
        );
        assert_eq!(
            serde_json::to_string(&AgentKind::Documentarian).unwrap(),
            "\"documentarian\""
        );
    }

    #[test]
    fn test_agent_kind_cycle() {
        let mut kind = AgentKind::Architect;
        kind = kind.next();
        assert_eq!(kind, AgentKind::Refactorer);
        kind = kind.next();
        assert_eq!(kind, AgentKind::Documentarian);
        kind = kind.next();
        assert_eq!(kind, AgentKind::Architect);
    }

    #[test]
    fn test_analysis_request_wire_field_names() {
        let request = AnalysisRequest {
            repo_path: ".".to_string(),
            prompt: "check auth module".to_string(),
            agent: AgentKind::Architect,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["repo_path"], ".");
        assert_eq!(json["prompt"], "check auth module");
        assert_eq!(json["agent_type"], "architect");
    }

    #[test]
    fn test_structured_analysis_accepts_both_casings() {
        let camel: StructuredAnalysis = serde_json::from_str(
            r#"{"healthScores":[{"metric":"Modularity","score":"A-","value":90}]}"#,
        )
        .unwrap();
        let snake: StructuredAnalysis = serde_json::from_str(
            r#"{"health_scores":[{"metric":"Modularity","score":"A-","value":90}]}"#,
        )
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.health_scores.unwrap()[0].metric, "Modularity");
    }

    #[test]
    fn test_health_metric_grade_and_ratio() {
        let metric = HealthMetric {
            metric: "Modularity".to_string(),
            score: "A-".to_string(),
            value: 85.0,
        };
        assert_eq!(metric.grade(), Grade::A);
        assert!((metric.ratio() - 0.85).abs() < f64::EPSILON);

        // Out-of-range values are stored raw but clamp at the render edge
        let wild = HealthMetric {
            metric: "Coverage".to_string(),
            score: "F".to_string(),
            value: 250.0,
        };
        assert_eq!(wild.value, 250.0);
        assert_eq!(wild.ratio(), 1.0);
        assert_eq!(wild.grade(), Grade::Other);
    }

    #[test]
    fn test_event_record_parses_server_shape() {
        let json = r#"{
            "id": 1,
            "type": "webhook_pr",
            "timestamp": "2024-06-01T12:30:45.123456",
            "details": {"title": "Add caching layer", "user": "octocat", "action": "opened"},
            "analysis": "Looks fine."
        }"#;
        let event: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, "webhook_pr");
        assert_eq!(event.details.title, "Add caching layer");
        assert_eq!(event.details.action.as_deref(), Some("opened"));
        // Naive timestamp falls back to the time-of-day slice
        assert_eq!(event.local_time(), "12:30:45");
    }

    #[test]
    fn test_event_record_tolerates_minimal_shape() {
        let json = r#"{"type":"push","timestamp":"not-a-time","details":{}}"#;
        let event: EventRecord = serde_json::from_str(json).unwrap();
        assert!(event.id.is_none());
        assert!(event.details.title.is_empty());
        assert_eq!(event.local_time(), "not-a-time");
    }
}
