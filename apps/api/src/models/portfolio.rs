//! Data shapes exchanged with the generation service and returned to clients.
//!
//! Everything here except `DatedPost` and `CombinedResult` is produced by the
//! external model. The declared response schemas in `portfolio::schema` must
//! stay in step with these types.

use serde::{Deserialize, Serialize};

/// Date assigned to a post line that carries no `YYYY-MM-DD:` prefix.
pub const UNKNOWN_DATE: &str = "unknown";

/// One pasted post line, split into its date prefix and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedPost {
    /// `YYYY-MM-DD` or [`UNKNOWN_DATE`].
    pub date: String,
    /// Never empty.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Work,
    Project,
    Learning,
    Achievement,
    Community,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Work,
        EventType::Project,
        EventType::Learning,
        EventType::Achievement,
        EventType::Community,
        EventType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Work => "Work",
            EventType::Project => "Project",
            EventType::Learning => "Learning",
            EventType::Achievement => "Achievement",
            EventType::Community => "Community",
            EventType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// A single career event. The model is asked to order these newest first;
/// nothing re-sorts them locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: String,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub bullets: Vec<String>,
    pub tags: Vec<String>,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationItem {
    pub item: String,
    pub reason: String,
}

/// Payload of a successful timeline generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub timeline: Vec<TimelineEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_user_verification: Option<Vec<VerificationItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub title: String,
    pub company: String,
    pub date: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub date: String,
    pub description: String,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub list: Vec<String>,
}

/// Payload of a successful simple-portfolio generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplePortfolioData {
    pub name: String,
    pub title: String,
    pub summary: String,
    pub experience: Vec<WorkExperience>,
    pub projects: Vec<Project>,
    pub skills: Vec<SkillGroup>,
}

/// Result of one "generate" action. Each half is absent when its task failed
/// or returned an empty payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub timeline: Option<GenerationOutput>,
    pub simple_portfolio: Option<SimplePortfolioData>,
}

impl CombinedResult {
    pub fn is_empty(&self) -> bool {
        self.timeline.is_none() && self.simple_portfolio.is_none()
    }
}
