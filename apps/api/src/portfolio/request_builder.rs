//! Request Builder: assembles the instruction, prompt, schema and temperature
//! for one generation task.
//!
//! Inputs are embedded verbatim. Nothing is truncated here; oversized requests
//! surface as errors from the generation call itself.

use std::fmt;

use serde_json::Value;

use crate::llm_client::prompts::{source_material, NO_FABRICATION_RULE};
use crate::llm_client::StructuredPrompt;
use crate::models::portfolio::DatedPost;
use crate::portfolio::prompts::{
    SIMPLE_PORTFOLIO_PROMPT_TEMPLATE, SIMPLE_PORTFOLIO_SYSTEM_TEMPLATE, TIMELINE_PROMPT_TEMPLATE,
    TIMELINE_SYSTEM_TEMPLATE,
};
use crate::portfolio::schema::{simple_portfolio_schema, timeline_schema};

/// Low temperature keeps event extraction close to the source text.
pub const TIMELINE_TEMPERATURE: f32 = 0.2;
/// Slightly looser for the prose summary.
pub const SIMPLE_PORTFOLIO_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationTask {
    Timeline,
    SimplePortfolio,
}

impl GenerationTask {
    pub fn temperature(self) -> f32 {
        match self {
            GenerationTask::Timeline => TIMELINE_TEMPERATURE,
            GenerationTask::SimplePortfolio => SIMPLE_PORTFOLIO_TEMPERATURE,
        }
    }

    fn schema(self) -> Value {
        match self {
            GenerationTask::Timeline => timeline_schema(),
            GenerationTask::SimplePortfolio => simple_portfolio_schema(),
        }
    }

    fn templates(self) -> (&'static str, &'static str) {
        match self {
            GenerationTask::Timeline => (TIMELINE_SYSTEM_TEMPLATE, TIMELINE_PROMPT_TEMPLATE),
            GenerationTask::SimplePortfolio => (
                SIMPLE_PORTFOLIO_SYSTEM_TEMPLATE,
                SIMPLE_PORTFOLIO_PROMPT_TEMPLATE,
            ),
        }
    }
}

impl fmt::Display for GenerationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationTask::Timeline => f.write_str("timeline"),
            GenerationTask::SimplePortfolio => f.write_str("simple portfolio"),
        }
    }
}

/// Builds the full structured prompt for `task`.
///
/// Fails only if the posts cannot be serialized to JSON.
pub fn build_prompt(
    resume_text: &str,
    posts: &[DatedPost],
    task: GenerationTask,
) -> Result<StructuredPrompt, serde_json::Error> {
    let posts_json = serde_json::to_string_pretty(posts)?;
    let (system_template, prompt_template) = task.templates();

    Ok(StructuredPrompt {
        system_instruction: system_template.replace("{no_fabrication_rule}", NO_FABRICATION_RULE),
        user_prompt: prompt_template
            .replace("{source_material}", &source_material(resume_text, &posts_json)),
        schema: task.schema(),
        temperature: task.temperature(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posts() -> Vec<DatedPost> {
        vec![
            DatedPost {
                date: "2024-07-26".to_string(),
                text: "Launched project X".to_string(),
            },
            DatedPost {
                date: "unknown".to_string(),
                text: "Spoke at a meetup".to_string(),
            },
        ]
    }

    #[test]
    fn test_timeline_prompt_carries_schema_and_low_temperature() {
        let prompt = build_prompt("Resume body", &sample_posts(), GenerationTask::Timeline).unwrap();
        assert_eq!(prompt.temperature, 0.2);
        assert_eq!(prompt.schema, timeline_schema());
        assert!(prompt.system_instruction.contains("expert career analyst"));
        assert!(prompt.system_instruction.contains("newest to oldest"));
        assert!(prompt.system_instruction.contains("needs_user_verification"));
        assert!(prompt.system_instruction.contains(NO_FABRICATION_RULE));
        assert!(!prompt.system_instruction.contains('{'));
    }

    #[test]
    fn test_simple_portfolio_prompt_carries_schema_and_temperature() {
        let prompt =
            build_prompt("Resume body", &sample_posts(), GenerationTask::SimplePortfolio).unwrap();
        assert_eq!(prompt.temperature, 0.3);
        assert_eq!(prompt.schema, simple_portfolio_schema());
        assert!(prompt.system_instruction.contains("professional resume writer"));
        assert!(prompt.system_instruction.contains("quantifiable achievements"));
        assert!(prompt
            .system_instruction
            .contains("5.  Do not include information that is not present in the inputs."));
        assert!(!prompt.system_instruction.contains(NO_FABRICATION_RULE));
        assert!(!prompt.system_instruction.contains('{'));
        assert!(prompt.user_prompt.starts_with("Synthesize the following resume"));
    }

    #[test]
    fn test_prompt_embeds_resume_verbatim_and_posts_as_pretty_json() {
        let resume = "Ada Lovelace\nStaff Engineer at Analytical Co";
        let prompt = build_prompt(resume, &sample_posts(), GenerationTask::Timeline).unwrap();

        assert!(prompt.user_prompt.contains(resume));
        let posts_json = serde_json::to_string_pretty(&sample_posts()).unwrap();
        assert!(prompt.user_prompt.contains(&posts_json));
        assert!(prompt.user_prompt.contains("\"date\": \"2024-07-26\""));
    }

    #[test]
    fn test_placeholder_text_in_inputs_is_not_expanded() {
        let resume = "Literal {source_material} in my resume";
        let posts = vec![DatedPost {
            date: "unknown".to_string(),
            text: "Mentions {resume_text} verbatim".to_string(),
        }];
        let prompt = build_prompt(resume, &posts, GenerationTask::Timeline).unwrap();
        assert!(prompt.user_prompt.contains("Literal {source_material} in my resume"));
        assert!(prompt.user_prompt.contains("Mentions {resume_text} verbatim"));
    }

    #[test]
    fn test_empty_posts_serialize_as_empty_array() {
        let prompt = build_prompt("cv", &[], GenerationTask::Timeline).unwrap();
        assert!(prompt.user_prompt.contains("```json\n[]\n```"));
    }

    #[test]
    fn test_large_input_is_passed_through_untruncated() {
        let resume = "x".repeat(200_000);
        let prompt = build_prompt(&resume, &[], GenerationTask::SimplePortfolio).unwrap();
        assert!(prompt.user_prompt.len() > 200_000);
    }

    #[test]
    fn test_task_display_names() {
        assert_eq!(GenerationTask::Timeline.to_string(), "timeline");
        assert_eq!(GenerationTask::SimplePortfolio.to_string(), "simple portfolio");
    }
}
