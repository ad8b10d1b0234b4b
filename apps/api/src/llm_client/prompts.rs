// Shared prompt fragments.
// Each service that needs generation calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

/// Strict no-fabrication rule for event extraction.
pub const NO_FABRICATION_RULE: &str =
    "Only use facts present in the provided input. DO NOT HALLUCINATE information.";

/// Source-material block embedded in every user prompt.
///
/// Built with `format!` rather than placeholder replacement so user text that
/// happens to contain `{...}` is never rewritten.
pub fn source_material(resume_text: &str, posts_json: &str) -> String {
    format!("**Resume Text:** ```\n{resume_text}\n```\n**Social Posts:** ```json\n{posts_json}\n```\n")
}
