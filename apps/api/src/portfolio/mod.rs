// Portfolio generation: post parsing, structured-output contracts, prompt
// assembly, and the concurrent two-task orchestration.
// All generation calls go through llm_client; no direct HTTP calls here.

pub mod handlers;
pub mod orchestrator;
pub mod posts;
pub mod prompts;
pub mod request_builder;
pub mod schema;
pub mod submission;
pub mod upload;
