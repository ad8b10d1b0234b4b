//! Orchestrator: fans out the two generation tasks and merges what settles.
//!
//! Flow: parse_posts (once) → spawn timeline + simple portfolio →
//!       join both unconditionally → keep each success, drop each failure.
//!
//! A failing task never affects its sibling. The only error returned to the
//! caller is a task that could not settle at all (panicked or aborted).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::llm_client::{generate_structured, GenerationError, GenerationService};
use crate::models::portfolio::{
    CombinedResult, DatedPost, GenerationOutput, SimplePortfolioData,
};
use crate::portfolio::posts::parse_posts;
use crate::portfolio::request_builder::{build_prompt, GenerationTask};

/// Returned when combining fails for an unexpected reason.
pub const COMBINE_FAILURE: &str = "Failed to generate portfolio from AI.";

/// Runs both generation tasks concurrently over the same inputs.
///
/// Each slot of the result is `Some` only if its task succeeded with a
/// non-empty payload. Both failing is still `Ok` with both slots empty.
pub async fn generate_all_outputs(
    service: Arc<dyn GenerationService>,
    resume_text: &str,
    posts_text: &str,
) -> Result<CombinedResult, AppError> {
    let posts: Arc<[DatedPost]> = parse_posts(posts_text).into();
    let resume_text: Arc<str> = Arc::from(resume_text);
    info!("Generating portfolio outputs from {} parsed posts", posts.len());

    let timeline_task = tokio::spawn(run_task::<GenerationOutput>(
        service.clone(),
        resume_text.clone(),
        posts.clone(),
        GenerationTask::Timeline,
    ));
    let portfolio_task = tokio::spawn(run_task::<SimplePortfolioData>(
        service,
        resume_text,
        posts,
        GenerationTask::SimplePortfolio,
    ));

    let (timeline, portfolio) = tokio::join!(timeline_task, portfolio_task);

    let (timeline, portfolio) = match (timeline, portfolio) {
        (Ok(timeline), Ok(portfolio)) => (timeline, portfolio),
        (Err(e), _) | (_, Err(e)) => {
            error!("Error generating portfolio outputs: {e}");
            return Err(AppError::Generation(COMBINE_FAILURE.to_string()));
        }
    };

    let timeline = settle(GenerationTask::Timeline, timeline).filter(|output| {
        let has_events = !output.timeline.is_empty();
        if !has_events {
            warn!("timeline generation returned no events; treating as absent");
        }
        has_events
    });
    let simple_portfolio = settle(GenerationTask::SimplePortfolio, portfolio);

    Ok(CombinedResult {
        timeline,
        simple_portfolio,
    })
}

async fn run_task<T: DeserializeOwned>(
    service: Arc<dyn GenerationService>,
    resume_text: Arc<str>,
    posts: Arc<[DatedPost]>,
    task: GenerationTask,
) -> Result<T, GenerationError> {
    let prompt = build_prompt(&resume_text, &posts, task)?;
    generate_structured(service.as_ref(), &prompt).await
}

/// Converts a task outcome into its result slot, logging failures.
fn settle<T>(task: GenerationTask, outcome: Result<T, GenerationError>) -> Option<T> {
    match outcome {
        Ok(value) => {
            info!("{task} generation settled successfully");
            Some(value)
        }
        Err(e) => {
            warn!("{task} generation failed: {e}");
            None
        }
    }
}
