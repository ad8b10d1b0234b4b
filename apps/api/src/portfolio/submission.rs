//! Submission path: input gate, in-flight tracking, and latest-result bookkeeping.
//!
//! Overlapping submissions from one client are allowed. Each request gets a
//! monotonically increasing id; only the result of the most recently
//! dispatched request may become the client's "latest". Results of earlier
//! requests are still returned to their own caller but never overwrite it.
//!
//! A client's entry lives only while it has requests in flight or a stored
//! result. Logout forgets the stored result and anything still in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::GenerationService;
use crate::models::portfolio::{CombinedResult, GenerationOutput, SimplePortfolioData};
use crate::portfolio::orchestrator::generate_all_outputs;

pub const NO_INPUT_MESSAGE: &str =
    "Please upload a resume or paste some posts to generate a timeline.";
pub const TIMELINE_FAILED_MESSAGE: &str =
    "The AI could not generate a timeline. Please try refining your input.";
pub const PORTFOLIO_FAILED_MESSAGE: &str =
    "The AI could not generate a simple portfolio. Please try refining your input.";
pub const PORTFOLIO_ALSO_FAILED_MESSAGE: &str =
    "Also, the AI could not generate a simple portfolio.";

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub posts_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub request_id: u64,
    pub timeline: Option<GenerationOutput>,
    pub simple_portfolio: Option<SimplePortfolioData>,
    /// One user-facing notice per missing product; empty when both arrived.
    pub messages: Vec<String>,
}

/// The most recent accepted result for a client.
#[derive(Debug, Clone, Serialize)]
pub struct LatestResult {
    pub request_id: u64,
    pub completed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: CombinedResult,
}

#[derive(Debug, Default)]
struct ClientSubmissions {
    last_dispatched: u64,
    in_flight: usize,
    latest: Option<LatestResult>,
    /// Requests up to this id were dispatched before a logout and may not record.
    forgotten_through: u64,
}

/// Per-client submission state shared by all handlers.
#[derive(Debug, Default)]
pub struct SubmissionTracker {
    clients: Mutex<HashMap<Uuid, ClientSubmissions>>,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ClientSubmissions>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a new request as dispatched. The in-flight mark is released when
    /// the returned guard drops, whatever the outcome.
    pub fn begin(self: &Arc<Self>, client: Uuid) -> InFlightGuard {
        let mut clients = self.lock();
        let entry = clients.entry(client).or_default();
        entry.last_dispatched += 1;
        entry.in_flight += 1;

        InFlightGuard {
            tracker: Arc::clone(self),
            client,
            request_id: entry.last_dispatched,
        }
    }

    /// Stores `result` as the client's latest unless a newer request has been
    /// dispatched since. Returns whether it was stored.
    pub fn record(&self, client: Uuid, request_id: u64, result: &CombinedResult) -> bool {
        let mut clients = self.lock();
        let Some(entry) = clients.get_mut(&client) else {
            return false;
        };
        if entry.last_dispatched != request_id || request_id <= entry.forgotten_through {
            return false;
        }
        entry.latest = Some(LatestResult {
            request_id,
            completed_at: Utc::now(),
            result: result.clone(),
        });
        true
    }

    pub fn latest(&self, client: Uuid) -> Option<LatestResult> {
        self.lock().get(&client).and_then(|e| e.latest.clone())
    }

    pub fn in_flight(&self, client: Uuid) -> bool {
        self.lock().get(&client).is_some_and(|e| e.in_flight > 0)
    }

    /// Drops the client's stored result. Requests still in flight keep their
    /// entry alive until they finish but can no longer record.
    pub fn forget(&self, client: Uuid) {
        let mut clients = self.lock();
        match clients.get_mut(&client) {
            Some(entry) if entry.in_flight > 0 => {
                entry.latest = None;
                entry.forgotten_through = entry.last_dispatched;
            }
            Some(_) => {
                clients.remove(&client);
            }
            None => {}
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn finish(&self, client: Uuid) {
        let mut clients = self.lock();
        let Some(entry) = clients.get_mut(&client) else {
            return;
        };
        entry.in_flight = entry.in_flight.saturating_sub(1);
        if entry.in_flight == 0 && entry.latest.is_none() {
            clients.remove(&client);
        }
    }
}

/// Releases one in-flight mark on drop.
pub struct InFlightGuard {
    tracker: Arc<SubmissionTracker>,
    client: Uuid,
    pub request_id: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.tracker.finish(self.client);
    }
}

/// Validates input, runs generation, records the result and builds notices.
///
/// Empty input is refused before any generation call.
pub async fn submit_generation(
    service: Arc<dyn GenerationService>,
    tracker: &Arc<SubmissionTracker>,
    client: Uuid,
    request: GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    if request.resume_text.trim().is_empty() && request.posts_text.trim().is_empty() {
        return Err(AppError::Validation(NO_INPUT_MESSAGE.to_string()));
    }

    let guard = tracker.begin(client);
    let request_id = guard.request_id;
    info!("Dispatching generation request {request_id} for client {client}");

    let result = generate_all_outputs(service, &request.resume_text, &request.posts_text).await?;

    if result.is_empty() {
        warn!("Request {request_id} for client {client} produced neither output");
    }
    if !tracker.record(client, request_id, &result) {
        warn!("Discarding stale result of request {request_id} for client {client}");
    }
    drop(guard);

    let messages = outcome_messages(&result);
    Ok(GenerateResponse {
        request_id,
        timeline: result.timeline,
        simple_portfolio: result.simple_portfolio,
        messages,
    })
}

/// User-facing notices naming each product that did not arrive.
pub fn outcome_messages(result: &CombinedResult) -> Vec<String> {
    let mut messages = Vec::new();
    if result.timeline.is_none() {
        messages.push(TIMELINE_FAILED_MESSAGE.to_string());
    }
    if result.simple_portfolio.is_none() {
        let message = if messages.is_empty() {
            PORTFOLIO_FAILED_MESSAGE
        } else {
            PORTFOLIO_ALSO_FAILED_MESSAGE
        };
        messages.push(message.to_string());
    }
    messages
}
