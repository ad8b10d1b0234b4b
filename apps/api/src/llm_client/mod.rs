/// Generation Client: the single point of entry for all calls to the generation service.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API directly.
/// All structured-output requests MUST go through `generate_structured`.
///
/// Model: gemini-2.5-flash (hardcoded)
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod schema;

use schema::SchemaError;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for every generation call.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-flash";
const RESPONSE_MIME_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("generation service returned empty content")]
    EmptyContent,

    #[error("prompt blocked by generation service: {0}")]
    Blocked(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Everything one structured-output call needs besides the model identifier.
#[derive(Debug, Clone)]
pub struct StructuredPrompt {
    pub system_instruction: String,
    pub user_prompt: String,
    /// Response schema in the service's OpenAPI subset (`OBJECT`, `ARRAY`, ...).
    pub schema: Value,
    pub temperature: f32,
}

/// The external generation service. One logical operation: complete a prompt
/// with structured output and hand back the raw response text.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn complete(&self, prompt: &StructuredPrompt) -> Result<String, GenerationError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    system_instruction: GeminiSystemInstruction<'a>,
    generation_config: GeminiGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    temperature: f32,
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

impl<'a> GeminiRequest<'a> {
    fn from_prompt(prompt: &'a StructuredPrompt) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: &prompt.user_prompt,
                }],
            }],
            system_instruction: GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: &prompt.system_instruction,
                }],
            },
            generation_config: GeminiGenerationConfig {
                temperature: prompt.temperature,
                response_mime_type: RESPONSE_MIME_TYPE,
                response_schema: &prompt.schema,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Production `GenerationService` over the Generative Language REST API.
///
/// No retries and no client-side timeout: every call is a single attempt and
/// the transport defaults apply.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Result<Self, GenerationError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
        })
    }

    fn url() -> String {
        format!("{GEMINI_API_BASE}/{MODEL}:generateContent")
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn complete(&self, prompt: &StructuredPrompt) -> Result<String, GenerationError> {
        let body = GeminiRequest::from_prompt(prompt);

        let mut request = self.client.post(Self::url()).json(&body);
        // A missing key is not checked here; the service rejects the call.
        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Generation call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(GenerationError::Blocked(reason));
        }

        let text = parsed.text();
        if text.is_none() {
            let finish_reason = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref());
            if let Some(reason) = finish_reason {
                warn!("Generation finished without content (finish_reason={reason})");
            }
        }
        text.ok_or(GenerationError::EmptyContent)
    }
}

/// Calls the service, then parses, validates and deserializes its response.
///
/// The raw JSON is checked against `prompt.schema` before the typed conversion.
pub async fn generate_structured<T: DeserializeOwned>(
    service: &dyn GenerationService,
    prompt: &StructuredPrompt,
) -> Result<T, GenerationError> {
    let raw = service.complete(prompt).await?;

    let text = strip_json_fences(&raw);
    if text.is_empty() {
        return Err(GenerationError::EmptyContent);
    }

    let value: Value = serde_json::from_str(text)?;
    schema::validate(&value, &prompt.schema)?;

    serde_json::from_value(value).map_err(GenerationError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(stripped)
}
