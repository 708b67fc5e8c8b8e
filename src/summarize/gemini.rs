//! Gemini `generateContent` client.

use rand::Rng;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::Summarizer;
use crate::error::SummarizeError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_PROMPT: &str = "Odradi sumarizaciju sljedećeg teksta:";

/// How a response status is handled by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// 429: quota exhausted, wait out the window
    RateLimited,
    /// 503: transient, back off exponentially
    Unavailable,
    Fatal,
}

pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        429 => StatusClass::RateLimited,
        503 => StatusClass::Unavailable,
        _ => StatusClass::Fatal,
    }
}

/// Attempt budget and waits between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub rate_limit_wait: Duration,
    pub base_backoff: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            rate_limit_wait: Duration::from_secs(60),
            base_backoff: Duration::from_secs(10),
            max_jitter: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Wait after a 503 on the zero-based `attempt`: `base * 2^attempt` plus uniform jitter.
    pub fn backoff_delay<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let exponential = self.base_backoff * 2u32.saturating_pow(attempt);
        let jitter = rng.gen_range(0.0..=self.max_jitter.as_secs_f64());
        exponential + Duration::from_secs_f64(jitter)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

impl GenerateRequest {
    fn new(prompt: String) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, trimmed.
    fn into_text(self) -> Result<String, SummarizeError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| SummarizeError::Parse("response has no candidate text".to_string()))
    }
}

/// Blocking Gemini client with rate-limit and outage retries.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    prompt: String,
    retry: RetryPolicy,
    http_client: Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            retry: RetryPolicy::default(),
            http_client: Client::new(),
        }
    }

    /// Reads the key from `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self, SummarizeError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SummarizeError::Config("GEMINI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Instruction placed before the text to summarize.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }

    fn prompt_for(&self, text: &str) -> String {
        format!("{}\n\n{}", self.prompt, text)
    }
}

impl Summarizer for GeminiClient {
    fn generate(&self, text: &str) -> Result<String, SummarizeError> {
        let body = GenerateRequest::new(self.prompt_for(text));
        let url = self.endpoint();
        let mut rng = rand::thread_rng();

        for attempt in 0..self.retry.max_attempts {
            let response = self.http_client.post(&url).json(&body).send()?;
            let status = response.status().as_u16();

            match classify_status(status) {
                StatusClass::Success => {
                    let reply: GenerateResponse = response
                        .json()
                        .map_err(|e| SummarizeError::Parse(e.to_string()))?;
                    return reply.into_text();
                }
                StatusClass::RateLimited => {
                    let wait = self.retry.rate_limit_wait;
                    warn!(attempt, wait_secs = wait.as_secs_f64(), "rate limited, waiting");
                    thread::sleep(wait);
                }
                StatusClass::Unavailable => {
                    let wait = self.retry.backoff_delay(attempt, &mut rng);
                    warn!(attempt, wait_secs = wait.as_secs_f64(), "service unavailable, backing off");
                    thread::sleep(wait);
                }
                StatusClass::Fatal => {
                    let message = response.text().unwrap_or_default();
                    debug!(status, "request rejected");
                    return Err(SummarizeError::Api { status, message });
                }
            }
        }

        Err(SummarizeError::RetriesExhausted {
            attempts: self.retry.max_attempts,
        })
    }
}
