//! LLM-backed formatting correction
//!
//! Hand-stitched bundles usually come out with small mechanical damage:
//! an unbalanced parenthesis, a missing semicolon after an IIFE. A hosted
//! model fixes those faster than a human scan, and the instruction prompt
//! forbids it from touching anything semantic. The model is an opaque
//! text-to-text transformer with no determinism guarantee, so it sits
//! behind the [`TextCorrector`] trait and tests substitute a stub.
//!
//! ## Key Discovery
//!
//! Auto-discovers API keys from environment variables:
//! - `GROQ_API_KEY` → Groq (llama-3.3, etc.)
//! - `OPENAI_API_KEY` → OpenAI (gpt-4o, etc.)
//! - `TOGETHER_API_KEY` → Together AI
//! - `DEOBKIT_AI_KEY` + `DEOBKIT_AI_ENDPOINT` → custom OpenAI-compatible
//!   endpoint (`DEOBKIT_AI_MODEL` optional)
//!
//! The first configured provider wins; the config file may override the
//! model and endpoint.

use crate::config::CorrectorConfig;
use crate::{DeobError, DeobResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

/// A text-to-text corrector capability.
pub trait TextCorrector {
    fn correct(&self, text: &str) -> DeobResult<String>;
}

/// Fixed instruction prompt. Formatting repairs only: the model must
/// never alter a value or introduce `this`.
const FIXUP_PROMPT: &str = "Fix this JavaScript file but only respond with the fixed file. \
    However only complete parenthesis or other small formatting issues. \
    Add all missing semi-colons, especially after an IIFE. \
    Do not change any value or add the keyword this:";

/// Known providers and their OpenAI-compatible endpoints
const PROVIDER_MAP: &[(&str, &str, &str, &str)] = &[
    // (env_var, provider_name, endpoint, default_model)
    (
        "GROQ_API_KEY",
        "groq",
        "https://api.groq.com/openai/v1/chat/completions",
        "llama-3.3-70b-versatile",
    ),
    (
        "OPENAI_API_KEY",
        "openai",
        "https://api.openai.com/v1/chat/completions",
        "gpt-4o-mini",
    ),
    (
        "TOGETHER_API_KEY",
        "together",
        "https://api.together.xyz/v1/chat/completions",
        "meta-llama/Llama-3.3-70B-Instruct-Turbo",
    ),
];

static FENCED_JS_RE: Lazy<Regex> = Lazy::new(|| {
    // First ```javascript (or ```js) fenced block, dot matches newline
    Regex::new(r"(?s)```(?:javascript|js)\s*(.*?)```").unwrap()
});

/// Pull the fenced JavaScript body out of a raw model response.
pub fn extract_fenced_block(raw: &str) -> DeobResult<String> {
    match FENCED_JS_RE.captures(raw) {
        Some(caps) => Ok(caps[1].trim().to_string()),
        None => Err(DeobError::FencedBlockNotFound),
    }
}

// ─── Response Shapes ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

// ─── The API Corrector ─────────────────────────────────────────────

/// Corrector backed by an OpenAI-compatible chat-completions API.
pub struct ApiCorrector {
    provider: String,
    key: String,
    endpoint: String,
    model: String,
    max_tokens: usize,
    client: reqwest::blocking::Client,
}

impl ApiCorrector {
    /// Build a corrector from the environment, honoring config overrides.
    ///
    /// Fails when no provider key is configured; correction is the one
    /// operation that cannot run offline.
    pub fn from_env(config: &CorrectorConfig) -> DeobResult<Self> {
        let (provider, key, endpoint, model) = Self::discover_key().ok_or_else(|| {
            DeobError::CorrectionApi(
                "no API key configured — set GROQ_API_KEY, OPENAI_API_KEY, or \
                 DEOBKIT_AI_KEY + DEOBKIT_AI_ENDPOINT"
                    .to_string(),
            )
        })?;

        let endpoint = config.endpoint.clone().unwrap_or(endpoint);
        let model = config.model.clone().unwrap_or(model);

        tracing::info!("Corrector initialized against {} ({})", provider, model);

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DeobError::CorrectionApi(e.to_string()))?;

        Ok(Self {
            provider,
            key,
            endpoint,
            model,
            max_tokens: config.max_tokens,
            client,
        })
    }

    /// First configured provider from the environment, custom endpoint first.
    fn discover_key() -> Option<(String, String, String, String)> {
        if let (Ok(key), Ok(endpoint)) = (
            std::env::var("DEOBKIT_AI_KEY"),
            std::env::var("DEOBKIT_AI_ENDPOINT"),
        ) {
            if !key.is_empty() {
                let model =
                    std::env::var("DEOBKIT_AI_MODEL").unwrap_or_else(|_| "default".to_string());
                return Some(("custom".to_string(), key, endpoint, model));
            }
        }

        for &(env_var, provider, endpoint, model) in PROVIDER_MAP {
            if let Ok(key) = std::env::var(env_var) {
                if !key.is_empty() {
                    tracing::debug!("Discovered {} API key from {}", provider, env_var);
                    return Some((
                        provider.to_string(),
                        key,
                        endpoint.to_string(),
                        model.to_string(),
                    ));
                }
            }
        }

        None
    }

    /// POST a chat completion and return the raw response text.
    fn call_api(&self, prompt: &str) -> DeobResult<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| {
                DeobError::CorrectionApi(format!("request failed ({}): {}", self.provider, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().unwrap_or_default();
            return Err(DeobError::CorrectionApi(format!(
                "API error {} from {}: {}",
                status,
                self.provider,
                &error_body[..error_body.len().min(200)]
            )));
        }

        let resp: ChatCompletionResponse = response.json().map_err(|e| {
            DeobError::CorrectionApi(format!(
                "failed to parse response from {}: {}",
                self.provider, e
            ))
        })?;

        resp.choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                DeobError::CorrectionApi(format!("empty response from {}", self.provider))
            })
    }
}

impl TextCorrector for ApiCorrector {
    fn correct(&self, text: &str) -> DeobResult<String> {
        let raw = self.call_api(&format!("{} {}", FIXUP_PROMPT, text))?;
        extract_fenced_block(&raw)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
