//! The upstream text-generation trait.
//!
//! Implemented by the `eibun-providers` crate for the real Gemini API and a
//! mock, so the pipeline and server can be tested without network access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

/// Trait for backends that turn a prompt into raw text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate raw text from a prompt. The returned string is untrusted
    /// and goes through [`normalize`](crate::normalize::normalize) before
    /// anything is shown to a client.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, UpstreamError>;
}

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The full prompt, built by [`prompt::build_prompt`](crate::prompt::build_prompt).
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_output_tokens: u32,
    /// Ask the upstream for strict JSON-formatted output when it supports
    /// that. The normalizer does not rely on it being honored.
    #[serde(default)]
    pub json_output: bool,
}
