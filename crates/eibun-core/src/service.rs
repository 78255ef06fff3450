//! The correction pipeline: validate → prompt → generate → normalize.

use serde::{Deserialize, Serialize};

use crate::error::CheckError;
use crate::model::{CorrectionRequest, CorrectionResult};
use crate::normalize::normalize;
use crate::prompt::build_prompt;
use crate::traits::{GenerateRequest, TextGenerator};

/// Generation policy applied to every upstream call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationPolicy {
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens the model may generate.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    1536
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Run one correction request end to end against the given backend.
pub async fn check(
    model: &dyn TextGenerator,
    request: &CorrectionRequest,
    policy: &GenerationPolicy,
) -> Result<CorrectionResult, CheckError> {
    request.validate()?;

    let prompt = build_prompt(&request.text, request.context.as_deref());
    let raw = model
        .generate(&GenerateRequest {
            prompt,
            temperature: policy.temperature,
            max_output_tokens: policy.max_output_tokens,
            json_output: true,
        })
        .await?;

    normalize(&raw, &request.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::UpstreamError;

    /// Minimal in-crate stub; the full-featured mock lives in
    /// `eibun-providers`.
    struct FixedModel(String);

    #[async_trait]
    impl TextGenerator for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _request: &GenerateRequest) -> Result<String, UpstreamError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn pipeline_returns_normalized_result() {
        let model = FixedModel(
            r#"{"corrected":"I went to school yesterday.","score":70,"advice":"過去形を使いましょう。"}"#
                .into(),
        );
        let request = CorrectionRequest::new("I go to school yesterday.");
        let result = check(&model, &request, &GenerationPolicy::default())
            .await
            .unwrap();
        assert_eq!(result.corrected, "I went to school yesterday.");
        assert_eq!(result.score, 70);
    }

    #[tokio::test]
    async fn pipeline_rejects_empty_text_before_generation() {
        let model = FixedModel("should never be called".into());
        let request = CorrectionRequest::new("  ");
        let err = check(&model, &request, &GenerationPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn pipeline_surfaces_empty_upstream_text() {
        let model = FixedModel(String::new());
        let request = CorrectionRequest::new("Hello.");
        let err = check(&model, &request, &GenerationPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::NormalizationFailed { .. }));
    }
}
