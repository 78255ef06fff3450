//! Mock backend for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use eibun_core::error::UpstreamError;
use eibun_core::traits::{GenerateRequest, TextGenerator};

/// A mock text generator for testing the server without real API calls.
///
/// Returns a fixed response and records the requests it receives.
pub struct MockModel {
    response: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockModel {
    /// Create a mock that always returns the same raw text.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            response: response.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of calls made to this backend.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request received, if any.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, UpstreamError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_calls_and_requests() {
        let mock = MockModel::with_fixed_response("{}");
        assert_eq!(mock.call_count(), 0);

        let request = GenerateRequest {
            prompt: "hello".into(),
            temperature: 0.7,
            max_output_tokens: 100,
            json_output: true,
        };
        let text = mock.generate(&request).await.unwrap();

        assert_eq!(text, "{}");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_request().unwrap().prompt, "hello");
    }
}
