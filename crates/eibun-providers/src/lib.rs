//! eibun-providers — upstream text-generation integrations.
//!
//! Implements the `TextGenerator` trait for the Gemini `generateContent`
//! API, plus a mock backend for testing the server without real API calls.

pub mod config;
pub mod gemini;
pub mod mock;

pub use config::GeminiConfig;
pub use gemini::GeminiClient;
pub use mock::MockModel;
