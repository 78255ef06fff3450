//! Core data model types for eibun.
//!
//! These are the only shapes that cross the system boundary: what the
//! browser submits, and the three-field result it renders.

use serde::{Deserialize, Serialize};

use crate::error::CheckError;

/// An English sentence submitted for correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    /// The sentence to evaluate.
    #[serde(default)]
    pub text: String,
    /// Optional exercise context, embedded verbatim into the prompt to bias
    /// correction toward the intended meaning.
    #[serde(default)]
    pub context: Option<String>,
}

impl CorrectionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    /// Reject empty submissions before any network call is made.
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.text.trim().is_empty() {
            return Err(CheckError::InvalidRequest("no text provided".into()));
        }
        Ok(())
    }
}

/// The strict three-field contract returned to the client.
///
/// Every code path either produces a fully populated instance of this or
/// fails explicitly; `score` is always an integer in `0..=100` and the two
/// string fields are always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// The grammatically corrected sentence.
    pub corrected: String,
    /// Grammar/clarity score out of 100.
    pub score: u8,
    /// Improvement advice, written in Japanese for the learner.
    pub advice: String,
}
