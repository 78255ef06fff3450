//! eibun-core — data model, prompt building, and response normalization.
//!
//! This crate defines the fundamental types and the correction pipeline that
//! the eibun system builds on: a request/result contract, a prompt builder
//! for the upstream generative model, and the normalization chain that turns
//! unreliable model output into a strict three-field result.

pub mod error;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod service;
pub mod traits;

pub use error::{CheckError, UpstreamError};
pub use model::{CorrectionRequest, CorrectionResult};
