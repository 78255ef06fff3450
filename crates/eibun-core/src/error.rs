//! Error taxonomy for the correction pipeline.
//!
//! Defined in `eibun-core` so the transport layer can classify errors for
//! retry decisions without string matching, and so the server can map them
//! onto HTTP statuses in one place.

use thiserror::Error;

/// Maximum length of raw upstream payloads embedded in error details and
/// log lines.
pub const MAX_DETAIL_LEN: usize = 512;

/// Errors from the upstream text-generation call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The API returned a definitive 4xx-class error. Not retried.
    #[error("upstream rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The API answered but the response carried no candidate text.
    #[error("upstream returned no candidate text: {0}")]
    NoCandidate(String),

    /// The API returned a 5xx-class error. Eligible for retry.
    #[error("upstream error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The request timed out. Eligible for retry.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred. Eligible for retry.
    #[error("network error: {0}")]
    Network(String),

    /// All retry attempts on transient errors were exhausted.
    #[error("upstream unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },
}

impl UpstreamError {
    /// Returns `true` if another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            UpstreamError::Http { .. } | UpstreamError::Timeout(_) | UpstreamError::Network(_)
        )
    }
}

/// Errors surfaced by the correction pipeline as a whole.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The inbound request had missing or empty text. Maps to HTTP 400.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream credential or endpoint is misconfigured. Fatal at
    /// startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The upstream call failed. Maps to HTTP 500.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The upstream answered with no text at all, leaving nothing to
    /// recover. Maps to HTTP 500.
    #[error("upstream returned no usable text")]
    NormalizationFailed { raw: String },
}

/// Truncate a diagnostic payload to [`MAX_DETAIL_LEN`] bytes on a char
/// boundary.
pub fn truncate_detail(raw: &str) -> String {
    if raw.len() <= MAX_DETAIL_LEN {
        return raw.to_string();
    }
    let mut end = MAX_DETAIL_LEN;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &raw[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(UpstreamError::Http {
            status: 503,
            message: "overloaded".into()
        }
        .is_transient());
        assert!(UpstreamError::Timeout(30).is_transient());
        assert!(UpstreamError::Network("connection reset".into()).is_transient());

        assert!(!UpstreamError::Rejected {
            status: 400,
            message: "bad request".into()
        }
        .is_transient());
        assert!(!UpstreamError::NoCandidate("empty candidates".into()).is_transient());
    }

    #[test]
    fn truncate_detail_short_payload_unchanged() {
        assert_eq!(truncate_detail("short"), "short");
    }

    #[test]
    fn truncate_detail_bounds_long_payload() {
        let long = "x".repeat(MAX_DETAIL_LEN * 4);
        let truncated = truncate_detail(&long);
        assert!(truncated.len() <= MAX_DETAIL_LEN + '…'.len_utf8());
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn truncate_detail_respects_char_boundaries() {
        // Multi-byte chars straddling the cutoff must not split.
        let long = "あ".repeat(MAX_DETAIL_LEN);
        let truncated = truncate_detail(&long);
        assert!(truncated.chars().all(|c| c == 'あ' || c == '…'));
    }
}
