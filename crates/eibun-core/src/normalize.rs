//! Response normalization — the heart of the system.
//!
//! The upstream model is asked for strict JSON but is not trusted to emit
//! it: truncation at the token limit, surrounding prose, and code fences
//! are all expected. This module coerces whatever came back into a valid
//! [`CorrectionResult`], applying an ordered chain of recovery strategies
//! and short-circuiting at the first success:
//!
//! 1. direct parse,
//! 2. code-fence stripping,
//! 3. first-`{`..last-`}` substring extraction,
//! 4. brace completion,
//! 5. field-level defaulting (never fails).
//!
//! Only completely empty upstream text escalates to
//! [`CheckError::NormalizationFailed`], since there is nothing to recover.

use serde_json::Value;

use crate::error::{truncate_detail, CheckError};
use crate::model::CorrectionResult;

/// Score used when the model did not supply a usable number.
pub const DEFAULT_SCORE: u8 = 50;

/// Advice used when the model did not supply usable feedback.
pub const DEFAULT_ADVICE: &str = "AIの解説を生成できませんでした。";

/// Normalize raw upstream text into a [`CorrectionResult`].
///
/// `submitted` is the learner's original sentence, used as the `corrected`
/// fallback when the model output is unusable.
pub fn normalize(raw: &str, submitted: &str) -> Result<CorrectionResult, CheckError> {
    if raw.trim().is_empty() {
        return Err(CheckError::NormalizationFailed {
            raw: raw.to_string(),
        });
    }

    if let Some(result) = parse_strict(raw) {
        return Ok(result);
    }

    let cleaned = strip_fences(raw);
    if let Some(result) = parse_strict(&cleaned) {
        return Ok(result);
    }

    if let Some(inner) = extract_object(&cleaned) {
        if let Some(result) = parse_strict(inner) {
            return Ok(result);
        }
    }

    let repaired = complete_braces(&cleaned);
    if let Some(result) = parse_strict(&repaired) {
        return Ok(result);
    }

    tracing::warn!(
        raw = %truncate_detail(raw),
        "upstream output unparseable, defaulting missing fields"
    );
    Ok(recover_fields(&repaired, submitted))
}

/// Parse `s` as JSON and validate the three-field contract.
///
/// Requires `corrected` and `advice` to be non-empty strings and `score` to
/// be a number; the score is rounded and clamped to `0..=100`.
fn parse_strict(s: &str) -> Option<CorrectionResult> {
    let value: Value = serde_json::from_str(s.trim()).ok()?;
    result_from_value(&value)
}

fn result_from_value(value: &Value) -> Option<CorrectionResult> {
    let corrected = value.get("corrected")?.as_str()?;
    let advice = value.get("advice")?.as_str()?;
    if corrected.trim().is_empty() || advice.trim().is_empty() {
        return None;
    }
    let score = coerce_score(value.get("score")?)?;
    Some(CorrectionResult {
        corrected: corrected.to_string(),
        score,
        advice: advice.to_string(),
    })
}

/// Coerce a JSON number to an integer score clamped to `0..=100`.
fn coerce_score(value: &Value) -> Option<u8> {
    let n = value.as_f64()?;
    if !n.is_finite() {
        return None;
    }
    Some(n.round().clamp(0.0, 100.0) as u8)
}

/// Remove code-fence marker lines and a leading language-tag line.
///
/// Handles the common ```` ```json ... ``` ```` wrapper as well as a bare
/// `json` line some models emit above the object.
pub(crate) fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut lines: Vec<&str> = trimmed
        .lines()
        .filter(|line| !line.trim().starts_with("```"))
        .collect();

    if lines
        .first()
        .is_some_and(|line| line.trim().eq_ignore_ascii_case("json"))
    {
        lines.remove(0);
    }

    lines.join("\n").trim().to_string()
}

/// The substring from the first `{` to the last `}`, inclusive.
///
/// Recovers objects the model prefixed or suffixed with prose.
pub(crate) fn extract_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

/// Trim leading noise before the first `{` and append a missing closing
/// brace.
pub(crate) fn complete_braces(s: &str) -> String {
    let trimmed = s.trim();
    let mut fixed = match trimmed.find('{') {
        Some(start) => trimmed[start..].to_string(),
        None => format!("{{{trimmed}"),
    };
    if !fixed.ends_with('}') {
        fixed.push('}');
    }
    fixed
}

/// Last-resort field-by-field construction. Never fails: each field the
/// parsed value cannot supply falls back to a documented default.
pub(crate) fn recover_fields(s: &str, submitted: &str) -> CorrectionResult {
    let value: Value = serde_json::from_str(s).unwrap_or(Value::Null);

    let corrected = value
        .get("corrected")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(submitted)
        .to_string();

    let score = value
        .get("score")
        .and_then(coerce_score)
        .unwrap_or(DEFAULT_SCORE);

    let advice = value
        .get("advice")
        .and_then(Value::as_str)
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(DEFAULT_ADVICE)
        .to_string();

    CorrectionResult {
        corrected,
        score,
        advice,
    }
}
