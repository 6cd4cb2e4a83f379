//! Normalization and decoding of tool output.
//!
//! Tools may print log lines or warnings before their JSON payload. The payload
//! is taken to start at the earliest `{` or `[`; everything before it is
//! discarded. A stray bracket in the noise itself will be picked as the start,
//! which then surfaces as a decode error.

use super::language::Language;
use crate::error::{FilterError, Result};
use serde::de::DeserializeOwned;

/// Maximum number of characters of raw output quoted in diagnostics.
pub const MAX_DIAGNOSTIC_CHARS: usize = 100;

/// Suffix appended to quoted output that was cut short.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

const NO_JSON_START: &str = "Could not find start curly brace or start brace";

/// Byte offset of the first JSON object or array delimiter, if any.
pub fn locate_json_start(raw: &str) -> Option<usize> {
    match (raw.find('{'), raw.find('[')) {
        (Some(curly), Some(square)) => Some(curly.min(square)),
        (curly, square) => curly.or(square),
    }
}

/// Drop any preamble before the JSON payload.
pub fn strip_preamble(raw: &str, language: Language) -> Result<&str> {
    match locate_json_start(raw) {
        Some(0) => Ok(raw),
        Some(start) => {
            log::debug!("Skipping {start} bytes of {language} tool output before JSON payload");
            Ok(&raw[start..])
        }
        None => Err(FilterError::MalformedToolOutput {
            language,
            reason: NO_JSON_START.to_string(),
            output: truncate_for_diagnostics(raw),
        }),
    }
}

/// Decode a tool response into `T`.
pub fn decode<T: DeserializeOwned>(raw: &str, language: Language) -> Result<T> {
    let payload = strip_preamble(raw, language)?;
    serde_json::from_str(payload).map_err(|e| FilterError::JsonDecode {
        language,
        text: payload.to_string(),
        message: e.to_string(),
    })
}

/// First [`MAX_DIAGNOSTIC_CHARS`] characters of `raw`, marked when cut.
pub fn truncate_for_diagnostics(raw: &str) -> String {
    match raw.char_indices().nth(MAX_DIAGNOSTIC_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &raw[..cut]),
        None => raw.to_string(),
    }
}
