use serde_json::Value;

use crate::error::ErrorKind;
use crate::models::RawModelResponse;

const FENCE_MARKERS: [&str; 2] = ["```json", "```"];

/// Recover the JSON payload from free-form model output.
///
/// Fences are stripped and the text is cut to the outermost `{ ... }` span before a
/// strict parse. Nothing beyond that trimming is repaired.
pub fn extract_json(response: &RawModelResponse) -> Result<Value, ErrorKind> {
    let stripped = strip_fences(&response.text);
    let candidate = json_candidate(&stripped);

    serde_json::from_str(candidate).map_err(|e| {
        ErrorKind::UnparseableResponse(format!(
            "{} (near: {:?})",
            e,
            &candidate.chars().take(80).collect::<String>()
        ))
    })
}

fn strip_fences(text: &str) -> String {
    FENCE_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, ""))
        .trim()
        .to_string()
}

fn json_candidate(text: &str) -> &str {
    let trimmed = text.trim();
    let start = match trimmed.find('{') {
        Some(start) => start,
        None => return trimmed,
    };
    let end = trimmed
        .rfind('}')
        .filter(|&end| end > start)
        .map(|end| end + 1)
        .unwrap_or(trimmed.len());
    &trimmed[start..end]
}
