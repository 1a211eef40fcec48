use serde_json::Value;

use crate::error::{WineError, WineResult};

/// Clean OCR output for substring matching.
///
/// Punctuation and symbols become spaces, whitespace runs collapse to a single
/// space and the ends are trimmed. Case is preserved so vintages can still be
/// compared literally.
pub fn normalize(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an untyped OCR payload. Anything but a JSON string is rejected.
pub fn normalize_value(value: &Value) -> WineResult<String> {
    match value {
        Value::String(text) => Ok(normalize(text)),
        Value::Null => Err(WineError::InvalidInputKind("detected text is null".into())),
        Value::Object(_) => Err(WineError::InvalidInputKind(
            "detected text is an object, expected a string".into(),
        )),
        Value::Array(_) => Err(WineError::InvalidInputKind(
            "detected text is an array, expected a string".into(),
        )),
        Value::Bool(_) | Value::Number(_) => Err(WineError::InvalidInputKind(format!(
            "detected text is a scalar ({value}), expected a string"
        ))),
    }
}
