use base64::{engine::general_purpose, Engine};
use serde_json::Value;

use crate::error::ErrorKind;
use crate::models::{AnalysisRequest, AnalyzeBody, DecodedImage, InputType, Payload};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Validate the posted body and turn it into an [`AnalysisRequest`].
pub fn normalize(body: AnalyzeBody) -> Result<AnalysisRequest, ErrorKind> {
    let input_type = body
        .input_type
        .as_ref()
        .and_then(Value::as_str)
        .and_then(InputType::from_string)
        .ok_or_else(|| ErrorKind::UnknownInputType(body.input_type.as_ref().map(describe)))?;

    let data = body.data.unwrap_or_default();

    let payload = match input_type {
        InputType::Image => Payload::Image(decode_data_url(&data)?),
        InputType::Text => {
            if data.trim().is_empty() {
                return Err(ErrorKind::EmptyInput);
            }
            Payload::Text(data)
        }
    };

    Ok(AnalysisRequest::new(payload, body.allergies.unwrap_or_default()))
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode a `"<metadata>,<base64>"` data URL.
pub fn decode_data_url(data: &str) -> Result<DecodedImage, ErrorKind> {
    let (metadata, encoded) = data.split_once(',').ok_or_else(|| {
        ErrorKind::InvalidImageEncoding("missing ',' between metadata and base64 data".to_string())
    })?;

    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ErrorKind::InvalidImageEncoding(e.to_string()))?;

    if bytes.is_empty() {
        return Err(ErrorKind::InvalidImageEncoding("image data is empty".to_string()));
    }

    Ok(DecodedImage {
        mime_type: mime_type_from_metadata(metadata),
        bytes,
    })
}

// "data:image/png;base64" -> "image/png"
fn mime_type_from_metadata(metadata: &str) -> String {
    let mime = metadata
        .trim()
        .strip_prefix("data:")
        .unwrap_or(metadata)
        .split(';')
        .next()
        .unwrap_or("")
        .trim();

    if mime.starts_with("image/") && mime.len() > "image/".len() {
        mime.to_string()
    } else {
        DEFAULT_IMAGE_MIME.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(input_type: Option<&str>, data: Option<&str>, allergies: Option<&str>) -> AnalyzeBody {
        AnalyzeBody {
            input_type: input_type.map(Value::from),
            data: data.map(String::from),
            allergies: allergies.map(String::from),
        }
    }

    #[test]
    fn test_text_input() {
        let request = normalize(body(Some("text"), Some("  アボカド "), None)).unwrap();

        assert_eq!(request.input_type(), InputType::Text);
        assert_eq!(request.payload(), &Payload::Text("  アボカド ".to_string()));
        assert_eq!(request.allergies(), "");
    }

    #[test]
    fn test_allergies_passed_through_unmodified() {
        let request = normalize(body(Some("text"), Some("カレー"), Some("えび、 かに"))).unwrap();
        assert_eq!(request.allergies(), "えび、 かに");
    }

    #[test]
    fn test_empty_text_rejected() {
        assert_eq!(
            normalize(body(Some("text"), Some("   \n"), None)),
            Err(ErrorKind::EmptyInput)
        );
        assert_eq!(normalize(body(Some("text"), None, None)), Err(ErrorKind::EmptyInput));
    }

    #[test]
    fn test_unknown_input_type() {
        assert_eq!(
            normalize(body(Some("audio"), Some("x"), None)),
            Err(ErrorKind::UnknownInputType(Some("audio".to_string())))
        );
        assert_eq!(
            normalize(body(None, Some("x"), None)),
            Err(ErrorKind::UnknownInputType(None))
        );
    }

    #[test]
    fn test_non_string_type_is_unknown_input_type() {
        for input_type in [json!(5), json!(["text"]), json!(true), json!(null)] {
            let body = AnalyzeBody {
                input_type: Some(input_type),
                data: Some("x".to_string()),
                allergies: None,
            };
            assert!(matches!(normalize(body), Err(ErrorKind::UnknownInputType(_))));
        }
    }

    #[test]
    fn test_image_data_url_decoded() {
        // "hello" in base64
        let request = normalize(body(Some("image"), Some("data:image/png;base64,aGVsbG8="), None))
            .unwrap();

        match request.payload() {
            Payload::Image(image) => {
                assert_eq!(image.mime_type, "image/png");
                assert_eq!(image.bytes, b"hello".to_vec());
            }
            other => panic!("expected image payload, got {:?}", other),
        }
    }

    #[test]
    fn test_image_without_delimiter_rejected() {
        let result = normalize(body(Some("image"), Some("garbage-no-comma"), None));
        assert!(matches!(result, Err(ErrorKind::InvalidImageEncoding(_))));
    }

    #[test]
    fn test_image_with_bad_base64_rejected() {
        let result = decode_data_url("data:image/jpeg;base64,@@not base64@@");
        assert!(matches!(result, Err(ErrorKind::InvalidImageEncoding(_))));
    }

    #[test]
    fn test_image_with_empty_data_rejected() {
        let result = decode_data_url("data:image/jpeg;base64,");
        assert!(matches!(result, Err(ErrorKind::InvalidImageEncoding(_))));
    }

    #[test]
    fn test_unknown_mime_falls_back_to_jpeg() {
        assert_eq!(mime_type_from_metadata("data:;base64"), "image/jpeg");
        assert_eq!(mime_type_from_metadata("data:text/plain;base64"), "image/jpeg");
        assert_eq!(mime_type_from_metadata("data:image/webp;base64"), "image/webp");
    }
}
