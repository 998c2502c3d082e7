use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Classified failure of the analysis pipeline.
///
/// The `Display` text carries internal detail for server logs. Callers only ever
/// see [`ErrorKind::public_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Request body is not a valid JSON object: {0}")]
    MalformedBody(String),

    #[error("Unknown input type: {0:?}")]
    UnknownInputType(Option<String>),

    #[error("Text input is empty")]
    EmptyInput,

    #[error("Invalid image encoding: {0}")]
    InvalidImageEncoding(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Unparseable model response: {0}")]
    UnparseableResponse(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::MalformedBody(_)
            | ErrorKind::UnknownInputType(_)
            | ErrorKind::EmptyInput
            | ErrorKind::InvalidImageEncoding(_) => StatusCode::BAD_REQUEST,
            ErrorKind::ModelUnavailable(_)
            | ErrorKind::UnparseableResponse(_)
            | ErrorKind::SchemaViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            ErrorKind::MalformedBody(_) => "リクエストの形式が正しくありません",
            ErrorKind::UnknownInputType(_) => "不明な入力タイプです",
            ErrorKind::EmptyInput => "料理・食材名を入力してください",
            ErrorKind::InvalidImageEncoding(_) => "画像データを読み込めませんでした",
            ErrorKind::ModelUnavailable(_) => "AIからの応答がありませんでした",
            ErrorKind::UnparseableResponse(_) | ErrorKind::SchemaViolation(_) => {
                "解析に失敗しました"
            }
        }
    }
}

impl IntoResponse for ErrorKind {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_message() });
        (self.status_code(), Json(body)).into_response()
    }
}
