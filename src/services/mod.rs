pub mod ai_service;
pub mod gemini; // Google Gemini generateContent
pub mod input_normalizer;
pub mod prompt_builder;
pub mod response_extractor;
pub mod result_validator;

pub use ai_service::{GenerativeModel, ModelError};
pub use gemini::GeminiService;
