use std::sync::Arc;

use crate::error::ErrorKind;
use crate::models::{AnalysisResult, AnalyzeBody};
use crate::services::{input_normalizer, prompt_builder, response_extractor, result_validator};
use crate::services::GenerativeModel;

/// Runs one analysis request: normalize, build prompt, call the model, extract, validate.
///
/// Holds no per-request state, so one instance is shared across all connections.
pub struct AnalysisHandler {
    model: Arc<dyn GenerativeModel>,
}

impl AnalysisHandler {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub async fn analyze(&self, body: AnalyzeBody) -> Result<AnalysisResult, ErrorKind> {
        let request = input_normalizer::normalize(body)?;
        log::info!(
            "📨 Analysis request - type: {} | allergies: {}",
            request.input_type(),
            if request.allergies().is_empty() { "none" } else { request.allergies() }
        );

        let prompt = prompt_builder::build_prompt(&request);
        log::debug!("📝 Prompt size: {} bytes", prompt.instruction_text.len());

        let raw = self.model.generate(&prompt).await.map_err(|e| {
            log::error!(
                "❌ {} ({}) call failed: {}",
                self.model.provider_name(),
                self.model.model_name(),
                e
            );
            ErrorKind::ModelUnavailable(e.to_string())
        })?;
        log::debug!("💬 Model response: {}", raw.text);

        let value = response_extractor::extract_json(&raw)?;
        let result = result_validator::validate(value)?;

        let mentions = result_validator::allergy_mentions(&result, request.allergies());
        if !mentions.is_empty() {
            log::warn!(
                "⚠️ Recipes for '{}' mention excluded items: {:?}",
                result.name,
                mentions
            );
        }

        log::info!(
            "✅ Analysis complete: {} ({} nutrients, {} recipes)",
            result.name,
            result.nutrients.len(),
            result.recipes.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Difficulty, PromptSpec, RawModelResponse};
    use crate::services::ModelError;
    use std::sync::Mutex;

    /// Model stub returning a fixed reply and recording every prompt it receives.
    pub(crate) struct StubModel {
        reply: Result<String, String>,
        pub(crate) calls: Mutex<Vec<PromptSpec>>,
    }

    impl StubModel {
        pub(crate) fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl GenerativeModel for StubModel {
        async fn generate(&self, prompt: &PromptSpec) -> Result<RawModelResponse, ModelError> {
            self.calls.lock().unwrap().push(prompt.clone());
            match &self.reply {
                Ok(text) => Ok(RawModelResponse { text: text.clone() }),
                Err(message) => Err(ModelError::RequestFailed(message.clone())),
            }
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }

        fn model_name(&self) -> &str {
            "stub-model"
        }
    }

    pub(crate) const AVOCADO_REPLY: &str = r#"分析結果は以下の通りです。
```json
{
    "name": "アボカド",
    "nutrients": [
        {"name": "タンパク質", "type": "body"},
        {"name": "脂質", "type": "energy"},
        {"name": "ビタミンE", "type": "condition"},
        {"name": "食物繊維", "type": "condition"}
    ],
    "advice": "良質な脂質とビタミンEが豊富で、抗酸化作用により若々しさを保つのに役立ちます。",
    "recipes": [
        {"title": "アボカドの海苔和え", "desc": "切って和えるだけ。3分で完成。", "difficulty": "beginner"},
        {"title": "アボカドとエビのグラタン", "desc": "トースターで焼くだけ。", "difficulty": "intermediate"},
        {"title": "自家製ワカモレとハンバーガー", "desc": "スパイスを調合して作る本格派。", "difficulty": "advanced"}
    ]
}
```"#;

    fn text_body(data: &str, allergies: Option<&str>) -> AnalyzeBody {
        AnalyzeBody {
            input_type: Some("text".into()),
            data: Some(data.to_string()),
            allergies: allergies.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_text_analysis_succeeds() {
        let model = Arc::new(StubModel::replying(AVOCADO_REPLY));
        let handler = AnalysisHandler::new(model.clone());

        let result = handler.analyze(text_body("アボカド", None)).await.unwrap();

        assert_eq!(result.name, "アボカド");
        assert_eq!(result.nutrients.len(), 4);
        assert_eq!(result.recipes[1].difficulty, Difficulty::Intermediate);
        assert_eq!(model.call_count(), 1);

        let calls = model.calls.lock().unwrap();
        assert!(calls[0].instruction_text.contains("「アボカド」"));
        assert!(calls[0].attached_image.is_none());
    }

    #[tokio::test]
    async fn test_allergies_reach_the_prompt() {
        let model = Arc::new(StubModel::replying(AVOCADO_REPLY));
        let handler = AnalysisHandler::new(model.clone());

        // The reply mentions エビ; the result is still returned.
        let result = handler.analyze(text_body("アボカド", Some("エビ"))).await;
        assert!(result.is_ok());

        let calls = model.calls.lock().unwrap();
        assert!(calls[0].instruction_text.contains(prompt_builder::ALLERGY_CLAUSE_HEADER));
        assert!(calls[0].instruction_text.contains("「エビ」"));
    }

    #[tokio::test]
    async fn test_unknown_type_never_calls_model() {
        let model = Arc::new(StubModel::replying(AVOCADO_REPLY));
        let handler = AnalysisHandler::new(model.clone());

        let body = AnalyzeBody {
            input_type: Some("video".into()),
            data: Some("x".to_string()),
            allergies: None,
        };
        let err = handler.analyze(body).await.unwrap_err();

        assert_eq!(err, ErrorKind::UnknownInputType(Some("video".to_string())));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_is_model_unavailable() {
        let model = Arc::new(StubModel::failing("connection reset"));
        let handler = AnalysisHandler::new(model.clone());

        let err = handler.analyze(text_body("納豆", None)).await.unwrap_err();
        assert!(matches!(err, ErrorKind::ModelUnavailable(_)));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_schema_violation_returns_no_partial_result() {
        let model = Arc::new(StubModel::replying(r#"{"name": "納豆", "nutrients": [{"name": "タンパク質", "type": "body"}], "advice": "..."}"#));
        let handler = AnalysisHandler::new(model);

        let err = handler.analyze(text_body("納豆", None)).await.unwrap_err();
        assert!(matches!(err, ErrorKind::SchemaViolation(_)));
    }
}
