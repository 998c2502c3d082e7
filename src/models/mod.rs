use serde::{Deserialize, Serialize};

/// JSON body posted to `/analyze` by the front-end.
///
/// `type` stays untyped so that a non-string discriminator is reported as an unknown
/// input type rather than a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeBody {
    #[serde(rename = "type")]
    pub input_type: Option<serde_json::Value>,
    pub data: Option<String>,
    pub allergies: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Image,
    Text,
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InputType::Image => "image",
            InputType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl InputType {
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "image" => Some(InputType::Image),
            "text" => Some(InputType::Text),
            _ => None,
        }
    }
}

/// Binary image decoded from a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// The payload interpretation is fixed by the input type: a dish name or an image, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Image(DecodedImage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    payload: Payload,
    allergies: String,
}

impl AnalysisRequest {
    pub fn new(payload: Payload, allergies: String) -> Self {
        Self { payload, allergies }
    }

    pub fn input_type(&self) -> InputType {
        match self.payload {
            Payload::Text(_) => InputType::Text,
            Payload::Image(_) => InputType::Image,
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Allergy description as the user typed it. Empty means no exclusions.
    pub fn allergies(&self) -> &str {
        &self.allergies
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub instruction_text: String,
    pub attached_image: Option<DecodedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelResponse {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientType {
    Body,      // 体を作る
    Energy,    // エネルギーになる
    Condition, // 調子を整える
}

impl NutrientType {
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "body" => Some(NutrientType::Body),
            "energy" => Some(NutrientType::Energy),
            "condition" => Some(NutrientType::Condition),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub nutrient_type: NutrientType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// Accepts the English tier names and the Japanese labels older prompts asked for.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "初級" => Some(Difficulty::Beginner),
            "intermediate" | "中級" => Some(Difficulty::Intermediate),
            "advanced" | "上級" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeEntry {
    pub title: String,
    pub desc: String,
    pub difficulty: Difficulty,
}

/// Caller-visible analysis of one food item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub name: String,
    pub nutrients: Vec<NutrientEntry>,
    pub advice: String,
    pub recipes: Vec<RecipeEntry>,
}
