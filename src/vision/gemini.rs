//! Gemini `generateContent` client
//!
//! Sends the photo inline with a fixed prompt and asks for JSON matching
//! `FoodEstimate`. One attempt per call; the caller decides whether to retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use crate::config::VisionConfig;
use super::{clean_image_payload, FoodAnalyzer, FoodEstimate, VisionError};

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROMPT: &str = "Analyze this image of food. Identify the main dish or components. \
Estimate the total calories, protein, carbs, fat, fiber, sugar, sodium, and cholesterol \
for the entire visible portion. Provide a short description and a confidence score (0-100).";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn response_schema() -> Value {
    let int = |description: &str| json!({ "type": "INTEGER", "description": description });
    json!({
        "type": "OBJECT",
        "properties": {
            "foodName": { "type": "STRING", "description": "Short, concise name of the food" },
            "calories": int("Total estimated calories"),
            "protein": int("Protein in grams"),
            "carbs": int("Carbohydrates in grams"),
            "fat": int("Fat in grams"),
            "fiber": int("Fiber in grams"),
            "sugar": int("Sugar in grams"),
            "sodium": int("Sodium in milligrams"),
            "cholesterol": int("Cholesterol in milligrams"),
            "description": {
                "type": "STRING",
                "description": "A brief 1-sentence description of the food and portion"
            },
            "confidence": int("Confidence score 0-100")
        },
        "required": ["foodName", "calories", "protein", "carbs", "fat", "description", "confidence"]
    })
}

pub struct GeminiAnalyzer {
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl GeminiAnalyzer {
    pub fn new(config: &VisionConfig) -> Result<Self, VisionError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
        })
    }

    fn build_url(&self, api_key: &str) -> String {
        format!("{API_BASE_URL}/models/{}:generateContent?key={}", self.model, api_key)
    }

    fn build_request(image: &str) -> GenerateRequest<'_> {
        GenerateRequest {
            contents: Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg",
                            data: image,
                        },
                    },
                    Part::Text { text: PROMPT },
                ],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        }
    }

    /// Pull the estimate out of a successful response body
    fn parse_estimate(response_text: &str) -> Result<FoodEstimate, VisionError> {
        let response: GenerateResponse = serde_json::from_str(response_text)?;
        if let Some(err) = response.error {
            return Err(VisionError::Api { status: 200, message: err.message });
        }

        let text = response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.text.as_deref()))
            .filter(|t| !t.trim().is_empty())
            .ok_or(VisionError::EmptyResponse)?;

        let estimate: FoodEstimate = serde_json::from_str(text)?;
        Ok(estimate.normalized())
    }

    fn map_api_error(status: u16, response_text: &str) -> VisionError {
        let message = serde_json::from_str::<GenerateResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);
        VisionError::Api { status, message }
    }
}

#[async_trait]
impl FoodAnalyzer for GeminiAnalyzer {
    #[instrument(skip(self, image_base64), fields(model = %self.model))]
    async fn analyze(&self, image_base64: &str) -> Result<FoodEstimate, VisionError> {
        let api_key = self.api_key.as_deref().ok_or(VisionError::MissingApiKey)?;
        let image = clean_image_payload(image_base64)?;

        debug!(bytes = image.len(), "Sending photo to Gemini");

        let response = self
            .client
            .post(self.build_url(api_key))
            .json(&Self::build_request(image))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let estimate = Self::parse_estimate(&response_text)?;
        debug!(food = %estimate.food_name, confidence = estimate.confidence, "Received estimate");
        Ok(estimate)
    }
}

impl std::fmt::Debug for GeminiAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAnalyzer")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
