//! Food photo analysis
//!
//! Estimating nutrition from a photo is delegated to a vision model behind the
//! `FoodAnalyzer` trait. `GeminiAnalyzer` is the production implementation.

pub mod gemini;

use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiAnalyzer;

/// Name reported by `FoodEstimate::unknown`
pub const UNKNOWN_FOOD: &str = "Unknown Food";

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("Image is not usable: {0}")]
    InvalidImage(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vision API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Vision API returned no content")]
    EmptyResponse,

    #[error("Could not parse the estimate: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Nutrition estimate for everything visible in one photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEstimate {
    pub food_name: String,
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
    #[serde(default)]
    pub fiber: i64,
    #[serde(default)]
    pub sugar: i64,
    #[serde(default)]
    pub sodium: i64,
    #[serde(default)]
    pub cholesterol: i64,
    #[serde(default)]
    pub description: String,
    /// 0..=100
    #[serde(default)]
    pub confidence: i64,
}

impl FoodEstimate {
    /// Zeroed placeholder for callers that show something instead of an error
    pub fn unknown(message: &str) -> Self {
        Self {
            food_name: UNKNOWN_FOOD.to_string(),
            calories: 0,
            protein: 0,
            carbs: 0,
            fat: 0,
            fiber: 0,
            sugar: 0,
            sodium: 0,
            cholesterol: 0,
            description: message.to_string(),
            confidence: 0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.food_name == UNKNOWN_FOOD && self.confidence == 0 && self.calories == 0
    }

    /// Clamp confidence into range and floor negative amounts at zero
    pub fn normalized(mut self) -> Self {
        self.confidence = self.confidence.clamp(0, 100);
        for v in [
            &mut self.calories,
            &mut self.protein,
            &mut self.carbs,
            &mut self.fat,
            &mut self.fiber,
            &mut self.sugar,
            &mut self.sodium,
            &mut self.cholesterol,
        ] {
            *v = (*v).max(0);
        }
        self
    }
}

#[async_trait]
pub trait FoodAnalyzer: Send + Sync {
    /// Estimate nutrition for a base64 image, with or without a data URL prefix
    async fn analyze(&self, image_base64: &str) -> Result<FoodEstimate, VisionError>;
}

const DATA_URL_PREFIXES: [&str; 4] = [
    "data:image/png;base64,",
    "data:image/jpeg;base64,",
    "data:image/jpg;base64,",
    "data:image/webp;base64,",
];

/// Remove a leading `data:image/...;base64,` prefix if present
pub fn strip_data_url(image: &str) -> &str {
    let image = image.trim();
    DATA_URL_PREFIXES
        .iter()
        .find_map(|prefix| image.strip_prefix(prefix))
        .unwrap_or(image)
}

/// Strip any data URL prefix and check the payload is real base64
pub fn clean_image_payload(image: &str) -> Result<&str, VisionError> {
    let payload = strip_data_url(image);
    if payload.is_empty() {
        return Err(VisionError::InvalidImage("image data is empty".to_string()));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| VisionError::InvalidImage(format!("not valid base64: {}", e)))?;
    Ok(payload)
}

/// Read an image file and base64-encode it
pub fn encode_image_file(path: &Path) -> Result<String, VisionError> {
    let bytes = std::fs::read(path)
        .map_err(|e| VisionError::InvalidImage(format!("{}: {}", path.display(), e)))?;
    if bytes.is_empty() {
        return Err(VisionError::InvalidImage(format!("{} is empty", path.display())));
    }
    Ok(STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedAnalyzer(FoodEstimate);

    #[async_trait]
    impl FoodAnalyzer for FixedAnalyzer {
        async fn analyze(&self, image_base64: &str) -> Result<FoodEstimate, VisionError> {
            clean_image_payload(image_base64)?;
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("data:image/webp;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("QUJD"), "QUJD");
        // Only the known image types are stripped
        assert_eq!(strip_data_url("data:text/plain;base64,QUJD"), "data:text/plain;base64,QUJD");
    }

    #[test]
    fn test_clean_payload_rejects_garbage() {
        assert!(clean_image_payload("data:image/png;base64,QUJD").is_ok());
        assert!(matches!(clean_image_payload(""), Err(VisionError::InvalidImage(_))));
        assert!(matches!(clean_image_payload("not base64!"), Err(VisionError::InvalidImage(_))));
    }

    #[test]
    fn test_estimate_json_shape() {
        let estimate: FoodEstimate = serde_json::from_str(
            r#"{"foodName":"Salad","calories":320,"protein":12,"carbs":20,"fat":18,
                "description":"A bowl of salad","confidence":88}"#,
        )
        .unwrap();
        assert_eq!(estimate.food_name, "Salad");
        assert_eq!(estimate.fiber, 0);
        assert_eq!(estimate.confidence, 88);

        let json = serde_json::to_value(&estimate).unwrap();
        assert_eq!(json["foodName"], "Salad");
    }

    #[test]
    fn test_unknown_and_normalized() {
        let unknown = FoodEstimate::unknown("Could not identify food. Please try again.");
        assert!(unknown.is_unknown());

        let mut estimate = FoodEstimate::unknown("");
        estimate.food_name = "Toast".to_string();
        estimate.confidence = 140;
        estimate.sugar = -2;
        let estimate = estimate.normalized();
        assert_eq!(estimate.confidence, 100);
        assert_eq!(estimate.sugar, 0);
        assert!(!estimate.is_unknown());
    }

    #[test]
    fn test_encode_image_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ABC").unwrap();
        assert_eq!(encode_image_file(file.path()).unwrap(), "QUJD");

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(encode_image_file(empty.path()).is_err());
    }

    #[tokio::test]
    async fn test_analyzer_trait_object() {
        let analyzer: Box<dyn FoodAnalyzer> = Box::new(FixedAnalyzer(FoodEstimate::unknown("x")));
        let result = analyzer.analyze("data:image/jpeg;base64,QUJD").await.unwrap();
        assert!(result.is_unknown());
        assert!(analyzer.analyze("%%%").await.is_err());
    }
}
