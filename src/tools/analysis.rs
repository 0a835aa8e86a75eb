//! Photo analysis tool

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::flow::{transition, ViewEvent, ViewState};
use crate::vision::{encode_image_file, FoodAnalyzer, FoodEstimate};

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub estimate: FoodEstimate,
    /// Where the capture flow goes next
    pub view: ViewState,
}

/// Estimate nutrition for a photo given inline or as a file path
pub async fn analyze_food_photo(
    analyzer: &dyn FoodAnalyzer,
    image_base64: Option<&str>,
    image_path: Option<&str>,
) -> Result<AnalysisResponse, String> {
    let image = match (image_base64, image_path) {
        (Some(data), None) => data.to_string(),
        (None, Some(path)) => encode_image_file(Path::new(path)).map_err(|e| e.to_string())?,
        _ => return Err("Provide exactly one of image_base64 or image_path".to_string()),
    };

    match analyzer.analyze(&image).await {
        Ok(estimate) => Ok(AnalysisResponse {
            estimate,
            view: transition(ViewState::Camera, ViewEvent::AnalysisFinished)
                .unwrap_or(ViewState::Review),
        }),
        Err(e) => {
            warn!(error = %e, "Food photo analysis failed");
            Err(format!("Photo analysis failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::vision::VisionError;

    struct Stub(Option<FoodEstimate>);

    #[async_trait]
    impl FoodAnalyzer for Stub {
        async fn analyze(&self, _image_base64: &str) -> Result<FoodEstimate, VisionError> {
            self.0.clone().ok_or(VisionError::EmptyResponse)
        }
    }

    fn pancakes() -> FoodEstimate {
        FoodEstimate {
            food_name: "Pancakes".to_string(),
            calories: 520,
            protein: 12,
            carbs: 80,
            fat: 16,
            fiber: 2,
            sugar: 24,
            sodium: 800,
            cholesterol: 110,
            description: "A stack of three pancakes with syrup".to_string(),
            confidence: 82,
        }
    }

    #[tokio::test]
    async fn test_success_moves_to_review() {
        let res = analyze_food_photo(&Stub(Some(pancakes())), Some("QUJD"), None).await.unwrap();
        assert_eq!(res.estimate.food_name, "Pancakes");
        assert_eq!(res.view, ViewState::Review);
    }

    #[tokio::test]
    async fn test_failure_is_an_error() {
        let err = analyze_food_photo(&Stub(None), Some("QUJD"), None).await.unwrap_err();
        assert!(err.contains("no content"));
    }

    #[tokio::test]
    async fn test_needs_exactly_one_source() {
        let stub = Stub(Some(pancakes()));
        assert!(analyze_food_photo(&stub, None, None).await.is_err());
        assert!(analyze_food_photo(&stub, Some("QUJD"), Some("/tmp/x.jpg")).await.is_err());
        assert!(analyze_food_photo(&stub, None, Some("/nonexistent/photo.jpg")).await.is_err());
    }
}
