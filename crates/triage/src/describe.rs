use inference::{GenerateContentRequest, Part, TextGenerator};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::call::ask;
use crate::{EncodedImage, StageText};

pub const DESCRIBE_PROMPT: &str = "Describe what is visible in this image in 1-2 sentences.";

/// First inference call: image in, short natural-language description out.
#[derive(Clone)]
pub struct DescriptionStage {
    generator: Arc<dyn TextGenerator>,
    deadline: Duration,
}

impl DescriptionStage {
    pub fn new(generator: Arc<dyn TextGenerator>, deadline: Duration) -> Self {
        Self {
            generator,
            deadline,
        }
    }

    pub fn request_for(image: &EncodedImage) -> GenerateContentRequest {
        GenerateContentRequest::single(vec![
            Part::text(DESCRIBE_PROMPT),
            Part::inline(image.media_type, image.payload.clone()),
        ])
    }

    /// Never fails: timeouts, provider errors and malformed responses all
    /// become an empty description and the pipeline carries on.
    pub async fn describe(&self, image: &EncodedImage) -> StageText {
        let start = Instant::now();
        let request = Self::request_for(image);
        match ask(self.generator.as_ref(), &request, self.deadline).await {
            Ok(text) => {
                let text = text.trim().to_string();
                debug!(
                    description_len = text.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "describe_success"
                );
                StageText::answered(text)
            }
            Err(reason) => {
                warn!(
                    reason = %reason,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "describe_degraded"
                );
                StageText::substituted(String::new(), reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CannedGenerator, SlowGenerator};
    use crate::Degraded;
    use inference::InferenceError;
    use serde_json::json;

    fn image() -> EncodedImage {
        EncodedImage {
            media_type: "image/png",
            payload: "aGVsbG8=".into(),
        }
    }

    #[test]
    fn request_carries_prompt_then_image() {
        let request = DescriptionStage::request_for(&image());
        assert_eq!(request.contents.len(), 1);
        assert_eq!(
            request.contents[0].parts,
            vec![
                Part::text(DESCRIBE_PROMPT),
                Part::inline("image/png", "aGVsbG8=")
            ]
        );
    }

    #[tokio::test]
    async fn describe_extracts_first_text() {
        let generator = CannedGenerator::ok(json!({
            "candidates": [{ "content": { "parts": [{ "text": " A car on fire by a road. \n" }] } }]
        }));
        let stage = DescriptionStage::new(Arc::new(generator), Duration::from_secs(1));
        let out = stage.describe(&image()).await;
        assert_eq!(out, StageText::answered("A car on fire by a road.".into()));
    }

    #[tokio::test]
    async fn describe_missing_structure_is_empty() {
        let generator = CannedGenerator::ok(json!({ "candidates": [] }));
        let stage = DescriptionStage::new(Arc::new(generator), Duration::from_secs(1));
        let out = stage.describe(&image()).await;
        assert_eq!(out.text, "");
        assert_eq!(out.degraded, Some(Degraded::MissingText));
    }

    #[tokio::test]
    async fn describe_provider_error_is_empty() {
        let generator = CannedGenerator::err(InferenceError::Status {
            status: 500,
            body: "boom".into(),
        });
        let stage = DescriptionStage::new(Arc::new(generator), Duration::from_secs(1));
        let out = stage.describe(&image()).await;
        assert_eq!(out.text, "");
        assert!(matches!(out.degraded, Some(Degraded::Inference(_))));
    }

    #[tokio::test]
    async fn describe_deadline_is_empty() {
        let stage = DescriptionStage::new(
            Arc::new(SlowGenerator(Duration::from_millis(300))),
            Duration::from_millis(20),
        );
        let out = stage.describe(&image()).await;
        assert_eq!(out, StageText::substituted("", Degraded::Timeout));
    }
}
