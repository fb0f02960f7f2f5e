use inference::{GenerateContentRequest, Part, TextGenerator};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::call::ask;
use crate::{Degraded, EmergencyType, StageText};

/// Reply substituted whenever the classifier gives nothing usable.
pub const SPAM_BLOCK: &str = "TITLE: SPAM\nTYPE: SPAM\nDESCRIPTION: SPAM";

/// Prompt for the second call. Only the description travels; the image is not resent.
pub fn classification_prompt(description: &str) -> String {
    let labels = EmergencyType::emergency_labels()
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You triage citizen reports for a community emergency board.\n\
         Image description: \"{description}\"\n\
         \n\
         Classify the description into exactly one of these emergency types: {labels}.\n\
         If the description does not match any of these emergency types, \
         answer SPAM in all three fields.\n\
         \n\
         Reply with exactly these three lines and nothing else:\n\
         TITLE: <short title, or SPAM>\n\
         TYPE: <one type from the list, or SPAM>\n\
         DESCRIPTION: <one sentence summary, or SPAM>"
    )
}

/// Second inference call: description in, three-line classification text out.
#[derive(Clone)]
pub struct ClassificationStage {
    generator: Arc<dyn TextGenerator>,
    deadline: Duration,
}

impl ClassificationStage {
    pub fn new(generator: Arc<dyn TextGenerator>, deadline: Duration) -> Self {
        Self {
            generator,
            deadline,
        }
    }

    pub fn request_for(description: &str) -> GenerateContentRequest {
        GenerateContentRequest::single(vec![Part::text(classification_prompt(description))])
    }

    /// Never fails: anything short of a non-blank reply becomes [`SPAM_BLOCK`].
    pub async fn classify(&self, description: &str) -> StageText {
        let start = Instant::now();
        let request = Self::request_for(description);
        let outcome = match ask(self.generator.as_ref(), &request, self.deadline).await {
            Ok(text) if text.trim().is_empty() => Err(Degraded::BlankReply),
            other => other,
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(text) => {
                debug!(reply_len = text.len(), elapsed_ms, "classify_success");
                StageText::answered(text)
            }
            Err(reason) => {
                warn!(reason = %reason, elapsed_ms, "classify_degraded");
                StageText::substituted(SPAM_BLOCK, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CannedGenerator, SlowGenerator};
    use inference::InferenceError;
    use serde_json::json;

    #[test]
    fn prompt_lists_grammar_labels_and_sentinel() {
        let prompt = classification_prompt("Smoke above market stalls.");
        assert!(prompt.contains("\"Smoke above market stalls.\""));
        assert!(prompt.contains("TITLE:"));
        assert!(prompt.contains("TYPE:"));
        assert!(prompt.contains("DESCRIPTION:"));
        for label in EmergencyType::emergency_labels() {
            assert!(prompt.contains(label), "missing label {label}");
        }
        assert!(prompt.contains("SPAM in all three fields"));
    }

    #[test]
    fn request_is_text_only() {
        let request = ClassificationStage::request_for("a dog");
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 1);
        assert!(matches!(parts[0], Part::Text { .. }));
    }

    #[tokio::test]
    async fn classify_passes_reply_through() {
        let reply = "TITLE: Fire near market\nTYPE: Fire outbreak\nDESCRIPTION: Smoke seen";
        let generator = Arc::new(CannedGenerator::text(reply));
        let stage = ClassificationStage::new(generator.clone(), Duration::from_secs(1));
        let out = stage.classify("smoke").await;
        assert_eq!(out, StageText::answered(reply.into()));

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], ClassificationStage::request_for("smoke"));
    }

    #[tokio::test]
    async fn classify_empty_description_still_asks() {
        let generator = Arc::new(CannedGenerator::text(SPAM_BLOCK));
        let stage = ClassificationStage::new(generator.clone(), Duration::from_secs(1));
        let out = stage.classify("").await;
        assert_eq!(out.text, SPAM_BLOCK);
        assert!(!out.is_degraded());
        assert_eq!(generator.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn classify_malformed_response_is_spam_block() {
        let generator = CannedGenerator::ok(json!({ "candidates": [{ "content": {} }] }));
        let stage = ClassificationStage::new(Arc::new(generator), Duration::from_secs(1));
        let out = stage.classify("anything").await;
        assert_eq!(out, StageText::substituted(SPAM_BLOCK, Degraded::MissingText));
    }

    #[tokio::test]
    async fn classify_blank_reply_is_spam_block() {
        let generator = CannedGenerator::text("  \n ");
        let stage = ClassificationStage::new(Arc::new(generator), Duration::from_secs(1));
        let out = stage.classify("anything").await;
        assert_eq!(out, StageText::substituted(SPAM_BLOCK, Degraded::BlankReply));
    }

    #[tokio::test]
    async fn classify_provider_error_is_spam_block() {
        let generator = CannedGenerator::err(InferenceError::Timeout);
        let stage = ClassificationStage::new(Arc::new(generator), Duration::from_secs(1));
        let out = stage.classify("anything").await;
        assert_eq!(out.text, SPAM_BLOCK);
        assert_eq!(
            out.degraded,
            Some(Degraded::Inference(InferenceError::Timeout))
        );
    }

    #[tokio::test]
    async fn classify_deadline_is_spam_block() {
        let stage = ClassificationStage::new(
            Arc::new(SlowGenerator(Duration::from_millis(300))),
            Duration::from_millis(20),
        );
        let out = stage.classify("anything").await;
        assert_eq!(out, StageText::substituted(SPAM_BLOCK, Degraded::Timeout));
    }
}
