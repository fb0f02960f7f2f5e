//! Canned generators for stage tests.

use async_trait::async_trait;
use inference::{GenerateContentRequest, InferenceError, TextGenerator};
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

/// Returns the same result to every call and remembers what it was asked.
pub(crate) struct CannedGenerator {
    result: Result<Value, InferenceError>,
    pub(crate) seen: Mutex<Vec<GenerateContentRequest>>,
}

impl CannedGenerator {
    pub(crate) fn ok(value: Value) -> Self {
        Self {
            result: Ok(value),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn err(err: InferenceError) -> Self {
        Self {
            result: Err(err),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn text(text: &str) -> Self {
        Self::ok(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<Value, InferenceError> {
        self.seen.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

/// Sleeps past any reasonable test deadline before answering.
pub(crate) struct SlowGenerator(pub(crate) Duration);

#[async_trait]
impl TextGenerator for SlowGenerator {
    async fn generate(&self, _request: &GenerateContentRequest) -> Result<Value, InferenceError> {
        tokio::time::sleep(self.0).await;
        Ok(json!({}))
    }
}
