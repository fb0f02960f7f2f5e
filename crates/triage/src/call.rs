use inference::{first_candidate_text, GenerateContentRequest, TextGenerator};
use std::time::Duration;

use crate::Degraded;

/// One deadline-bounded inference call reduced to its first text part.
pub(crate) async fn ask(
    generator: &dyn TextGenerator,
    request: &GenerateContentRequest,
    deadline: Duration,
) -> Result<String, Degraded> {
    match tokio::time::timeout(deadline, generator.generate(request)).await {
        Err(_) => Err(Degraded::Timeout),
        Ok(Err(err)) => Err(Degraded::Inference(err)),
        Ok(Ok(response)) => first_candidate_text(&response).ok_or(Degraded::MissingText),
    }
}
