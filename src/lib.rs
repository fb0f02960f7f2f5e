//! Workspace umbrella crate for the Astra relay.
//!
//! This crate sequences the triage stages into one request pipeline so callers
//! can turn an image URL into an [`EmergencyReport`] with a single call:
//!
//! ```text
//! Fetching -> Describing -> Classifying -> Parsing
//! ```
//!
//! Fetching is the only stage whose failure reaches the caller. Describing and
//! Classifying degrade to empty or sentinel text, and Parsing is total, so
//! every run that gets past the fetch ends in a report: real, or uniform SPAM.
//! There are no retries; each stage runs at most once under its own deadline.

pub mod config;

pub use config::{AstraConfig, ConfigLoadError, PipelineConfig, GEMINI_API_KEY_ENV};
pub use inference::{GeminiClient, InferenceConfig, InferenceError, TextGenerator};
pub use triage::{
    Degraded, EmergencyReport, EmergencyType, ImageReference, Stage, TriageConfig, TriageError,
    TypePolicy, SPAM,
};

use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use tracing::{info, warn, Instrument};
use triage::{
    parse_classification, ClassificationStage, DescriptionStage, FallbackPolicy, ImageFetcher,
};

/// Errors that end a pipeline run without a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The request carried no usable image reference.
    InvalidReference(TriageError),
    /// The image could not be fetched.
    Fetch(TriageError),
    /// The pipeline could not be built from its configuration.
    InvalidConfig(String),
}

impl PipelineError {
    /// True for failures the caller caused (bad input) rather than the image origin.
    pub fn is_input_error(&self) -> bool {
        matches!(self, PipelineError::InvalidReference(_))
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidReference(err) => write!(f, "invalid image reference: {err}"),
            PipelineError::Fetch(err) => write!(f, "{err}"),
            PipelineError::InvalidConfig(msg) => write!(f, "invalid pipeline config: {msg}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::InvalidReference(err) | PipelineError::Fetch(err) => Some(err),
            PipelineError::InvalidConfig(_) => None,
        }
    }
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::InvalidConfig(value.to_string())
    }
}

impl From<InferenceError> for PipelineError {
    fn from(value: InferenceError) -> Self {
        PipelineError::InvalidConfig(value.to_string())
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_fetch(&self, latency: Duration, result: Result<(), &TriageError>);
    fn record_describe(&self, latency: Duration, degraded: Option<&Degraded>);
    fn record_classify(&self, latency: Duration, degraded: Option<&Degraded>);
    /// Whole-run latency and the report that came out of it.
    fn record_report(&self, latency: Duration, report: &EmergencyReport);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_fetch(self, result: Result<(), &TriageError>) {
        self.recorder.record_fetch(self.start.elapsed(), result);
    }

    fn record_describe(self, degraded: Option<&Degraded>) {
        self.recorder.record_describe(self.start.elapsed(), degraded);
    }

    fn record_classify(self, degraded: Option<&Degraded>) {
        self.recorder.record_classify(self.start.elapsed(), degraded);
    }

    fn record_report(self, report: &EmergencyReport) {
        self.recorder.record_report(self.start.elapsed(), report);
    }
}

/// The four triage stages wired together. Cheap to share behind an `Arc`;
/// concurrent runs share nothing but the HTTP connection pools.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: ImageFetcher,
    describer: DescriptionStage,
    classifier: ClassificationStage,
    fallback: FallbackPolicy,
}

impl Pipeline {
    /// Build a pipeline around any [`TextGenerator`].
    pub fn new(
        cfg: &PipelineConfig,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, PipelineError> {
        cfg.triage
            .validate()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        let fetcher =
            ImageFetcher::new(&cfg.triage).map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            fetcher,
            describer: DescriptionStage::new(generator.clone(), cfg.triage.describe_deadline()),
            classifier: ClassificationStage::new(generator, cfg.triage.classify_deadline()),
            fallback: FallbackPolicy::new(cfg.triage.type_policy),
        })
    }

    /// Build a pipeline that talks to the configured Gemini endpoint.
    pub fn from_config(cfg: &PipelineConfig) -> Result<Self, PipelineError> {
        cfg.validate()?;
        let client = GeminiClient::new(&cfg.inference)?;
        Self::new(cfg, Arc::new(client))
    }

    /// Run one image through Fetching, Describing, Classifying and Parsing.
    pub async fn run(&self, image_url: &str) -> Result<EmergencyReport, PipelineError> {
        let reference = ImageReference::parse(image_url).map_err(PipelineError::InvalidReference)?;
        let span = tracing::info_span!("pipeline.run", reference = %reference);
        self.run_inner(reference).instrument(span).await
    }

    async fn run_inner(&self, reference: ImageReference) -> Result<EmergencyReport, PipelineError> {
        let start = Instant::now();
        let run_metrics = MetricsSpan::start();

        let fetch_metrics = MetricsSpan::start();
        let image = match self.fetcher.fetch(&reference).await {
            Ok(image) => {
                if let Some(span) = fetch_metrics {
                    span.record_fetch(Ok(()));
                }
                image
            }
            Err(err) => {
                if let Some(span) = fetch_metrics {
                    span.record_fetch(Err(&err));
                }
                warn!(
                    stage = %Stage::Fetching,
                    error = %err,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "pipeline_failure"
                );
                return Err(PipelineError::Fetch(err));
            }
        };

        let describe_metrics = MetricsSpan::start();
        let description = self.describer.describe(&image).await;
        drop(image);
        if let Some(span) = describe_metrics {
            span.record_describe(description.degraded.as_ref());
        }

        let classify_metrics = MetricsSpan::start();
        let classification = self.classifier.classify(&description.text).await;
        if let Some(span) = classify_metrics {
            span.record_classify(classification.degraded.as_ref());
        }

        let report = self.fallback.apply(parse_classification(&classification.text));
        if let Some(span) = run_metrics {
            span.record_report(&report);
        }

        info!(
            is_spam = report.is_spam(),
            description_degraded = description.is_degraded(),
            classification_degraded = classification.is_degraded(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipeline_success"
        );
        Ok(report)
    }
}
