//! Astra image triage stages
//!
//! Turns a picture of something happening in the street into a structured
//! emergency report, one stage at a time:
//!
//! - **Fetch** ([`ImageFetcher`]) - download the image, base64 it, guess the
//!   media type from the URL suffix.
//! - **Describe** ([`DescriptionStage`]) - ask the model for a 1-2 sentence
//!   description of the image.
//! - **Classify** ([`ClassificationStage`]) - ask again, text only, to map
//!   that description onto the fixed [`EmergencyType`] labels or SPAM.
//! - **Parse** ([`parse_classification`]) - pull `TITLE:`/`TYPE:`/`DESCRIPTION:`
//!   lines out of whatever came back.
//! - **Fall back** ([`FallbackPolicy`]) - anything incomplete becomes the
//!   uniform SPAM report.
//!
//! Only fetching can fail. The two inference stages degrade instead: an empty
//! description, or the literal [`SPAM_BLOCK`] for classification. Callers
//! never have to tell "model confused" apart from "not an emergency".
//!
//! Sequencing lives in the `astra` crate; these stages hold no state between
//! calls and can be shared across concurrent requests.
//!
//! ## Example
//!
//! ```
//! use triage::{parse_classification, FallbackPolicy};
//!
//! let parsed = parse_classification("TITLE: Lost cat");
//! let report = FallbackPolicy::default().apply(parsed);
//! assert!(report.is_spam());
//! ```

pub mod config;
pub mod error;
pub mod types;

mod call;
mod classify;
mod describe;
mod fallback;
mod fetch;
mod parser;

#[cfg(test)]
mod testing;

pub use crate::classify::{classification_prompt, ClassificationStage, SPAM_BLOCK};
pub use crate::config::{TriageConfig, TypePolicy};
pub use crate::describe::{DescriptionStage, DESCRIBE_PROMPT};
pub use crate::error::TriageError;
pub use crate::fallback::FallbackPolicy;
pub use crate::fetch::{media_type_for, ImageFetcher, MEDIA_JPEG, MEDIA_PNG, MEDIA_WEBP};
pub use crate::parser::parse_classification;
pub use crate::types::{
    Degraded, EmergencyReport, EmergencyType, EncodedImage, ImageReference, ParsedFields, Stage,
    StageText, SPAM,
};
