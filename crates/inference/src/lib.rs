//! Astra inference client
//!
//! Thin wrapper around a multimodal `generateContent` endpoint. The triage
//! stages build requests from [`Part`]s, send them through a [`TextGenerator`],
//! and read the answer back with [`first_candidate_text`].
//!
//! Provider responses are treated as untrusted shapes: navigation never panics
//! and never errors, it just returns `None` when a link is missing. Transport
//! and status failures come back as [`InferenceError`] so callers decide how
//! to degrade.
//!
//! ## Quick example
//!
//! ```no_run
//! use inference::{first_candidate_text, GeminiClient, GenerateContentRequest, InferenceConfig, Part, TextGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cfg = InferenceConfig {
//!         api_key: std::env::var("GEMINI_API_KEY").ok(),
//!         ..Default::default()
//!     };
//!     let client = GeminiClient::new(&cfg).unwrap();
//!     let request = GenerateContentRequest::single(vec![Part::text("Say hi")]);
//!     let response = client.generate(&request).await.unwrap();
//!     println!("{:?}", first_candidate_text(&response));
//! }
//! ```

pub mod config;
pub mod error;
pub mod types;

mod client;

pub use crate::client::{GeminiClient, TextGenerator};
pub use crate::config::InferenceConfig;
pub use crate::error::InferenceError;
pub use crate::types::{first_candidate_text, Content, GenerateContentRequest, InlineData, Part};
