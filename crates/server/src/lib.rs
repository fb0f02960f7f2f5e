//! Astra Server - HTTP REST API in front of the triage pipeline
//!
//! Exposes the image triage pipeline to the mobile app, together with the
//! two collaborators the app needs around it: support-chat provisioning and
//! leader lookup.
//!
//! # Features
//!
//! - **Authentication**: API key on admin routes, compared in constant time, with per-key rate limiting
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: `.env`, optional `astra-server` config file, `ASTRA_*` environment variables
//! - **Metrics**: Prometheus export of per-stage pipeline latency and report outcomes
//! - **Graceful Shutdown**: SIGTERM and Ctrl+C
//!
//! # API Endpoints
//!
//! ## Public
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe with collaborator status
//! - `GET /metrics` - Prometheus metrics
//! - `POST /classify-image` - `{ "imageUrl": ... }` to `{ title, type, description }`
//! - `GET /token/{userId}?name=` - Chat token for a provisioned support member
//! - `GET /leaders?location=` - Leader search results for a location
//!
//! ## Admin (API Key Required)
//!
//! - `POST /truncate-channel` - Clear the support channel
//!
//! Every error body is `{ "error": "<message>" }`.

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
