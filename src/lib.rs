//! # imgpair
//!
//! Batch comparative analysis of paired images via a vision-language API.
//!
//! Images in two directories are joined on filename stem; each pair is sent
//! to the remote model in one multimodal request, the textual result lands
//! as `<stem>.txt` next to the second directory's image, and token usage is
//! turned into a monetary estimate.
//!
//! ## Pipeline
//!
//! ```text
//!   pairing::match_pairs ──▶ batch::run_batch
//!                                │  (semaphore-bounded workers)
//!                                ▼
//!                        worker::analyze_pair ──▶ llm::ArkClient
//!                                │  encode ×2, one remote call
//!                                ▼
//!                     completion channel → files + progress lines
//! ```
//!
//! ## Modules
//! - `pairing`: stem-based directory join
//! - `encode`: base64 data-URI encoding of image files
//! - `cost`: token usage → monetary estimate
//! - `llm`: chat types, `VisionClient` trait, Ark client
//! - `worker`: per-pair analysis
//! - `batch`: bounded worker pool and streaming progress log
//! - `config`: `config.json` loading and validation
//! - `error`: fatal vs. per-pair error taxonomy

pub mod batch;
pub mod config;
pub mod cost;
pub mod encode;
pub mod error;
pub mod llm;
pub mod pairing;
pub mod worker;

pub use batch::{run_batch, BatchOptions, RunSummary};
pub use config::Config;
pub use error::Error;
