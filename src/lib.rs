// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod article;
pub mod config;
pub mod metrics;
pub mod normalize;
pub mod resolve;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::article::{Article, ArticleSource, RawRecord};
pub use crate::normalize::{normalize_batch, normalize_record, NormalizeOptions};
pub use crate::resolve::{match_in_batch, resolve, resolve_across};
