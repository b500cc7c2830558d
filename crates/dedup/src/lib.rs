//! `marob-dedup` — Approximate deduplication engine for marine
//! observation reports.
//!
//! Pure engine crate: receives pre-loaded records, returns a clustering
//! with per-record confidence. Blocking → field comparison →
//! classification → transitive clustering, all deterministic.

pub mod blocking;
pub mod classify;
pub mod cluster;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod score;

pub use config::DedupConfig;
pub use engine::{load_csv_records, run};
pub use error::DedupError;
pub use model::{DedupInput, DedupResult, Record};
