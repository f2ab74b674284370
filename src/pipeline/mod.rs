//! Pipeline entry points for crawler operations.
//!
//! - `run_ingest`: Crawl the listing window and upsert events into storage

pub mod ingest;

pub use ingest::{IngestSummary, ingest_from, run_ingest};
