// src/models/mod.rs

//! Domain models for the events crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod event;
mod window;

// Re-export all public types
pub use config::{Config, CrawlerConfig, IngestConfig};
pub use event::{Event, NULL_PLACEHOLDER};
pub use window::CrawlWindow;
