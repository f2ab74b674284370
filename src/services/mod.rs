//! Service layer for the events crawler.
//!
//! This module contains the business logic for:
//! - Listing crawling and extraction (`ListingCrawler`)
//! - The page-source seam the pipeline consumes (`EventSource`)
//! - Fixed selectors for the listing markup (`ListingSelectors`)

mod listing;
mod selectors;

pub use listing::{EventSource, ListingCrawler};
pub use selectors::ListingSelectors;
