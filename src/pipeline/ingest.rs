// src/pipeline/ingest.rs

//! Event ingest pipeline.
//!
//! Linear flow: count result pages for the crawl window, then fetch,
//! extract, and write one page at a time. The first failure aborts the
//! remaining pages; events written before the failure stay written.

use crate::error::Result;
use crate::models::{Config, CrawlWindow};
use crate::services::{EventSource, ListingCrawler};
use crate::storage::EventStore;

/// Totals for a completed ingest run.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestSummary {
    /// Result pages behind the window
    pub pages: u64,
    /// Events extracted and written
    pub events: usize,
}

/// Run the ingest pipeline across every result page in the window.
pub async fn run_ingest(
    config: &Config,
    window: &CrawlWindow,
    store: &dyn EventStore,
) -> Result<IngestSummary> {
    let crawler = ListingCrawler::new(&config.crawler)?;
    let search_url = window.search_url(&config.ingest.base_url);
    ingest_from(&crawler, &search_url, store).await
}

/// Ingest every result page behind a search URL from the given source.
///
/// Zero pages is a success with nothing fetched and nothing written.
pub async fn ingest_from(
    source: &dyn EventSource,
    search_url: &str,
    store: &dyn EventStore,
) -> Result<IngestSummary> {
    log::info!("Reading listing at {search_url}");
    let pages = source.count_pages(search_url).await?;
    if pages == 0 {
        log::info!("Listing window is empty, nothing to ingest");
        return Ok(IngestSummary::default());
    }

    let mut summary = IngestSummary { pages, events: 0 };
    for page in 1..=pages {
        let events = source.fetch_page_events(search_url, page).await?;
        let write = store.put_events(&events).await?;
        summary.events += events.len();

        log::info!(
            "Page {page}/{pages}: wrote {} events to {}",
            write.event_count,
            write.location
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::error::AppError;
    use crate::models::Event;
    use crate::storage::WriteSummary;

    fn page_event(page: u64) -> Event {
        Event {
            id: format!("/events/page-{page}"),
            name: format!("Event on page {page}"),
            month: "JUN".to_string(),
            day: "14".to_string(),
            location: "Central Park".to_string(),
            start_date: "2024-06-14".to_string(),
            end_date: "2024-06-14".to_string(),
            borough: None,
            street_address: None,
            description: None,
            categories: Vec::new(),
        }
    }

    /// Listing double serving a fixed page count, one event per page,
    /// optionally failing when a given page is fetched.
    struct FixedListing {
        pages: u64,
        fail_on: Option<u64>,
        fetched: Mutex<Vec<u64>>,
    }

    impl FixedListing {
        fn with_pages(pages: u64) -> Self {
            Self {
                pages,
                fail_on: None,
                fetched: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EventSource for FixedListing {
        async fn count_pages(&self, _search_url: &str) -> Result<u64> {
            Ok(self.pages)
        }

        async fn fetch_page_events(&self, _search_url: &str, page: u64) -> Result<Vec<Event>> {
            self.fetched.lock().unwrap().push(page);
            if self.fail_on == Some(page) {
                return Err(AppError::parse(
                    "event container",
                    "events_leftcol is missing",
                ));
            }
            Ok(vec![page_event(page)])
        }
    }

    /// Store double recording the size of each batch written to it.
    #[derive(Default)]
    struct RecordingStore {
        batches: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl EventStore for RecordingStore {
        async fn put_events(&self, events: &[Event]) -> Result<WriteSummary> {
            self.batches.lock().unwrap().push(events.len());
            Ok(WriteSummary {
                event_count: events.len(),
                timestamp: Utc::now(),
                location: "memory".to_string(),
            })
        }

        async fn get_event(&self, _id: &str) -> Result<Option<Event>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_zero_pages_succeeds_without_fetches_or_writes() {
        let listing = FixedListing::with_pages(0);
        let store = RecordingStore::default();

        let summary = ingest_from(&listing, "https://example.test/events", &store)
            .await
            .unwrap();

        assert_eq!(summary.pages, 0);
        assert_eq!(summary.events, 0);
        assert!(listing.fetched.lock().unwrap().is_empty());
        assert!(store.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_every_page_is_fetched_and_written_in_order() {
        let listing = FixedListing::with_pages(3);
        let store = RecordingStore::default();

        let summary = ingest_from(&listing, "https://example.test/events", &store)
            .await
            .unwrap();

        assert_eq!(summary.pages, 3);
        assert_eq!(summary.events, 3);
        assert_eq!(*listing.fetched.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(*store.batches.lock().unwrap(), vec![1, 1, 1]);
    }

    #[tokio::test]
    async fn test_failed_page_aborts_the_remaining_pages() {
        let listing = FixedListing {
            pages: 3,
            fail_on: Some(2),
            fetched: Mutex::new(Vec::new()),
        };
        let store = RecordingStore::default();

        let result = ingest_from(&listing, "https://example.test/events", &store).await;

        assert!(result.is_err());
        // Page 1 stays written, page 3 is never fetched.
        assert_eq!(*listing.fetched.lock().unwrap(), vec![1, 2]);
        assert_eq!(*store.batches.lock().unwrap(), vec![1]);
    }
}
