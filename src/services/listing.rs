//! Events listing crawler service.
//!
//! Fetches listing pages and extracts event records from their
//! schema.org microdata. Extraction is synchronous over a fetched
//! document; nothing awaits while parsed markup is held.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, Event};
use crate::utils::http;

use super::selectors::ListingSelectors;

/// Number of events the listing serves per result page.
pub const PAGE_SIZE: u64 = 10;

/// Pattern pulling the total result count out of the summary line.
const TOTAL_EVENTS_PATTERN: &str = r"out of ([0-9,]*) events";

/// Source of listing pages for the ingest pipeline.
///
/// `ListingCrawler` is the HTTP implementation; the pipeline tests
/// drive `ingest_from` with in-memory doubles instead.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Number of result pages behind a search URL.
    ///
    /// Reads the total count from the first page's summary line and
    /// rounds up to whole pages. Zero events means zero pages.
    async fn count_pages(&self, search_url: &str) -> Result<u64>;

    /// Fetch one result page and extract every event entry on it.
    async fn fetch_page_events(&self, search_url: &str, page: u64) -> Result<Vec<Event>>;
}

/// Service for crawling the paginated events listing.
pub struct ListingCrawler {
    client: Client,
    selectors: ListingSelectors,
    total_pattern: Regex,
}

impl ListingCrawler {
    /// Create a new listing crawler with the given configuration.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
            selectors: ListingSelectors::parse()?,
            total_pattern: Regex::new(TOTAL_EVENTS_PATTERN)
                .map_err(|e| AppError::parse("summary pattern", e))?,
        })
    }
}

#[async_trait]
impl EventSource for ListingCrawler {
    async fn count_pages(&self, search_url: &str) -> Result<u64> {
        let document = http::fetch_page_async(&self.client, search_url).await?;
        let total = summary_total(&document, &self.selectors, &self.total_pattern)?;
        log::debug!("Listing at {search_url} reports {total} events");
        Ok(pages_for(total))
    }

    async fn fetch_page_events(&self, search_url: &str, page: u64) -> Result<Vec<Event>> {
        let url = page_url(search_url, page);
        let document = http::fetch_page_async(&self.client, &url).await?;
        listing_events(&document, &self.selectors)
    }
}

/// URL of one result page; pages are numbered from 1.
pub fn page_url(search_url: &str, page: u64) -> String {
    format!("{search_url}/p{page}")
}

/// Round a result count up to whole pages.
fn pages_for(total_events: u64) -> u64 {
    total_events.div_ceil(PAGE_SIZE)
}

/// Total result count from the first page's summary line.
fn summary_total(document: &Html, selectors: &ListingSelectors, pattern: &Regex) -> Result<u64> {
    let summary = document
        .select(&selectors.summary)
        .next()
        .ok_or_else(|| AppError::parse("listing summary", "no alert element on the page"))?;

    let text: String = summary.text().collect();
    let captures = pattern
        .captures(&text)
        .ok_or_else(|| AppError::parse("listing summary", format!("no total count in {text:?}")))?;

    // The count carries thousands separators past 999 events.
    captures[1].replace(',', "").parse().map_err(|e| {
        AppError::parse("listing summary", format!("bad count {:?}: {e}", &captures[1]))
    })
}

/// Extract every event entry under the listing container, in document order.
fn listing_events(document: &Html, selectors: &ListingSelectors) -> Result<Vec<Event>> {
    let container = document
        .select(&selectors.container)
        .next()
        .ok_or_else(|| AppError::parse("event container", "events_leftcol is missing"))?;

    container
        .select(&selectors.entry)
        .map(|entry| extract_event(entry, selectors))
        .collect()
}

/// Build one event record from one listing entry.
///
/// Required fields fail the run when their element is missing; optional
/// fields become `None`. Categories are the bare spans (no class, no
/// itemprop) in document order.
fn extract_event(entry: ElementRef<'_>, selectors: &ListingSelectors) -> Result<Event> {
    let id = required_attr(entry, &selectors.detail_link, "href", "event id")?;
    if id.is_empty() {
        return Err(AppError::parse("event id", "detail link href is empty"));
    }

    Ok(Event {
        id,
        name: required_text(entry, &selectors.name, "event name")?,
        month: required_text(entry, &selectors.month, "calendar month")?,
        day: required_text(entry, &selectors.day, "calendar day")?,
        location: required_text(entry, &selectors.location, "location name")?,
        start_date: required_attr(entry, &selectors.start_date, "content", "start date")?,
        end_date: required_attr(entry, &selectors.end_date, "content", "end date")?,
        borough: optional_text(entry, &selectors.borough),
        street_address: optional_attr(entry, &selectors.street_address, "content"),
        description: optional_text(entry, &selectors.description),
        categories: entry
            .select(&selectors.category)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect(),
    })
}

/// Element text with whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn required_text(entry: ElementRef<'_>, selector: &Selector, field: &str) -> Result<String> {
    entry
        .select(selector)
        .next()
        .map(element_text)
        .ok_or_else(|| AppError::parse(field, "required element is missing"))
}

fn required_attr(
    entry: ElementRef<'_>,
    selector: &Selector,
    attr: &str,
    field: &str,
) -> Result<String> {
    entry
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
        .ok_or_else(|| AppError::parse(field, format!("required {attr} attribute is missing")))
}

fn optional_text(entry: ElementRef<'_>, selector: &Selector) -> Option<String> {
    entry
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn optional_attr(entry: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    entry
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
        .filter(|text| !text.is_empty())
}
