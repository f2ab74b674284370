//! Crawl window for the listing query.

use chrono::{Duration, Local, NaiveDate};

/// Inclusive date range bounding the events listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlWindow {
    /// First day covered by the query
    pub start: NaiveDate,

    /// Last day covered by the query
    pub end: NaiveDate,
}

impl CrawlWindow {
    /// Window from today through today plus `days`.
    pub fn next_days(days: u32) -> Self {
        Self::from_start(Local::now().date_naive(), days)
    }

    /// Window from an explicit start date, for deterministic runs.
    pub fn from_start(start: NaiveDate, days: u32) -> Self {
        Self {
            start,
            end: start + Duration::days(i64::from(days)),
        }
    }

    /// Listing search URL with the window embedded as path segments.
    pub fn search_url(&self, base_url: &str) -> String {
        format!(
            "{}/f{}/t{}",
            base_url.trim_end_matches('/'),
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn june_14() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    #[test]
    fn test_from_start_spans_requested_days() {
        let window = CrawlWindow::from_start(june_14(), 7);
        assert_eq!(window.start, june_14());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 6, 21).unwrap());
    }

    #[test]
    fn test_search_url_embeds_window() {
        let window = CrawlWindow::from_start(june_14(), 7);
        assert_eq!(
            window.search_url("https://www.nycgovparks.org/events"),
            "https://www.nycgovparks.org/events/f2024-06-14/t2024-06-21"
        );
    }

    #[test]
    fn test_search_url_tolerates_trailing_slash() {
        let window = CrawlWindow::from_start(june_14(), 0);
        assert_eq!(
            window.search_url("https://www.nycgovparks.org/events/"),
            "https://www.nycgovparks.org/events/f2024-06-14/t2024-06-14"
        );
    }

    #[test]
    fn test_next_days_starts_today() {
        let window = CrawlWindow::next_days(7);
        assert_eq!(window.end - window.start, Duration::days(7));
    }
}
