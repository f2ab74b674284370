//! Fixed CSS selectors for the events listing markup.
//!
//! The listing annotates each entry with schema.org Event microdata, so
//! every field is reached by a fixed tag + attribute pair. Selector
//! strings are constants; a parse failure here means a typo, not bad
//! input.

use scraper::Selector;

use crate::error::{AppError, Result};

/// Parsed selector set for one listing page.
pub struct ListingSelectors {
    /// Summary line carrying the total result count
    pub summary: Selector,

    /// Column wrapping every event entry on a page
    pub container: Selector,

    /// One event entry
    pub entry: Selector,

    /// Event name heading
    pub name: Selector,

    /// Anchor under the name heading; its href is the event id
    pub detail_link: Selector,

    /// Calendar month abbreviation
    pub month: Selector,

    /// Calendar day
    pub day: Selector,

    /// Venue name
    pub location: Selector,

    /// Start date meta tag
    pub start_date: Selector,

    /// End date meta tag
    pub end_date: Selector,

    /// Borough span (optional in the markup)
    pub borough: Selector,

    /// Street address meta tag (optional in the markup)
    pub street_address: Selector,

    /// Description span (optional in the markup)
    pub description: Selector,

    /// Category tags: spans with neither a class nor an itemprop
    pub category: Selector,
}

impl ListingSelectors {
    /// Parse the full selector set.
    pub fn parse() -> Result<Self> {
        Ok(Self {
            summary: parse_selector("p.alert")?,
            container: parse_selector("div#events_leftcol")?,
            entry: parse_selector(r#"div[itemtype="http://schema.org/Event"]"#)?,
            name: parse_selector(r#"h3[itemprop="name"]"#)?,
            detail_link: parse_selector(r#"h3[itemprop="name"] a"#)?,
            month: parse_selector("span.cal_month")?,
            day: parse_selector("span.cal_day")?,
            location: parse_selector(r#"span[itemprop="name"]"#)?,
            start_date: parse_selector(r#"meta[itemprop="startDate"]"#)?,
            end_date: parse_selector(r#"meta[itemprop="endDate"]"#)?,
            borough: parse_selector(r#"span[itemprop="addressLocality"]"#)?,
            street_address: parse_selector(r#"meta[itemprop="streetAddress"]"#)?,
            description: parse_selector(r#"span[itemprop="description"]"#)?,
            category: parse_selector("span:not([class]):not([itemprop])")?,
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
