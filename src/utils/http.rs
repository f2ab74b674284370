// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use scraper::Html;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
///
/// The identifying User-Agent from the configuration is attached to
/// every request the client makes.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page asynchronously and parse it as HTML.
///
/// Non-success statuses fail here as HTTP errors rather than surfacing
/// later as markup errors on an error page.
pub async fn fetch_page_async(client: &reqwest::Client, url: &str) -> Result<Html> {
    let response = client.get(url).send().await?.error_for_status()?;
    let text = response.text().await?;
    Ok(Html::parse_document(&text))
}
