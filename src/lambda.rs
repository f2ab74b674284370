// src/lambda.rs

//! AWS Lambda handler for the events crawler.
//!
//! One invocation runs one full ingest:
//! 1. Loads configuration from the environment
//! 2. Counts the result pages behind the crawl window
//! 3. Fetches, extracts, and writes events page by page into DynamoDB
//!
//! The invocation payload is ignored; scheduling lives outside this
//! crate.

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde_json::Value;
use tracing::{info, instrument};

use crate::models::{Config, CrawlWindow};
use crate::pipeline::run_ingest;
use crate::storage::DynamoStore;

/// Response body returned on a successful run.
const SUCCESS_MESSAGE: &str = "Success! Parsed Events";

/// Main Lambda handler function.
///
/// Returns the success message as a plain string; any pipeline failure
/// propagates as an error and fails the invocation.
#[instrument(skip(event))]
pub async fn handler(event: LambdaEvent<Value>) -> std::result::Result<String, LambdaError> {
    let start = std::time::Instant::now();
    let (_payload, context) = event.into_parts();
    info!("Starting ingest: request_id={}", context.request_id);

    let config = Config::from_env();
    config.validate()?;

    let window = CrawlWindow::next_days(config.ingest.crawl_days);
    let store = DynamoStore::from_env(&config.ingest.table_name).await;

    let summary = run_ingest(&config, &window, &store).await?;
    info!(
        "Ingest complete: {} events across {} pages in {}ms",
        summary.events,
        summary.pages,
        start.elapsed().as_millis()
    );

    Ok(SUCCESS_MESSAGE.to_string())
}
