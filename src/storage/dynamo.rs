//! AWS DynamoDB storage implementation.
//!
//! Events are written with `BatchWriteItem` in chunks of 25 (the
//! service limit), resubmitting any unprocessed writes until the whole
//! batch is flushed. Every write is an upsert keyed by `id`; rows
//! written by earlier ingest runs share the same item shape, including
//! the `"null"` placeholder for absent optional fields.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{Event, NULL_PLACEHOLDER};
use crate::storage::{EventStore, WriteSummary};

/// Maximum number of items DynamoDB accepts per BatchWriteItem call.
const MAX_BATCH_ITEMS: usize = 25;

/// Pause before the first resubmission of unprocessed writes; doubles
/// on every further resubmission.
const RESUBMIT_DELAY: Duration = Duration::from_millis(100);

/// Resubmissions of one chunk before a throttled table fails the run.
const MAX_RESUBMITS: u32 = 5;

/// DynamoDB-backed event storage.
#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    /// Create a new DynamoDB store for an existing table.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Create a store from the ambient AWS environment configuration.
    pub async fn from_env(table: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), table)
    }

    fn location(&self) -> String {
        format!("dynamodb://{}", self.table)
    }

    /// Send one chunk, resubmitting unprocessed writes until drained.
    ///
    /// Resubmissions back off exponentially and are capped; a table that
    /// keeps throttling fails the run instead of spinning forever.
    async fn write_chunk(&self, writes: Vec<WriteRequest>) -> Result<()> {
        let mut pending = writes;
        let mut resubmits = 0;
        loop {
            let output = self
                .client
                .batch_write_item()
                .set_request_items(Some(HashMap::from([(self.table.clone(), pending)])))
                .send()
                .await
                .map_err(|e| AppError::storage(DisplayErrorContext(e)))?;

            pending = output
                .unprocessed_items
                .and_then(|mut items| items.remove(&self.table))
                .unwrap_or_default();

            if pending.is_empty() {
                return Ok(());
            }

            let delay = next_resubmit(&self.table, pending.len(), resubmits)?;
            warn!(
                "{} writes to {} unprocessed, resubmitting in {delay:?}",
                pending.len(),
                self.table
            );
            tokio::time::sleep(delay).await;
            resubmits += 1;
        }
    }
}

/// Delay before the next resubmission, or the give-up error once the
/// cap is reached.
fn next_resubmit(table: &str, pending: usize, resubmits: u32) -> Result<Duration> {
    if resubmits >= MAX_RESUBMITS {
        return Err(AppError::storage(format!(
            "{pending} writes to {table} still unprocessed after {MAX_RESUBMITS} resubmissions"
        )));
    }
    Ok(RESUBMIT_DELAY * 2u32.saturating_pow(resubmits))
}

#[async_trait]
impl EventStore for DynamoStore {
    async fn put_events(&self, events: &[Event]) -> Result<WriteSummary> {
        for chunk in events.chunks(MAX_BATCH_ITEMS) {
            let writes = chunk
                .iter()
                .map(|event| {
                    let put = PutRequest::builder()
                        .set_item(Some(to_item(event)))
                        .build()
                        .map_err(AppError::storage)?;
                    Ok(WriteRequest::builder().put_request(put).build())
                })
                .collect::<Result<Vec<_>>>()?;

            self.write_chunk(writes).await?;
        }

        info!("Wrote {} events to {}", events.len(), self.location());
        Ok(WriteSummary {
            event_count: events.len(),
            timestamp: Utc::now(),
            location: self.location(),
        })
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| AppError::storage(DisplayErrorContext(e)))?;

        output.item.map(from_item).transpose()
    }
}

/// Marshal an event into a DynamoDB item.
///
/// Absent optional fields become the placeholder string and an empty
/// category list becomes the placeholder instead of an empty list, so
/// new rows keep the shape of rows already in the table.
fn to_item(event: &Event) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("id".to_string(), AttributeValue::S(event.id.clone()));
    item.insert("name".to_string(), AttributeValue::S(event.name.clone()));
    item.insert("month".to_string(), AttributeValue::S(event.month.clone()));
    item.insert("day".to_string(), AttributeValue::S(event.day.clone()));
    item.insert(
        "location".to_string(),
        AttributeValue::S(event.location.clone()),
    );
    item.insert(
        "startDate".to_string(),
        AttributeValue::S(event.start_date.clone()),
    );
    item.insert(
        "endDate".to_string(),
        AttributeValue::S(event.end_date.clone()),
    );
    item.insert("borough".to_string(), optional_attribute(&event.borough));
    item.insert(
        "streetAddress".to_string(),
        optional_attribute(&event.street_address),
    );
    item.insert(
        "description".to_string(),
        optional_attribute(&event.description),
    );

    let categories = if event.categories.is_empty() {
        AttributeValue::S(NULL_PLACEHOLDER.to_string())
    } else {
        AttributeValue::L(
            event
                .categories
                .iter()
                .cloned()
                .map(AttributeValue::S)
                .collect(),
        )
    };
    item.insert("categories".to_string(), categories);

    item
}

/// Unmarshal a DynamoDB item back into an event.
fn from_item(item: HashMap<String, AttributeValue>) -> Result<Event> {
    let categories = match item.get("categories") {
        Some(AttributeValue::L(values)) => values
            .iter()
            .map(|value| match value {
                AttributeValue::S(s) => Ok(s.clone()),
                other => Err(AppError::storage(format!(
                    "unexpected category value: {other:?}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(AttributeValue::S(s)) if s == NULL_PLACEHOLDER => Vec::new(),
        other => {
            return Err(AppError::storage(format!(
                "unexpected categories attribute: {other:?}"
            )));
        }
    };

    Ok(Event {
        id: string_attribute(&item, "id")?,
        name: string_attribute(&item, "name")?,
        month: string_attribute(&item, "month")?,
        day: string_attribute(&item, "day")?,
        location: string_attribute(&item, "location")?,
        start_date: string_attribute(&item, "startDate")?,
        end_date: string_attribute(&item, "endDate")?,
        borough: optional_string(&item, "borough")?,
        street_address: optional_string(&item, "streetAddress")?,
        description: optional_string(&item, "description")?,
        categories,
    })
}

fn optional_attribute(value: &Option<String>) -> AttributeValue {
    AttributeValue::S(
        value
            .clone()
            .unwrap_or_else(|| NULL_PLACEHOLDER.to_string()),
    )
}

fn string_attribute(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String> {
    match item.get(key) {
        Some(AttributeValue::S(s)) => Ok(s.clone()),
        _ => Err(AppError::storage(format!(
            "item is missing string attribute {key}"
        ))),
    }
}

fn optional_string(item: &HashMap<String, AttributeValue>, key: &str) -> Result<Option<String>> {
    string_attribute(item, key).map(|s| if s == NULL_PLACEHOLDER { None } else { Some(s) })
}
