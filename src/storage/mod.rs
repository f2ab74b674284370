//! Storage backends for extracted events.
//!
//! Every backend exposes the same contract: `put_events` is a batched
//! upsert keyed by the event `id` (re-ingesting an event overwrites the
//! previous row), and `get_event` reads one row back. There is no
//! delete; stale rows simply stop being refreshed.

#[cfg(feature = "dynamo")]
pub mod dynamo;
pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Event;

// Re-export for convenience
#[cfg(feature = "dynamo")]
pub use dynamo::DynamoStore;
pub use local::LocalStore;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Number of events written by this call
    pub event_count: usize,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
    /// Human-readable destination (table or file path)
    pub location: String,
}

/// Trait for event storage backends.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Upsert every record, keyed by `id`.
    ///
    /// There is no partial-batch rollback; a failure may leave earlier
    /// records of the batch written.
    async fn put_events(&self, events: &[Event]) -> Result<WriteSummary>;

    /// Read a single record back by id.
    async fn get_event(&self, id: &str) -> Result<Option<Event>>;
}
