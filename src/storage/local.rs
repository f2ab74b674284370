//! Local filesystem storage implementation.
//!
//! Keeps every event in a single JSON map keyed by `id`, so repeated
//! writes of the same event overwrite the previous row exactly like the
//! DynamoDB backend. Intended for development and testing runs.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml           # Crawler configuration (read by the CLI)
//! └── events.json           # Event map keyed by id
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Event;
use crate::storage::{EventStore, WriteSummary};

/// File holding the event map inside the storage directory.
const EVENTS_FILE: &str = "events.json";

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn events_path(&self) -> PathBuf {
        self.root_dir.join(EVENTS_FILE)
    }

    /// Read the stored event map; an absent file is an empty map.
    async fn read_map(&self) -> Result<BTreeMap<String, Event>> {
        match tokio::fs::read(self.events_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the event map atomically (write to temp, then rename).
    async fn write_map(&self, events: &BTreeMap<String, Event>) -> Result<()> {
        let path = self.events_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(events)?;
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Every stored event, ordered by id.
    pub async fn load_all(&self) -> Result<Vec<Event>> {
        Ok(self.read_map().await?.into_values().collect())
    }
}

#[async_trait]
impl EventStore for LocalStore {
    async fn put_events(&self, events: &[Event]) -> Result<WriteSummary> {
        let mut stored = self.read_map().await?;
        for event in events {
            stored.insert(event.id.clone(), event.clone());
        }
        self.write_map(&stored).await?;

        log::info!(
            "Wrote {} events to {}",
            events.len(),
            self.events_path().display()
        );
        Ok(WriteSummary {
            event_count: events.len(),
            timestamp: Utc::now(),
            location: self.events_path().display().to_string(),
        })
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.read_map().await?.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_event(id: &str, name: &str) -> Event {
        Event {
            id: id.to_string(),
            name: name.to_string(),
            month: "JUN".to_string(),
            day: "14".to_string(),
            location: "Central Park".to_string(),
            start_date: "2024-06-14".to_string(),
            end_date: "2024-06-14".to_string(),
            borough: Some("Manhattan".to_string()),
            street_address: None,
            description: None,
            categories: vec!["Free".to_string()],
        }
    }

    #[tokio::test]
    async fn test_round_trip_by_id() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let event = sample_event("/events/1", "Picnic");
        store.put_events(std::slice::from_ref(&event)).await.unwrap();

        let loaded = store.get_event("/events/1").await.unwrap();
        assert_eq!(loaded, Some(event));
    }

    #[tokio::test]
    async fn test_get_missing_event_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        assert_eq!(store.get_event("/events/nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_double_write_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let events = vec![sample_event("/events/1", "Picnic")];
        store.put_events(&events).await.unwrap();
        store.put_events(&events).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], events[0]);
    }

    #[tokio::test]
    async fn test_same_id_overwrites_previous_row() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        store
            .put_events(&[sample_event("/events/1", "Picnic")])
            .await
            .unwrap();
        store
            .put_events(&[sample_event("/events/1", "Picnic (moved)")])
            .await
            .unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Picnic (moved)");
    }

    #[tokio::test]
    async fn test_writes_accumulate_across_batches() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        store
            .put_events(&[sample_event("/events/1", "Picnic")])
            .await
            .unwrap();
        let summary = store
            .put_events(&[sample_event("/events/2", "Stargazing")])
            .await
            .unwrap();

        assert_eq!(summary.event_count, 1);
        assert_eq!(store.load_all().await.unwrap().len(), 2);
    }
}
