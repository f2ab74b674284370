//! Event data structure.

use serde::{Deserialize, Serialize};

use crate::utils;

/// Placeholder stored in place of an optional field the listing omits.
///
/// Rows written before this crate existed carry the literal string, so
/// the wire shape keeps it; inside the crate absence is an `Option`.
pub const NULL_PLACEHOLDER: &str = "null";

/// An event extracted from one listing entry.
///
/// Stored keyed by `id`, so re-ingesting the same entry overwrites the
/// previous row rather than duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Detail-page link, relative to the site root; the write key
    pub id: String,

    /// Event name
    pub name: String,

    /// Calendar month abbreviation as printed on the listing
    pub month: String,

    /// Calendar day as printed on the listing
    pub day: String,

    /// Venue name
    pub location: String,

    /// Start date from the entry's microdata
    pub start_date: String,

    /// End date from the entry's microdata
    pub end_date: String,

    /// Borough, when the entry carries one
    #[serde(with = "placeholder")]
    pub borough: Option<String>,

    /// Street address, when the entry carries one
    #[serde(with = "placeholder")]
    pub street_address: Option<String>,

    /// Free-text description, when the entry carries one
    #[serde(with = "placeholder")]
    pub description: Option<String>,

    /// Category tags in listing order (empty when the entry has none)
    #[serde(with = "category_list")]
    pub categories: Vec<String>,
}

impl Event {
    /// Absolute URL of the event's detail page.
    pub fn detail_url(&self, base_url: &str) -> Option<String> {
        utils::resolve(base_url, &self.id)
    }
}

/// Serde adapter mapping `None` to the stored placeholder string.
mod placeholder {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NULL_PLACEHOLDER;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(NULL_PLACEHOLDER))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(if value == NULL_PLACEHOLDER {
            None
        } else {
            Some(value)
        })
    }
}

/// Serde adapter mapping an empty tag list to the stored placeholder string.
mod category_list {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NULL_PLACEHOLDER;

    pub fn serialize<S>(value: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_empty() {
            serializer.serialize_str(NULL_PLACEHOLDER)
        } else {
            serializer.collect_seq(value)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Tags(Vec<String>),
            Placeholder(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Tags(tags) => tags,
            Raw::Placeholder(_) => Vec::new(),
        })
    }
}
