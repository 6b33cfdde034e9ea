//! Domain event type.
//!
//! An `Event` is a single scheduled convention session (panel, workshop,
//! screening, ...). Events are produced by the transformer from wire
//! records and are the only thing the local store holds.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled convention session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Globally unique id, used as the storage key
    pub id: String,
    /// Secondary key assigned by the remote schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_key: Option<String>,
    pub name: String,
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Event type, e.g. "Programming" or "Room Parties"
    #[serde(default)]
    pub category: String,
    /// Free-text tags, searched by substring
    #[serde(default)]
    pub tags: String,
    /// Comma-separated host names
    #[serde(default)]
    pub hosts: String,
    #[serde(default)]
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
}

impl Event {
    /// Whether the event starts strictly after `instant`.
    pub fn starts_after(&self, instant: DateTime<Utc>) -> bool {
        self.start > instant
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
