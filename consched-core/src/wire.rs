//! Wire types as returned by the remote schedule API.
//!
//! These mirror the JSON export of the schedule service. Dates are kept as
//! raw strings here; interpreting them is the transformer's job.

use serde::{Deserialize, Serialize};

/// A panel/session as it arrives from the remote schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_key: Option<String>,
    #[serde(default)]
    pub name: String,
    /// `YYYY-MM-DD HH:MM` in the convention's local time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub speakers: Vec<Speaker>,
}

/// An official speaker running a panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
