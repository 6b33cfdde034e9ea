//! Conversion of wire records into domain events.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::constants::WIRE_DATE_FORMAT;
use crate::error::{SchedError, SchedResult};
use crate::event::Event;
use crate::wire::WireEvent;

/// Converts one representation into another.
pub trait Transformer<From, To>: Send + Sync {
    fn transform(&self, from: From) -> SchedResult<To>;

    /// Transform every item in order, stopping at the first failure.
    fn bulk_transform(&self, items: Vec<From>) -> SchedResult<Vec<To>> {
        items.into_iter().map(|item| self.transform(item)).collect()
    }
}

/// Maps remote schedule records onto [`Event`]s.
///
/// Wire timestamps carry no offset, so they are read as local time in the
/// convention's time zone.
#[derive(Debug, Clone)]
pub struct EventTransformer {
    timezone: Tz,
}

impl EventTransformer {
    pub fn new(timezone: Tz) -> Self {
        EventTransformer { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl Transformer<WireEvent, Event> for EventTransformer {
    fn transform(&self, wire: WireEvent) -> SchedResult<Event> {
        let id = wire.id.trim().to_string();
        if id.is_empty() {
            return Err(SchedError::Transform(format!(
                "Event '{}' has no id",
                wire.name
            )));
        }

        let name = wire.name.trim().to_string();
        if name.is_empty() {
            return Err(SchedError::Transform(format!("Event {id} has no name")));
        }

        let start = match non_blank(wire.event_start.as_deref()) {
            Some(value) => parse_wire_time(value, self.timezone)
                .map_err(|e| SchedError::Transform(format!("Event {id} start: {e}")))?,
            None => {
                return Err(SchedError::Transform(format!(
                    "Event {id} has no start time"
                )));
            }
        };

        let end = non_blank(wire.event_end.as_deref())
            .map(|value| parse_wire_time(value, self.timezone))
            .transpose()
            .map_err(|e| SchedError::Transform(format!("Event {id} end: {e}")))?;

        let tags = [wire.event_subtype.as_deref(), wire.tags.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join(", ");

        let hosts = wire
            .speakers
            .iter()
            .map(|s| s.name.trim())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Event {
            id,
            event_key: non_blank(wire.event_key.as_deref()).map(str::to_string),
            name,
            start,
            end,
            category: non_blank(wire.event_type.as_deref())
                .unwrap_or_default()
                .to_string(),
            tags,
            hosts,
            room: non_blank(wire.venue.as_deref())
                .unwrap_or_default()
                .to_string(),
            description: non_blank(wire.description.as_deref()).map(str::to_string),
            venue_id: non_blank(wire.venue_id.as_deref()).map(str::to_string),
        })
    }
}

/// Parse a wire timestamp.
///
/// Accepts RFC 3339, or `YYYY-MM-DD HH:MM` interpreted as local time in `tz`.
/// A local time falling in a DST fold resolves to the earlier instant; one
/// falling in a DST gap is rejected.
pub fn parse_wire_time(value: &str, tz: Tz) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, WIRE_DATE_FORMAT).map_err(|_| {
        format!("Invalid date '{value}'. Expected YYYY-MM-DD HH:MM")
    })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("'{value}' does not exist in {tz}"))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
