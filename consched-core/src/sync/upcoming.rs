//! Nth upcoming event carrying a tag.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::lookup::LocalLookup;
use crate::error::{SchedError, SchedResult};
use crate::event::Event;
use crate::store::{Collation, EventStore, Field, Filter, Order, Query, SortKey};

/// A tag to search for and the 1-based position among upcoming matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCriteria {
    pub search: String,
    pub ordinal: u32,
}

impl TagCriteria {
    pub fn new(search: impl Into<String>, ordinal: u32) -> SchedResult<Self> {
        let criteria = TagCriteria {
            search: search.into(),
            ordinal,
        };
        criteria.validate()?;
        Ok(criteria)
    }

    pub fn validate(&self) -> SchedResult<()> {
        if self.ordinal < 1 {
            return Err(SchedError::Validation(format!(
                "Ordinal must be 1 or greater, got {}",
                self.ordinal
            )));
        }
        Ok(())
    }
}

/// Looks up a single upcoming event by tag and position.
///
/// Considers events whose tags contain the search term and that start
/// strictly after now, ordered by start time. `ordinal = 1` is the soonest.
#[derive(Debug, Clone)]
pub struct UpcomingByTag {
    criteria: TagCriteria,
    collation: Collation,
    now: Option<DateTime<Utc>>,
}

impl UpcomingByTag {
    pub fn new(criteria: TagCriteria) -> Self {
        UpcomingByTag {
            criteria,
            collation: Collation::default(),
            now: None,
        }
    }

    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    /// Pin "now" instead of reading the clock at every lookup.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn criteria(&self) -> &TagCriteria {
        &self.criteria
    }

    pub fn query(&self, now: DateTime<Utc>) -> Query {
        let offset = self.criteria.ordinal.saturating_sub(1) as usize;

        Query::new(Filter::AllOf(vec![
            Filter::contains(Field::Tags, self.criteria.search.as_str()),
            Filter::StartsAfter(now),
        ]))
        .order_by(Order::asc(SortKey::Start))
        .offset(offset)
        .limit(1)
        .collation(self.collation)
    }
}

#[async_trait]
impl LocalLookup for UpcomingByTag {
    type Output = Option<Event>;

    fn validate(&self) -> SchedResult<()> {
        self.criteria.validate()
    }

    async fn lookup(&self, store: &dyn EventStore) -> SchedResult<Option<Event>> {
        self.criteria.validate()?;
        let now = self.now.unwrap_or_else(Utc::now);
        store.find_one(&self.query(now)).await
    }
}
