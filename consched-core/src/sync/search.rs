//! Free-text search over cached events.

use async_trait::async_trait;

use super::lookup::LocalLookup;
use crate::error::SchedResult;
use crate::event::Event;
use crate::store::{Collation, EventStore, Field, Filter, Order, Query, SortKey};

/// Trimmed free text matched against several event fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria(String);

impl SearchCriteria {
    pub fn new(raw: &str) -> Self {
        SearchCriteria(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SearchCriteria {
    fn from(raw: &str) -> Self {
        SearchCriteria::new(raw)
    }
}

/// All cached events matching a search, ordered by start time then name.
///
/// Events are matched roughly by name, host, room and tags (substring), and
/// exactly by category so a category name works as a filter. Blank criteria
/// match everything.
#[derive(Debug, Clone)]
pub struct AllEventsMatching {
    criteria: SearchCriteria,
    collation: Collation,
}

impl AllEventsMatching {
    pub fn new(criteria: impl Into<SearchCriteria>) -> Self {
        AllEventsMatching {
            criteria: criteria.into(),
            collation: Collation::default(),
        }
    }

    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn query(&self) -> Query {
        let c = self.criteria.as_str();

        Query::new(Filter::AnyOf(vec![
            Filter::contains(Field::Name, c),
            Filter::equals(Field::Category, c),
            Filter::contains(Field::Tags, c),
            Filter::contains(Field::Hosts, c),
            Filter::contains(Field::Room, c),
        ]))
        .order_by(Order::asc(SortKey::Start))
        .order_by(Order::asc(SortKey::Name))
        .collation(self.collation)
    }
}

#[async_trait]
impl LocalLookup for AllEventsMatching {
    type Output = Vec<Event>;

    async fn lookup(&self, store: &dyn EventStore) -> SchedResult<Vec<Event>> {
        store.find_many(&self.query()).await
    }
}
