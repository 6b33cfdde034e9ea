//! Predicate, ordering and paging for local event queries.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::event::Event;

/// Searchable text fields of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Category,
    Tags,
    Hosts,
    Room,
}

impl Field {
    fn value(self, event: &Event) -> &str {
        match self {
            Field::Name => &event.name,
            Field::Category => &event.category,
            Field::Tags => &event.tags,
            Field::Hosts => &event.hosts,
            Field::Room => &event.room,
        }
    }
}

/// How text comparisons treat letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collation {
    #[default]
    CaseInsensitive,
    CaseSensitive,
}

impl Collation {
    pub fn from_case_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            Collation::CaseSensitive
        } else {
            Collation::CaseInsensitive
        }
    }

    fn contains(self, haystack: &str, needle: &str) -> bool {
        match self {
            Collation::CaseSensitive => haystack.contains(needle),
            Collation::CaseInsensitive => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }

    fn equals(self, a: &str, b: &str) -> bool {
        match self {
            Collation::CaseSensitive => a == b,
            Collation::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// Predicate over stored events.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every event
    All,
    Contains { field: Field, needle: String },
    Equals { field: Field, value: String },
    /// `start` strictly after the instant
    StartsAfter(DateTime<Utc>),
    IdEquals(String),
    AnyOf(Vec<Filter>),
    AllOf(Vec<Filter>),
}

impl Filter {
    pub fn contains(field: Field, needle: impl Into<String>) -> Self {
        Filter::Contains {
            field,
            needle: needle.into(),
        }
    }

    pub fn equals(field: Field, value: impl Into<String>) -> Self {
        Filter::Equals {
            field,
            value: value.into(),
        }
    }

    pub fn matches(&self, event: &Event, collation: Collation) -> bool {
        match self {
            Filter::All => true,
            Filter::Contains { field, needle } => collation.contains(field.value(event), needle),
            Filter::Equals { field, value } => collation.equals(field.value(event), value),
            Filter::StartsAfter(instant) => event.starts_after(*instant),
            Filter::IdEquals(id) => event.id == *id,
            Filter::AnyOf(filters) => filters.iter().any(|f| f.matches(event, collation)),
            Filter::AllOf(filters) => filters.iter().all(|f| f.matches(event, collation)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Start,
    Name,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub key: SortKey,
    pub direction: Direction,
}

impl Order {
    pub fn asc(key: SortKey) -> Self {
        Order {
            key,
            direction: Direction::Ascending,
        }
    }

    pub fn desc(key: SortKey) -> Self {
        Order {
            key,
            direction: Direction::Descending,
        }
    }

    fn compare(&self, a: &Event, b: &Event) -> Ordering {
        let ord = match self.key {
            SortKey::Start => a.start.cmp(&b.start),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Id => a.id.cmp(&b.id),
        };
        match self.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }
}

/// A local lookup: filter, then order, then skip `offset`, then take `limit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub order: Vec<Order>,
    pub offset: usize,
    pub limit: Option<usize>,
    pub collation: Collation,
}

impl Query {
    pub fn new(filter: Filter) -> Self {
        Query {
            filter,
            order: Vec::new(),
            offset: 0,
            limit: None,
            collation: Collation::default(),
        }
    }

    pub fn all() -> Self {
        Self::new(Filter::All)
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new(Filter::IdEquals(id.into()))
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    /// Compare two events by the query's order, falling back to id so the
    /// result is total.
    pub fn compare(&self, a: &Event, b: &Event) -> Ordering {
        self.order
            .iter()
            .map(|o| o.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    /// Run the query over an in-memory set of events.
    pub fn apply<'a, I>(&self, events: I) -> Vec<Event>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut matched: Vec<&Event> = events
            .into_iter()
            .filter(|e| self.filter.matches(e, self.collation))
            .collect();

        matched.sort_by(|a, b| self.compare(a, b));

        matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}
