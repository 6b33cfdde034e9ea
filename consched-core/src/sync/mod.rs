//! Sync workers: emit the cached result, refresh the cache from the remote
//! schedule, emit the refreshed result.

pub mod emission;
mod lookup;
mod search;
mod upcoming;
mod worker;

pub use emission::{
    ChannelSubscriber, CollectingSubscriber, Emission, EmissionStream, Emitter, FnSubscriber,
    Subscriber, channel,
};
pub use lookup::{EventCount, LocalLookup};
pub use search::{AllEventsMatching, SearchCriteria};
pub use upcoming::{TagCriteria, UpcomingByTag};
pub use worker::{SyncReport, SyncWorker};
