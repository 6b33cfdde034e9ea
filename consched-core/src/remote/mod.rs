//! Remote schedule endpoints.

mod http;

pub use http::HttpEndpoint;

use async_trait::async_trait;

use crate::error::SchedResult;
use crate::wire::WireEvent;

/// Source of the authoritative schedule.
///
/// One call returns the full current schedule; there is no paging. Any
/// failure (network, status, decoding) fails the call as a whole.
#[async_trait]
pub trait ScheduleEndpoint: Send + Sync {
    async fn get_schedule(&self) -> SchedResult<Vec<WireEvent>>;
}
