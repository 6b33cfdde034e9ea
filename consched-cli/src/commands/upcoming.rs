use anyhow::Result;
use consched_core::sync::{TagCriteria, UpcomingByTag};
use owo_colors::OwoColorize;

use super::{Output, stream};
use crate::context::Context;
use crate::render::render_detail;

pub async fn run(ctx: &Context, criteria: TagCriteria, output: Output) -> Result<()> {
    let not_found = format!(
        "No upcoming event #{} tagged '{}'",
        criteria.ordinal, criteria.search
    );
    let lookup = UpcomingByTag::new(criteria).with_collation(ctx.collation());
    let tz = ctx.tz();

    stream(ctx, lookup, output, |event| match event {
        Some(event) => render_detail(event, tz),
        None => not_found.dimmed().to_string(),
    })
    .await
}
