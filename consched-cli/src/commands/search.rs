use anyhow::Result;
use consched_core::sync::AllEventsMatching;

use super::{Output, stream};
use crate::context::Context;
use crate::render::render_listing;

pub async fn run(ctx: &Context, query: &str, output: Output) -> Result<()> {
    let lookup = AllEventsMatching::new(query).with_collation(ctx.collation());
    let tz = ctx.tz();

    stream(ctx, lookup, output, |events| render_listing(events, tz)).await
}
