use anyhow::{Result, bail};
use consched_core::store::{EventStore, Query};

use crate::context::Context;
use crate::render::render_detail;

/// Show a cached event by id. Never touches the network.
pub async fn run(ctx: &Context, id: &str, json: bool) -> Result<()> {
    let Some(event) = ctx.store.find_one(&Query::by_id(id)).await? else {
        bail!("No cached event with id '{}'. Try `consched sync` first.", id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else {
        println!("{}", render_detail(&event, ctx.tz()));
    }

    Ok(())
}
