use anyhow::Result;
use consched_core::sync::EventCount;

use super::{Output, stream};
use crate::context::Context;

pub async fn run(ctx: &Context, json: bool) -> Result<()> {
    let output = Output {
        json,
        offline: false,
    };

    stream(ctx, EventCount, output, |count| format!("{count} events")).await
}
