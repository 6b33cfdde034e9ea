use anyhow::Result;
use chrono::Utc;
use consched_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::context::Context;

pub async fn run(ctx: &Context) -> Result<()> {
    let count = ctx.store.count().await?;
    let metadata = ctx.store.metadata().await?;

    println!("{}", "Schedule".bold());
    println!("  Endpoint:   {}", ctx.endpoint.url());
    println!("  Cache:      {}", ctx.store.path().display());
    println!("  Events:     {}", count);

    match metadata {
        Some(meta) => {
            let age = (Utc::now() - meta.last_synced)
                .to_std()
                .map(|d| std::time::Duration::from_secs(d.as_secs()))
                .unwrap_or_default();
            println!(
                "  Last sync:  {} ({} ago)",
                meta.last_synced
                    .with_timezone(&ctx.tz())
                    .format("%a %b %-d %H:%M"),
                humantime::format_duration(age)
            );
        }
        None => println!("  Last sync:  {}", "never".dimmed()),
    }

    Ok(())
}
