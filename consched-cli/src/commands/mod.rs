pub mod config;
pub mod search;
pub mod show;
pub mod status;
pub mod sync;
pub mod upcoming;

use anyhow::Result;
use consched_core::error::SchedError;
use consched_core::sync::{Emission, LocalLookup, SyncReport, channel};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::context::Context;
use crate::utils::tui;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub offline: bool,
}

#[derive(Serialize)]
struct JsonEmission<'a, T: Serialize> {
    phase: &'a str,
    result: &'a T,
}

/// Run `lookup` through a sync worker and print the cached result, then the
/// refreshed one. With `offline`, only the local lookup runs.
pub async fn stream<L>(
    ctx: &Context,
    lookup: L,
    output: Output,
    render: impl Fn(&L::Output) -> String,
) -> Result<()>
where
    L: LocalLookup + 'static,
    L::Output: Serialize + 'static,
{
    if output.offline {
        lookup.validate()?;
        let result = lookup.lookup(ctx.store.as_ref()).await?;
        print_result(output, "cached", &result, &render)?;
        return Ok(());
    }

    let worker = ctx.worker(lookup);
    let (mut tx, mut rx) = channel();
    let handle = tokio::spawn(async move { worker.run(&mut tx).await });

    let mut phase = 0;
    let mut spinner = None;
    let mut failure: Option<SchedError> = None;

    while let Some(emission) = rx.recv().await {
        if let Some(s) = spinner.take() {
            tui::finish(s);
        }

        match emission {
            Emission::Next(result) => {
                let label = if phase == 0 { "cached" } else { "fresh" };
                phase += 1;
                print_result(output, label, &result, &render)?;
                if phase == 1 && !output.json {
                    spinner = Some(tui::create_spinner("Syncing schedule".to_string()));
                }
            }
            Emission::Error(e) => {
                failure = Some(e);
                break;
            }
            Emission::Completed => break,
        }
    }

    let report: SyncReport = handle.await?;
    tracing::debug!(?report, "sync finished");

    match failure {
        None => Ok(()),
        // Nothing was shown; the caller's input or the cache is the problem
        Some(e) if phase == 0 => Err(e.into()),
        Some(e) => {
            eprintln!(
                "{} {}",
                "Could not refresh schedule, showing cached results:".yellow(),
                e.to_string().red()
            );
            Ok(())
        }
    }
}

fn print_result<T: Serialize>(
    output: Output,
    phase: &str,
    result: &T,
    render: &impl Fn(&T) -> String,
) -> Result<()> {
    if output.json {
        println!(
            "{}",
            serde_json::to_string(&JsonEmission { phase, result })?
        );
        return Ok(());
    }

    if phase == "fresh" {
        println!();
        println!("{}", "Updated:".bold());
    } else {
        println!("{}", "Cached:".dimmed());
    }
    println!("{}", render(result));
    Ok(())
}
