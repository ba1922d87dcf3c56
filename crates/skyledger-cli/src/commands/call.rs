//! Resource call commands.
//!
//! `skyledger call` - One page, printed as a pretty JSON replay.
//! `skyledger sync` - The whole cursor chain, one JSON replay per line.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use skyledger_core::Replay;
use skyledger_core::config::SkyledgerConfig;
use skyledger_runtime::{SyncEngine, SyncError};
use std::future::Future;
use std::io::Write;

pub async fn call(
    engine: &SyncEngine,
    config: &SkyledgerConfig,
    resource: &str,
    args: Map<String, Value>,
) -> Result<()> {
    let credential = config
        .credential
        .resolve()
        .context("Failed to resolve vendor credential")?;
    let replay = engine.call(resource, &args, &credential).await?;
    println!("{}", serde_json::to_string_pretty(&replay)?);
    Ok(())
}

pub async fn sync(
    engine: &SyncEngine,
    config: &SkyledgerConfig,
    resource: &str,
    args: Map<String, Value>,
) -> Result<()> {
    let credential = config
        .credential
        .resolve()
        .context("Failed to resolve vendor credential")?;
    let credential = &credential;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = drive(
        resource,
        args,
        config.sync.max_pages,
        |args| async move { engine.call(resource, &args, credential).await },
        |replay| {
            serde_json::to_writer(&mut out, replay)?;
            writeln!(out)?;
            Ok(())
        },
    )
    .await?;

    eprintln!(
        "{}: {} page(s), {} record(s)",
        resource, summary.pages, summary.records
    );
    Ok(())
}

/// Totals of one completed chain.
#[derive(Debug, Default, PartialEq)]
struct ChainSummary {
    pages: u32,
    records: usize,
}

/// Call `fetch` from the caller's marker until the cursor is exhausted,
/// handing every replay to `emit`. Fails when `max_pages` calls did not
/// reach the end.
async fn drive<F, Fut>(
    resource: &str,
    mut args: Map<String, Value>,
    max_pages: u32,
    mut fetch: F,
    mut emit: impl FnMut(&Replay) -> Result<()>,
) -> Result<ChainSummary>
where
    F: FnMut(Map<String, Value>) -> Fut,
    Fut: Future<Output = Result<Replay, SyncError>>,
{
    let mut summary = ChainSummary::default();
    while summary.pages < max_pages {
        let replay = fetch(args.clone())
            .await
            .with_context(|| format!("{} failed after {} page(s)", resource, summary.pages))?;
        summary.pages += 1;
        summary.records += replay.result.len();
        emit(&replay)?;

        if replay.is_terminal() {
            tracing::info!(
                resource,
                pages = summary.pages,
                records = summary.records,
                "chain complete"
            );
            return Ok(summary);
        }
        args.insert("marker".to_string(), Value::String(replay.next));
    }
    bail!("{} did not finish within {} pages", resource, max_pages)
}
