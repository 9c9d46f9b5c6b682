//! Reconciliation engine. Reshapes every target environment's schema to
//! match the source environment (the first element of the slice).
//!
//! A run is a strict four-step sequence:
//!
//! - **Table pass**: create tables missing on a target, drop extra ones.
//! - **Refresh**: re-fetch each target's tables so server-assigned column
//!   ids and auto-created system columns are visible downstream.
//! - **Column pass**: add, update and remove columns and relations table
//!   by table, in dependency order.
//! - **Cleanup**: release residual server-side state per target.
//!
//! Every mutation is awaited before the next one starts; targets are
//! processed sequentially so confirmation prompts stay ordered. A failed
//! mutation is logged with the qualified item name and the run moves on.
//! Only a failed refresh aborts the run, because the column pass would
//! otherwise operate on stale table sets.

mod columns;
mod tables;

pub use columns::sync_columns;
pub use tables::{SYSTEM_TABLES, is_system_table, sync_tables};

use log::warn;

use crate::api::{ConfirmPrompt, ConsoleApi};
use crate::errors::ApiResult;
use crate::model::Environment;

/// Knobs for a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Bypass every confirmation prompt; destructive changes proceed
    /// automatically.
    pub silent: bool,
    /// Column names excluded from comparison and reconciliation, on top
    /// of the fixed system set.
    pub columns_to_ignore: Vec<String>,
}

/// Tally of what a run did, declined to do, or failed to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub tables_added: u32,
    pub tables_removed: u32,
    pub columns_added: u32,
    pub columns_updated: u32,
    pub columns_removed: u32,
    /// Operations skipped because a confirmation prompt was declined.
    pub skipped: u32,
    /// Per-item mutation failures that were logged and stepped over.
    pub failures: u32,
}

impl SyncStats {
    /// Total number of schema mutations that were applied.
    pub fn changes(&self) -> u32 {
        self.tables_added
            + self.tables_removed
            + self.columns_added
            + self.columns_updated
            + self.columns_removed
    }
}

/// Run the full reconciliation described above. `environments[0]` is the
/// source of truth; every other element is a target.
pub async fn run(
    api: &dyn ConsoleApi,
    mut environments: Vec<Environment>,
    options: &SyncOptions,
    prompt: &mut dyn ConfirmPrompt,
) -> ApiResult<SyncStats> {
    let mut stats = SyncStats::default();
    if environments.len() < 2 {
        warn!("sync needs a source and at least one target, nothing to do");
        return Ok(stats);
    }

    sync_tables(api, &mut environments, options, prompt, &mut stats).await;

    // Tables created in the pass above come back with server-assigned ids
    // and system columns only after a round trip.
    for environment in environments.iter_mut().skip(1) {
        environment.tables = api.fetch_tables(&environment.id).await?;
    }

    sync_columns(api, &environments, options, prompt, &mut stats).await;

    for environment in environments.iter().skip(1) {
        if let Err(err) = api.cleanup(&environment.id).await {
            warn!("cleanup failed for {}: {err}", environment.name);
        }
    }

    Ok(stats)
}
