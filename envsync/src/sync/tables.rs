//! Table pass of the reconciliation engine.

use log::{error, info};

use crate::api::{ConfirmPrompt, ConsoleApi};
use crate::model::Environment;

use super::{SyncOptions, SyncStats};

/// Tables owned by the platform itself. Never created, dropped or
/// column-synced by a run.
pub const SYSTEM_TABLES: [&str; 2] = ["DeviceRegistration", "Loggers"];

pub fn is_system_table(name: &str) -> bool {
    SYSTEM_TABLES.contains(&name)
}

/// Align each target's table set with the source. Creation is considered
/// safe and applies unconditionally; removal destroys data and asks
/// first unless the run is silent. Mutation failures are logged with the
/// qualified table name and the loop keeps going.
pub async fn sync_tables(
    api: &dyn ConsoleApi,
    environments: &mut [Environment],
    options: &SyncOptions,
    prompt: &mut dyn ConfirmPrompt,
    stats: &mut SyncStats,
) {
    let Some((source, targets)) = environments.split_first_mut() else {
        return;
    };

    for target in targets {
        let for_remove: Vec<String> = target
            .tables
            .iter()
            .filter(|table| !is_system_table(&table.name) && source.table(&table.name).is_none())
            .map(|table| table.name.clone())
            .collect();
        let for_add: Vec<String> = source
            .tables
            .iter()
            .filter(|table| !is_system_table(&table.name) && target.table(&table.name).is_none())
            .map(|table| table.name.clone())
            .collect();

        for name in for_remove {
            if !options.silent {
                let message = format!(
                    "Are you sure you want to delete the table {}.{name}?",
                    target.name
                );
                if !prompt.confirm(&message) {
                    stats.skipped += 1;
                    continue;
                }
            }
            match api.remove_table(&target.id, &name).await {
                Ok(()) => {
                    // Keep the in-memory table list current so the rest
                    // of the run never sees the removed table.
                    target.tables.retain(|table| table.name != name);
                    stats.tables_removed += 1;
                    info!("removed table {}.{name}", target.name);
                }
                Err(err) => {
                    error!("{}.{name}: {err}", target.name);
                    stats.failures += 1;
                }
            }
        }

        for name in for_add {
            match api.add_table(&target.id, &name).await {
                Ok(()) => {
                    stats.tables_added += 1;
                    info!("added table {}.{name}", target.name);
                }
                Err(err) => {
                    error!("{}.{name}: {err}", target.name);
                    stats.failures += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_tables_are_recognized() {
        assert!(is_system_table("DeviceRegistration"));
        assert!(is_system_table("Loggers"));
        assert!(!is_system_table("Orders"));
    }
}
