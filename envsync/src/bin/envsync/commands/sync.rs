use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use envsync::compare::{CompareOptions, compare_tables};
use envsync::sync::{SyncOptions, SyncStats};

use crate::commands::{connect, fetch_environments};
use crate::config::EnvsyncConfig;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::prompt::TerminalPrompt;
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Guided Sync",
        commands: &[
            "envsync sync                 # Confirm each destructive change before applying it",
        ],
    },
    ExampleGroup {
        title: "Unattended Sync",
        commands: &[
            "envsync sync --silent        # Apply every change without prompting",
        ],
    },
];

#[derive(Args)]
pub struct SyncArgs {
    /// Path to the configuration file (defaults to the nearest envsync.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Apply every change without asking for confirmation
    #[arg(long)]
    pub silent: bool,
}

pub async fn handle_sync(args: SyncArgs, output: &OutputManager) -> Result<()> {
    let config = EnvsyncConfig::locate(args.config.as_deref())?;
    if config.environments.targets.is_empty() {
        anyhow::bail!("No target environments configured under [environments] targets");
    }

    let client = connect(&config, output).await?;
    let environments = fetch_environments(&client, &config, output).await?;

    output.heading("Data Schema");
    let options = CompareOptions {
        columns_to_ignore: config.compare.columns_to_ignore.clone(),
    };
    let report = compare_tables(&environments, &options);
    if !report.has_differences() {
        output.success("Schemas already match, nothing to sync");
        return Ok(());
    }
    output.display(&report)?;

    output.heading("Reconciliation");
    for target in &config.environments.targets {
        output.bullet(target);
    }
    let sync_options = SyncOptions {
        silent: args.silent,
        columns_to_ignore: config.compare.columns_to_ignore.clone(),
    };
    let mut prompt = TerminalPrompt;
    let stats = envsync::sync::run(&client, environments, &sync_options, &mut prompt)
        .await
        .context("Sync run failed")?;

    render_stats(output, &stats);
    Ok(())
}

fn render_stats(output: &OutputManager, stats: &SyncStats) {
    output.indented(ICONS.plus, &format!("{} table(s) added", stats.tables_added));
    output.indented(
        ICONS.minus,
        &format!("{} table(s) removed", stats.tables_removed),
    );
    output.indented(
        ICONS.plus,
        &format!("{} column(s) added", stats.columns_added),
    );
    output.indented(
        ICONS.changed,
        &format!("{} column(s) updated", stats.columns_updated),
    );
    output.indented(
        ICONS.minus,
        &format!("{} column(s) removed", stats.columns_removed),
    );

    if stats.skipped > 0 {
        output.info(&format!("{} change(s) skipped at the prompt", stats.skipped));
    }
    if stats.failures > 0 {
        output.error(&format!(
            "{} operation(s) failed, details are in the log",
            stats.failures
        ));
    } else {
        output.success(&format!("Sync complete, {} change(s) applied", stats.changes()));
    }
}
