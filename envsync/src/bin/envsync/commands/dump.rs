use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use envsync::ConsoleApi;

use crate::commands::connect;
use crate::config::EnvsyncConfig;
use crate::dump::write_snapshot;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Snapshots",
    commands: &[
        "envsync dump                 # Write <source>.json into ./snapshots",
        "envsync dump --out reports   # Write the snapshot into reports/",
    ],
}];

#[derive(Args)]
pub struct DumpArgs {
    /// Path to the configuration file (defaults to the nearest envsync.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory the snapshot is written into
    #[arg(long, value_name = "DIR", default_value = "snapshots")]
    pub out: PathBuf,
}

pub async fn handle_dump(args: DumpArgs, output: &OutputManager) -> Result<()> {
    let config = EnvsyncConfig::locate(args.config.as_deref())?;
    let client = connect(&config, output).await?;

    let app_id = config.environments.source.as_str();
    output.progress(&format!("Fetching {app_id}"));
    let environment = client
        .fetch_environment(app_id)
        .await
        .with_context(|| format!("Failed to fetch environment {app_id}"))?;
    output.clear_line();

    let path = write_snapshot(&environment, &args.out, &config.compare.tables_to_ignore)?;
    output.success(&format!("Snapshot written to {}", path.display()));
    output.key_value("Environment", &environment.name);
    output.key_value("Tables", &environment.tables.len().to_string());
    Ok(())
}
