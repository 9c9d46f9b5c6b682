use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use envsync::compare::{
    CompareOptions, compare_api_keys, compare_endpoints, compare_role_permissions, compare_tables,
};
use serde::Serialize;

use crate::commands::{connect, fetch_environments};
use crate::config::EnvsyncConfig;
use crate::dump::write_snapshot;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Full Comparison",
        commands: &[
            "envsync compare                               # Run every check across configured environments",
            "envsync --output json compare                 # Machine-readable difference report",
        ],
    },
    ExampleGroup {
        title: "Selective Checks",
        commands: &[
            "envsync compare --checks schema               # Data schema only",
            "envsync compare --checks permissions,api-keys # Role permissions and custom API keys",
        ],
    },
    ExampleGroup {
        title: "Monitoring",
        commands: &[
            "envsync compare --monitor                     # Exit with an error when environments drift",
            "envsync compare --dump-dir snapshots          # Also snapshot the source environment",
        ],
    },
];

/// One comparison dimension selectable with `--checks`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Check {
    /// Tables, columns, and relations
    Schema,
    /// Role permission matrices
    Permissions,
    /// API service endpoints
    Endpoints,
    /// Custom API keys
    ApiKeys,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Path to the configuration file (defaults to the nearest envsync.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Comma-separated list of checks to run (defaults to all of them)
    #[arg(long, value_enum, value_delimiter = ',', num_args = 1..)]
    pub checks: Vec<Check>,

    /// Exit with an error when any difference is detected
    #[arg(long)]
    pub monitor: bool,

    /// Write a snapshot of the source environment into this directory
    #[arg(long, value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,
}

pub async fn handle_compare(args: CompareArgs, output: &OutputManager) -> Result<()> {
    let config = EnvsyncConfig::locate(args.config.as_deref())?;
    let checks = selected_checks(&args.checks);

    let client = connect(&config, output).await?;
    let environments = fetch_environments(&client, &config, output).await?;

    if let Some(dir) = &args.dump_dir {
        let path = write_snapshot(&environments[0], dir, &config.compare.tables_to_ignore)?;
        output.success(&format!("Snapshot written to {}", path.display()));
    }

    if environments.len() < 2 {
        output.warning("Only one environment is configured, nothing to compare");
        return Ok(());
    }

    let mut any_differences = false;

    if checks.contains(&Check::Schema) {
        output.heading("Data Schema");
        let options = CompareOptions {
            columns_to_ignore: config.compare.columns_to_ignore.clone(),
        };
        let report = compare_tables(&environments, &options);
        any_differences |= render(output, &report, report.has_differences(), "Schemas match")?;
    }

    if checks.contains(&Check::Permissions) {
        output.heading("Role Permissions");
        let report = compare_role_permissions(&environments);
        any_differences |= render(
            output,
            &report,
            report.has_differences(),
            "Role permissions match",
        )?;
    }

    if checks.contains(&Check::Endpoints) {
        output.heading("API Endpoints");
        let report = compare_endpoints(&environments);
        any_differences |= render(
            output,
            &report,
            report.has_differences(),
            "API endpoints match",
        )?;
    }

    if checks.contains(&Check::ApiKeys) {
        output.heading("Custom API Keys");
        let report = compare_api_keys(&environments);
        any_differences |= render(
            output,
            &report,
            report.has_differences(),
            "Every custom API key is present everywhere",
        )?;
    }

    if any_differences && args.monitor {
        anyhow::bail!("Differences detected");
    }

    Ok(())
}

fn selected_checks(requested: &[Check]) -> Vec<Check> {
    if requested.is_empty() {
        vec![
            Check::Schema,
            Check::Permissions,
            Check::Endpoints,
            Check::ApiKeys,
        ]
    } else {
        requested.to_vec()
    }
}

fn render<T>(
    output: &OutputManager,
    report: &T,
    has_differences: bool,
    clean_message: &str,
) -> Result<bool>
where
    T: Serialize + TableDisplay,
{
    if has_differences {
        output.display(report)?;
    } else {
        output.success(clean_message);
    }
    Ok(has_differences)
}
