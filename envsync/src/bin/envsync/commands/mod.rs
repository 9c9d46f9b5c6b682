pub mod compare;
pub mod dump;
pub mod sync;

use anyhow::{Context, Result};
use envsync::{ConsoleApi, ConsoleClient, Environment};

use crate::config::EnvsyncConfig;
use crate::output::OutputManager;

/// Authenticate against the console configured in `config`.
pub async fn connect(config: &EnvsyncConfig, output: &OutputManager) -> Result<ConsoleClient> {
    let password = config.password()?;

    output.progress("Logging in to the console");
    let client = ConsoleClient::login(
        &config.console.url,
        &config.console.username,
        &password,
        config.timeout(),
    )
    .await
    .context("Console login failed")?;
    output.clear_line();
    output.verbose(&format!("authenticated against {}", config.console.url));

    Ok(client)
}

/// Fetch every configured environment, source first.
pub async fn fetch_environments(
    api: &ConsoleClient,
    config: &EnvsyncConfig,
    output: &OutputManager,
) -> Result<Vec<Environment>> {
    let mut environments = Vec::new();

    for app_id in config.app_ids() {
        output.progress(&format!("Fetching {app_id}"));
        let environment = api
            .fetch_environment(app_id)
            .await
            .with_context(|| format!("Failed to fetch environment {app_id}"))?;
        output.clear_line();
        output.verbose(&format!(
            "{}: {} table(s), {} role(s), {} service(s)",
            environment.name,
            environment.tables.len(),
            environment.roles.len(),
            environment.services.len()
        ));
        environments.push(environment);
    }

    Ok(environments)
}
