//! External interfaces consumed by the comparison and sync pipeline.
//!
//! The core never talks HTTP directly: everything goes through
//! [`ConsoleApi`], so the executor can run against the real console
//! ([`crate::client::ConsoleClient`]) or an in-memory double in tests.
//! Interactive confirmation is likewise abstracted behind
//! [`ConfirmPrompt`].

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ApiResult;
use crate::model::{ColumnDefinition, Environment, Table};

/// Mutating and fetching operations of the backend console, scoped by
/// application id. Implementations own all transport and auth concerns.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Fetch one environment in full: tables, roles, services, API keys.
    async fn fetch_environment(&self, app_id: &str) -> ApiResult<Environment>;

    /// Fetch only the data tables, used to refresh an environment between
    /// the table pass and the column pass.
    async fn fetch_tables(&self, app_id: &str) -> ApiResult<Vec<Table>>;

    async fn add_table(&self, app_id: &str, table: &str) -> ApiResult<()>;

    async fn remove_table(&self, app_id: &str, table: &str) -> ApiResult<()>;

    async fn add_column(
        &self,
        app_id: &str,
        table: &str,
        column: &ColumnDefinition,
    ) -> ApiResult<()>;

    async fn update_column(
        &self,
        app_id: &str,
        table: &str,
        column: &ColumnDefinition,
    ) -> ApiResult<()>;

    async fn remove_column(&self, app_id: &str, table: &str, column: &str) -> ApiResult<()>;

    /// Set `values` on every row of `table` matching `where_clause`.
    /// Returns the number of rows affected.
    async fn bulk_update(
        &self,
        app_id: &str,
        table: &str,
        where_clause: &str,
        values: &Map<String, Value>,
    ) -> ApiResult<u64>;

    /// Release residual server-side state (caches) after a sync run.
    async fn cleanup(&self, app_id: &str) -> ApiResult<()>;
}

/// Blocking yes/no prompt shown before destructive sync operations.
/// Bypassed entirely in silent mode.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}
