//! HTTP implementation of [`ConsoleApi`] against the management console.
//!
//! Authentication is a login call that yields an `auth-key` response
//! header; every subsequent request sends that key back verbatim. Error
//! responses carry a JSON body whose `message` field is the
//! human-readable cause.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use url::Url;

use crate::api::ConsoleApi;
use crate::errors::{ApiError, ApiResult};
use crate::model::{ColumnDefinition, Environment, Table};

const AUTH_KEY_HEADER: &str = "auth-key";

/// Authenticated console client. One instance serves every environment
/// reachable under the same console URL and account.
pub struct ConsoleClient {
    http: reqwest::Client,
    base_url: Url,
    auth_key: String,
}

impl ConsoleClient {
    /// Authenticate against the console and return a ready client.
    pub async fn login(
        base_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ApiError::other(format!("invalid console url: {err}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let response = http
            .post(format!(
                "{}/console/home/login",
                base_url.as_str().trim_end_matches('/')
            ))
            .json(&json!({ "login": username, "password": password }))
            .send()
            .await?;
        let response = Self::check(response).await?;

        let auth_key = response
            .headers()
            .get(AUTH_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or(ApiError::MissingAuthToken)?;

        Ok(Self {
            http,
            base_url,
            auth_key,
        })
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.as_str().trim_end_matches('/').to_string();
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    /// Map non-success responses to [`ApiError::Console`], preferring the
    /// body's `message` over the bare status line.
    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };

        Err(ApiError::Console {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> ApiResult<T> {
        let response = self
            .http
            .get(url)
            .header(AUTH_KEY_HEADER, &self.auth_key)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

/// Wire shape of console error responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct EnvironmentMeta {
    id: String,
    name: String,
}

#[async_trait]
impl ConsoleApi for ConsoleClient {
    async fn fetch_environment(&self, app_id: &str) -> ApiResult<Environment> {
        let meta: EnvironmentMeta = self.get_json(self.url(&["console", app_id, "meta"])).await?;
        let tables = self.fetch_tables(app_id).await?;
        let roles = self
            .get_json(self.url(&["console", app_id, "security", "roles"]))
            .await?;
        let services = self
            .get_json(self.url(&["console", app_id, "api", "services"]))
            .await?;
        let api_keys = self
            .get_json(self.url(&["console", app_id, "security", "api-keys"]))
            .await?;

        Ok(Environment {
            id: meta.id,
            name: meta.name,
            tables,
            roles,
            services,
            api_keys,
        })
    }

    async fn fetch_tables(&self, app_id: &str) -> ApiResult<Vec<Table>> {
        self.get_json(self.url(&["console", app_id, "data", "tables"]))
            .await
    }

    async fn add_table(&self, app_id: &str, table: &str) -> ApiResult<()> {
        let response = self
            .http
            .post(self.url(&["console", app_id, "data", "tables"]))
            .header(AUTH_KEY_HEADER, &self.auth_key)
            .json(&json!({ "name": table }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn remove_table(&self, app_id: &str, table: &str) -> ApiResult<()> {
        let response = self
            .http
            .delete(self.url(&["console", app_id, "data", "tables", table]))
            .header(AUTH_KEY_HEADER, &self.auth_key)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn add_column(
        &self,
        app_id: &str,
        table: &str,
        column: &ColumnDefinition,
    ) -> ApiResult<()> {
        let response = self
            .http
            .post(self.url(&["console", app_id, "data", "tables", table, "columns"]))
            .header(AUTH_KEY_HEADER, &self.auth_key)
            .json(column)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_column(
        &self,
        app_id: &str,
        table: &str,
        column: &ColumnDefinition,
    ) -> ApiResult<()> {
        let response = self
            .http
            .put(self.url(&["console", app_id, "data", "tables", table, "columns", column.name()]))
            .header(AUTH_KEY_HEADER, &self.auth_key)
            .json(column)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn remove_column(&self, app_id: &str, table: &str, column: &str) -> ApiResult<()> {
        let response = self
            .http
            .delete(self.url(&["console", app_id, "data", "tables", table, "columns", column]))
            .header(AUTH_KEY_HEADER, &self.auth_key)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn bulk_update(
        &self,
        app_id: &str,
        table: &str,
        where_clause: &str,
        values: &Map<String, Value>,
    ) -> ApiResult<u64> {
        let response = self
            .http
            .put(self.url(&["console", app_id, "data", "bulk", table]))
            .header(AUTH_KEY_HEADER, &self.auth_key)
            .query(&[("where", where_clause)])
            .json(values)
            .send()
            .await?;

        // The console answers a bulk update with the affected row count.
        let count: Value = Self::check(response).await?.json().await?;
        count.as_u64().ok_or_else(|| ApiError::UnexpectedResponse {
            message: format!("bulk update returned {count} instead of a row count"),
        })
    }

    async fn cleanup(&self, app_id: &str) -> ApiResult<()> {
        let response = self
            .http
            .post(self.url(&["console", app_id, "data", "cleanup"]))
            .header(AUTH_KEY_HEADER, &self.auth_key)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
