//! PostgREST (Supabase) backend.
//!
//! Records live in a table shaped `(id text primary key, payload jsonb)`.
//!
//! - lookup: `GET /rest/v1/{table}?id=eq.{key}&select=payload` asking for a
//!   single object; zero rows comes back as 406 with code `PGRST116`.
//! - upsert: `POST /rest/v1/{table}` with `Prefer: resolution=merge-duplicates`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

use super::RecordStore;
use crate::error::RemoteError;
use crate::identity::Identity;
use crate::storage::RemoteConfig;
use crate::streak::StreakData;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const NO_ROWS_CODE: &str = "PGRST116";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

#[derive(Debug, Deserialize)]
struct Row {
    payload: StreakData,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for a PostgREST table of streak records.
pub struct PostgrestStore {
    client: reqwest::Client,
    table_url: Url,
    anon_key: String,
    timeout_secs: u64,
}

impl PostgrestStore {
    /// Build a client from the `[remote]` config section.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let mut base = config.url.trim_end_matches('/').to_string();
        base.push_str("/rest/v1/");
        let table_url = Url::parse(&base)?.join(&config.table)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            table_url,
            anon_key: config.anon_key.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.anon_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn lookup_url(&self, key: &Identity) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", key.as_str()))
            .append_pair("select", "payload");
        url
    }

    fn transport_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            RemoteError::Network(err)
        }
    }

    /// Map a non-success response onto the error taxonomy.
    async fn error_from_response(&self, response: Response) -> RemoteError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();

        match status {
            StatusCode::NOT_ACCEPTABLE if body.code.as_deref() == Some(NO_ROWS_CODE) => {
                RemoteError::NotFound
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized {
                status: status.as_u16(),
            },
            StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited,
            _ => RemoteError::Api {
                status: status.as_u16(),
                message: body.message.unwrap_or(text),
            },
        }
    }
}

#[async_trait]
impl RecordStore for PostgrestStore {
    fn name(&self) -> &str {
        "postgrest"
    }

    async fn fetch(&self, key: &Identity) -> Result<StreakData, RemoteError> {
        let response = self
            .client
            .get(self.lookup_url(key))
            .headers(self.auth_headers())
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        // Some proxies ignore the single-object Accept header and return an array.
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let row_value = match value {
            serde_json::Value::Array(mut rows) => {
                if rows.is_empty() {
                    return Err(RemoteError::NotFound);
                }
                rows.swap_remove(0)
            }
            other => other,
        };
        let row: Row = serde_json::from_value(row_value)?;
        Ok(row.payload)
    }

    async fn upsert(&self, key: &Identity, data: &StreakData) -> Result<(), RemoteError> {
        let body = json!({
            "id": key.as_str(),
            "payload": data,
        });

        let response = self
            .client
            .post(self.table_url.clone())
            .headers(self.auth_headers())
            .header("Prefer", UPSERT_PREFER)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.error_from_response(response).await)
        }
    }
}
