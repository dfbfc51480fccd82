//! Dining-services menu API client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use time::Date;
use tracing::{debug, warn};

use crate::config::HudsConfig;
use crate::dates::format_us;

#[derive(Debug, Error)]
pub enum HudsError {
    #[error("dining api request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("dining api returned {status}")]
    Status { status: StatusCode, body: String },
    #[error("dining api payload could not be decoded: {0}")]
    Decode(String),
    #[error("dining api base url {0} cannot take a path")]
    BaseUrl(Url),
}

impl HudsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, HudsError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// Source of dining locations, events and recipes. Payloads are passed
/// through as the provider returns them.
#[async_trait]
pub trait MenuProvider: Send + Sync {
    async fn locations(&self) -> Result<Vec<Value>, HudsError>;
    async fn events(&self, date: Option<Date>, location_id: Option<&str>)
        -> Result<Vec<Value>, HudsError>;
    async fn recipes(&self, date: Option<Date>, location_id: Option<&str>)
        -> Result<Vec<Value>, HudsError>;
    async fn recipe(&self, id: &str) -> Result<Value, HudsError>;
}

pub struct HudsClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HudsClient {
    pub fn new(cfg: &HudsConfig) -> anyhow::Result<Self> {
        Self::with_timeout(&cfg.base_url, &cfg.api_key, cfg.timeout)
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid dining api url {base_url:?}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("dining api url {base_url} cannot take a path");
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build dining api http client")?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    /// Base URL plus `segments`, each percent-encoded as a single path
    /// segment. `.` and `..` segments are dropped.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, HudsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HudsError::BaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url, params: &[(&str, String)]) -> Result<Value, HudsError> {
        debug!(%url, ?params, "dining api request");
        let response = self
            .client
            .get(url.clone())
            .header("X-Api-Key", self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let body: String = String::from_utf8_lossy(&body).chars().take(512).collect();
            warn!(%status, %url, "dining api error status");
            return Err(HudsError::Status { status, body });
        }
        serde_json::from_slice(&body).map_err(|e| HudsError::Decode(e.to_string()))
    }

    async fn get_list(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Value>, HudsError> {
        match self.get(self.endpoint(&[path])?, params).await? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(HudsError::Decode(format!(
                "expected an array from {path}, got {}",
                kind_of(&other)
            ))),
        }
    }
}

fn filter_params(date: Option<Date>, location_id: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(2);
    if let Some(date) = date {
        params.push(("date", format_us(date)));
    }
    if let Some(id) = location_id.filter(|id| !id.is_empty()) {
        params.push(("locationId", id.to_string()));
    }
    params
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl MenuProvider for HudsClient {
    async fn locations(&self) -> Result<Vec<Value>, HudsError> {
        self.get_list("locations", &[]).await
    }

    async fn events(
        &self,
        date: Option<Date>,
        location_id: Option<&str>,
    ) -> Result<Vec<Value>, HudsError> {
        self.get_list("events", &filter_params(date, location_id)).await
    }

    async fn recipes(
        &self,
        date: Option<Date>,
        location_id: Option<&str>,
    ) -> Result<Vec<Value>, HudsError> {
        self.get_list("recipes", &filter_params(date, location_id)).await
    }

    async fn recipe(&self, id: &str) -> Result<Value, HudsError> {
        self.get(self.endpoint(&["recipes", id])?, &[]).await
    }
}
