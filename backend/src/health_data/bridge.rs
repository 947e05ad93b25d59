//! HTTP client for a device-side health-data bridge
//!
//! The bridge runs next to the platform health store and exposes it as JSON:
//!
//! - `POST /authorization` with `{"read": [...]}` returns `{"granted": bool}`
//! - `GET /samples/{metric}/latest` returns `{"sample": null | {...}}`
//! - `GET /statistics/{metric}/sum?start=&end=` returns `{"sum": null | {...}}`
//!
//! A 404 means the data type is not available on the device.

use super::HealthDataService;
use anyhow::Result;
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use total_evolve_shared::validation::validate_quantity_value;
use total_evolve_shared::{DayWindow, HealthError, HealthMetric, Quantity, QuantitySample};
use tracing::debug;

#[derive(Serialize)]
struct AuthorizationRequest<'a> {
    read: Vec<&'a str>,
}

#[derive(Deserialize)]
struct AuthorizationResponse {
    granted: bool,
}

#[derive(Deserialize)]
struct LatestSampleResponse {
    sample: Option<QuantitySample>,
}

#[derive(Deserialize)]
struct SumResponse {
    sum: Option<Quantity>,
}

/// [`HealthDataService`] backed by a bridge process over HTTP
pub struct HttpHealthBridge {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpHealthBridge {
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(SecretString::new),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, HealthError> {
        builder
            .send()
            .await
            .map_err(|e| HealthError::QueryFailed(e.to_string()))
    }

    async fn read_json<T: DeserializeOwned>(
        metric: HealthMetric,
        response: Response,
    ) -> Result<T, HealthError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(HealthError::DataTypeUnavailable(metric));
        }
        if !status.is_success() {
            return Err(HealthError::QueryFailed(format!(
                "bridge returned {} for {}",
                status, metric
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| HealthError::QueryFailed(e.to_string()))
    }

    fn check_value(value: f64) -> Result<(), HealthError> {
        validate_quantity_value(value).map_err(HealthError::QueryFailed)
    }
}

#[async_trait]
impl HealthDataService for HttpHealthBridge {
    fn name(&self) -> &'static str {
        "bridge"
    }

    async fn request_authorization(&self, metrics: &[HealthMetric]) -> Result<(), HealthError> {
        let body = AuthorizationRequest {
            read: metrics.iter().map(|m| m.identifier()).collect(),
        };
        let response = Self::send(self.request(Method::POST, "/authorization").json(&body)).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(HealthError::AuthorizationDenied(format!(
                "bridge returned {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(HealthError::QueryFailed(format!(
                "authorization request returned {}",
                status
            )));
        }

        let parsed: AuthorizationResponse = response
            .json()
            .await
            .map_err(|e| HealthError::QueryFailed(e.to_string()))?;
        if parsed.granted {
            Ok(())
        } else {
            Err(HealthError::AuthorizationDenied(
                "read access not granted".to_string(),
            ))
        }
    }

    async fn latest_sample(
        &self,
        metric: HealthMetric,
    ) -> Result<Option<QuantitySample>, HealthError> {
        let path = format!("/samples/{}/latest", metric.identifier());
        let response = Self::send(self.request(Method::GET, &path)).await?;
        let parsed: LatestSampleResponse = Self::read_json(metric, response).await?;
        if let Some(sample) = &parsed.sample {
            Self::check_value(sample.quantity.value)?;
        }
        debug!(metric = %metric, found = parsed.sample.is_some(), "Bridge latest sample");
        Ok(parsed.sample)
    }

    async fn cumulative_sum(
        &self,
        metric: HealthMetric,
        window: &DayWindow,
    ) -> Result<Option<Quantity>, HealthError> {
        let path = format!("/statistics/{}/sum", metric.identifier());
        let query = [
            ("start", window.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("end", window.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ];
        let response = Self::send(self.request(Method::GET, &path).query(&query)).await?;
        let parsed: SumResponse = Self::read_json(metric, response).await?;
        if let Some(sum) = &parsed.sum {
            Self::check_value(sum.value)?;
        }
        debug!(metric = %metric, found = parsed.sum.is_some(), "Bridge cumulative sum");
        Ok(parsed.sum)
    }
}
