//! Sample-backed health-data service
//!
//! Answers queries from an in-memory list of samples with the same semantics
//! as a device health store: the latest sample is chosen by start date, and a
//! daily sum covers samples whose start lies in the half-open day window.
//! Failures and unsupported types can be injected for tests.

use super::HealthDataService;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use total_evolve_shared::{
    DayWindow, HealthError, HealthMetric, HealthUnit, Quantity, QuantitySample,
};
use tracing::debug;

/// How an authorization request is answered
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthorizationBehavior {
    #[default]
    Grant,
    Deny,
    Fail(String),
}

#[derive(Debug, Default)]
struct Inner {
    samples: HashMap<HealthMetric, Vec<QuantitySample>>,
    unsupported: HashSet<HealthMetric>,
    failures: HashMap<HealthMetric, String>,
    delays: HashMap<HealthMetric, Duration>,
    queries: HashMap<HealthMetric, usize>,
    authorization: AuthorizationBehavior,
    authorization_requests: usize,
}

/// In-memory [`HealthDataService`]
#[derive(Debug, Default)]
pub struct InMemoryHealthService {
    inner: Mutex<Inner>,
}

/// JSON fixture: `{"samples": [...], "unsupported": [...]}`
#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    samples: Vec<FixtureSample>,
    #[serde(default)]
    unsupported: Vec<HealthMetric>,
}

#[derive(Debug, Deserialize)]
struct FixtureSample {
    metric: HealthMetric,
    value: f64,
    unit: HealthUnit,
    start: DateTime<Utc>,
    #[serde(default)]
    end: Option<DateTime<Utc>>,
}

impl InMemoryHealthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load samples from a JSON fixture file
    pub fn from_fixture_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let fixture: Fixture = serde_json::from_slice(&bytes)?;
        let service = Self::new();
        for s in fixture.samples {
            service.add_sample(
                s.metric,
                QuantitySample {
                    quantity: Quantity::new(s.value, s.unit),
                    start: s.start,
                    end: s.end.unwrap_or(s.start),
                },
            );
        }
        for metric in fixture.unsupported {
            service.set_supported(metric, false);
        }
        Ok(service)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_sample(&self, metric: HealthMetric, sample: QuantitySample) {
        self.lock().samples.entry(metric).or_default().push(sample);
    }

    /// Record an instantaneous sample
    pub fn record(&self, metric: HealthMetric, quantity: Quantity, at: DateTime<Utc>) {
        self.add_sample(metric, QuantitySample::at(quantity, at));
    }

    pub fn set_supported(&self, metric: HealthMetric, supported: bool) {
        let mut inner = self.lock();
        if supported {
            inner.unsupported.remove(&metric);
        } else {
            inner.unsupported.insert(metric);
        }
    }

    /// Make every query for `metric` fail with `reason`
    pub fn fail_queries(&self, metric: HealthMetric, reason: impl Into<String>) {
        self.lock().failures.insert(metric, reason.into());
    }

    /// Delay query responses for `metric`
    pub fn set_delay(&self, metric: HealthMetric, delay: Duration) {
        self.lock().delays.insert(metric, delay);
    }

    pub fn set_authorization(&self, behavior: AuthorizationBehavior) {
        self.lock().authorization = behavior;
    }

    /// Number of queries issued for `metric`
    pub fn query_count(&self, metric: HealthMetric) -> usize {
        self.lock().queries.get(&metric).copied().unwrap_or(0)
    }

    pub fn authorization_requests(&self) -> usize {
        self.lock().authorization_requests
    }

    /// Count the query and return its configured delay and injected failure
    fn begin_query(&self, metric: HealthMetric) -> (Option<Duration>, Option<String>) {
        let mut inner = self.lock();
        *inner.queries.entry(metric).or_default() += 1;
        (
            inner.delays.get(&metric).copied(),
            inner.failures.get(&metric).cloned(),
        )
    }

    async fn prepare_query(&self, metric: HealthMetric) -> Result<(), HealthError> {
        if !self.supports(metric) {
            return Err(HealthError::DataTypeUnavailable(metric));
        }
        let (delay, failure) = self.begin_query(metric);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(reason) => Err(HealthError::QueryFailed(reason)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HealthDataService for InMemoryHealthService {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn supports(&self, metric: HealthMetric) -> bool {
        !self.lock().unsupported.contains(&metric)
    }

    async fn request_authorization(&self, metrics: &[HealthMetric]) -> Result<(), HealthError> {
        let behavior = {
            let mut inner = self.lock();
            inner.authorization_requests += 1;
            inner.authorization.clone()
        };
        debug!(count = metrics.len(), "In-memory authorization request");
        match behavior {
            AuthorizationBehavior::Grant => Ok(()),
            AuthorizationBehavior::Deny => Err(HealthError::AuthorizationDenied(
                "read access not granted".to_string(),
            )),
            AuthorizationBehavior::Fail(reason) => Err(HealthError::QueryFailed(reason)),
        }
    }

    async fn latest_sample(
        &self,
        metric: HealthMetric,
    ) -> Result<Option<QuantitySample>, HealthError> {
        self.prepare_query(metric).await?;
        let inner = self.lock();
        Ok(inner
            .samples
            .get(&metric)
            .and_then(|samples| samples.iter().max_by_key(|s| s.start))
            .copied())
    }

    async fn cumulative_sum(
        &self,
        metric: HealthMetric,
        window: &DayWindow,
    ) -> Result<Option<Quantity>, HealthError> {
        self.prepare_query(metric).await?;
        let inner = self.lock();
        let Some(samples) = inner.samples.get(&metric) else {
            return Ok(None);
        };

        let mut sum: Option<Quantity> = None;
        for sample in samples.iter().filter(|s| window.contains(&s.start)) {
            let next = match sum {
                None => sample
                    .quantity
                    .value_in(metric.display_unit())
                    .map(|v| Quantity::new(v, metric.display_unit())),
                Some(acc) => acc.checked_add(&sample.quantity),
            };
            sum = Some(next.map_err(|e| HealthError::QueryFailed(e.to_string()))?);
        }
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, h, m, 0).unwrap()
    }

    fn window() -> DayWindow {
        DayWindow::containing(&utc(12, 0))
    }

    #[tokio::test]
    async fn test_latest_sample_by_start_date() {
        let service = InMemoryHealthService::new();
        service.record(HealthMetric::BodyMass, Quantity::new(71.0, HealthUnit::Kilogram), utc(7, 0));
        service.record(HealthMetric::BodyMass, Quantity::new(70.5, HealthUnit::Kilogram), utc(9, 0));
        service.record(HealthMetric::BodyMass, Quantity::new(72.0, HealthUnit::Kilogram), utc(8, 0));

        let latest = service.latest_sample(HealthMetric::BodyMass).await.unwrap().unwrap();
        assert_eq!(latest.quantity.value, 70.5);
        assert_eq!(service.query_count(HealthMetric::BodyMass), 1);
    }

    #[tokio::test]
    async fn test_sum_uses_half_open_window() {
        let service = InMemoryHealthService::new();
        let w = window();
        let protein = HealthMetric::DietaryProtein;
        service.record(protein, Quantity::new(30.0, HealthUnit::Gram), w.start);
        service.record(protein, Quantity::new(25.0, HealthUnit::Gram), utc(13, 0));
        service.record(protein, Quantity::new(99.0, HealthUnit::Gram), w.end);
        service.record(protein, Quantity::new(50.0, HealthUnit::Gram), w.start - chrono::Duration::seconds(1));

        let sum = service.cumulative_sum(protein, &w).await.unwrap().unwrap();
        assert_eq!(sum.unit, HealthUnit::Gram);
        assert!((sum.value - 55.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sum_converts_mixed_units() {
        let service = InMemoryHealthService::new();
        let water = HealthMetric::DietaryWater;
        service.record(water, Quantity::new(0.5, HealthUnit::Liter), utc(8, 0));
        service.record(water, Quantity::new(250.0, HealthUnit::Milliliter), utc(10, 0));

        let sum = service.cumulative_sum(water, &window()).await.unwrap().unwrap();
        assert_eq!(sum.unit, HealthUnit::Milliliter);
        assert!((sum.value - 750.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_no_samples_is_none_not_zero() {
        let service = InMemoryHealthService::new();
        let energy = HealthMetric::DietaryEnergy;
        assert_eq!(service.cumulative_sum(energy, &window()).await.unwrap(), None);

        service.record(energy, Quantity::new(0.0, HealthUnit::Kilocalorie), utc(8, 0));
        let sum = service.cumulative_sum(energy, &window()).await.unwrap();
        assert_eq!(sum, Some(Quantity::new(0.0, HealthUnit::Kilocalorie)));
    }

    #[tokio::test]
    async fn test_unsupported_type_and_injected_failure() {
        let service = InMemoryHealthService::new();
        service.set_supported(HealthMetric::DietaryWater, false);
        service.fail_queries(HealthMetric::DietaryProtein, "store offline");

        assert_eq!(
            service.cumulative_sum(HealthMetric::DietaryWater, &window()).await,
            Err(HealthError::DataTypeUnavailable(HealthMetric::DietaryWater))
        );
        assert_eq!(
            service.cumulative_sum(HealthMetric::DietaryProtein, &window()).await,
            Err(HealthError::QueryFailed("store offline".to_string()))
        );
    }

    #[tokio::test]
    async fn test_authorization_behaviors() {
        let service = InMemoryHealthService::new();
        assert!(service.request_authorization(&HealthMetric::ALL).await.is_ok());

        service.set_authorization(AuthorizationBehavior::Deny);
        assert!(matches!(
            service.request_authorization(&HealthMetric::ALL).await,
            Err(HealthError::AuthorizationDenied(_))
        ));
        assert_eq!(service.authorization_requests(), 2);
    }

    #[test]
    fn test_fixture_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(
            &path,
            r#"{
                "samples": [
                    {"metric": "body_mass", "value": 70000, "unit": "gram", "start": "2024-05-20T07:00:00Z"}
                ],
                "unsupported": ["dietary_water"]
            }"#,
        )
        .unwrap();

        let service = InMemoryHealthService::from_fixture_file(&path).unwrap();
        assert!(!service.supports(HealthMetric::DietaryWater));
        assert!(service.supports(HealthMetric::BodyMass));
        assert_eq!(service.lock().samples[&HealthMetric::BodyMass].len(), 1);
    }
}
