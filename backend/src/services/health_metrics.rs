//! Health metrics store
//!
//! Owns authorization against the health-data service and the four dashboard
//! slots. Each fetch runs as its own tokio task and completes independently;
//! every slot change goes through a single `watch` channel so subscribers
//! always observe whole snapshots, one notification per change.
//!
//! Errors from the service are logged and swallowed. A slot that already
//! holds a value keeps it when a later fetch fails or finds no samples.

use crate::health_data::HealthDataService;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use total_evolve_shared::{
    AuthorizationStatus, DayWindow, HealthError, HealthMetric, HealthMetricSnapshot,
    MetricQuery, MetricState,
};
use tracing::{debug, error, info, warn};

/// Source of the "today" window used by daily sums
pub trait Clock: Send + Sync {
    fn today(&self) -> DayWindow;
}

/// Local wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> DayWindow {
        DayWindow::today()
    }
}

/// Result of one completed fetch
#[derive(Debug, Clone, PartialEq)]
enum FetchOutcome {
    Value(f64),
    NoSamples,
    Unavailable,
    Failed(String),
}

struct Inner {
    service: Arc<dyn HealthDataService>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<HealthMetricSnapshot>,
    in_flight: Mutex<HashMap<HealthMetric, Vec<JoinHandle<()>>>>,
    cancel_superseded: bool,
}

/// Observable store of the four dashboard metrics
///
/// Cloning is cheap; clones share the same slots and in-flight fetches.
/// Fetch methods spawn tasks and must be called from within a tokio runtime.
#[derive(Clone)]
pub struct HealthMetricsStore {
    inner: Arc<Inner>,
}

impl HealthMetricsStore {
    /// Create a store using the system clock, cancelling superseded fetches
    pub fn new(service: Arc<dyn HealthDataService>) -> Self {
        Self::with_clock(service, Arc::new(SystemClock), true)
    }

    pub fn with_clock(
        service: Arc<dyn HealthDataService>,
        clock: Arc<dyn Clock>,
        cancel_superseded: bool,
    ) -> Self {
        let (state, _) = watch::channel(HealthMetricSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                service,
                clock,
                state,
                in_flight: Mutex::new(HashMap::new()),
                cancel_superseded,
            }),
        }
    }

    /// Current values of all slots
    pub fn snapshot(&self) -> HealthMetricSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receive a notification after every slot change
    pub fn subscribe(&self) -> watch::Receiver<HealthMetricSnapshot> {
        self.inner.state.subscribe()
    }

    /// Request read access to all four metrics, then refresh on success
    pub async fn request_authorization(&self) {
        let service = &self.inner.service;
        match service.request_authorization(&HealthMetric::ALL).await {
            Ok(()) => {
                info!(provider = service.name(), "Health data authorization granted");
                self.set_authorization(AuthorizationStatus::Authorized);
                self.refresh();
            }
            Err(HealthError::AuthorizationDenied(reason)) => {
                warn!(provider = service.name(), reason = %reason, "Health data authorization denied");
                self.set_authorization(AuthorizationStatus::Denied);
            }
            Err(e) => {
                error!(provider = service.name(), error = %e, "Error requesting health data authorization");
                self.set_authorization(AuthorizationStatus::Failed);
            }
        }
    }

    /// Start all four fetches without waiting for them
    pub fn refresh(&self) {
        debug!("Refreshing health metrics");
        for metric in HealthMetric::ALL {
            self.spawn_fetch(metric);
        }
    }

    pub fn fetch_latest_weight(&self) {
        self.spawn_fetch(HealthMetric::BodyMass);
    }

    pub fn fetch_today_protein(&self) {
        self.spawn_fetch(HealthMetric::DietaryProtein);
    }

    pub fn fetch_today_calories(&self) {
        self.spawn_fetch(HealthMetric::DietaryEnergy);
    }

    pub fn fetch_today_water(&self) {
        self.spawn_fetch(HealthMetric::DietaryWater);
    }

    /// Wait for every in-flight fetch, including ones started while waiting
    pub async fn settle(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = self
                .in_flight()
                .drain()
                .flat_map(|(_, handles)| handles)
                .collect();
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        error!(error = %e, "Health metric fetch panicked");
                    }
                }
            }
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<HealthMetric, Vec<JoinHandle<()>>>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_fetch(&self, metric: HealthMetric) {
        let mut in_flight = self.in_flight();
        let handles = in_flight.entry(metric).or_default();
        handles.retain(|h| !h.is_finished());
        if self.inner.cancel_superseded {
            for superseded in handles.drain(..) {
                debug!(metric = %metric, "Cancelling superseded fetch");
                superseded.abort();
            }
        }

        let store = self.clone();
        handles.push(tokio::spawn(async move {
            let outcome = store.fetch(metric).await;
            store.apply(metric, outcome);
        }));
    }

    async fn fetch(&self, metric: HealthMetric) -> FetchOutcome {
        let service = &self.inner.service;
        if !service.supports(metric) {
            return FetchOutcome::Unavailable;
        }

        let result = match metric.query() {
            MetricQuery::LatestSample => service
                .latest_sample(metric)
                .await
                .map(|sample| sample.map(|s| s.quantity)),
            MetricQuery::DailySum => {
                let window = self.inner.clock.today();
                service.cumulative_sum(metric, &window).await
            }
        };

        match result {
            Ok(Some(quantity)) => match quantity.value_in(metric.display_unit()) {
                Ok(value) => FetchOutcome::Value(value),
                Err(e) => FetchOutcome::Failed(e.to_string()),
            },
            Ok(None) => FetchOutcome::NoSamples,
            Err(HealthError::DataTypeUnavailable(_)) => FetchOutcome::Unavailable,
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }

    fn apply(&self, metric: HealthMetric, outcome: FetchOutcome) {
        let provider = self.inner.service.name();
        let next = match outcome {
            FetchOutcome::Value(value) => {
                debug!(metric = %metric, value, unit = %metric.display_unit(), "Health metric updated");
                MetricState::Value(value)
            }
            FetchOutcome::NoSamples => {
                debug!(metric = %metric, "No samples, leaving slot unchanged");
                return;
            }
            FetchOutcome::Unavailable => {
                warn!(metric = %metric, provider, "Data type is not available on this device");
                MetricState::Unavailable
            }
            FetchOutcome::Failed(reason) => {
                error!(metric = %metric, provider, error = %reason, "Error retrieving health metric");
                MetricState::Failed(reason)
            }
        };

        self.inner.state.send_if_modified(|snapshot| {
            let slot = snapshot.slot_mut(metric);
            // A received value is never replaced by an error state
            if (slot.has_value() && !next.has_value()) || *slot == next {
                return false;
            }
            *slot = next;
            true
        });
    }

    fn set_authorization(&self, status: AuthorizationStatus) {
        self.inner.state.send_if_modified(|snapshot| {
            if snapshot.authorization == status {
                return false;
            }
            snapshot.authorization = status;
            true
        });
    }
}
