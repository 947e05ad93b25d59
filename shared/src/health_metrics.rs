//! Health metric types shown on the dashboard
//!
//! Four metrics are tracked: the most recent body weight and today's
//! cumulative protein, energy and water intake. Each one occupies an
//! independent slot in a [`HealthMetricSnapshot`].

use crate::units::{HealthUnit, Quantity};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Metric Kinds
// ============================================================================

/// How a metric is read from the health-data service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricQuery {
    /// Single most recent sample, sorted by start date descending
    LatestSample,
    /// Cumulative sum over today's window
    DailySum,
}

/// Health data category read by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthMetric {
    BodyMass,
    DietaryProtein,
    DietaryEnergy,
    DietaryWater,
}

impl HealthMetric {
    /// Every metric, in dashboard order
    pub const ALL: [HealthMetric; 4] = [
        HealthMetric::BodyMass,
        HealthMetric::DietaryProtein,
        HealthMetric::DietaryEnergy,
        HealthMetric::DietaryWater,
    ];

    /// Stable identifier used on the wire and in fixtures
    pub fn identifier(&self) -> &'static str {
        match self {
            HealthMetric::BodyMass => "body_mass",
            HealthMetric::DietaryProtein => "dietary_protein",
            HealthMetric::DietaryEnergy => "dietary_energy",
            HealthMetric::DietaryWater => "dietary_water",
        }
    }

    /// Unit the dashboard displays this metric in
    pub fn display_unit(&self) -> HealthUnit {
        match self {
            HealthMetric::BodyMass => HealthUnit::Kilogram,
            HealthMetric::DietaryProtein => HealthUnit::Gram,
            HealthMetric::DietaryEnergy => HealthUnit::Kilocalorie,
            HealthMetric::DietaryWater => HealthUnit::Milliliter,
        }
    }

    pub fn query(&self) -> MetricQuery {
        match self {
            HealthMetric::BodyMass => MetricQuery::LatestSample,
            _ => MetricQuery::DailySum,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            HealthMetric::BodyMass => "Weight",
            HealthMetric::DietaryProtein => "Protein",
            HealthMetric::DietaryEnergy => "Calories",
            HealthMetric::DietaryWater => "Water",
        }
    }
}

impl fmt::Display for HealthMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl std::str::FromStr for HealthMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HealthMetric::ALL
            .into_iter()
            .find(|m| m.identifier() == s)
            .ok_or_else(|| format!("Unknown health metric: {}", s))
    }
}

// ============================================================================
// Samples and Windows
// ============================================================================

/// A single quantity sample recorded by the health-data service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantitySample {
    pub quantity: Quantity,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QuantitySample {
    /// Create an instantaneous sample
    pub fn at(quantity: Quantity, instant: DateTime<Utc>) -> Self {
        Self {
            quantity,
            start: instant,
            end: instant,
        }
    }
}

/// Half-open time window `[start, end)` covering one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window for the calendar day containing `instant`, in `instant`'s time zone
    pub fn containing<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let tz = instant.timezone();
        let day = instant.date_naive();
        let start = start_of_day(&tz, day);
        let end = match day.succ_opt() {
            Some(next) => start_of_day(&tz, next),
            None => start + Duration::days(1),
        };
        Self { start, end }
    }

    /// Window for today in the local time zone
    pub fn today() -> Self {
        Self::containing(&chrono::Local::now())
    }

    /// Whether a sample starting at `instant` falls in this window
    ///
    /// The start bound is inclusive and the end bound exclusive.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST transition
        None => tz.from_utc_datetime(&midnight).with_timezone(&Utc),
    }
}

// ============================================================================
// Observable State
// ============================================================================

/// State of a single dashboard slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum MetricState {
    /// No fetch has completed yet
    #[default]
    Loading,
    /// Converted value in the metric's display unit
    Value(f64),
    /// Data type not supported on this device
    Unavailable,
    /// Query failed before any value was received
    Failed(String),
}

impl MetricState {
    /// The value, if one has been received this session
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricState::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn has_value(&self) -> bool {
        matches!(self, MetricState::Value(_))
    }
}

/// Authorization against the health-data service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Authorized,
    Denied,
    Failed,
}

/// Current values of the four dashboard metrics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthMetricSnapshot {
    pub authorization: AuthorizationStatus,
    pub weight: MetricState,
    pub protein: MetricState,
    pub calories: MetricState,
    pub water: MetricState,
}

impl HealthMetricSnapshot {
    pub fn slot(&self, metric: HealthMetric) -> &MetricState {
        match metric {
            HealthMetric::BodyMass => &self.weight,
            HealthMetric::DietaryProtein => &self.protein,
            HealthMetric::DietaryEnergy => &self.calories,
            HealthMetric::DietaryWater => &self.water,
        }
    }

    pub fn slot_mut(&mut self, metric: HealthMetric) -> &mut MetricState {
        match metric {
            HealthMetric::BodyMass => &mut self.weight,
            HealthMetric::DietaryProtein => &mut self.protein,
            HealthMetric::DietaryEnergy => &mut self.calories,
            HealthMetric::DietaryWater => &mut self.water,
        }
    }

    /// Latest body weight in kilograms
    pub fn weight_kg(&self) -> Option<f64> {
        self.weight.value()
    }

    /// Today's protein in grams
    pub fn protein_g(&self) -> Option<f64> {
        self.protein.value()
    }

    /// Today's energy intake in kilocalories
    pub fn calories_kcal(&self) -> Option<f64> {
        self.calories.value()
    }

    /// Today's water intake in millilitres
    pub fn water_ml(&self) -> Option<f64> {
        self.water.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use proptest::prelude::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_window_bounds_in_utc() {
        let window = DayWindow::containing(&utc(2024, 3, 12, 15, 30));
        assert_eq!(window.start, utc(2024, 3, 12, 0, 0));
        assert_eq!(window.end, utc(2024, 3, 13, 0, 0));
    }

    #[test]
    fn test_window_start_inclusive_end_exclusive() {
        let window = DayWindow::containing(&utc(2024, 3, 12, 9, 0));
        assert!(window.contains(&window.start));
        assert!(!window.contains(&window.end));
        assert!(window.contains(&(window.end - Duration::nanoseconds(1))));
        assert!(!window.contains(&(window.start - Duration::seconds(1))));
    }

    #[test]
    fn test_window_follows_local_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = tz.with_ymd_and_hms(2024, 6, 1, 1, 0, 0).unwrap();
        let window = DayWindow::containing(&local);
        // Local midnight at +02:00 is 22:00 UTC the previous day
        assert_eq!(window.start, utc(2024, 5, 31, 22, 0));
        assert_eq!(window.end, utc(2024, 6, 1, 22, 0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: The window always contains the instant it was built from
        #[test]
        fn prop_window_contains_its_instant(secs in 0i64..4_000_000_000) {
            let instant = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            let window = DayWindow::containing(&instant);
            prop_assert!(window.contains(&instant));
            prop_assert_eq!(window.end - window.start, Duration::days(1));
        }
    }

    #[test]
    fn test_metric_state_value() {
        assert_eq!(MetricState::Loading.value(), None);
        assert_eq!(MetricState::Unavailable.value(), None);
        assert_eq!(MetricState::Failed("boom".into()).value(), None);
        assert_eq!(MetricState::Value(70.0).value(), Some(70.0));
    }

    #[test]
    fn test_new_snapshot_is_all_loading() {
        let snapshot = HealthMetricSnapshot::default();
        assert_eq!(snapshot.authorization, AuthorizationStatus::NotDetermined);
        for metric in HealthMetric::ALL {
            assert_eq!(snapshot.slot(metric), &MetricState::Loading);
        }
        assert_eq!(snapshot.weight_kg(), None);
        assert_eq!(snapshot.water_ml(), None);
    }

    #[test]
    fn test_slot_mut_targets_matching_field() {
        let mut snapshot = HealthMetricSnapshot::default();
        *snapshot.slot_mut(HealthMetric::DietaryProtein) = MetricState::Value(120.0);
        assert_eq!(snapshot.protein_g(), Some(120.0));
        assert_eq!(snapshot.calories_kcal(), None);
    }

    #[test]
    fn test_metric_identifier_roundtrip() {
        for metric in HealthMetric::ALL {
            assert_eq!(metric.identifier().parse::<HealthMetric>().unwrap(), metric);
        }
        assert!("step_count".parse::<HealthMetric>().is_err());
    }

    #[test]
    fn test_metric_state_serialization() {
        let json = serde_json::to_value(MetricState::Value(2.5)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "value", "detail": 2.5}));
        let json = serde_json::to_value(MetricState::Loading).unwrap();
        assert_eq!(json, serde_json::json!({"status": "loading"}));
    }
}
