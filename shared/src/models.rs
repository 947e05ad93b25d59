//! Weekly gym plan models

use crate::errors::PlanError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of days in a plan
pub const DAYS_PER_WEEK: usize = 7;

/// Day of the week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; DAYS_PER_WEEK] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Day for a plan index (0 = Monday)
    pub fn from_index(index: usize) -> Result<Self, PlanError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(PlanError::InvalidDay(index))
    }

    /// Plan index of this day (0 = Monday)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Workout assigned to a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkoutLabel {
    #[default]
    RestDay,
    BackAndBiceps,
    ShouldersAndTriceps,
    LegsAndCore,
    FullBody,
}

impl WorkoutLabel {
    /// Every label, in picker order
    pub const ALL: [WorkoutLabel; 5] = [
        WorkoutLabel::RestDay,
        WorkoutLabel::BackAndBiceps,
        WorkoutLabel::ShouldersAndTriceps,
        WorkoutLabel::LegsAndCore,
        WorkoutLabel::FullBody,
    ];

    /// Stored and displayed text of the label
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutLabel::RestDay => "Rest Day",
            WorkoutLabel::BackAndBiceps => "Back & Biceps",
            WorkoutLabel::ShouldersAndTriceps => "Shoulders & Triceps",
            WorkoutLabel::LegsAndCore => "Legs & Core",
            WorkoutLabel::FullBody => "Full Body",
        }
    }
}

impl fmt::Display for WorkoutLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkoutLabel {
    type Err = PlanError;

    /// Exact match only; stored values are never normalised
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| PlanError::UnknownWorkout(s.to_string()))
    }
}

impl Serialize for WorkoutLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WorkoutLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Seven workouts, Monday through Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeeklyPlan {
    days: [WorkoutLabel; DAYS_PER_WEEK],
}

impl WeeklyPlan {
    pub fn new(days: [WorkoutLabel; DAYS_PER_WEEK]) -> Self {
        Self { days }
    }

    /// Build a plan from stored strings
    ///
    /// Returns `None` unless there are exactly seven entries. Unrecognised
    /// entries become rest days and are reported back by index so the caller
    /// can log them.
    pub fn from_stored<S: AsRef<str>>(entries: &[S]) -> Option<(Self, Vec<(usize, String)>)> {
        if entries.len() != DAYS_PER_WEEK {
            return None;
        }
        let mut plan = Self::default();
        let mut rejected = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            match entry.as_ref().parse::<WorkoutLabel>() {
                Ok(label) => plan.days[index] = label,
                Err(_) => rejected.push((index, entry.as_ref().to_string())),
            }
        }
        Some((plan, rejected))
    }

    /// Stored representation: seven label strings
    pub fn to_stored(&self) -> Vec<String> {
        self.days.iter().map(|d| d.as_str().to_string()).collect()
    }

    pub fn workout(&self, day: Weekday) -> WorkoutLabel {
        self.days[day.index()]
    }

    pub fn set(&mut self, day: Weekday, workout: WorkoutLabel) {
        self.days[day.index()] = workout;
    }

    /// Iterate `(day, workout)` pairs in week order
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, WorkoutLabel)> + '_ {
        Weekday::ALL.into_iter().zip(self.days.iter().copied())
    }

    pub fn days(&self) -> &[WorkoutLabel; DAYS_PER_WEEK] {
        &self.days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_plan_is_all_rest_days() {
        let plan = WeeklyPlan::default();
        assert_eq!(plan.to_stored(), vec!["Rest Day"; 7]);
    }

    #[rstest]
    #[case("Rest Day", WorkoutLabel::RestDay)]
    #[case("Back & Biceps", WorkoutLabel::BackAndBiceps)]
    #[case("Shoulders & Triceps", WorkoutLabel::ShouldersAndTriceps)]
    #[case("Legs & Core", WorkoutLabel::LegsAndCore)]
    #[case("Full Body", WorkoutLabel::FullBody)]
    fn test_label_parsing(#[case] text: &str, #[case] expected: WorkoutLabel) {
        assert_eq!(text.parse::<WorkoutLabel>().unwrap(), expected);
        assert_eq!(expected.as_str(), text);
    }

    #[rstest]
    #[case("rest day")]
    #[case("Cardio")]
    #[case("")]
    #[case("Legs & Core ")]
    fn test_label_parsing_is_exact(#[case] text: &str) {
        assert_eq!(
            text.parse::<WorkoutLabel>(),
            Err(PlanError::UnknownWorkout(text.to_string()))
        );
    }

    #[test]
    fn test_weekday_index_mapping() {
        assert_eq!(Weekday::from_index(0).unwrap(), Weekday::Monday);
        assert_eq!(Weekday::from_index(6).unwrap(), Weekday::Sunday);
        assert_eq!(Weekday::from_index(7), Err(PlanError::InvalidDay(7)));
        for (i, day) in Weekday::ALL.iter().enumerate() {
            assert_eq!(day.index(), i);
        }
    }

    #[test]
    fn test_weekday_from_chrono() {
        assert_eq!(Weekday::from(chrono::Weekday::Mon), Weekday::Monday);
        assert_eq!(Weekday::from(chrono::Weekday::Sun), Weekday::Sunday);
    }

    #[test]
    fn test_from_stored_requires_seven_entries() {
        assert!(WeeklyPlan::from_stored(&["Rest Day"; 6]).is_none());
        assert!(WeeklyPlan::from_stored(&["Rest Day"; 8]).is_none());
        assert!(WeeklyPlan::from_stored::<&str>(&[]).is_none());
    }

    #[test]
    fn test_from_stored_substitutes_unknown_entries() {
        let stored = [
            "Full Body",
            "Cardio",
            "Rest Day",
            "Legs & Core",
            "Rest Day",
            "Yoga",
            "Back & Biceps",
        ];
        let (plan, rejected) = WeeklyPlan::from_stored(&stored).unwrap();
        assert_eq!(plan.workout(Weekday::Monday), WorkoutLabel::FullBody);
        assert_eq!(plan.workout(Weekday::Tuesday), WorkoutLabel::RestDay);
        assert_eq!(plan.workout(Weekday::Saturday), WorkoutLabel::RestDay);
        assert_eq!(plan.workout(Weekday::Sunday), WorkoutLabel::BackAndBiceps);
        assert_eq!(
            rejected,
            vec![(1, "Cardio".to_string()), (5, "Yoga".to_string())]
        );
    }

    #[test]
    fn test_set_only_touches_one_day() {
        let mut plan = WeeklyPlan::default();
        plan.set(Weekday::Thursday, WorkoutLabel::LegsAndCore);
        let stored = plan.to_stored();
        assert_eq!(stored[3], "Legs & Core");
        assert_eq!(stored.iter().filter(|s| *s == "Rest Day").count(), 6);
    }

    #[test]
    fn test_label_serializes_as_display_text() {
        let json = serde_json::to_string(&WorkoutLabel::ShouldersAndTriceps).unwrap();
        assert_eq!(json, "\"Shoulders & Triceps\"");
        assert!(serde_json::from_str::<WorkoutLabel>("\"Pilates\"").is_err());
    }
}
