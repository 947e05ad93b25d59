//! Input validation functions
//!
//! Validation for values that cross a boundary: plan edits coming from the
//! presentation layer and quantities coming from a health-data service.

use crate::errors::PlanError;
use crate::models::{Weekday, WorkoutLabel};

/// Validate a plan day index (0 = Monday .. 6 = Sunday)
pub fn validate_day_index(day_index: usize) -> Result<Weekday, PlanError> {
    Weekday::from_index(day_index)
}

/// Validate a workout label against the fixed label set
pub fn validate_workout(label: &str) -> Result<WorkoutLabel, PlanError> {
    label.parse()
}

/// Validate a plan edit
pub fn validate_plan_edit(
    day_index: usize,
    label: &str,
) -> Result<(Weekday, WorkoutLabel), PlanError> {
    let day = validate_day_index(day_index)?;
    let workout = validate_workout(label)?;
    Ok((day, workout))
}

/// Validate a quantity value reported by a health-data service
pub fn validate_quantity_value(value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err("Quantity must be a valid number".to_string());
    }
    if value < 0.0 {
        return Err("Quantity cannot be negative".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Weekday::Monday)]
    #[case(3, Weekday::Thursday)]
    #[case(6, Weekday::Sunday)]
    fn test_valid_day_indices(#[case] index: usize, #[case] expected: Weekday) {
        assert_eq!(validate_day_index(index).unwrap(), expected);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: Every index past Sunday is rejected
        #[test]
        fn prop_out_of_range_day_rejected(index in 7usize..10_000) {
            prop_assert_eq!(validate_day_index(index), Err(PlanError::InvalidDay(index)));
        }
    }

    #[test]
    fn test_plan_edit_checks_day_before_label() {
        assert_eq!(
            validate_plan_edit(9, "Cardio"),
            Err(PlanError::InvalidDay(9))
        );
        assert_eq!(
            validate_plan_edit(2, "Cardio"),
            Err(PlanError::UnknownWorkout("Cardio".to_string()))
        );
        assert_eq!(
            validate_plan_edit(2, "Full Body"),
            Ok((Weekday::Wednesday, WorkoutLabel::FullBody))
        );
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(70.5, true)]
    #[case(-1.0, false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    fn test_quantity_value_validation(#[case] value: f64, #[case] valid: bool) {
        assert_eq!(validate_quantity_value(value).is_ok(), valid);
    }
}
