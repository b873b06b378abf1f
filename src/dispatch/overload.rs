//! Running the electrolyser above its maximum load.
//!
//! After an overloaded hour the stack needs to recover, so it cannot overload again until
//! `recharge_hours` hours have passed without an overload.
use super::{LoadBounds, OverloadSpec};

/// Allow the electrolyser to overload wherever generation exceeds maximum load and the stack has
/// recovered from its previous overload.
///
/// # Arguments
///
/// * `generator_cf` - Blended generator capacity factors
/// * `oversize_ratio` - Ratio of generation capacity to electrolyser capacity
/// * `load` - Electrolyser load bounds
/// * `overload` - Overload parameters
/// * `clipped_cf` - Electrolyser capacity factors after clipping to load bounds
///
/// # Returns
///
/// Electrolyser capacity factors with overloading applied.
pub fn apply_overload(
    generator_cf: &[f64],
    oversize_ratio: f64,
    load: &LoadBounds,
    overload: &OverloadSpec,
    clipped_cf: &[f64],
) -> Vec<f64> {
    let mut overloaded = vec![false; generator_cf.len()];
    let mut electrolyser_cf = clipped_cf.to_vec();

    for (hour, cf) in generator_cf.iter().enumerate() {
        let candidate = cf * oversize_ratio;
        if candidate <= load.max {
            continue;
        }

        // Lockout if there was an overload in the recovery window
        let window = hour.min(overload.recharge_hours);
        let available = (1..=window).all(|lag| !overloaded[hour - lag]);
        if available {
            electrolyser_cf[hour] = candidate.min(overload.max);
            overloaded[hour] = true;
        }
    }

    electrolyser_cf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::clip_to_load_bounds;
    use crate::fixture::load_bounds;
    use rstest::rstest;

    fn run(generator_cf: &[f64], recharge_hours: usize) -> Vec<f64> {
        let load = load_bounds();
        let overload = OverloadSpec {
            max: 1.2,
            recharge_hours,
        };
        let clipped = clip_to_load_bounds(generator_cf, 1.0, &load);
        apply_overload(generator_cf, 1.0, &load, &overload, &clipped)
    }

    #[test]
    fn test_overload_first_hour() {
        // No history before the first hour, so it can always overload
        assert_eq!(run(&[1.1], 3), [1.1]);
    }

    #[test]
    fn test_overload_capped_at_max() {
        assert_eq!(run(&[1.5, 0.5], 1), [1.2, 0.5]);
    }

    #[rstest]
    #[case(1, vec![1.2, 1.0, 1.2, 1.0, 1.2])]
    #[case(2, vec![1.2, 1.0, 1.0, 1.2, 1.0])]
    #[case(4, vec![1.2, 1.0, 1.0, 1.0, 1.0])]
    fn test_overload_lockout(#[case] recharge_hours: usize, #[case] expected: Vec<f64>) {
        assert_eq!(run(&[1.3; 5], recharge_hours), expected);
    }

    #[test]
    fn test_overload_window_resets_without_overload() {
        // The hour at 0.5 doesn't overload so doesn't extend the lockout
        assert_eq!(run(&[1.3, 0.5, 1.3, 1.3], 1), [1.2, 0.5, 1.2, 1.0]);
    }

    #[test]
    fn test_overload_within_normal_bounds_untouched() {
        let generator_cf = [0.0, 0.05, 0.5, 1.0];
        let clipped = clip_to_load_bounds(&generator_cf, 1.0, &load_bounds());
        assert_eq!(run(&generator_cf, 2), clipped);
    }
}
