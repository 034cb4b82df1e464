//! Choice of sample windows across a video.

/// Tolerance for floating-point noise when counting whole windows
/// (e.g. `0.3 / 0.1` evaluates to `2.9999999999999996`).
const WINDOW_EPSILON: f64 = 1e-9;

/// Compute the start offsets of the sampled cuts.
///
/// Strategy:
/// 1. Non-positive duration or cut length, or `max_cuts == 0`: no cuts.
/// 2. Video no longer than one cut: a single cut at `0`.
/// 3. `duration / cut_length <= max_cuts`: back-to-back windows
///    `0, cut_length, 2 * cut_length, ...` as long as each window ends
///    inside the video.
/// 4. Otherwise: exactly `max_cuts` windows spread evenly over
///    `[0, duration - cut_length]`, both ends included.
///
/// Every offset satisfies `0 <= s` and `s + cut_length <= duration`, and the
/// result is strictly increasing.
#[must_use]
pub fn plan_cuts(duration: f64, cut_length: f64, max_cuts: usize) -> Vec<f64> {
    if max_cuts == 0 || !(duration > 0.0) || !(cut_length > 0.0) || !duration.is_finite() {
        return Vec::new();
    }

    if duration <= cut_length {
        return vec![0.0];
    }

    let last_start = duration - cut_length;
    let ratio = duration / cut_length;

    if ratio <= max_cuts as f64 {
        let windows = ((ratio + WINDOW_EPSILON).floor() as usize).clamp(1, max_cuts);
        return (0..windows)
            .map(|i| (i as f64 * cut_length).min(last_start))
            .collect();
    }

    spread_evenly(last_start, max_cuts)
}

/// `count` points from `0` to `last_start` inclusive with uniform spacing.
fn spread_evenly(last_start: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![0.0];
    }

    let step = last_start / (count - 1) as f64;
    (0..count)
        .map(|i| {
            if i == count - 1 {
                last_start
            } else {
                (i as f64 * step).min(last_start)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_offsets(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 0.01, "{actual:?} vs {expected:?}");
        }
    }

    fn assert_valid_plan(plan: &[f64], duration: f64, cut_length: f64, max_cuts: usize) {
        assert!(plan.len() <= max_cuts);
        for s in plan {
            assert!(*s >= 0.0, "negative offset in {plan:?}");
            assert!(
                s + cut_length <= duration + EPS || plan == [0.0],
                "overshoot in {plan:?}"
            );
        }
        for pair in plan.windows(2) {
            assert!(pair[1] > pair[0], "not increasing: {plan:?}");
        }
    }

    #[test]
    fn test_natural_windows_when_under_cap() {
        let plan = plan_cuts(30.0, 5.0, 10);
        assert_offsets(&plan, &[0.0, 5.0, 10.0, 15.0, 20.0, 25.0]);
    }

    #[test]
    fn test_even_spread_when_over_cap() {
        let plan = plan_cuts(100.0, 5.0, 4);
        assert_offsets(&plan, &[0.0, 31.67, 63.33, 95.0]);
        assert!((plan[3] - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_short_video_gets_single_cut() {
        assert_eq!(plan_cuts(3.0, 5.0, 10), vec![0.0]);
        assert_eq!(plan_cuts(5.0, 5.0, 10), vec![0.0]);
        assert_eq!(plan_cuts(0.5, 5.0, 1), vec![0.0]);
    }

    #[test]
    fn test_partial_trailing_window_is_dropped() {
        // 32s holds six whole 5s windows; a seventh would end at 35s.
        let plan = plan_cuts(32.0, 5.0, 10);
        assert_offsets(&plan, &[0.0, 5.0, 10.0, 15.0, 20.0, 25.0]);
    }

    #[test]
    fn test_exactly_at_cap_uses_natural_windows() {
        let plan = plan_cuts(50.0, 5.0, 10);
        assert_eq!(plan.len(), 10);
        assert!((plan[9] - 45.0).abs() < EPS);
    }

    #[test]
    fn test_floating_point_window_count() {
        let plan = plan_cuts(0.3, 0.1, 10);
        assert_eq!(plan.len(), 3);
        assert_valid_plan(&plan, 0.3, 0.1, 10);
    }

    #[test]
    fn test_single_cut_cap_on_long_video() {
        assert_eq!(plan_cuts(600.0, 5.0, 1), vec![0.0]);
    }

    #[test]
    fn test_degenerate_inputs_give_empty_plan() {
        assert!(plan_cuts(0.0, 5.0, 10).is_empty());
        assert!(plan_cuts(-1.0, 5.0, 10).is_empty());
        assert!(plan_cuts(f64::NAN, 5.0, 10).is_empty());
        assert!(plan_cuts(f64::INFINITY, 5.0, 10).is_empty());
        assert!(plan_cuts(30.0, 0.0, 10).is_empty());
        assert!(plan_cuts(30.0, -5.0, 10).is_empty());
        assert!(plan_cuts(30.0, 5.0, 0).is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        assert_eq!(plan_cuts(1234.567, 3.3, 17), plan_cuts(1234.567, 3.3, 17));
    }

    #[test]
    fn test_plan_invariants_over_grid() {
        let durations = [0.1, 1.0, 4.99, 5.0, 5.01, 12.3, 59.9, 100.0, 3600.0, 7201.7];
        let cut_lengths = [0.5, 1.0, 2.5, 5.0, 7.3];
        let caps = [1, 2, 3, 10, 54];

        for &duration in &durations {
            for &cut_length in &cut_lengths {
                for &max_cuts in &caps {
                    let plan = plan_cuts(duration, cut_length, max_cuts);
                    assert!(!plan.is_empty());
                    assert_valid_plan(&plan, duration, cut_length, max_cuts);

                    if duration / cut_length > max_cuts as f64 {
                        assert_eq!(plan.len(), max_cuts);
                        if max_cuts > 1 {
                            let last = plan[plan.len() - 1];
                            assert!((last - (duration - cut_length)).abs() < EPS);
                            let step = plan[1] - plan[0];
                            for pair in plan.windows(2) {
                                assert!((pair[1] - pair[0] - step).abs() < EPS);
                            }
                        }
                    }
                }
            }
        }
    }
}
