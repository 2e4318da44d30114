//! Bootstrapped discounted returns.
use crate::StepKind;

/// Computes discounted returns over a time-major window.
///
/// For `t` from the last index down to `0`, per lane:
///
/// ```text
/// future[t]  = final_value        if t == T-1
///            = returns[t+1]       otherwise
/// returns[t] = rewards[t] + discount_factor * future[t]
/// ```
///
/// with the discounted term forced to zero wherever `step_kinds[t]` is
/// `Last`, so the recursion restarts at the immediate reward whenever a
/// lane's terminal step is crossed. `final_value` bootstraps the last step
/// of the window and defaults to zero.
///
/// `step_kinds[t]` is the kind of the step *following* the action that
/// earned `rewards[t]`, as recorded in a [`Trajectory`](crate::Trajectory).
///
/// # Panics
///
/// Panics if `step_kinds`, `rewards` and `final_value` do not agree in
/// shape. Shape mismatches are caller contract violations, not recoverable
/// conditions.
pub fn discounted_returns(
    discount_factor: f32,
    step_kinds: &[Vec<StepKind>],
    rewards: &[Vec<f32>],
    final_value: Option<&[f32]>,
) -> Vec<Vec<f32>> {
    assert_eq!(step_kinds.len(), rewards.len());
    let steps = rewards.len();
    if steps == 0 {
        return Vec::new();
    }
    let n_lanes = rewards[0].len();
    if let Some(v) = final_value {
        assert_eq!(v.len(), n_lanes);
    }

    let mut returns = vec![vec![0.; n_lanes]; steps];
    for t in (0..steps).rev() {
        assert_eq!(rewards[t].len(), n_lanes);
        assert_eq!(step_kinds[t].len(), n_lanes);
        for lane in 0..n_lanes {
            let future = if step_kinds[t][lane].is_last() {
                0.
            } else if t == steps - 1 {
                final_value.map_or(0., |v| v[lane])
            } else {
                returns[t + 1][lane]
            };
            returns[t][lane] = rewards[t][lane] + discount_factor * future;
        }
    }
    returns
}
