//! Advantage estimation.
use crate::StepKind;
use serde::{Deserialize, Serialize};

/// Advantage estimators.
///
/// All variants consume a time-major window of `(step_kinds, returns,
/// values)` plus an optional bootstrap `final_value` and produce an array
/// congruent in shape to `returns`. Estimation is pure; no argument is
/// mutated. The variant set is closed and dispatched statically.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum AdvantageEstimator {
    /// Uses the raw returns as the learning target.
    None,

    /// Simple baseline subtraction: `returns - values`.
    Empirical,

    /// Generalized advantage estimation, GAE(γ, λ).
    Generalized {
        /// Discount factor γ.
        discount_factor: f32,
        /// Exponential weighting λ of the multi-step TD residuals.
        lambda: f32,
    },
}

impl AdvantageEstimator {
    /// Estimates advantages for a time-major window.
    ///
    /// For [`AdvantageEstimator::Generalized`], the backward recursion is
    ///
    /// ```text
    /// delta[t]     = returns[t] + γ * next_value[t] - values[t]
    /// advantage[t] = delta[t] + γ * λ * advantage[t+1]
    /// ```
    ///
    /// where `next_value[T-1] = final_value`, and both `next_value[t]` and
    /// `advantage[t+1]` are forced to zero wherever `step_kinds[t]` is
    /// `Last`, mirroring the episode-reset rule of
    /// [`discounted_returns`](super::discounted_returns). With λ = 1 and an
    /// all-zero baseline the recursion collapses to the plain discounted
    /// return.
    ///
    /// # Panics
    ///
    /// Panics if the inputs consumed by the chosen variant do not agree in
    /// shape.
    pub fn estimate(
        &self,
        step_kinds: &[Vec<StepKind>],
        returns: &[Vec<f32>],
        values: &[Vec<f32>],
        final_value: Option<&[f32]>,
    ) -> Vec<Vec<f32>> {
        match self {
            AdvantageEstimator::None => returns.to_vec(),
            AdvantageEstimator::Empirical => {
                assert_eq!(returns.len(), values.len());
                returns
                    .iter()
                    .zip(values.iter())
                    .map(|(r, v)| {
                        assert_eq!(r.len(), v.len());
                        r.iter().zip(v.iter()).map(|(r, v)| r - v).collect()
                    })
                    .collect()
            }
            AdvantageEstimator::Generalized {
                discount_factor,
                lambda,
            } => generalized(*discount_factor, *lambda, step_kinds, returns, values, final_value),
        }
    }
}

fn generalized(
    discount_factor: f32,
    lambda: f32,
    step_kinds: &[Vec<StepKind>],
    returns: &[Vec<f32>],
    values: &[Vec<f32>],
    final_value: Option<&[f32]>,
) -> Vec<Vec<f32>> {
    assert_eq!(step_kinds.len(), returns.len());
    assert_eq!(values.len(), returns.len());
    let steps = returns.len();
    if steps == 0 {
        return Vec::new();
    }
    let n_lanes = returns[0].len();
    if let Some(v) = final_value {
        assert_eq!(v.len(), n_lanes);
    }

    let mut advantages = vec![vec![0.; n_lanes]; steps];
    for t in (0..steps).rev() {
        assert_eq!(returns[t].len(), n_lanes);
        assert_eq!(values[t].len(), n_lanes);
        assert_eq!(step_kinds[t].len(), n_lanes);
        for lane in 0..n_lanes {
            let (next_value, next_advantage) = if step_kinds[t][lane].is_last() {
                (0., 0.)
            } else if t == steps - 1 {
                (final_value.map_or(0., |v| v[lane]), 0.)
            } else {
                (values[t + 1][lane], advantages[t + 1][lane])
            };
            let delta = returns[t][lane] + discount_factor * next_value - values[t][lane];
            advantages[t][lane] = delta + discount_factor * lambda * next_advantage;
        }
    }
    advantages
}
