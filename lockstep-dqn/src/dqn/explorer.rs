//! Exploration strategies of DQN.
use lockstep_core::Space;
use serde::{Deserialize, Serialize};

/// Behavior policies of DQN, mapping per-lane action values to actions.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum DqnExplorer {
    /// Softmax action selection.
    Softmax(Softmax),

    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),
}

impl DqnExplorer {
    /// Chooses one action per lane from `values`, one row of per-action
    /// values per lane.
    pub fn action<S: Space<Element = i64>>(&mut self, values: &[Vec<f32>], space: &S) -> Vec<i64> {
        match self {
            DqnExplorer::Softmax(softmax) => softmax.action(values),
            DqnExplorer::EpsilonGreedy(egreedy) => egreedy.action(values, space),
        }
    }
}

/// Index of the maximum value, ties resolved to the lowest index.
pub(crate) fn argmax(values: &[f32]) -> i64 {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best as i64
}

/// Greedy action per lane, used in evaluation mode.
pub(crate) fn greedy_actions(values: &[Vec<f32>]) -> Vec<i64> {
    values.iter().map(|v| argmax(v)).collect()
}

/// Softmax explorer for DQN.
///
/// Samples each lane's action from the softmax distribution of its values,
/// exploring through the network's own output distribution.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Softmax {}

#[allow(clippy::new_without_default)]
impl Softmax {
    /// Constructs softmax explorer.
    pub fn new() -> Self {
        Self {}
    }

    /// Takes an action per lane based on the action values.
    pub fn action(&mut self, values: &[Vec<f32>]) -> Vec<i64> {
        values.iter().map(|v| sample_softmax(v)).collect()
    }
}

fn sample_softmax(values: &[f32]) -> i64 {
    // max-subtraction keeps exp() finite for large magnitudes
    let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps = values.iter().map(|v| (v - max).exp()).collect::<Vec<_>>();
    let total: f32 = exps.iter().sum();
    let mut r = fastrand::f32() * total;
    for (i, e) in exps.iter().enumerate() {
        r -= e;
        if r <= 0. {
            return i as i64;
        }
    }
    values.len() as i64 - 1
}

/// Epsilon-greedy explorer for DQN.
///
/// Epsilon anneals linearly from `eps_start` to `eps_final` over
/// `final_step` ticks; a constant rate is the schedule with both ends
/// equal. Every lane flips its own coin, since lanes are independent
/// episode clocks.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Number of ticks taken so far, driving the schedule.
    pub n_ticks: usize,
    /// Epsilon at the first tick.
    pub eps_start: f64,
    /// Epsilon from `final_step` onwards.
    pub eps_final: f64,
    /// Tick at which `eps_final` is reached.
    pub final_step: usize,
}

#[allow(clippy::new_without_default)]
impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new() -> Self {
        Self {
            n_ticks: 0,
            eps_start: 1.0,
            eps_final: 0.02,
            final_step: 100_000,
        }
    }

    /// Constructs an explorer with a constant exploration rate.
    pub fn constant(eps: f64) -> Self {
        Self {
            n_ticks: 0,
            eps_start: eps,
            eps_final: eps,
            final_step: 1,
        }
    }

    /// The current exploration rate.
    pub fn eps(&self) -> f64 {
        let d = (self.eps_start - self.eps_final) / (self.final_step as f64);
        (self.eps_start - d * self.n_ticks as f64).max(self.eps_final)
    }

    /// Takes an action per lane: with probability epsilon a uniform draw
    /// from the action space, otherwise the arg-max of the lane's values.
    pub fn action<S: Space<Element = i64>>(&mut self, values: &[Vec<f32>], space: &S) -> Vec<i64> {
        let eps = self.eps();
        self.n_ticks += 1;

        values
            .iter()
            .map(|v| {
                if (fastrand::f64()) < eps {
                    space.sample()
                } else {
                    argmax(v)
                }
            })
            .collect()
    }

    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Set the epsilon value at the final step.
    pub fn eps_final(mut self, v: f64) -> Self {
        self.eps_final = v;
        self
    }

    /// Set the tick at which the final epsilon value is reached.
    pub fn final_step(mut self, v: usize) -> Self {
        self.final_step = v;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{argmax, EpsilonGreedy, Softmax};
    use lockstep_core::DiscreteSpace;

    #[test]
    fn argmax_breaks_ties_low() {
        assert_eq!(argmax(&[0., 2., 2., 1.]), 1);
        assert_eq!(argmax(&[-1., -3.]), 0);
    }

    #[test]
    fn zero_epsilon_is_deterministic_argmax() {
        let space = DiscreteSpace::new(3).unwrap();
        let mut egreedy = EpsilonGreedy::constant(0.);
        let values = vec![vec![0., 1., 0.], vec![2., 1., 0.]];
        for _ in 0..100 {
            assert_eq!(egreedy.action(&values, &space), vec![1, 0]);
        }
    }

    #[test]
    fn full_epsilon_is_statistically_uniform() {
        fastrand::seed(7);
        let space = DiscreteSpace::new(3).unwrap();
        let mut egreedy = EpsilonGreedy::constant(1.);
        // values strongly favor action 0; epsilon must override them
        let values = vec![vec![100., 0., 0.]];

        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            let a = egreedy.action(&values, &space)[0];
            counts[a as usize] += 1;
        }
        for &c in counts.iter() {
            assert!(c > 800 && c < 1200, "counts not uniform: {:?}", counts);
        }
    }

    #[test]
    fn epsilon_anneals_linearly() {
        let egreedy = EpsilonGreedy::new().eps_start(1.).eps_final(0.).final_step(10);
        let mut egreedy = egreedy;
        assert!((egreedy.eps() - 1.).abs() < 1e-9);
        egreedy.n_ticks = 5;
        assert!((egreedy.eps() - 0.5).abs() < 1e-9);
        egreedy.n_ticks = 100;
        assert!(egreedy.eps().abs() < 1e-9);
    }

    #[test]
    fn softmax_prefers_high_values() {
        fastrand::seed(11);
        let mut softmax = Softmax::new();
        let values = vec![vec![10., -10.]];
        let mut hits = 0;
        for _ in 0..100 {
            if softmax.action(&values)[0] == 0 {
                hits += 1;
            }
        }
        assert!(hits > 95);
    }
}
