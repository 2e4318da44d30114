//! Recorded transitions.
use super::StepKind;

/// One batched transition: for every lane, the observation the agent saw,
/// the action it took, the reward that followed and the kind of the step
/// that followed.
///
/// `state` carries the agent's internal network state at the time the
/// actions were chosen, so that recurrent agents can resume computation
/// consistently when the transition is replayed. Stateless agents store
/// `()`.
///
/// A trajectory is immutable once constructed; it is copied into the replay
/// buffer and into any per-step observer.
#[derive(Clone, Debug)]
pub struct Trajectory<O, A, S> {
    /// Step kind of the *next* step, one per lane.
    pub next_kind: Vec<StepKind>,

    /// Observations on which the actions were taken.
    pub obs: O,

    /// Actions taken.
    pub act: A,

    /// Rewards returned by the environment, one per lane.
    pub reward: Vec<f32>,

    /// Agent internal state when the actions were chosen.
    pub state: S,
}

impl<O, A, S> Trajectory<O, A, S> {
    /// Constructs a [`Trajectory`] object.
    pub fn new(next_kind: Vec<StepKind>, obs: O, act: A, reward: Vec<f32>, state: S) -> Self {
        Self {
            next_kind,
            obs,
            act,
            reward,
            state,
        }
    }

    /// Number of lanes in the transition.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.next_kind.len()
    }
}
