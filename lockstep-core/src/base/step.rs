//! Batched environment steps.
use super::Env;
use serde::{Deserialize, Serialize};

/// Additional information attached to a [`Step`].
pub trait Info {}

impl Info for () {}

/// Position of one lane within its episode.
///
/// Each lane of a batched environment runs its own episode clock. Within a
/// lane's chronological trace, `First` occurs at time 0 and immediately
/// after every `Last`; exactly one `Last` closes an episode before the next
/// `First`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// The first step of an episode.
    #[default]
    First,

    /// A step that is neither the first nor the last of its episode.
    Mid,

    /// The final step of an episode.
    Last,
}

impl StepKind {
    /// Returns `true` for [`StepKind::First`].
    pub fn is_first(&self) -> bool {
        matches!(self, StepKind::First)
    }

    /// Returns `true` for [`StepKind::Mid`].
    pub fn is_mid(&self) -> bool {
        matches!(self, StepKind::Mid)
    }

    /// Returns `true` for [`StepKind::Last`].
    pub fn is_last(&self) -> bool {
        matches!(self, StepKind::Last)
    }
}

/// Represents an observation and reward tuple `(o_t, r_t)` for every lane,
/// tagged with each lane's position in its episode.
///
/// An environment emits a [`Step`] object at every interaction tick. A single
/// tick may report `First` for lanes that just reset and `Last` for lanes
/// whose episode just ended; the lanes share nothing but the batch index
/// space.
pub struct Step<E: Env> {
    /// Step kind, one per lane.
    pub kind: Vec<StepKind>,

    /// Observation.
    pub obs: E::Obs,

    /// Reward, one per lane.
    pub reward: Vec<f32>,

    /// Information defined by user.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(kind: Vec<StepKind>, obs: E::Obs, reward: Vec<f32>, info: E::Info) -> Self {
        Step {
            kind,
            obs,
            reward,
            info,
        }
    }

    /// Number of lanes in the step.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.kind.len()
    }
}
