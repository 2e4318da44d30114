//! Environment.
use super::{Act, Info, Obs, Space, Step};
use anyhow::Result;

/// Represents a batched environment: `batch_size` independent episode lanes
/// advancing in lockstep.
///
/// Every lane keeps its own episode clock. The environment is responsible
/// for restarting a lane after it reports [`StepKind::Last`]: the following
/// tick returns [`StepKind::First`] for that lane together with a fresh
/// initial observation.
///
/// [`StepKind::Last`]: super::StepKind::Last
/// [`StepKind::First`]: super::StepKind::First
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// The space from which valid actions are drawn.
    type ActSpace: Space;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Number of lanes.
    fn batch_size(&self) -> usize;

    /// The step emitted by the most recent `reset` or `step` call.
    fn current_step(&self) -> Step<Self>
    where
        Self: Sized;

    /// Advances every lane by one tick.
    fn step(&mut self, a: &Self::Act) -> Step<Self>
    where
        Self: Sized;

    /// Restarts every lane at the beginning of a new episode.
    fn reset(&mut self) -> Step<Self>
    where
        Self: Sized;

    /// The action space of the environment.
    fn action_space(&self) -> &Self::ActSpace;
}
