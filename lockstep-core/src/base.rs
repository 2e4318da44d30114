//! Core functionalities.
mod agent;
mod env;
mod network;
mod replay_buffer;
mod space;
mod step;
mod trajectory;
pub use agent::Agent;
pub use env::Env;
pub use network::{Network, Optimizer};
pub use replay_buffer::ReplayBufferBase;
pub use space::{DiscreteSpace, Space};
use std::fmt::Debug;
pub use step::{Info, Step, StepKind};
pub use trajectory::Trajectory;

/// A set of observations of an environment, one per lane.
pub trait Obs: Clone + Debug {
    /// Returns the number of observations in the object.
    fn len(&self) -> usize;

    /// Returns `true` if the object holds no observations.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A set of actions of the environment, one per lane.
pub trait Act: Clone + Debug {
    /// Returns the number of actions in the object.
    fn len(&self) -> usize;

    /// Returns `true` if the object holds no actions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
