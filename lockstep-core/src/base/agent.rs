//! Agent.
use super::Env;
use crate::record::Record;
use anyhow::Result;

/// Represents a trainable policy that drives a batched environment.
///
/// An agent both selects actions and owns its training loop: one call to
/// [`Agent::update`] interacts with the environment, records experience and
/// performs the agent's configured number of gradient steps. The call is
/// atomic with respect to the agent's own state; a precondition failure
/// aborts before any mutation.
pub trait Agent<E: Env> {
    /// Chooses a batched action for the environment's current step.
    fn act(&mut self, env: &E) -> Result<E::Act>;

    /// Interacts with the environment, then trains.
    ///
    /// Interaction continues until `max_steps` completed steps or
    /// `max_episodes` completed episodes have accumulated across all lanes,
    /// whichever is reached first. Completed steps are ticks whose next step
    /// kind is not `Last`; completed episodes are ticks whose next step kind
    /// is `Last`.
    fn update(&mut self, env: &mut E, max_steps: usize, max_episodes: usize) -> Result<Record>;

    /// Set the agent to training mode: the behavior policy may explore.
    fn train(&mut self);

    /// Set the agent to evaluation mode: the behavior policy is greedy.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;
}
