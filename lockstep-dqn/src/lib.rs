#![warn(missing_docs)]
//! A value-based (DQN-style) agent for batched environments.
//!
//! The agent is independent of any deep learning backend: networks and
//! optimizers enter through the [`Network`](lockstep_core::Network) and
//! [`Optimizer`](lockstep_core::Optimizer) traits of
//! [`lockstep-core`](lockstep_core).
pub mod dqn;
pub use dqn::{Dqn, DqnConfig, DqnExplorer, EpsilonGreedy, Softmax};
