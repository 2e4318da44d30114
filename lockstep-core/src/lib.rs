#![warn(missing_docs)]
//! A library for reinforcement learning on batched environments.
//!
//! Many independent episodes advance in lockstep as *lanes* of one batched
//! state. This crate provides the pieces shared by learning algorithms on
//! such environments:
//!
//! * the episode-boundary data model ([`StepKind`], [`Step`],
//!   [`Trajectory`]),
//! * a bounded per-lane experience store with uniform windowed sampling
//!   ([`replay_buffer::UniformReplayBuffer`]),
//! * bootstrapped return and advantage estimators ([`estimator`]),
//! * the trait seams agents are written against ([`Env`], [`Agent`],
//!   [`Network`], [`Optimizer`], [`Space`]).
//!
//! Environment physics, probability distributions, tensor algebra and
//! automatic differentiation are external collaborators behind these
//! traits.
pub mod error;
pub mod estimator;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Act, Agent, DiscreteSpace, Env, Info, Network, Obs, Optimizer, ReplayBufferBase, Space, Step,
    StepKind, Trajectory,
};
