//! Uniform replay buffer for batched environments.
//!
//! This module provides streaming storage and uniform windowed retrieval of
//! experience, independently per lane:
//! - [`BatchBase`], the storage interface for lane-major columns
//! - [`UniformReplayBuffer`], a bounded per-lane ring store of trajectories
//! - [`TrajectoryWindow`], the time-major stack returned by sampling
mod base;
mod batch;
mod config;
pub use base::UniformReplayBuffer;
pub use batch::{BatchBase, TrajectoryWindow};
pub use config::ReplayBufferConfig;
