//! Replay buffer interface.
use anyhow::Result;

/// Interface of bounded experience storage with windowed retrieval.
///
/// A replay buffer records one item per environment tick and serves
/// uniformly sampled contiguous windows of them for training. The buffer is
/// a shared mutable resource with exactly one writer assumed; concurrent use
/// requires external synchronization.
pub trait ReplayBufferBase {
    /// Configuration of the buffer.
    type Config: Clone;

    /// The item recorded per environment tick.
    type Item;

    /// The stacked window type returned by sampling.
    type Window;

    /// Builds a replay buffer from the given configuration.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Appends one item at the write cursor, evicting the oldest item once
    /// the buffer is full.
    fn record(&mut self, item: Self::Item) -> Result<()>;

    /// Draws `num_samples` contiguous windows of `step_count` items each,
    /// uniformly at random with replacement.
    ///
    /// Fails with an explicit insufficient-data error when fewer than
    /// `step_count` items are held; degenerate output is never returned.
    fn sample_windows(&mut self, num_samples: usize, step_count: usize) -> Result<Self::Window>;

    /// Number of items currently held.
    fn len(&self) -> usize;

    /// Returns `true` when nothing has been recorded.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
