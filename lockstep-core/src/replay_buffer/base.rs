//! Uniform replay buffer.
use super::{BatchBase, ReplayBufferConfig, TrajectoryWindow};
use crate::{error::LockstepError, ReplayBufferBase, StepKind, Trajectory};
use anyhow::Result;
use log::trace;
use rand::{rngs::StdRng, RngCore, SeedableRng};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// A bounded, per-lane ring store of [`Trajectory`] objects.
///
/// Conceptually the buffer holds `n_lanes` independent ring buffers of
/// capacity `max_length` steps each. Because one batched trajectory is
/// recorded per environment tick, all lanes advance their write cursor in
/// lockstep; the rings are realized as flat lane-major columns indexed by
/// `row * n_lanes + lane`.
///
/// ```mermaid
/// graph LR
///     A[Trajectory] -->|record| B[UniformReplayBuffer]
///     B -->|sample_windows| C[TrajectoryWindow]
/// ```
///
/// Sampling draws `(lane, offset)` pairs uniformly at random with
/// replacement and returns, for each draw, the contiguous ordered window of
/// trajectories starting at that offset, stacked into a time-major
/// [`TrajectoryWindow`].
///
/// # Type Parameters
///
/// * `O` - Storage of observations
/// * `A` - Storage of actions
/// * `S` - Storage of agent internal states
pub struct UniformReplayBuffer<O, A, S>
where
    O: BatchBase,
    A: BatchBase,
    S: BatchBase,
{
    /// Number of lanes.
    n_lanes: usize,

    /// Maximum number of steps held per lane.
    max_length: usize,

    /// Next row to write.
    cursor: usize,

    /// Number of rows currently held.
    size: usize,

    /// Storage of next step kinds.
    next_kind: Vec<StepKind>,

    /// Storage of observations.
    obs: O,

    /// Storage of actions.
    act: A,

    /// Storage of rewards.
    reward: Vec<f32>,

    /// Storage of agent internal states.
    state: S,

    /// Random number generator for sampling.
    rng: StdRng,
}

impl<O, A, S> UniformReplayBuffer<O, A, S>
where
    O: BatchBase,
    A: BatchBase,
    S: BatchBase,
{
    /// Number of lanes.
    pub fn n_lanes(&self) -> usize {
        self.n_lanes
    }

    /// Maximum number of steps held per lane.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Row index of the oldest stored step.
    fn oldest_row(&self) -> usize {
        if self.size < self.max_length {
            0
        } else {
            self.cursor
        }
    }

    /// Flat storage index of `(row, lane)`, with `row` counted from the
    /// oldest stored step.
    fn storage_ix(&self, row: usize, lane: usize) -> usize {
        ((self.oldest_row() + row) % self.max_length) * self.n_lanes + lane
    }

    fn sample_next_kind(&self, ixs: &[usize]) -> Vec<StepKind> {
        ixs.iter().map(|ix| self.next_kind[*ix]).collect()
    }

    fn sample_reward(&self, ixs: &[usize]) -> Vec<f32> {
        ixs.iter().map(|ix| self.reward[*ix]).collect()
    }
}

impl<O, A, S> ReplayBufferBase for UniformReplayBuffer<O, A, S>
where
    O: BatchBase,
    A: BatchBase,
    S: BatchBase,
{
    type Config = ReplayBufferConfig;
    type Item = Trajectory<O, A, S>;
    type Window = TrajectoryWindow<O, A, S>;

    fn build(config: &Self::Config) -> Result<Self> {
        if config.max_length == 0 {
            return Err(
                LockstepError::InvalidConfig("max_length must be positive".to_string()).into(),
            );
        }
        if config.n_lanes == 0 {
            return Err(
                LockstepError::InvalidConfig("n_lanes must be positive".to_string()).into(),
            );
        }
        let capacity = config.max_length * config.n_lanes;
        trace!(
            "Build a replay buffer with {} lanes x {} steps",
            config.n_lanes,
            config.max_length
        );

        Ok(Self {
            n_lanes: config.n_lanes,
            max_length: config.max_length,
            cursor: 0,
            size: 0,
            next_kind: vec![StepKind::default(); capacity],
            obs: O::new(capacity),
            act: A::new(capacity),
            reward: vec![0.; capacity],
            state: S::new(capacity),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Appends exactly one trajectory per lane at the write cursor,
    /// amortized O(1); wraps and evicts the oldest step once `max_length`
    /// steps are held.
    fn record(&mut self, item: Self::Item) -> Result<()> {
        if item.next_kind.len() != self.n_lanes {
            return Err(LockstepError::LaneMismatch {
                expected: self.n_lanes,
                got: item.next_kind.len(),
            }
            .into());
        }
        if item.reward.len() != self.n_lanes {
            return Err(LockstepError::LaneMismatch {
                expected: self.n_lanes,
                got: item.reward.len(),
            }
            .into());
        }

        let base = self.cursor * self.n_lanes;
        self.obs.push(base, item.obs);
        self.act.push(base, item.act);
        self.state.push(base, item.state);
        for (j, kind) in item.next_kind.into_iter().enumerate() {
            self.next_kind[base + j] = kind;
        }
        for (j, r) in item.reward.into_iter().enumerate() {
            self.reward[base + j] = r;
        }

        self.cursor = (self.cursor + 1) % self.max_length;
        self.size = (self.size + 1).min(self.max_length);

        Ok(())
    }

    fn sample_windows(&mut self, num_samples: usize, step_count: usize) -> Result<Self::Window> {
        if step_count == 0 {
            return Err(
                LockstepError::InvalidConfig("step_count must be positive".to_string()).into(),
            );
        }
        if self.size < step_count {
            return Err(LockstepError::InsufficientData {
                required: step_count,
                available: self.size,
            }
            .into());
        }

        let n_offsets = self.size - step_count + 1;
        let draws = (0..num_samples)
            .map(|_| {
                let lane = (self.rng.next_u32() as usize) % self.n_lanes;
                let offset = (self.rng.next_u32() as usize) % n_offsets;
                (lane, offset)
            })
            .collect::<Vec<_>>();

        let steps = (0..step_count)
            .map(|t| {
                let ixs = draws
                    .iter()
                    .map(|(lane, offset)| self.storage_ix(offset + t, *lane))
                    .collect::<Vec<_>>();
                Trajectory::new(
                    self.sample_next_kind(&ixs),
                    self.obs.sample(&ixs),
                    self.act.sample(&ixs),
                    self.sample_reward(&ixs),
                    self.state.sample(&ixs),
                )
            })
            .collect();

        Ok(TrajectoryWindow { steps })
    }

    /// Number of steps currently held per lane.
    fn len(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Buffer = UniformReplayBuffer<Vec<i64>, Vec<i64>, ()>;

    fn row(n_lanes: usize, value: i64, kind: StepKind) -> Trajectory<Vec<i64>, Vec<i64>, ()> {
        Trajectory::new(
            vec![kind; n_lanes],
            vec![value; n_lanes],
            vec![value; n_lanes],
            vec![value as f32; n_lanes],
            (),
        )
    }

    #[test]
    fn eviction_keeps_the_newest_steps_in_order() {
        let config = ReplayBufferConfig::default().max_length(3).n_lanes(1);
        let mut buffer = Buffer::build(&config).unwrap();
        for v in 1..=5 {
            buffer.record(row(1, v, StepKind::Mid)).unwrap();
        }
        assert_eq!(buffer.len(), 3);

        let window = buffer.sample_windows(1, 3).unwrap();
        let values = window
            .steps
            .iter()
            .map(|s| s.obs[0])
            .collect::<Vec<_>>();
        assert_eq!(values, vec![3, 4, 5]);
    }

    #[test]
    fn sampling_before_enough_data_is_an_explicit_error() {
        let config = ReplayBufferConfig::default().max_length(8).n_lanes(2);
        let mut buffer = Buffer::build(&config).unwrap();
        buffer.record(row(2, 1, StepKind::Mid)).unwrap();

        let err = buffer.sample_windows(4, 2).unwrap_err();
        let err = err.downcast::<LockstepError>().unwrap();
        assert!(matches!(
            err,
            LockstepError::InsufficientData {
                required: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn windows_are_contiguous_and_lane_consistent() {
        // Lane 0 stores 10, 11, 12, ...; lane 1 stores 20, 21, 22, ...
        let config = ReplayBufferConfig::default().max_length(4).n_lanes(2);
        let mut buffer = Buffer::build(&config).unwrap();
        for t in 0..6i64 {
            buffer
                .record(Trajectory::new(
                    vec![StepKind::Mid; 2],
                    vec![10 + t, 20 + t],
                    vec![0, 0],
                    vec![0., 0.],
                    (),
                ))
                .unwrap();
        }

        let window = buffer.sample_windows(32, 3).unwrap();
        assert_eq!(window.step_count(), 3);
        for draw in 0..32 {
            let first = window.steps[0].obs[draw];
            for (t, step) in window.steps.iter().enumerate() {
                let value = step.obs[draw];
                // consecutive within the drawn lane
                assert_eq!(value, first + t as i64);
                // oldest held step is t=2, so offsets stay in range
                assert!((value % 10) >= 2 && (value % 10) <= 5);
            }
        }
    }

    #[test]
    fn record_rejects_wrong_lane_count() {
        let config = ReplayBufferConfig::default().max_length(4).n_lanes(2);
        let mut buffer = Buffer::build(&config).unwrap();
        assert!(buffer.record(row(3, 1, StepKind::Mid)).is_err());
    }

    #[test]
    fn zero_sized_configs_are_rejected() {
        assert!(Buffer::build(&ReplayBufferConfig::default().max_length(0)).is_err());
        assert!(Buffer::build(&ReplayBufferConfig::default().n_lanes(0)).is_err());
    }
}
