//! Configuration of DQN agents.
use super::explorer::{DqnExplorer, EpsilonGreedy};
use anyhow::Result;
use lockstep_core::error::LockstepError;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Dqn`](super::Dqn).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig {
    /// Number of transitions trained per sampled window. Sampling requests
    /// one extra trailing step, which supplies the next-state observations
    /// for bootstrapping.
    pub train_sequence_length: usize,

    /// Per-lane capacity of the replay buffer, in steps. Must exceed
    /// `train_sequence_length`.
    pub max_replayed_sequence_length: usize,

    /// Number of windows sampled per gradient step.
    pub batch_size: usize,

    /// Gradient steps performed per update call.
    pub n_gradient_steps_per_update: usize,

    /// Discount factor of the Bellman target.
    pub discount_factor: f32,

    /// Gradient steps between target network updates.
    pub target_update_period: usize,

    /// EMA coefficient of the target network update,
    /// `target = β * target + (1 - β) * online`. Must lie in `(0, 1]`;
    /// `1.0` freezes the target network permanently.
    pub target_update_forget_factor: f64,

    /// Behavior policy.
    pub explorer: DqnExplorer,

    /// Random seed of replay sampling.
    pub seed: u64,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            train_sequence_length: 1,
            max_replayed_sequence_length: 1000,
            batch_size: 32,
            n_gradient_steps_per_update: 1,
            discount_factor: 0.99,
            target_update_period: 1,
            target_update_forget_factor: 0.95,
            explorer: DqnExplorer::EpsilonGreedy(EpsilonGreedy::new()),
            seed: 42,
        }
    }
}

impl DqnConfig {
    /// Sets the number of transitions trained per sampled window.
    pub fn train_sequence_length(mut self, v: usize) -> Self {
        self.train_sequence_length = v;
        self
    }

    /// Sets the per-lane capacity of the replay buffer.
    pub fn max_replayed_sequence_length(mut self, v: usize) -> Self {
        self.max_replayed_sequence_length = v;
        self
    }

    /// Sets the number of windows sampled per gradient step.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the number of gradient steps per update call.
    pub fn n_gradient_steps_per_update(mut self, v: usize) -> Self {
        self.n_gradient_steps_per_update = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the number of gradient steps between target network updates.
    pub fn target_update_period(mut self, v: usize) -> Self {
        self.target_update_period = v;
        self
    }

    /// Sets the EMA coefficient of the target network update.
    pub fn target_update_forget_factor(mut self, v: f64) -> Self {
        self.target_update_forget_factor = v;
        self
    }

    /// Sets the behavior policy.
    pub fn explorer(mut self, v: DqnExplorer) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the random seed of replay sampling.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks the configuration. Construction of an agent fails on the
    /// first violated condition; no agent instance is created.
    pub fn validate(&self) -> Result<()> {
        if self.train_sequence_length == 0 {
            return Err(invalid("train_sequence_length must be positive"));
        }
        if self.train_sequence_length >= self.max_replayed_sequence_length {
            return Err(invalid(
                "train_sequence_length must be less than max_replayed_sequence_length",
            ));
        }
        if !(self.target_update_forget_factor > 0. && self.target_update_forget_factor <= 1.) {
            return Err(invalid("target_update_forget_factor must lie in (0, 1]"));
        }
        if self.target_update_period == 0 {
            return Err(invalid("target_update_period must be positive"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size must be positive"));
        }
        if self.n_gradient_steps_per_update == 0 {
            return Err(invalid("n_gradient_steps_per_update must be positive"));
        }
        if !(0. ..=1.).contains(&self.discount_factor) {
            return Err(invalid("discount_factor must lie in [0, 1]"));
        }
        Ok(())
    }

    /// Constructs [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnConfig`] to YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

fn invalid(msg: &str) -> anyhow::Error {
    LockstepError::InvalidConfig(msg.to_string()).into()
}
