//! Configuration of the replay buffer.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`UniformReplayBuffer`](super::UniformReplayBuffer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// Maximum number of steps held per lane. Once reached, recording a new
    /// step evicts the oldest one.
    pub max_length: usize,

    /// Number of lanes written per recorded step.
    pub n_lanes: usize,

    /// Random seed of window sampling.
    pub seed: u64,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            max_length: 10000,
            n_lanes: 1,
            seed: 42,
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the per-lane capacity of the buffer.
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Sets the number of lanes.
    pub fn n_lanes(mut self, n_lanes: usize) -> Self {
        self.n_lanes = n_lanes;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ReplayBufferConfig;
    use tempdir::TempDir;

    #[test]
    fn yaml_roundtrip() {
        let dir = TempDir::new("replay_buffer_config").unwrap();
        let path = dir.path().join("config.yaml");
        let config = ReplayBufferConfig::default()
            .max_length(128)
            .n_lanes(4)
            .seed(7);
        config.save(&path).unwrap();
        let loaded = ReplayBufferConfig::load(&path).unwrap();
        assert_eq!(config, loaded);
    }
}
