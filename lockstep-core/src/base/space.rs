//! Spaces of environment values.
use crate::error::LockstepError;
use anyhow::Result;

/// A set of values with uniform random sampling.
///
/// Behavior policies draw exploratory actions from the environment's action
/// space through this trait.
pub trait Space {
    /// The type of values in the space.
    type Element;

    /// Returns `true` if the space contains `value`.
    fn contains(&self, value: &Self::Element) -> bool;

    /// Draws a value uniformly at random.
    fn sample(&self) -> Self::Element;
}

/// The integers `0..n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscreteSpace {
    n: i64,
}

impl DiscreteSpace {
    /// Constructs the space of integers `0..n`.
    ///
    /// Fails for `n <= 0`; an empty action space would make uniform
    /// sampling meaningless.
    pub fn new(n: i64) -> Result<Self> {
        if n <= 0 {
            return Err(LockstepError::InvalidConfig(format!(
                "discrete space size must be positive, got {}",
                n
            ))
            .into());
        }
        Ok(Self { n })
    }

    /// Number of values in the space.
    pub fn n(&self) -> i64 {
        self.n
    }
}

impl Space for DiscreteSpace {
    type Element = i64;

    fn contains(&self, value: &i64) -> bool {
        (0..self.n).contains(value)
    }

    fn sample(&self) -> i64 {
        fastrand::i64(0..self.n)
    }
}
