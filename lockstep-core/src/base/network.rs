//! Action-value networks and optimizers.
//!
//! Tensor algebra and automatic differentiation are external collaborators.
//! The seam is explicit: the training loop computes the gradient of its loss
//! with respect to the network output and hands it to [`Network::backward`],
//! which turns it into a parameter gradient for an [`Optimizer`] to apply.
use crate::replay_buffer::BatchBase;

/// A trainable action-value network.
///
/// [`Network::forward`] maps a batch of observations to one row of
/// per-action values per batch element. Recurrent networks expose their
/// internal state through [`Network::state`] and [`Network::set_state`] so
/// that replayed windows can resume computation from the state recorded at
/// interaction time; stateless networks use `()`.
pub trait Network {
    /// Batched input of the network.
    type Input;

    /// Internal recurrent state. Stateless networks use `()`.
    type State: BatchBase + Clone;

    /// Parameter gradient accumulator.
    type Gradient;

    /// Computes per-action values, one row per batch element.
    fn forward(&mut self, input: &Self::Input) -> Vec<Vec<f32>>;

    /// Accumulates into `grad` the parameter gradient for `input`, given the
    /// gradient of the loss with respect to the forward output.
    fn backward(
        &mut self,
        input: &Self::Input,
        grad_output: &[Vec<f32>],
        grad: &mut Self::Gradient,
    );

    /// Returns a zeroed gradient accumulator.
    fn zero_gradient(&self) -> Self::Gradient;

    /// Captures the current internal state.
    fn state(&self) -> Self::State;

    /// Restores an internal state captured by [`Network::state`].
    fn set_state(&mut self, state: &Self::State);

    /// Returns an independent copy with identical parameters.
    fn copy(&self) -> Self;

    /// Merges parameters of `source` into this network as an exponential
    /// moving average: `self = forget_factor * self + (1 - forget_factor) *
    /// source`.
    ///
    /// `forget_factor = 1.0` leaves this network untouched; `0.0` makes it
    /// an exact copy of `source`.
    fn track(&mut self, source: &Self, forget_factor: f64);
}

/// Applies one optimization step in place.
pub trait Optimizer<N: Network> {
    /// Updates the network parameters with the given gradient.
    fn update(&mut self, network: &mut N, gradient: &N::Gradient);
}
