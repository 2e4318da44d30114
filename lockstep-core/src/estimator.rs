//! Return and advantage estimation.
//!
//! Pure functions over time-major windows of experience: outer index is
//! time, inner index is the lane. All estimators reset their backward
//! recursion at every [`StepKind::Last`](crate::StepKind::Last) so that no
//! credit is assigned across episode boundaries, including windows spanning
//! two or more completed episodes in one lane.
mod advantage;
mod returns;
pub use advantage::AdvantageEstimator;
pub use returns::discounted_returns;
