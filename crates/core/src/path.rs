//! Values prescribed along the shooting nodes of a phase.
//!
//! A [`PathCondition`] stores a small matrix of values and an
//! [`InterpolationType`] describing how its columns spread over the nodes.
//! [`Bounds`] pair two conditions, [`InitialGuess`] wraps one.
//!
//! The number of shooting nodes is usually unknown when a condition is
//! written, so conditions are validated and completed later with
//! [`PathCondition::check_and_adjust_dimensions`], before any evaluation.

mod bounds;
mod condition;
mod error;
mod initial_guess;

pub use bounds::Bounds;
pub use condition::{InterpolationType, PathCondition};
pub use error::PathError;
pub use initial_guess::InitialGuess;
