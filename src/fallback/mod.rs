//! Ranked-fallback execution.
//!
//! A [`FallbackChain`] tries an ordered list of [`Strategy`] implementations and
//! keeps the first result accepted by its validity predicate. Every transport,
//! status, payload or predicate failure is recorded and the walk moves on; a
//! single strategy can never abort the run.
//!
//! Two entry points share the same walk:
//!
//! - [`FallbackChain::execute`] always terminates with a value, substituting the
//!   caller's static fallback when every strategy failed.
//! - [`FallbackChain::try_execute`] surfaces exhaustion as [`ExhaustedError`] for
//!   call sites that must report "service degraded" instead of guessing.
//!
//! The optional starting offset lets a caller rotate which strategy is tried
//! first; the counter itself lives in the caller's state (see [`Rotation`]).

pub mod error;
pub mod executor;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{ExhaustedError, StrategyError};
pub use executor::{FallbackChain, Predicate};
pub use types::{AttemptFailure, ExecutionOutcome, OutcomeSource, Rotation, Strategy};
