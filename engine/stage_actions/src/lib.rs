//! Stage Actions - bricks compiled into frame-stepped state machines.
//!
//! [`compile`] turns a brick into an [`Action`] appended to a [`Sequence`].
//! The scheduler steps each running sequence once per tick with the elapsed
//! time; a step either completes or suspends until the next tick. Everything
//! an action reads or changes goes through the [`Stage`] it is stepped with.

mod action;
mod compile;
mod effect;
mod error;
mod sequence;
mod stage;

pub use action::{Action, StepStatus};
pub use compile::{compile, compile_bricks, compile_script};
pub use effect::Effect;
pub use error::ActionError;
pub use sequence::Sequence;
pub use stage::{BroadcastTicket, Stage};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
