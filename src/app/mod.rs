//! Full-screen terminal session around a [`Form`](crate::form::Form).

mod input;
mod session;
mod status;
mod terminal;

pub use input::{KeyCommand, classify};
pub use session::{FormSession, SessionOutcome};
