//! # Plinth Kernel
//!
//! Bootstrapping for the plinth host: the [`Application`](bootstrap::Application)
//! struct wires the descriptor store, the live plugin set, the shared-object
//! registry and the lifecycle orchestrator together, and the `error`
//! submodule defines the top-level [`Error`](error::Error) and `Result`
//! types a host sees.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use error::{Error, Result};
// Test module declaration
#[cfg(test)]
mod tests;
