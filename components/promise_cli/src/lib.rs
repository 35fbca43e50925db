//! Promise scenario CLI library
//!
//! Provides the argument definitions, the built-in scenarios and the Runtime
//! that runs them for the `promise-demo` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod runtime;
pub mod scenarios;

pub use cli::{Cli, Command};
pub use error::{CliError, CliResult};
pub use runtime::{Outcome, Runtime, ScenarioReport};
pub use scenarios::{Scenario, SCENARIOS};
