//! Scenario execution
//!
//! The Runtime runs each scenario on its own event loop, so scenarios never
//! observe each other's timers or microtasks.

use crate::error::{CliError, CliResult};
use crate::scenarios::{self, Scenario};
use async_runtime::{EventLoop, PromiseState, RuntimeConfig};
use core_types::Value;
use std::fmt;
use tracing::{debug, info};

/// How a scenario's promise ended up once its loop went idle.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The promise fulfilled with this value
    Fulfilled(Value),
    /// The promise rejected with this reason
    Rejected(Value),
    /// Nothing was left to run and the promise never settled
    Pending,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Fulfilled(value) => write!(f, "fulfilled: {}", value),
            Outcome::Rejected(reason) => write!(f, "rejected: {}", reason),
            Outcome::Pending => write!(f, "pending"),
        }
    }
}

/// Report for one finished scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: &'static str,
    /// Final settlement of the scenario's promise
    pub outcome: Outcome,
    /// Virtual time elapsed, in milliseconds
    pub elapsed_ms: u64,
    /// Rejections nobody handled (only collected with rejection tracking)
    pub unhandled: Vec<Value>,
}

/// Runs scenarios with a shared configuration.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a runtime whose event loops use `config`.
    ///
    /// # Example
    /// ```
    /// use async_runtime::RuntimeConfig;
    /// use promise_cli::Runtime;
    ///
    /// let runtime = Runtime::new(RuntimeConfig::default());
    /// let report = runtime.run("chain").unwrap();
    /// assert_eq!(report.outcome.to_string(), "fulfilled: 112");
    /// ```
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// The configuration handed to each event loop.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Runs the scenario called `name`.
    pub fn run(&self, name: &str) -> CliResult<ScenarioReport> {
        let scenario =
            scenarios::find(name).ok_or_else(|| CliError::UnknownScenario(name.to_string()))?;
        self.run_scenario(scenario)
    }

    /// Runs every scenario in listing order, stopping at the first failure.
    pub fn run_all(&self) -> CliResult<Vec<ScenarioReport>> {
        scenarios::SCENARIOS
            .iter()
            .map(|scenario| self.run_scenario(scenario))
            .collect()
    }

    /// Builds `scenario` on a fresh event loop and runs the loop until idle.
    pub fn run_scenario(&self, scenario: &Scenario) -> CliResult<ScenarioReport> {
        info!(scenario = scenario.name, "running scenario");
        let event_loop = EventLoop::with_config(self.config.clone());
        let promise = (scenario.build)(&event_loop);
        event_loop.run_until_done()?;

        let outcome = match (promise.state(), promise.value()) {
            (PromiseState::Fulfilled, Some(value)) => Outcome::Fulfilled(value),
            (PromiseState::Rejected, Some(reason)) => Outcome::Rejected(reason),
            _ => Outcome::Pending,
        };
        let unhandled = event_loop
            .take_unhandled_rejections()
            .into_iter()
            .map(|entry| entry.reason)
            .collect();
        debug!(scenario = scenario.name, %outcome, "scenario finished");

        Ok(ScenarioReport {
            name: scenario.name,
            outcome,
            elapsed_ms: event_loop.now(),
            unhandled,
        })
    }
}
