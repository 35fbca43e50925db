//! Command-line argument definitions

use crate::error::CliResult;
use async_runtime::RuntimeConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Runs promise scenarios on a fresh event loop and prints how they settle.
#[derive(Debug, Parser)]
#[command(name = "promise-demo", version, about)]
pub struct Cli {
    /// What to do
    #[command(subcommand)]
    pub command: Command,

    /// JSON file with event loop settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum microtasks per checkpoint (overrides the config file)
    #[arg(long, global = true)]
    pub microtask_budget: Option<usize>,

    /// Report promises rejected without a handler
    #[arg(long, global = true)]
    pub track_rejections: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

/// Subcommands
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// List the available scenarios
    List,
    /// Run scenarios by name
    Run {
        /// Scenario names
        names: Vec<String>,
        /// Run every scenario
        #[arg(long, conflicts_with = "names")]
        all: bool,
    },
}

impl Cli {
    /// Builds the event loop config: defaults, then the config file, then flags.
    pub fn runtime_config(&self) -> CliResult<RuntimeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str(&text)?
            }
            None => RuntimeConfig::default(),
        };
        if let Some(limit) = self.microtask_budget {
            config.microtask_budget = Some(limit);
        }
        if self.track_rejections {
            config.track_rejections = true;
        }
        Ok(config)
    }
}
