//! Event loop configuration.

use serde::{Deserialize, Serialize};

/// Tunables for an [`EventLoop`](crate::EventLoop).
///
/// Missing fields fall back to their defaults when deserialized, so a config
/// file only needs to name the settings it changes.
///
/// # Examples
///
/// ```
/// use async_runtime::RuntimeConfig;
///
/// let config = RuntimeConfig::new()
///     .with_microtask_budget(10_000)
///     .with_rejection_tracking(true);
/// assert_eq!(config.microtask_budget, Some(10_000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum number of microtasks run by one checkpoint. `None` is unlimited.
    pub microtask_budget: Option<usize>,
    /// Record promises that are rejected while nothing observes them.
    pub track_rejections: bool,
}

impl RuntimeConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the number of microtasks a single checkpoint may run.
    pub fn with_microtask_budget(mut self, limit: usize) -> Self {
        self.microtask_budget = Some(limit);
        self
    }

    /// Enables or disables unhandled rejection tracking.
    pub fn with_rejection_tracking(mut self, enabled: bool) -> Self {
        self.track_rejections = enabled;
        self
    }
}
