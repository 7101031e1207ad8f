//! Build lifecycle callbacks.
//!
//! The build notifies listeners of its major phases in a fixed order. The
//! model registry's configuration phase runs between `projects_loaded` and
//! `projects_evaluated`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;

/// Phases of a build, in the order they are announced.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    Started,
    SettingsEvaluated,
    ProjectsLoaded,
    ProjectsEvaluated,
    TaskGraphPopulated,
    Finished,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Started => "buildStarted",
            Self::SettingsEvaluated => "settingsEvaluated",
            Self::ProjectsLoaded => "projectsLoaded",
            Self::ProjectsEvaluated => "projectsEvaluated",
            Self::TaskGraphPopulated => "taskGraphPopulated",
            Self::Finished => "buildFinished",
        };
        f.write_str(name)
    }
}

/// Outcome handed to [`BuildListener::build_finished`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    /// Failure description, `None` for a successful build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl BuildResult {
    /// A successful build.
    #[must_use]
    pub const fn success() -> Self {
        Self { failure: None }
    }

    /// A failed build.
    #[must_use]
    pub fn failed(failure: impl Into<String>) -> Self {
        Self {
            failure: Some(failure.into()),
        }
    }

    /// Returns true if the build succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Receives build lifecycle notifications. Every method defaults to a no-op.
pub trait BuildListener: Send {
    /// The build is starting.
    fn build_started(&mut self) {}

    /// Settings are loaded and evaluated.
    fn settings_evaluated(&mut self) {}

    /// Projects exist but none has been evaluated.
    fn projects_loaded(&mut self) {}

    /// All projects are configured; the task graph can be populated.
    fn projects_evaluated(&mut self) {}

    /// The task graph is ready to execute.
    fn task_graph_populated(&mut self) {}

    /// The build completed, successfully or not.
    fn build_finished(&mut self, _result: &BuildResult) {}
}

/// Fans lifecycle events out to listeners, in registration order.
#[derive(Default)]
pub struct BuildListenerBroadcast {
    listeners: Vec<Box<dyn BuildListener>>,
    last: Option<BuildPhase>,
}

impl BuildListenerBroadcast {
    /// Creates a broadcast with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. It receives only events announced after this call.
    pub fn add(&mut self, listener: Box<dyn BuildListener>) {
        self.listeners.push(listener);
    }

    /// The most recently announced phase.
    #[must_use]
    pub const fn last_phase(&self) -> Option<BuildPhase> {
        self.last
    }

    /// Announces the start of the build.
    ///
    /// # Errors
    /// - `LifecycleOutOfOrder`: this phase cannot follow the last one.
    pub fn build_started(&mut self) -> Result<(), ValidationError> {
        self.announce(BuildPhase::Started, |l| l.build_started())
    }

    /// Announces that settings are evaluated.
    pub fn settings_evaluated(&mut self) -> Result<(), ValidationError> {
        self.announce(BuildPhase::SettingsEvaluated, |l| l.settings_evaluated())
    }

    /// Announces that projects are loaded.
    pub fn projects_loaded(&mut self) -> Result<(), ValidationError> {
        self.announce(BuildPhase::ProjectsLoaded, |l| l.projects_loaded())
    }

    /// Announces that all projects are configured.
    pub fn projects_evaluated(&mut self) -> Result<(), ValidationError> {
        self.announce(BuildPhase::ProjectsEvaluated, |l| l.projects_evaluated())
    }

    /// Announces that the task graph is populated.
    pub fn task_graph_populated(&mut self) -> Result<(), ValidationError> {
        self.announce(BuildPhase::TaskGraphPopulated, |l| l.task_graph_populated())
    }

    /// Announces completion. Allowed after any phase but only once.
    pub fn build_finished(&mut self, result: &BuildResult) -> Result<(), ValidationError> {
        self.announce(BuildPhase::Finished, |l| l.build_finished(result))
    }

    fn announce(
        &mut self,
        phase: BuildPhase,
        mut notify: impl FnMut(&mut dyn BuildListener),
    ) -> Result<(), ValidationError> {
        if !self.may_follow(phase) {
            return Err(ValidationError::LifecycleOutOfOrder {
                previous: self
                    .last
                    .map_or_else(|| "(nothing)".to_string(), |p| p.to_string()),
                actual: phase.to_string(),
            });
        }
        debug!(phase = %phase, listeners = self.listeners.len(), "build lifecycle event");
        for listener in &mut self.listeners {
            notify(listener.as_mut());
        }
        self.last = Some(phase);
        Ok(())
    }

    fn may_follow(&self, phase: BuildPhase) -> bool {
        match (self.last, phase) {
            (Some(BuildPhase::Finished), _) => false,
            (Some(_), BuildPhase::Finished) => true,
            (None, BuildPhase::Started) => true,
            (None, _) => false,
            (Some(prev), next) => (prev as u8) + 1 == next as u8,
        }
    }
}

impl fmt::Debug for BuildListenerBroadcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildListenerBroadcast")
            .field("listeners", &self.listeners.len())
            .field("last", &self.last)
            .finish()
    }
}
