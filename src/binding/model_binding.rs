//! Write-once resolution cell for a rule reference.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::descriptor::RuleDescriptor;
use crate::error::BindingError;
use crate::path::ModelPath;
use crate::promise::ModelPromise;

use super::predicate::BindingPredicate;

/// Unique identifier for a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(Uuid);

impl BindingId {
    /// Create a new random binding id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolution state of a binding.
///
/// Moves from `Unbound` to `Bound` once and never back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "path", rename_all = "snake_case")]
pub enum BindingState {
    /// Not yet resolved.
    Unbound,
    /// Resolved to the node at this path. The graph owns the node.
    Bound(ModelPath),
}

/// A rule reference and its resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBinding {
    id: BindingId,
    referrer: RuleDescriptor,
    predicate: BindingPredicate,
    state: BindingState,
}

impl ModelBinding {
    /// Creates an unbound binding.
    #[must_use]
    pub fn new(referrer: RuleDescriptor, predicate: BindingPredicate) -> Self {
        Self {
            id: BindingId::new(),
            referrer,
            predicate,
            state: BindingState::Unbound,
        }
    }

    /// Unique id of this binding.
    #[must_use]
    pub const fn id(&self) -> BindingId {
        self.id
    }

    /// The rule that declared the reference.
    #[must_use]
    pub const fn referrer(&self) -> &RuleDescriptor {
        &self.referrer
    }

    /// What the reference asks for.
    #[must_use]
    pub const fn predicate(&self) -> &BindingPredicate {
        &self.predicate
    }

    /// Current resolution state.
    #[must_use]
    pub const fn state(&self) -> &BindingState {
        &self.state
    }

    /// Path of the bound node, if resolved.
    #[must_use]
    pub const fn bound_to(&self) -> Option<&ModelPath> {
        match &self.state {
            BindingState::Bound(path) => Some(path),
            BindingState::Unbound => None,
        }
    }

    /// Returns true once the binding is resolved.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self.state, BindingState::Bound(_))
    }

    /// Returns true if `promise` satisfies the predicate's type and access mode.
    #[must_use]
    pub fn is_type_compatible(&self, promise: &ModelPromise) -> bool {
        match self.predicate.target_type() {
            None => true,
            Some(target) if target.is_untyped() => true,
            Some(target) if self.predicate.is_writable() => promise.can_be_viewed_as_writable(target),
            Some(target) => promise.can_be_viewed_as_readable(target),
        }
    }

    /// Seals the binding to `path`.
    ///
    /// # Errors
    /// - `AlreadyBound`: the binding was sealed before.
    pub(crate) fn bind_to(&mut self, path: &ModelPath) -> Result<(), BindingError> {
        self.check_unbound()?;
        self.state = BindingState::Bound(path.clone());
        Ok(())
    }

    pub(crate) fn check_unbound(&self) -> Result<(), BindingError> {
        match &self.state {
            BindingState::Unbound => Ok(()),
            BindingState::Bound(bound_to) => Err(BindingError::AlreadyBound {
                reference: self.predicate.reference().to_string(),
                referrer: self.referrer.clone(),
                bound_to: bound_to.clone(),
            }),
        }
    }
}
