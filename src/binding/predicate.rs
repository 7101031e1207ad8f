//! What a rule reference asks for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model_type::ModelType;
use crate::path::ModelPath;

/// A reference to a model element by path, type, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<ModelPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_type: Option<ModelType>,
    /// Free-form description, e.g. the rule parameter the reference feeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl ModelReference {
    /// References the element at `path` with the given type.
    #[must_use]
    pub fn of(path: ModelPath, model_type: ModelType) -> Self {
        Self {
            path: Some(path),
            model_type: Some(model_type),
            description: None,
        }
    }

    /// References the element at `path` without a type obligation.
    #[must_use]
    pub fn of_path(path: ModelPath) -> Self {
        Self {
            path: Some(path),
            model_type: None,
            description: None,
        }
    }

    /// References an element by type only.
    #[must_use]
    pub fn of_type(model_type: ModelType) -> Self {
        Self {
            path: None,
            model_type: Some(model_type),
            description: None,
        }
    }

    /// Attaches a description used in diagnostics.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Target path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&ModelPath> {
        self.path.as_ref()
    }

    /// Requested type, if any.
    #[must_use]
    pub fn model_type(&self) -> Option<&ModelType> {
        self.model_type.as_ref()
    }

    /// Diagnostic description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, &self.model_type) {
            (Some(path), Some(ty)) => write!(f, "'{path}' ({ty})")?,
            (Some(path), None) => write!(f, "'{path}'")?,
            (None, Some(ty)) => write!(f, "<{ty}>")?,
            (None, None) => f.write_str("<any>")?,
        }
        if let Some(description) = &self.description {
            write!(f, " [{description}]")?;
        }
        Ok(())
    }
}

/// Whether a reference reads or mutates its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// The rule only reads the element.
    ReadOnly,
    /// The rule mutates the element.
    ReadWrite,
}

/// Immutable description of what a reference wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingPredicate {
    reference: ModelReference,
    access: AccessMode,
}

impl BindingPredicate {
    /// Creates a predicate.
    #[must_use]
    pub const fn new(reference: ModelReference, access: AccessMode) -> Self {
        Self { reference, access }
    }

    /// A read-only predicate.
    #[must_use]
    pub const fn read(reference: ModelReference) -> Self {
        Self::new(reference, AccessMode::ReadOnly)
    }

    /// A read-write predicate.
    #[must_use]
    pub const fn write(reference: ModelReference) -> Self {
        Self::new(reference, AccessMode::ReadWrite)
    }

    /// The wrapped reference.
    #[must_use]
    pub const fn reference(&self) -> &ModelReference {
        &self.reference
    }

    /// Target path of the reference.
    #[must_use]
    pub fn path(&self) -> Option<&ModelPath> {
        self.reference.path()
    }

    /// The requested type, `None` for untyped references.
    #[must_use]
    pub fn target_type(&self) -> Option<&ModelType> {
        self.reference.model_type()
    }

    /// Requested access mode.
    #[must_use]
    pub const fn access(&self) -> AccessMode {
        self.access
    }

    /// Returns true for read-write predicates.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        matches!(self.access, AccessMode::ReadWrite)
    }

    /// Returns true if the reference carries no type obligation.
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        self.target_type().map_or(true, ModelType::is_untyped)
    }
}
