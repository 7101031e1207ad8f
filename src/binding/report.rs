//! Diagnostics for references that resolve to a node of the wrong type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::RuleDescriptor;
use crate::path::ModelPath;
use crate::promise::ModelPromise;

use super::predicate::BindingPredicate;

/// Structured report of an incompatible reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompatibleTypeReport {
    /// Rule that declared the reference.
    pub referrer: RuleDescriptor,
    /// Path of the candidate node.
    pub path: ModelPath,
    /// Rule that created the candidate node, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<RuleDescriptor>,
    /// Requested type, in display form.
    pub requested_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// True if the reference asked for mutable access.
    pub writable: bool,
    /// Types the node offers for the requested access mode.
    pub available_types: Vec<String>,
}

impl IncompatibleTypeReport {
    /// Builds a report for `predicate` against a candidate node.
    #[must_use]
    pub fn of(
        referrer: &RuleDescriptor,
        path: &ModelPath,
        creator: Option<&RuleDescriptor>,
        promise: &ModelPromise,
        predicate: &BindingPredicate,
    ) -> Self {
        let writable = predicate.is_writable();
        let available_types = if writable {
            promise.writable_type_descriptions()
        } else {
            promise.readable_type_descriptions()
        };
        Self {
            referrer: referrer.clone(),
            path: path.clone(),
            creator: creator.cloned(),
            requested_type: predicate
                .target_type()
                .map_or_else(|| "untyped".to_string(), ToString::to_string),
            description: predicate.reference().description().map(str::to_string),
            writable,
            available_types,
        }
    }
}

impl fmt::Display for IncompatibleTypeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "There is a problem with model rule {}.", self.referrer)?;
        write!(f, "Model reference to element '{}' with type {}", self.path, self.requested_type)?;
        if let Some(description) = &self.description {
            write!(f, " ({description})")?;
        }
        writeln!(f, " is invalid due to incompatible types.")?;

        match &self.creator {
            Some(creator) => write!(f, "This element was created by {creator} and ")?,
            None => f.write_str("This element ")?,
        }
        let mode = if self.writable { "mutated" } else { "read" };
        write!(f, "can be {mode} as the following types:")?;
        if self.available_types.is_empty() {
            write!(f, "\n  - (None)")?;
        }
        for name in &self.available_types {
            write!(f, "\n  - {name}")?;
        }
        Ok(())
    }
}
