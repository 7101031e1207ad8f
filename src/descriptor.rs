//! Rule provenance.
//!
//! Every registration and reference records the rule that declared it, so
//! diagnostics can name the plugin or script responsible.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Describes the rule that declared a registration or reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleDescriptor {
    /// A standalone rule, e.g. `NativeRules#components`.
    Simple {
        /// Human-readable description of the rule.
        description: String,
    },

    /// A rule declared from within another rule.
    Nested {
        /// The enclosing rule.
        parent: Box<RuleDescriptor>,
        /// Description of the nested rule.
        child: String,
    },
}

impl RuleDescriptor {
    /// Creates a simple descriptor.
    #[must_use]
    pub fn simple(description: impl Into<String>) -> Self {
        Self::Simple {
            description: description.into(),
        }
    }

    /// Creates a simple descriptor, rejecting blank descriptions.
    pub fn parse(description: &str) -> Result<Self, ValidationError> {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(Self::simple(trimmed))
    }

    /// Creates a descriptor for a rule nested inside this one.
    #[must_use]
    pub fn nested(&self, child: impl Into<String>) -> Self {
        Self::Nested {
            parent: Box::new(self.clone()),
            child: child.into(),
        }
    }

    /// Appends the description to `out`.
    pub fn describe_to(&self, out: &mut String) {
        match self {
            Self::Simple { description } => out.push_str(description),
            Self::Nested { parent, child } => {
                parent.describe_to(out);
                out.push_str(" > ");
                out.push_str(child);
            }
        }
    }
}

impl fmt::Display for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.describe_to(&mut out);
        f.write_str(&out)
    }
}
