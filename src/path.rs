//! Model element paths.
//!
//! Paths are dotted sequences of names (`components.main.sources`). The empty
//! path is the root of the model graph.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const SEPARATOR: char = '.';

static SEGMENT: OnceLock<Regex> = OnceLock::new();

fn segment_regex() -> &'static Regex {
    SEGMENT.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("path segment pattern compiles"))
}

/// Address of a node in the model graph.
///
/// # Examples
///
/// ```
/// use rulegraph::ModelPath;
///
/// let path = ModelPath::parse("components.main").unwrap();
/// assert_eq!(path.name(), "main");
/// assert_eq!(path.parent().unwrap().to_string(), "components");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelPath(String);

impl ModelPath {
    /// The root path.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Parses and validates a dotted path.
    pub fn parse(path: &str) -> Result<Self, ValidationError> {
        if path.is_empty() {
            return Ok(Self::root());
        }
        for segment in path.split(SEPARATOR) {
            validate_name(path, segment)?;
        }
        Ok(Self(path.to_string()))
    }

    /// Returns the path of a direct child named `name`.
    pub fn child(&self, name: &str) -> Result<Self, ValidationError> {
        let full = if self.is_root() {
            name.to_string()
        } else {
            format!("{}{SEPARATOR}{name}", self.0)
        };
        validate_name(&full, name)?;
        Ok(Self(full))
    }

    /// Returns the parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind(SEPARATOR) {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        })
    }

    /// Last segment of the path; empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or_default()
    }

    /// Number of segments; zero for the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.split(SEPARATOR).count()
        }
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `self` is a direct child of `parent`.
    #[must_use]
    pub fn is_direct_child_of(&self, parent: &ModelPath) -> bool {
        self.parent().as_ref() == Some(parent)
    }

    /// The dotted string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_name(path: &str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidPath {
            path: path.to_string(),
            reason: "path segments cannot be empty".to_string(),
        });
    }
    if !segment_regex().is_match(name) {
        return Err(ValidationError::InvalidPath {
            path: path.to_string(),
            reason: format!(
                "segment '{name}' must start with a letter or '_' and contain only letters, digits, '_' or '-'"
            ),
        });
    }
    Ok(())
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl TryFrom<String> for ModelPath {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ModelPath> for String {
    fn from(path: ModelPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_navigate() {
        let path = ModelPath::parse("components.main.sources").unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(path.name(), "sources");

        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "components.main");
        assert!(path.is_direct_child_of(&parent));
        assert!(!path.is_direct_child_of(&parent.parent().unwrap()));
    }

    #[test]
    fn test_top_level_parent_is_root() {
        let path = ModelPath::parse("tasks").unwrap();
        let parent = path.parent().unwrap();
        assert!(parent.is_root());
        assert!(parent.parent().is_none());
        assert_eq!(parent.to_string(), "<root>");
    }

    #[test]
    fn test_child_of_root() {
        let child = ModelPath::root().child("tasks").unwrap();
        assert_eq!(child.as_str(), "tasks");
        let nested = child.child("build-all").unwrap();
        assert_eq!(nested.as_str(), "tasks.build-all");
    }

    #[test]
    fn test_rejects_invalid_segments() {
        assert!(ModelPath::parse("tasks..build").is_err());
        assert!(ModelPath::parse("1tasks").is_err());
        assert!(ModelPath::parse("tasks.bu ild").is_err());
        assert!(ModelPath::root().child("").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let path: ModelPath = serde_json::from_str("\"components.main\"").unwrap();
        assert_eq!(path.depth(), 2);
        assert!(serde_json::from_str::<ModelPath>("\"components..main\"").is_err());
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"components.main\"");
    }
}
