//! Type descriptors for model elements.
//!
//! A [`ModelType`] is a reified, possibly parameterized type. Identity is the
//! raw type only: `List<String>` and `List<Task>` share a [`TypeKey`], so a
//! factory registered for one is found when asked for the other. Generic
//! arguments are kept for display.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

const UNTYPED_RAW_NAME: &str = "?untyped";

/// Stable numeric key derived from a type's raw name.
///
/// The key is the first eight bytes of the BLAKE3 digest of the fully
/// qualified raw name, so it is identical across processes and builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(u64);

impl TypeKey {
    /// Derives the key for a raw (unparameterized) type name.
    #[must_use]
    pub fn of_raw_name(raw_name: &str) -> Self {
        let digest = blake3::hash(raw_name.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.as_bytes()[..8]);
        Self(u64::from_le_bytes(prefix))
    }

    /// Returns the numeric value of the key.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A declared model type.
///
/// Equality and hashing use [`TypeKey`] only.
///
/// # Examples
///
/// ```
/// use rulegraph::ModelType;
///
/// let strings = ModelType::of::<Vec<String>>();
/// let numbers = ModelType::of::<Vec<u32>>();
/// assert_eq!(strings, numbers);
/// assert_eq!(strings.simple_name(), "Vec<String>");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ModelTypeRepr")]
pub struct ModelType {
    key: TypeKey,
    raw_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    type_args: Vec<ModelType>,
    /// Keys of every type this one is assignable to, excluding itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    supertypes: Vec<TypeKey>,
}

impl ModelType {
    /// Creates a type from a raw name such as `Greeting` or `app::model::Greeting`.
    #[must_use]
    pub fn named(raw_name: impl Into<String>) -> Self {
        let raw_name = raw_name.into();
        Self {
            key: TypeKey::of_raw_name(&raw_name),
            raw_name,
            type_args: Vec::new(),
            supertypes: Vec::new(),
        }
    }

    /// Creates the descriptor of a Rust type.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        parse_type_name(std::any::type_name::<T>())
    }

    /// The universal marker for references that carry no type obligation.
    #[must_use]
    pub fn untyped() -> Self {
        Self::named(UNTYPED_RAW_NAME)
    }

    /// Returns a copy of this type parameterized with `type_args`.
    #[must_use]
    pub fn with_type_args(mut self, type_args: Vec<ModelType>) -> Self {
        self.type_args = type_args;
        self
    }

    /// Declares that this type is assignable to `parent` and to everything
    /// `parent` is assignable to.
    #[must_use]
    pub fn extending(mut self, parent: &ModelType) -> Self {
        for key in std::iter::once(parent.key).chain(parent.supertypes.iter().copied()) {
            if key != self.key && !self.supertypes.contains(&key) {
                self.supertypes.push(key);
            }
        }
        self
    }

    /// Raw identity of this type.
    #[must_use]
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    /// Fully qualified raw name, without generic arguments.
    #[must_use]
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Generic arguments, in declaration order.
    #[must_use]
    pub fn type_args(&self) -> &[ModelType] {
        &self.type_args
    }

    /// Returns true for the [`ModelType::untyped`] marker.
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        self.raw_name == UNTYPED_RAW_NAME
    }

    /// Last path segment of the raw name, without generic arguments.
    #[must_use]
    pub fn raw_simple_name(&self) -> &str {
        if self.is_untyped() {
            return "untyped";
        }
        self.raw_name.rsplit("::").next().unwrap_or(&self.raw_name)
    }

    /// Short display name: last path segment, with simple generic arguments.
    #[must_use]
    pub fn simple_name(&self) -> String {
        let base = self.raw_simple_name();
        if self.is_untyped() || self.type_args.is_empty() {
            return base.to_string();
        }
        let args: Vec<String> = self.type_args.iter().map(Self::simple_name).collect();
        format!("{base}<{}>", args.join(", "))
    }

    /// Fully qualified display name, with qualified generic arguments.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.type_args.is_empty() {
            return self.raw_name.clone();
        }
        let args: Vec<String> = self.type_args.iter().map(Self::display_name).collect();
        format!("{}<{}>", self.raw_name, args.join(", "))
    }

    /// Returns true if a value of type `other` can be used where `self` is expected.
    #[must_use]
    pub fn is_assignable_from(&self, other: &ModelType) -> bool {
        self.is_untyped() || self.key == other.key || other.supertypes.contains(&self.key)
    }
}

/// Deserialized form of [`ModelType`]. The key is always derived from the
/// raw name, never read back.
#[derive(Deserialize)]
struct ModelTypeRepr {
    raw_name: String,
    #[serde(default)]
    type_args: Vec<ModelType>,
    #[serde(default)]
    supertypes: Vec<TypeKey>,
}

impl From<ModelTypeRepr> for ModelType {
    fn from(repr: ModelTypeRepr) -> Self {
        Self {
            key: TypeKey::of_raw_name(&repr.raw_name),
            raw_name: repr.raw_name,
            type_args: repr.type_args,
            supertypes: repr.supertypes,
        }
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ModelType {}

impl Hash for ModelType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.simple_name())
    }
}

/// Parses the output of `std::any::type_name` into a descriptor.
///
/// Only path types carry generic arguments; tuples, references, slices and
/// trait objects are kept whole as their raw name.
fn parse_type_name(name: &str) -> ModelType {
    let name = name.trim();
    let Some(open) = name.find('<') else {
        return ModelType::named(name);
    };
    if name.starts_with(['(', '&', '[', '*']) || name.starts_with("dyn ") || !name.ends_with('>') {
        return ModelType::named(name);
    }

    let raw = &name[..open];
    let inner = &name[open + 1..name.len() - 1];
    let args = split_top_level(inner).into_iter().map(parse_type_name).collect();
    ModelType::named(raw).with_type_args(args)
}

fn split_top_level(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in args.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&args[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&args[start..]);
    parts
}
