//! Reference binding.
//!
//! A rule declares what it needs as a [`BindingPredicate`]. The predicate is
//! wrapped in a [`ModelBinding`], which a [`CreationListener`] resolves
//! against a graph node once the node's promise can answer the question.

mod listener;
mod model_binding;
mod predicate;
mod report;

pub use listener::{BindAction, CreationListener, PathBinder};
pub use model_binding::{BindingId, BindingState, ModelBinding};
pub use predicate::{AccessMode, BindingPredicate, ModelReference};
pub use report::IncompatibleTypeReport;
