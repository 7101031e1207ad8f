//! Instance factories.
//!
//! A factory maps each declared model type to exactly one construction
//! function and tracks the internal views instances of that type satisfy.

mod base;
mod instance;

pub use base::BaseInstanceFactory;
pub use instance::{FactoryFn, InstanceFactory};
