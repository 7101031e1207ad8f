//! Instance factory contract.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::descriptor::RuleDescriptor;
use crate::error::RegistryError;
use crate::graph::ModelNode;
use crate::model_type::ModelType;

/// Construction function: builds an instance from a payload and the node it
/// will live at.
pub type FactoryFn<T, P> = Box<dyn Fn(&P, &ModelNode) -> T + Send + Sync>;

/// Constructs model elements of registered types.
///
/// `T` is the base type every construction function produces, `P` the payload
/// handed to it.
pub trait InstanceFactory<T, P> {
    /// Registers the construction function for `model_type`.
    ///
    /// # Errors
    /// - `DuplicateRegistration`: a function is already registered for the
    ///   raw type. The existing registration stays in effect.
    fn register_factory(
        &mut self,
        model_type: ModelType,
        source_rule: Option<RuleDescriptor>,
        factory: FactoryFn<T, P>,
    ) -> Result<(), RegistryError>;

    /// Checks that a construction function is registered for `model_type`
    /// without constructing anything.
    ///
    /// # Errors
    /// - `UnknownType`: nothing is registered for the raw type.
    fn check_supported(&self, model_type: &ModelType) -> Result<(), RegistryError>;

    /// Constructs a fresh instance of `model_type`.
    ///
    /// # Errors
    /// - `UnknownType`: nothing is registered for the raw type.
    fn create(&self, model_type: &ModelType, node: &ModelNode, payload: &P) -> Result<T, RegistryError>;

    /// All registered types.
    fn supported_types(&self) -> HashSet<ModelType>;

    /// Records `view_type` as an internal view of `model_type`.
    fn register_internal_view(
        &mut self,
        model_type: &ModelType,
        source_rule: Option<RuleDescriptor>,
        view_type: ModelType,
    );

    /// Internal views of `model_type`, in registration order.
    fn internal_views(&self, model_type: &ModelType) -> IndexSet<ModelType>;
}
