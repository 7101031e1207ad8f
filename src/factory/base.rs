//! Map-backed instance factory.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::descriptor::RuleDescriptor;
use crate::error::{format_type_names, RegistryError};
use crate::graph::ModelNode;
use crate::model_type::{ModelType, TypeKey};

use super::instance::{FactoryFn, InstanceFactory};

struct Registration<T, P> {
    /// The type this registration was made for; lookups only reach it
    /// through a matching key.
    model_type: ModelType,
    source: Option<RuleDescriptor>,
    factory: FactoryFn<T, P>,
}

/// Instance factory keyed by raw type identity.
///
/// One registry is created per model domain (components, binaries, ...)
/// and is only mutated while configuration rules run.
///
/// # Examples
///
/// ```
/// use rulegraph::{BaseInstanceFactory, InstanceFactory, ModelNode, ModelPath, ModelType};
///
/// let mut factory: BaseInstanceFactory<String, ()> = BaseInstanceFactory::new("greeting factory");
/// let greeting = ModelType::named("Greeting");
/// factory
///     .register_factory(greeting.clone(), None, Box::new(|_, _| "hello".to_string()))
///     .unwrap();
///
/// let node = ModelNode::new(ModelPath::parse("greeting").unwrap(), None);
/// assert_eq!(factory.create(&greeting, &node, &()).unwrap(), "hello");
/// ```
pub struct BaseInstanceFactory<T, P> {
    display_name: String,
    factories: HashMap<TypeKey, Registration<T, P>>,
    internal_views: HashMap<TypeKey, IndexSet<ModelType>>,
}

impl<T, P> BaseInstanceFactory<T, P> {
    /// Creates an empty factory. `display_name` appears in diagnostics.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            factories: HashMap::new(),
            internal_views: HashMap::new(),
        }
    }

    /// Name used in diagnostics.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The rule that registered `model_type`, if known.
    #[must_use]
    pub fn source_rule(&self, model_type: &ModelType) -> Option<&RuleDescriptor> {
        self.factories.get(&model_type.key())?.source.as_ref()
    }

    fn supported_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .values()
            .map(|registration| registration.model_type.raw_simple_name().to_string())
            .collect();
        names.sort();
        names
    }

    fn unknown_type(&self, model_type: &ModelType) -> RegistryError {
        RegistryError::UnknownType {
            type_name: model_type.simple_name(),
            registry: self.display_name.clone(),
            supported: self.supported_type_names(),
        }
    }
}

impl<T, P> InstanceFactory<T, P> for BaseInstanceFactory<T, P> {
    fn register_factory(
        &mut self,
        model_type: ModelType,
        source_rule: Option<RuleDescriptor>,
        factory: FactoryFn<T, P>,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.factories.get(&model_type.key()) {
            warn!(
                registry = %self.display_name,
                model_type = %model_type,
                existing_rule = ?existing.source.as_ref().map(ToString::to_string),
                "rejected duplicate factory registration"
            );
            return Err(RegistryError::DuplicateRegistration {
                type_name: model_type.simple_name(),
                existing_rule: existing.source.clone(),
            });
        }

        debug!(
            registry = %self.display_name,
            model_type = %model_type,
            source_rule = ?source_rule.as_ref().map(ToString::to_string),
            "registered factory"
        );
        self.factories.insert(
            model_type.key(),
            Registration {
                model_type,
                source: source_rule,
                factory,
            },
        );
        Ok(())
    }

    fn check_supported(&self, model_type: &ModelType) -> Result<(), RegistryError> {
        if self.factories.contains_key(&model_type.key()) {
            Ok(())
        } else {
            Err(self.unknown_type(model_type))
        }
    }

    fn create(&self, model_type: &ModelType, node: &ModelNode, payload: &P) -> Result<T, RegistryError> {
        let Some(registration) = self.factories.get(&model_type.key()) else {
            return Err(self.unknown_type(model_type));
        };
        debug_assert_eq!(registration.model_type.key(), model_type.key());
        Ok((registration.factory)(payload, node))
    }

    fn supported_types(&self) -> HashSet<ModelType> {
        self.factories
            .values()
            .map(|registration| registration.model_type.clone())
            .collect()
    }

    fn register_internal_view(
        &mut self,
        model_type: &ModelType,
        source_rule: Option<RuleDescriptor>,
        view_type: ModelType,
    ) {
        debug!(
            registry = %self.display_name,
            model_type = %model_type,
            view_type = %view_type,
            source_rule = ?source_rule.as_ref().map(ToString::to_string),
            "registered internal view"
        );
        self.internal_views
            .entry(model_type.key())
            .or_default()
            .insert(view_type);
    }

    fn internal_views(&self, model_type: &ModelType) -> IndexSet<ModelType> {
        self.internal_views
            .get(&model_type.key())
            .cloned()
            .unwrap_or_default()
    }
}

impl<T, P> fmt::Display for BaseInstanceFactory<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", format_type_names(&self.supported_type_names()))
    }
}

impl<T, P> fmt::Debug for BaseInstanceFactory<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseInstanceFactory")
            .field("display_name", &self.display_name)
            .field("supported", &self.supported_type_names())
            .finish_non_exhaustive()
    }
}
