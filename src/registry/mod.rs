//! Provider Registry module.
//!
//! Holds the ordered list of candidate image-generation providers and answers
//! which of them are currently eligible for dispatch.

mod error;
mod provider;
#[cfg(test)]
mod tests;

pub use error::*;
pub use provider::*;

use std::sync::{PoisonError, RwLock};

/// The Provider Registry stores every configured provider in registry order.
///
/// Registry order matters: `list_enabled` sorts by priority with a stable
/// sort, so providers sharing a priority keep the order they were added in.
///
/// # Examples
///
/// ```
/// use easel::registry::{ProviderDescriptor, ProviderKind, ProviderRegistry};
///
/// let registry = ProviderRegistry::new();
/// registry
///     .add_provider(ProviderDescriptor::new("placeholder", "Placeholder", ProviderKind::Placeholder, 6))
///     .unwrap();
/// registry
///     .add_provider(ProviderDescriptor::new("mock", "Mock", ProviderKind::Mock, 5))
///     .unwrap();
///
/// let enabled = registry.list_enabled();
/// assert_eq!(enabled[0].id, "mock");
/// assert_eq!(enabled[1].id, "placeholder");
/// ```
pub struct ProviderRegistry {
    providers: RwLock<Vec<ProviderDescriptor>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
        }
    }

    /// Build a registry from descriptors, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateProvider` if two descriptors share an id.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ProviderDescriptor>,
    ) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for descriptor in descriptors {
            registry.add_provider(descriptor)?;
        }
        Ok(registry)
    }

    /// Append a provider to the registry.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateProvider` if a provider with the same ID already exists.
    pub fn add_provider(&self, descriptor: ProviderDescriptor) -> Result<(), RegistryError> {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if providers.iter().any(|p| p.id == descriptor.id) {
            return Err(RegistryError::DuplicateProvider(descriptor.id));
        }

        providers.push(descriptor);
        Ok(())
    }

    /// Get a provider by ID.
    pub fn get_provider(&self, id: &str) -> Option<ProviderDescriptor> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// All providers in registry order, enabled or not.
    pub fn list_all(&self) -> Vec<ProviderDescriptor> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Enabled providers, priority ascending, ties broken by registry order.
    ///
    /// Recomputed on every call so operator toggles take effect on the next
    /// dispatch. An empty result means no provider is available.
    pub fn list_enabled(&self) -> Vec<ProviderDescriptor> {
        let mut enabled: Vec<_> = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|p| p.enabled)
            .cloned()
            .collect();

        // sort_by_key is stable
        enabled.sort_by_key(|p| p.priority);
        enabled
    }

    /// Get the number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Enable or disable a provider.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), RegistryError> {
        self.update(id, |p| p.enabled = enabled)?;
        tracing::info!(provider_id = %id, enabled, "Provider enablement changed");
        Ok(())
    }

    /// Change a provider's priority.
    pub fn set_priority(&self, id: &str, priority: i32) -> Result<(), RegistryError> {
        self.update(id, |p| p.priority = priority)?;
        tracing::info!(provider_id = %id, priority, "Provider priority changed");
        Ok(())
    }

    fn update(
        &self,
        id: &str,
        apply: impl FnOnce(&mut ProviderDescriptor),
    ) -> Result<(), RegistryError> {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let provider = providers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RegistryError::ProviderNotFound(id.to_string()))?;

        apply(provider);
        Ok(())
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
