//! Type-keyed registry of services shared between extensions.

use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::info;

/// Registry mapping a service type to its single provider.
///
/// Services are keyed by the type they are registered under, which is
/// usually a trait object such as `dyn WorldBorderApi`:
///
/// ```rust
/// use std::sync::Arc;
/// use tint_event_system::ServiceRegistry;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct Fixed;
/// impl Clock for Fixed {
///     fn now(&self) -> u64 { 42 }
/// }
///
/// let registry = ServiceRegistry::new();
/// registry.register::<dyn Clock>(Arc::new(Fixed));
/// assert_eq!(registry.get::<dyn Clock>().unwrap().now(), 42);
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    services: DashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service` as the provider for `T`, replacing any previous one.
    pub fn register<T>(&self, service: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services.insert(TypeId::of::<T>(), Box::new(service));
        info!("🧩 Registered service {}", std::any::type_name::<T>());
    }

    /// Looks up the provider registered for `T`.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value().downcast_ref::<Arc<T>>().cloned())
    }

    /// Removes the provider for `T`, returning whether one was registered.
    pub fn unregister<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services.remove(&TypeId::of::<T>()).is_some()
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
