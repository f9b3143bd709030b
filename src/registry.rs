//! Registry capability shared by the container and scoped views.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::error::{Error, Result};

/// A constructed service instance, type-erased for storage.
pub type Service = Arc<dyn Any + Send + Sync>;

/// A factory builds one service, resolving its dependencies through the
/// registry view it is handed.
pub type Factory = dyn Fn(&dyn Registry) -> Result<Service> + Send + Sync;

/// Minimal registry capability.
///
/// This is the whole surface a factory sees mid-build: it can register
/// ready instances and look services up, but it cannot register further
/// factories or trigger an eager build.
pub trait Registry {
    /// Stores `service` under `key` immediately. Overwriting an existing
    /// instance is allowed; direct registration never goes through
    /// build-state tracking.
    fn register(&self, key: &str, service: Service);

    /// Resolves `key`, constructing it on demand when a factory is
    /// registered. Blocks while another caller is building the same key.
    fn get(&self, key: &str) -> Result<Service>;

    /// True if `key` has either an instance or a factory. Never blocks and
    /// never triggers construction.
    fn has(&self, key: &str) -> bool;
}

/// Typed convenience layer over [`Registry`].
///
/// Blanket-implemented, so it is usable both on concrete registries and on
/// the `&dyn Registry` view inside a factory.
pub trait RegistryExt: Registry {
    /// Stores `value` under `key`, erasing its type.
    fn register_value<T>(&self, key: &str, value: T)
    where
        T: Any + Send + Sync,
    {
        self.register(key, Arc::new(value));
    }

    /// Resolves `key` and downcasts the stored value to `T`.
    fn get_as<T>(&self, key: &str) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get(key)?.downcast::<T>().map_err(|_| Error::TypeMismatch {
            key: key.to_owned(),
            expected: type_name::<T>(),
        })
    }
}

impl<R: Registry + ?Sized> RegistryExt for R {}
