//! Service container: lazy construction, memoization, cycle detection.
//!
//! The container holds built instances, pending factories, and in-flight
//! build latches behind one lock. The lock is held only for O(1) map
//! operations and never across factory execution, so unrelated builds and
//! nested reentrant lookups proceed without contending on it.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wireup::{Container, Registry, RegistryExt, Service};
//!
//! let container = Container::new();
//! container.register_factory("config", |_| {
//!     Ok(Arc::new(Config::load()) as Service)
//! });
//! container.register_factory("ledger", |registry| {
//!     let config = registry.get_as::<Config>("config")?;
//!     Ok(Arc::new(LedgerClient::connect(&config)) as Service)
//! });
//!
//! // "config" is built on demand inside the "ledger" factory.
//! let ledger = container.get_as::<LedgerClient>("ledger")?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, RwLock};

use crate::chain::BuildChain;
use crate::error::{Error, Result};
use crate::registry::{Factory, Registry, Service};

/// Completion signal for one in-flight build.
///
/// Opened exactly once, when the claiming caller finishes. Waiters re-check
/// the instance table afterwards: present on success, absent on failure.
struct Latch {
    done: Mutex<bool>,
    cond: Condvar,
}

impl Latch {
    fn new() -> Self {
        Self {
            done: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    fn wait(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.cond.wait(&mut done);
        }
    }

    fn open(&self) {
        let mut done = self.done.lock();
        *done = true;
        self.cond.notify_all();
    }
}

#[derive(Default)]
struct State {
    /// Built services.
    services: HashMap<String, Service>,
    /// Factory functions, pending until first lookup.
    factories: HashMap<String, Arc<Factory>>,
    /// Services currently being built, keyed to their completion latch.
    building: HashMap<String, Arc<Latch>>,
}

/// Outcome of one locked pass over the container state for a key.
enum Claim {
    Done(Service),
    Wait(Arc<Latch>),
    Build(Arc<Factory>),
}

/// Concurrency-safe, lazily constructed service registry.
///
/// Each key is built at most once: concurrent callers of the same key join
/// the in-flight build and receive the same memoized value, and a key that
/// resolves itself through its own dependency chain fails with
/// [`Error::CircularDependency`] instead of recursing.
///
/// Cycle detection is per call chain only. Two factories that block on each
/// other's completion from unrelated call paths deadlock; the container
/// supports no cancellation or timeout.
#[derive(Default)]
pub struct Container {
    state: RwLock<State>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for `key`. Nothing is constructed until the key
    /// is first looked up or [`build`](Container::build) runs.
    pub fn register_factory<F>(&self, key: impl Into<String>, factory: F)
    where
        F: Fn(&dyn Registry) -> Result<Service> + Send + Sync + 'static,
    {
        let key = key.into();
        tracing::trace!(%key, "factory registered");
        self.state.write().factories.insert(key, Arc::new(factory));
    }

    /// Eagerly constructs every factory-registered service that has no
    /// built instance yet, stopping at the first failure.
    ///
    /// Iteration order is immaterial: a dependency processed after its
    /// dependent has already been built on demand inside the dependent's
    /// factory and is skipped by the memoization check.
    pub fn build(&self) -> Result<()> {
        let pending: Vec<String> = {
            let state = self.state.read();
            state
                .factories
                .keys()
                .filter(|key| !state.services.contains_key(*key))
                .cloned()
                .collect()
        };

        for key in pending {
            self.get(&key)?;
        }
        Ok(())
    }

    fn build_or_join(&self, key: &str, chain: &BuildChain) -> Result<Service> {
        // Purely local to this call path, so it runs before any locking.
        if chain.contains(key) {
            return Err(Error::CircularDependency {
                key: key.to_owned(),
                chain: chain.extended(key),
            });
        }

        // Fast path: memoized reads take only the shared lock.
        {
            let state = self.state.read();
            if let Some(service) = state.services.get(key) {
                return Ok(service.clone());
            }
        }

        loop {
            let claim = {
                let mut state = self.state.write();
                if let Some(service) = state.services.get(key) {
                    Claim::Done(service.clone())
                } else if let Some(latch) = state.building.get(key) {
                    Claim::Wait(latch.clone())
                } else if let Some(factory) = state.factories.get(key) {
                    let factory = factory.clone();
                    state
                        .building
                        .insert(key.to_owned(), Arc::new(Latch::new()));
                    Claim::Build(factory)
                } else {
                    return Err(Error::ServiceNotFound(key.to_owned()));
                }
            };

            match claim {
                Claim::Done(service) => return Ok(service),
                Claim::Wait(latch) => {
                    tracing::debug!(%key, "joining in-flight build");
                    latch.wait();
                    // Re-check: memoized on success, claimable again on failure.
                }
                Claim::Build(factory) => return self.run_factory(key, chain, factory),
            }
        }
    }

    /// Runs `factory` with the container lock released, memoizes a
    /// successful result, and releases every waiter on the key's latch.
    fn run_factory(&self, key: &str, chain: &BuildChain, factory: Arc<Factory>) -> Result<Service> {
        tracing::debug!(%key, "building service");
        let scoped = ScopedRegistry {
            container: self,
            chain: chain.extended(key),
        };
        let result = factory(&scoped);

        let latch = {
            let mut state = self.state.write();
            if let Ok(service) = &result {
                state.services.insert(key.to_owned(), service.clone());
            }
            state.building.remove(key)
        };
        if let Some(latch) = latch {
            latch.open();
        }

        match &result {
            Ok(_) => tracing::debug!(%key, "service built"),
            Err(err) => tracing::debug!(%key, %err, "factory failed"),
        }
        result
    }
}

impl Registry for Container {
    fn register(&self, key: &str, service: Service) {
        self.state.write().services.insert(key.to_owned(), service);
    }

    fn get(&self, key: &str) -> Result<Service> {
        self.build_or_join(key, &BuildChain::new())
    }

    fn has(&self, key: &str) -> bool {
        let state = self.state.read();
        state.services.contains_key(key) || state.factories.contains_key(key)
    }
}

/// Registry view handed to a factory mid-build.
///
/// Carries the build chain of the lookup that triggered the factory, so
/// nested `get` calls extend the chain and participate in the same cycle
/// check and the same at-most-once guarantee.
pub struct ScopedRegistry<'a> {
    container: &'a Container,
    chain: BuildChain,
}

impl Registry for ScopedRegistry<'_> {
    fn register(&self, key: &str, service: Service) {
        self.container.register(key, service);
    }

    fn get(&self, key: &str) -> Result<Service> {
        self.container.build_or_join(key, &self.chain)
    }

    fn has(&self, key: &str) -> bool {
        self.container.has(key)
    }
}
