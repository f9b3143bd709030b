//! Wireup - concurrency-safe, lazily constructed service registry.
//!
//! Services are registered by key, either as ready instances or as
//! factories. A factory runs at most once per key process-wide: concurrent
//! callers of the same key join the in-flight build, and a key that
//! resolves itself through its own dependency chain fails with
//! [`Error::CircularDependency`] instead of recursing or deadlocking.

pub mod cache;
pub mod chain;
pub mod container;
pub mod context;
pub mod error;
pub mod registry;
pub mod token;

pub use chain::BuildChain;
pub use container::{Container, ScopedRegistry};
pub use error::{Error, Result};
pub use registry::{Factory, Registry, RegistryExt, Service};
pub use token::{get_token, has_token, register_token, Token};

// Re-export FromRef at crate root for macro-generated code
pub use context::FromRef;
