//! Error types for service registration and resolution.

use thiserror::Error;

use crate::chain::BuildChain;

/// Errors surfaced by the container and the typed token layer.
///
/// All of these are ordinary `Result` values. `CircularDependency` points at
/// a wiring bug and is normally treated as fatal by startup code, but the
/// container itself never aborts; the caller decides.
#[derive(Error, Debug)]
pub enum Error {
    /// Lookup on a key that has neither a built instance nor a factory.
    #[error("service '{0}' not registered")]
    ServiceNotFound(String),

    /// A key reappeared in its own active build chain.
    #[error("circular dependency detected for service '{key}' (chain: {chain})")]
    CircularDependency { key: String, chain: BuildChain },

    /// A stored value does not match the type requested for it.
    #[error("service '{key}' is not of expected type {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
