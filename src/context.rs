//! Compile-time extraction layer.
//!
//! Where wiring is statically known, services do not need to go through the
//! string-keyed, runtime-checked path at all: a context struct owns the
//! shared dependencies, and anything cheaply cloneable can be extracted
//! from it by type.
//!
//! # Overview
//!
//! - `FromRef<T>`: trait for extracting a value from a reference to `T`
//! - `#[derive(Context)]`: makes each field of a struct extractable
//! - `#[derive(FromContext)]`: generates `FromRef` by resolving each field
//! - [`register_extracted`]: bridges a `FromRef`-extractable type into the
//!   runtime container, keyed through a context token
//!
//! # Example
//!
//! ```ignore
//! use wireup::context::{Context, FromContext, FromRef};
//!
//! #[derive(Context, Clone)]
//! pub struct AppContext {
//!     pub ledger: LedgerClient,
//!     pub settings: Settings,
//! }
//!
//! #[derive(FromContext, Clone)]
//! #[from_context(Context = "AppContext")]
//! pub struct TransferService {
//!     ledger: LedgerClient,  // resolved via FromRef<AppContext>
//! }
//!
//! let ctx = AppContext { ledger, settings };
//! let service = TransferService::from_ref(&ctx);
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::container::Container;
use crate::registry::Service;
use crate::token::{get_token, Token};

/// Trait for extracting a value from a reference to another type.
///
/// Generated implementations reference `crate::FromRef`, so crates using
/// the derives re-export this trait at their root (as `wireup` itself
/// does).
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Blanket implementation: any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}

// Re-export derive macros
pub use wireup_macros::{Context, FromContext};

/// Registers a factory for `key` that resolves the context bound to
/// `context` and extracts a `T` from it.
///
/// The extraction itself is compile-time checked; the only runtime-checked
/// step left is fetching the context by its token.
pub fn register_extracted<C, T>(container: &Container, key: &str, context: &Token<C>)
where
    C: Any + Send + Sync,
    T: FromRef<C> + Any + Send + Sync,
{
    let context = context.clone();
    container.register_factory(key, move |registry| {
        let ctx = get_token(registry, &context)?;
        Ok(Arc::new(T::from_ref(ctx.as_ref())) as Service)
    });
}
