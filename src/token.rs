//! Typed tokens for type-checked retrieval.
//!
//! A token binds a string key to the type the caller expects back. The
//! token layer is a validation wrapper over the base registry: it adds no
//! concurrency behavior of its own, it only downcasts and reports
//! [`Error::TypeMismatch`](crate::Error::TypeMismatch) when the stored
//! value has a different runtime type.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::Container;
use crate::error::Result;
use crate::registry::{Registry, RegistryExt, Service};

/// Typed handle for a service key.
///
/// # Example
///
/// ```ignore
/// use wireup::{register_token, get_token, Container, Token};
///
/// let sessions: Token<SessionStore> = Token::new("sessions");
/// register_token(&container, &sessions, |_| Ok(SessionStore::default()));
///
/// let store = get_token(&container, &sessions)?;
/// ```
pub struct Token<T> {
    key: String,
    _type: PhantomData<fn() -> T>,
}

impl<T> Token<T> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            _type: PhantomData,
        }
    }

    /// The string key this token resolves through.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token<{}>({})", type_name::<T>(), self.key)
    }
}

impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Registers a typed factory under the token's key.
///
/// The factory returns a plain `T`; the erasure to [`Service`] happens
/// here, so registration cannot introduce a key/type mismatch.
pub fn register_token<T, F>(container: &Container, token: &Token<T>, factory: F)
where
    T: Send + Sync + 'static,
    F: Fn(&dyn Registry) -> Result<T> + Send + Sync + 'static,
{
    container.register_factory(token.key(), move |registry| {
        Ok(Arc::new(factory(registry)?) as Service)
    });
}

/// Resolves the service bound to `token`, downcasting to its declared type.
pub fn get_token<T, R>(registry: &R, token: &Token<T>) -> Result<Arc<T>>
where
    T: Send + Sync + 'static,
    R: Registry + ?Sized,
{
    registry.get_as::<T>(token.key())
}

/// True if a service or factory is registered under the token's key.
pub fn has_token<T, R>(registry: &R, token: &Token<T>) -> bool
where
    R: Registry + ?Sized,
{
    registry.has(token.key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_register_and_get_roundtrip() {
        let container = Container::new();
        let token: Token<Vec<u8>> = Token::new("payload");

        register_token(&container, &token, |_| Ok(vec![1, 2, 3]));

        assert!(has_token(&container, &token));
        let payload = get_token(&container, &token).unwrap();
        assert_eq!(*payload, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_token_type_mismatch() {
        let container = Container::new();
        container.register_value("port", 8080u16);

        let token: Token<String> = Token::new("port");
        match get_token(&container, &token) {
            Err(Error::TypeMismatch { key, expected }) => {
                assert_eq!(key, "port");
                assert!(expected.contains("String"));
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_token_usable_inside_factory() {
        let container = Container::new();
        let base: Token<u32> = Token::new("base");
        let doubled: Token<u32> = Token::new("doubled");

        register_token(&container, &base, |_| Ok(21));
        let dep = base.clone();
        register_token(&container, &doubled, move |registry| {
            Ok(*get_token(registry, &dep)? * 2)
        });

        assert_eq!(*get_token(&container, &doubled).unwrap(), 42);
    }

    #[test]
    fn test_missing_token_not_found() {
        let container = Container::new();
        let token: Token<String> = Token::new("ghost");

        assert!(!has_token(&container, &token));
        assert!(matches!(
            get_token(&container, &token),
            Err(Error::ServiceNotFound(_))
        ));
    }

    #[test]
    fn test_display_names_type_and_key() {
        let token: Token<String> = Token::new("greeting");
        let rendered = token.to_string();
        assert!(rendered.contains("String"));
        assert!(rendered.contains("greeting"));
    }
}
