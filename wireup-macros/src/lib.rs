//! Derive macros for wireup's compile-time extraction layer.
//!
//! This crate provides two derives:
//! - `#[derive(Context)]` to make a struct's fields extractable
//! - `#[derive(FromContext)]` to auto-resolve a struct from a context
//!
//! The `FromRef` trait lives in the consuming crate. Generated code
//! references `crate::FromRef`, so consumers re-export the trait at their
//! crate root (`wireup` itself does this in `lib.rs`).

use proc_macro::TokenStream;

mod context;
mod from_context;

/// Derive macro for declaring an extraction context.
///
/// When applied to a struct, generates a `FromRef` implementation for each
/// field type, allowing the field to be extracted from a reference to the
/// context.
///
/// # Requirements
///
/// - All extractable fields must implement `Clone`
/// - Field types must be distinct; annotate duplicates with
///   `#[context(skip)]` to avoid conflicting implementations
///
/// # Example
///
/// ```ignore
/// use wireup_macros::Context;
///
/// #[derive(Context, Clone)]
/// pub struct AppContext {
///     pub ledger: LedgerClient,
///     pub settings: Settings,
///     #[context(skip)]
///     pub backup_settings: Settings, // same type as `settings`
/// }
///
/// // Generated implementations:
/// // impl FromRef<AppContext> for LedgerClient { ... }
/// // impl FromRef<AppContext> for Settings { ... }
/// ```
#[proc_macro_derive(Context, attributes(context))]
pub fn derive_context(input: TokenStream) -> TokenStream {
    context::derive_context_impl(input)
}

/// Derive macro for types constructed by extracting each field from a
/// context.
///
/// Generates a `FromRef<Context>` implementation that resolves every field
/// through `FromRef::from_ref` on the context.
///
/// # Requirements
///
/// - Each field type must implement `FromRef<Context>`
/// - The context type defaults to `Context`; override it with
///   `#[from_context(Context = "MyContext")]`
///
/// # Example
///
/// ```ignore
/// use wireup_macros::FromContext;
///
/// #[derive(FromContext, Clone)]
/// #[from_context(Context = "AppContext")]
/// pub struct TransferService {
///     ledger: LedgerClient,   // resolved via LedgerClient::from_ref(ctx)
///     settings: Settings,     // resolved via Settings::from_ref(ctx)
/// }
/// ```
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    from_context::derive_from_context_impl(input)
}
