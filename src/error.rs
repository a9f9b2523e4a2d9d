//! Crate-level error surface, distinct from [`crate::diagnostic::Diagnostic`].
//!
//! `Diagnostic` is data describing a failure *in the PL program* (a bad
//! declaration, a division by zero); it is returned, never a Rust `Error`.
//! `PljitError` covers misuse of this crate's own API that has no source
//! location to anchor to.

/// Failure modes of the registry that cannot be expressed as a
/// source-anchored [`crate::diagnostic::Diagnostic`].
#[derive(Debug, thiserror::Error)]
pub enum PljitError {
    /// `Registry::register` was called with an empty (or whitespace-only)
    /// source string; the lexer cannot usefully report a location for it.
    #[error("cannot register an empty source string")]
    EmptySource,
}
