//! A just-in-time compiler and evaluator for PL, a tiny procedural
//! language of `PARAM`/`VAR`/`CONST` declarations and a single `BEGIN…END`
//! statement block. A function's source text is registered once; it is
//! lexed, parsed, semantically checked, optimized, and cached behind a
//! one-shot compile latch, then evaluated as many times as callers like.
//!
//! ```
//! use pljit::Registry;
//!
//! let mut registry = Registry::new();
//! let volume = registry
//!     .register(
//!         "PARAM width, height, depth;
//!          VAR volume;
//!          CONST density = 2400;
//!          BEGIN
//!            volume := width * height * depth;
//!            RETURN density * volume
//!          END.",
//!     )
//!     .unwrap();
//!
//! assert_eq!(volume.evaluate(&[100, 100, 100]).unwrap(), 2_400_000_000);
//! ```

pub mod ast;
pub mod builder;
pub mod config;
pub mod cst;
pub mod diagnostic;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod optimize;
pub mod parser;
pub mod registry;
pub mod source;
pub mod symbol_table;
pub mod token;

pub use config::RenderConfig;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::PljitError;
pub use registry::{FunctionHandle, Registry};
pub use source::{CodePosition, SourceCode, SourceSpan};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefinition_reports_at_the_second_declaration_with_a_note() {
        let mut registry = Registry::new();
        let handle = registry
            .register("CONST test = 2, test = 3; BEGIN RETURN 0 END.")
            .unwrap();
        let err = handle.evaluate(&[]).unwrap_err();
        assert_eq!(err.message(), "Redefinition of identifier!");
        assert_eq!(err.causes()[0].message(), "Original declaration here");
    }

    #[test]
    fn missing_return_is_reported_at_the_end_keyword() {
        let mut registry = Registry::new();
        let handle = registry.register("VAR t; BEGIN t := 0 END.").unwrap();
        let err = handle.evaluate(&[]).unwrap_err();
        assert_eq!(
            err.message(),
            "Reached end of function without a RETURN statement!"
        );
    }
}
