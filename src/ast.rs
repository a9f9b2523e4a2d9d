//! The abstract syntax tree: the semantic form after identifier resolution,
//! free of syntactic sugar and of every terminal except literal values and
//! source references. Built once by [`crate::builder`], mutated in place by
//! the optimization passes in [`crate::optimize`], then walked by
//! [`crate::eval`].
//!
//! One tagged union per kind (expression, statement, declaration) rather
//! than a class hierarchy with virtual `evaluate`/`optimize` methods,
//! following the reference codebase's typed-IR pattern of flat enums
//! consumed by `match`.

use crate::source::SourceSpan;
use crate::symbol_table::SymbolId;

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(i64),
    Variable(SymbolId),
    UnaryPlus(Box<Expr>),
    UnaryMinus(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Subtract(Box<Expr>, Box<Expr>),
    Multiply(Box<Expr>, Box<Expr>),
    /// `operator_site` is the `/` token's span, used to locate the
    /// "Division by zero!" runtime diagnostic.
    Divide(Box<Expr>, Box<Expr>, SourceSpan),
}

#[derive(Debug, Clone)]
pub enum Statement {
    Assignment(SymbolId, Expr),
    Return(Expr),
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub vars: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub vars: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub vars: Vec<SymbolId>,
    pub literals: Vec<i64>,
}

/// A fully lowered, resolvable function body, ready for optimization and
/// evaluation.
#[derive(Debug, Clone)]
pub struct Function {
    pub param: Option<ParamDecl>,
    pub var: Option<VarDecl>,
    pub const_decl: Option<ConstDecl>,
    pub body: Vec<Statement>,
    pub symbol_count: usize,
    /// Span of the `END` keyword, used for the "Reached end of function
    /// without a RETURN statement!" diagnostic.
    pub end_reference: SourceSpan,
}
