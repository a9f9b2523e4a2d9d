//! The concrete syntax tree: one node per grammar production (§6), each a
//! precisely-typed struct or enum rather than a downcast-from-base hierarchy.
//! Every interior node stores its children in source order; every terminal
//! stores its [`SourceSpan`]. Built once by the parser and never mutated.

use crate::source::SourceSpan;

#[derive(Debug, Clone, Copy)]
pub struct Ident {
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct Literal {
    pub span: SourceSpan,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct DeclList {
    pub idents: Vec<Ident>,
    /// One comma span between each pair of consecutive identifiers.
    pub commas: Vec<SourceSpan>,
}

#[derive(Debug, Clone, Copy)]
pub struct InitDecl {
    pub ident: Ident,
    pub equals: SourceSpan,
    pub literal: Literal,
}

#[derive(Debug, Clone)]
pub struct InitList {
    pub decls: Vec<InitDecl>,
    pub commas: Vec<SourceSpan>,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub keyword: SourceSpan,
    pub list: DeclList,
    pub semicolon: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub keyword: SourceSpan,
    pub list: DeclList,
    pub semicolon: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub keyword: SourceSpan,
    pub list: InitList,
    pub semicolon: SourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulOp {
    Star,
    Slash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOp {
    Plus,
    Minus,
}

/// `primary = ident | literal | "(" additive ")" .`
#[derive(Debug, Clone)]
pub enum Primary {
    Ident(Ident),
    Literal(Literal),
    Bracketed {
        open: SourceSpan,
        inner: Box<Additive>,
        close: SourceSpan,
    },
}

/// `unary = [ "+"|"-" ] primary .`
#[derive(Debug, Clone)]
pub struct Unary {
    pub op: Option<(UnaryOp, SourceSpan)>,
    pub primary: Primary,
}

/// `multiplicative = unary [ ("*"|"/") multiplicative ] .` Right-recursive,
/// matching the grammar exactly: the optimizer's structural rewrite rules
/// pattern-match on this shape.
#[derive(Debug, Clone)]
pub struct Multiplicative {
    pub head: Unary,
    pub tail: Option<(MulOp, SourceSpan, Box<Multiplicative>)>,
}

/// `additive = multiplicative [ ("+"|"-") additive ] .` Right-recursive.
#[derive(Debug, Clone)]
pub struct Additive {
    pub head: Multiplicative,
    pub tail: Option<(AddOp, SourceSpan, Box<Additive>)>,
}

/// `stmt = ident ":=" additive | "RETURN" additive .`
#[derive(Debug, Clone)]
pub enum Stmt {
    Assignment {
        ident: Ident,
        assign: SourceSpan,
        expr: Additive,
    },
    Return {
        keyword: SourceSpan,
        expr: Additive,
    },
}

/// `stmt-list = stmt { ";" stmt } .`
#[derive(Debug, Clone)]
pub struct StmtList {
    pub stmts: Vec<Stmt>,
    /// One semicolon span between each pair of consecutive statements.
    pub semicolons: Vec<SourceSpan>,
}

/// `compound = "BEGIN" stmt-list "END" .`
#[derive(Debug, Clone)]
pub struct Compound {
    pub begin: SourceSpan,
    pub stmts: StmtList,
    pub end: SourceSpan,
}

/// `program = [ param-decl ] [ var-decl ] [ const-decl ] compound "." .`
/// Root of the parse tree.
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub param: Option<ParamDecl>,
    pub var: Option<VarDecl>,
    pub const_decl: Option<ConstDecl>,
    pub compound: Compound,
    pub dot: SourceSpan,
}

/// Collects every terminal's span, in pre-order, for the parse-tree-fidelity
/// invariant: concatenating their source slices reproduces the source minus
/// whitespace.
pub fn collect_terminals(func: &FunctionDefinition, out: &mut Vec<SourceSpan>) {
    if let Some(p) = &func.param {
        out.push(p.keyword);
        collect_decl_list(&p.list, out);
        out.push(p.semicolon);
    }
    if let Some(v) = &func.var {
        out.push(v.keyword);
        collect_decl_list(&v.list, out);
        out.push(v.semicolon);
    }
    if let Some(c) = &func.const_decl {
        out.push(c.keyword);
        collect_init_list(&c.list, out);
        out.push(c.semicolon);
    }
    out.push(func.compound.begin);
    collect_stmt_list(&func.compound.stmts, out);
    out.push(func.compound.end);
    out.push(func.dot);
}

fn collect_decl_list(list: &DeclList, out: &mut Vec<SourceSpan>) {
    for (i, ident) in list.idents.iter().enumerate() {
        out.push(ident.span);
        if let Some(comma) = list.commas.get(i) {
            out.push(*comma);
        }
    }
}

fn collect_init_list(list: &InitList, out: &mut Vec<SourceSpan>) {
    for (i, decl) in list.decls.iter().enumerate() {
        out.push(decl.ident.span);
        out.push(decl.equals);
        out.push(decl.literal.span);
        if let Some(comma) = list.commas.get(i) {
            out.push(*comma);
        }
    }
}

fn collect_stmt_list(list: &StmtList, out: &mut Vec<SourceSpan>) {
    for (i, stmt) in list.stmts.iter().enumerate() {
        match stmt {
            Stmt::Assignment { ident, assign, expr } => {
                out.push(ident.span);
                out.push(*assign);
                collect_additive(expr, out);
            }
            Stmt::Return { keyword, expr } => {
                out.push(*keyword);
                collect_additive(expr, out);
            }
        }
        if let Some(semi) = list.semicolons.get(i) {
            out.push(*semi);
        }
    }
}

fn collect_additive(expr: &Additive, out: &mut Vec<SourceSpan>) {
    collect_multiplicative(&expr.head, out);
    if let Some((_, op_span, rest)) = &expr.tail {
        out.push(*op_span);
        collect_additive(rest, out);
    }
}

fn collect_multiplicative(expr: &Multiplicative, out: &mut Vec<SourceSpan>) {
    collect_unary(&expr.head, out);
    if let Some((_, op_span, rest)) = &expr.tail {
        out.push(*op_span);
        collect_multiplicative(rest, out);
    }
}

fn collect_unary(expr: &Unary, out: &mut Vec<SourceSpan>) {
    if let Some((_, op_span)) = &expr.op {
        out.push(*op_span);
    }
    collect_primary(&expr.primary, out);
}

fn collect_primary(primary: &Primary, out: &mut Vec<SourceSpan>) {
    match primary {
        Primary::Ident(ident) => out.push(ident.span),
        Primary::Literal(literal) => out.push(literal.span),
        Primary::Bracketed { open, inner, close } => {
            out.push(*open);
            collect_additive(inner, out);
            out.push(*close);
        }
    }
}
