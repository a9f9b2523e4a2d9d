//! Walks the parse tree once and lowers it to an [`ast::Function`] plus a
//! fully populated [`SymbolTable`] (§4.6). Declares PARAM, VAR, then CONST
//! identifiers in source order, then lowers every statement, resolving each
//! identifier reference against the table as it goes.

use crate::ast::{self, Expr, Statement};
use crate::cst;
use crate::diagnostic::Diagnostic;
use crate::source::SourceCode;
use crate::symbol_table::{SymbolKind, SymbolTable};

pub struct BuildResult {
    pub function: ast::Function,
    pub symbols: SymbolTable,
}

pub fn build(tree: &cst::FunctionDefinition, source: &SourceCode) -> Result<BuildResult, Diagnostic> {
    let mut symbols = SymbolTable::new();

    let param = match &tree.param {
        Some(decl) => {
            let mut vars = Vec::with_capacity(decl.list.idents.len());
            for ident in &decl.list.idents {
                let name = ident.span.slice(source);
                vars.push(symbols.declare(name, SymbolKind::Param, ident.span, true)?);
            }
            Some(ast::ParamDecl { vars })
        }
        None => None,
    };

    let var = match &tree.var {
        Some(decl) => {
            let mut vars = Vec::with_capacity(decl.list.idents.len());
            for ident in &decl.list.idents {
                let name = ident.span.slice(source);
                vars.push(symbols.declare(name, SymbolKind::Var, ident.span, false)?);
            }
            Some(ast::VarDecl { vars })
        }
        None => None,
    };

    let const_decl = match &tree.const_decl {
        Some(decl) => {
            let mut vars = Vec::with_capacity(decl.list.decls.len());
            let mut literals = Vec::with_capacity(decl.list.decls.len());
            for init in &decl.list.decls {
                let name = init.ident.span.slice(source);
                vars.push(symbols.declare(name, SymbolKind::Const, init.ident.span, true)?);
                literals.push(init.literal.value);
            }
            Some(ast::ConstDecl { vars, literals })
        }
        None => None,
    };

    let mut body = Vec::with_capacity(tree.compound.stmts.stmts.len());
    for stmt in &tree.compound.stmts.stmts {
        body.push(lower_stmt(stmt, &mut symbols, source)?);
    }

    if !body.iter().any(|s| matches!(s, Statement::Return(_))) {
        return Err(Diagnostic::error(
            "Reached end of function without a RETURN statement!",
            tree.compound.end,
        ));
    }

    let function = ast::Function {
        param,
        var,
        const_decl,
        body,
        symbol_count: symbols.len(),
        end_reference: tree.compound.end,
    };

    Ok(BuildResult { function, symbols })
}

fn lower_stmt(
    stmt: &cst::Stmt,
    symbols: &mut SymbolTable,
    source: &SourceCode,
) -> Result<Statement, Diagnostic> {
    match stmt {
        cst::Stmt::Assignment { ident, expr, .. } => {
            let name = ident.span.slice(source);
            let rhs = lower_additive(expr, symbols, source)?;
            let id = symbols.use_as_assignment_target(name, ident.span)?;
            Ok(Statement::Assignment(id, rhs))
        }
        cst::Stmt::Return { expr, .. } => {
            let rhs = lower_additive(expr, symbols, source)?;
            Ok(Statement::Return(rhs))
        }
    }
}

fn lower_additive(
    node: &cst::Additive,
    symbols: &mut SymbolTable,
    source: &SourceCode,
) -> Result<Expr, Diagnostic> {
    let head = lower_multiplicative(&node.head, symbols, source)?;
    match &node.tail {
        Some((op, _op_span, rest)) => {
            let rhs = lower_additive(rest, symbols, source)?;
            Ok(match op {
                cst::AddOp::Plus => Expr::Add(Box::new(head), Box::new(rhs)),
                cst::AddOp::Minus => Expr::Subtract(Box::new(head), Box::new(rhs)),
            })
        }
        None => Ok(head),
    }
}

fn lower_multiplicative(
    node: &cst::Multiplicative,
    symbols: &mut SymbolTable,
    source: &SourceCode,
) -> Result<Expr, Diagnostic> {
    let head = lower_unary(&node.head, symbols, source)?;
    match &node.tail {
        Some((op, op_span, rest)) => {
            let rhs = lower_multiplicative(rest, symbols, source)?;
            Ok(match op {
                cst::MulOp::Star => Expr::Multiply(Box::new(head), Box::new(rhs)),
                cst::MulOp::Slash => Expr::Divide(Box::new(head), Box::new(rhs), *op_span),
            })
        }
        None => Ok(head),
    }
}

fn lower_unary(
    node: &cst::Unary,
    symbols: &mut SymbolTable,
    source: &SourceCode,
) -> Result<Expr, Diagnostic> {
    let primary = lower_primary(&node.primary, symbols, source)?;
    Ok(match &node.op {
        Some((cst::UnaryOp::Plus, _)) => Expr::UnaryPlus(Box::new(primary)),
        Some((cst::UnaryOp::Minus, _)) => Expr::UnaryMinus(Box::new(primary)),
        None => primary,
    })
}

fn lower_primary(
    node: &cst::Primary,
    symbols: &mut SymbolTable,
    source: &SourceCode,
) -> Result<Expr, Diagnostic> {
    match node {
        cst::Primary::Ident(ident) => {
            let name = ident.span.slice(source);
            let id = symbols.use_read(name, ident.span)?;
            Ok(Expr::Variable(id))
        }
        cst::Primary::Literal(literal) => Ok(Expr::Literal(literal.value)),
        cst::Primary::Bracketed { inner, .. } => lower_additive(inner, symbols, source),
    }
}
