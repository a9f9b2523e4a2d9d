//! Constant propagation (§4.8), grounded in the original implementation's
//! `ConstantPropagation` pass: a per-symbol `{is_constant, value}` table,
//! seeded from `CONST` declarations, walked statement by statement while
//! rewriting each right-hand side bottom-up.

use std::collections::HashMap;

use crate::ast::{Expr, Function, Statement};
use crate::symbol_table::SymbolId;

#[derive(Clone, Copy)]
struct Entry {
    constant: bool,
    value: i64,
}

pub fn propagate_constants(function: &mut Function) {
    let mut state: HashMap<SymbolId, Entry> = HashMap::new();

    if let Some(const_decl) = &function.const_decl {
        for (id, value) in const_decl.vars.iter().zip(&const_decl.literals) {
            state.insert(
                *id,
                Entry {
                    constant: true,
                    value: *value,
                },
            );
        }
    }

    for stmt in &mut function.body {
        match stmt {
            Statement::Assignment(id, expr) => {
                rewrite(expr, &state);
                match expr {
                    Expr::Literal(value) => {
                        state.insert(
                            *id,
                            Entry {
                                constant: true,
                                value: *value,
                            },
                        );
                    }
                    _ => {
                        state.insert(
                            *id,
                            Entry {
                                constant: false,
                                value: 0,
                            },
                        );
                    }
                }
            }
            Statement::Return(expr) => rewrite(expr, &state),
        }
    }
}

/// Rewrites `expr` bottom-up in place, folding constant subtrees.
fn rewrite(expr: &mut Expr, state: &HashMap<SymbolId, Entry>) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Variable(id) => {
            if let Some(entry) = state.get(id) {
                if entry.constant {
                    *expr = Expr::Literal(entry.value);
                }
            }
        }
        Expr::UnaryPlus(inner) => {
            rewrite(inner, state);
            if let Expr::Literal(k) = **inner {
                *expr = Expr::Literal(k);
            }
        }
        Expr::UnaryMinus(inner) => {
            rewrite(inner, state);
            if let Expr::Literal(k) = **inner {
                *expr = Expr::Literal(k.wrapping_neg());
            }
        }
        Expr::Add(l, r) => {
            rewrite(l, state);
            rewrite(r, state);
            if let (Expr::Literal(a), Expr::Literal(b)) = (&**l, &**r) {
                *expr = Expr::Literal(a.wrapping_add(*b));
            }
        }
        Expr::Subtract(l, r) => {
            rewrite(l, state);
            rewrite(r, state);
            if let (Expr::Literal(a), Expr::Literal(b)) = (&**l, &**r) {
                *expr = Expr::Literal(a.wrapping_sub(*b));
            }
        }
        Expr::Multiply(l, r) => {
            rewrite(l, state);
            rewrite(r, state);
            if let (Expr::Literal(a), Expr::Literal(b)) = (&**l, &**r) {
                *expr = Expr::Literal(a.wrapping_mul(*b));
            }
        }
        Expr::Divide(l, r, site) => {
            rewrite(l, state);
            rewrite(r, state);
            if let (Expr::Literal(a), Expr::Literal(b)) = (&**l, &**r) {
                // A zero divisor is left unrewritten so the runtime
                // "Division by zero!" diagnostic still fires at evaluation.
                if *b != 0 {
                    *expr = Expr::Literal(a.wrapping_div(*b));
                } else {
                    let _ = site;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::parser::Parser;
    use crate::source::SourceCode;

    fn optimized_body(text: &str) -> Vec<Statement> {
        let source = SourceCode::new(text);
        let tree = Parser::new(&source).parse_program().unwrap();
        let mut result = build(&tree, &source).unwrap();
        propagate_constants(&mut result.function);
        result.function.body
    }

    #[test]
    fn folds_arithmetic_on_literals() {
        let body = optimized_body("BEGIN RETURN 1 + 2 * 3 END.");
        let Statement::Return(Expr::Literal(value)) = &body[0] else {
            panic!("expected a folded literal");
        };
        assert_eq!(*value, 7);
    }

    #[test]
    fn propagates_through_assignments() {
        let body = optimized_body("VAR a; BEGIN a := 5; RETURN a + 1 END.");
        let Statement::Return(Expr::Literal(value)) = &body[1] else {
            panic!("expected a folded literal");
        };
        assert_eq!(*value, 6);
    }

    #[test]
    fn does_not_fold_divide_by_zero() {
        let body = optimized_body("BEGIN RETURN 5 / 0 END.");
        let Statement::Return(Expr::Divide(..)) = &body[0] else {
            panic!("division by a literal zero must stay unrewritten");
        };
    }

    #[test]
    fn parameter_reads_are_not_constant() {
        let body = optimized_body("PARAM x; BEGIN RETURN x + 1 END.");
        let Statement::Return(Expr::Add(l, _)) = &body[0] else {
            panic!("expected an Add node");
        };
        assert!(matches!(**l, Expr::Variable(_)));
    }
}
