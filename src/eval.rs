//! Tree-walking evaluator (§4.7). A single recursive function matches on
//! the AST's expression variant rather than dispatching through a virtual
//! `evaluate` hierarchy; arithmetic uses wrapping two's-complement 64-bit
//! operations throughout, with no overflow checks.

use crate::ast::{Expr, Function, Statement};
use crate::diagnostic::Diagnostic;

/// Per-call evaluation state: one slot per declared symbol, 1-based ids.
pub struct EvaluationContext {
    variables: Vec<i64>,
    return_value: Option<i64>,
}

impl EvaluationContext {
    fn new(symbol_count: usize) -> Self {
        Self {
            variables: vec![0; symbol_count],
            return_value: None,
        }
    }

    fn set(&mut self, index: usize, value: i64) {
        self.variables[index] = value;
    }

    fn get(&self, index: usize) -> i64 {
        self.variables[index]
    }
}

impl Function {
    /// Runs the function body against `arguments`, returning the `RETURN`
    /// value or the first diagnostic raised along the way.
    pub fn evaluate(&self, arguments: &[i64]) -> Result<i64, Diagnostic> {
        let mut ctx = EvaluationContext::new(self.symbol_count);

        match &self.param {
            None => {
                if !arguments.is_empty() {
                    return Err(Diagnostic::error(
                        "Provided arguments to function with missing PARAM declaration!",
                        self.end_reference,
                    ));
                }
            }
            Some(param) => {
                if arguments.len() < param.vars.len() {
                    return Err(Diagnostic::error(
                        "Received to few arguments!",
                        self.end_reference,
                    ));
                }
                if arguments.len() > param.vars.len() {
                    return Err(Diagnostic::error(
                        "Received to many arguments!",
                        self.end_reference,
                    ));
                }
                for (id, value) in param.vars.iter().zip(arguments) {
                    ctx.set((id.get() - 1) as usize, *value);
                }
            }
        }

        if let Some(const_decl) = &self.const_decl {
            for (id, value) in const_decl.vars.iter().zip(&const_decl.literals) {
                ctx.set((id.get() - 1) as usize, *value);
            }
        }

        for stmt in &self.body {
            match stmt {
                Statement::Assignment(id, expr) => {
                    let value = eval_expr(expr, &ctx)?;
                    ctx.set((id.get() - 1) as usize, value);
                }
                Statement::Return(expr) => {
                    let value = eval_expr(expr, &ctx)?;
                    ctx.return_value = Some(value);
                }
            }
        }

        Ok(ctx
            .return_value
            .expect("builder guarantees at least one Return in the statement list"))
    }
}

fn eval_expr(expr: &Expr, ctx: &EvaluationContext) -> Result<i64, Diagnostic> {
    Ok(match expr {
        Expr::Literal(value) => *value,
        Expr::Variable(id) => ctx.get((id.get() - 1) as usize),
        Expr::UnaryPlus(e) => eval_expr(e, ctx)?,
        Expr::UnaryMinus(e) => eval_expr(e, ctx)?.wrapping_neg(),
        Expr::Add(l, r) => eval_expr(l, ctx)?.wrapping_add(eval_expr(r, ctx)?),
        Expr::Subtract(l, r) => eval_expr(l, ctx)?.wrapping_sub(eval_expr(r, ctx)?),
        Expr::Multiply(l, r) => eval_expr(l, ctx)?.wrapping_mul(eval_expr(r, ctx)?),
        Expr::Divide(l, r, site) => {
            let lhs = eval_expr(l, ctx)?;
            let rhs = eval_expr(r, ctx)?;
            if rhs == 0 {
                return Err(Diagnostic::error("Division by zero!", *site));
            }
            lhs.wrapping_div(rhs)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::parser::Parser;
    use crate::source::SourceCode;

    fn evaluate(text: &str, args: &[i64]) -> Result<i64, Diagnostic> {
        let source = SourceCode::new(text);
        let tree = Parser::new(&source).parse_program().unwrap();
        let result = build(&tree, &source).unwrap();
        result.function.evaluate(args)
    }

    #[test]
    fn volume_example() {
        let result = evaluate(
            "PARAM width, height, depth;\nVAR volume;\nCONST density = 2400;\nBEGIN\n  volume := width * height * depth;\n  RETURN density * volume\nEND.",
            &[100, 100, 100],
        );
        assert_eq!(result.unwrap(), 2_400_000_000);
    }

    #[test]
    fn unary_precedence_example() {
        let result = evaluate("PARAM a; VAR b; BEGIN b := (+a - -a) + a / a; RETURN b END.", &[1]);
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn division_by_zero_points_at_innermost_operator() {
        let result = evaluate(
            "BEGIN RETURN +(-(1 + (1 - (1 * (1 / (1 / 0)))))) END.",
            &[],
        );
        let err = result.unwrap_err();
        assert_eq!(err.message(), "Division by zero!");
    }

    #[test]
    fn missing_param_declaration_rejects_arguments() {
        let result = evaluate("BEGIN RETURN 1 END.", &[1]);
        let err = result.unwrap_err();
        assert_eq!(
            err.message(),
            "Provided arguments to function with missing PARAM declaration!"
        );
    }

    #[test]
    fn too_few_arguments_is_reported() {
        let result = evaluate("PARAM a, b; BEGIN RETURN a + b END.", &[1]);
        assert_eq!(result.unwrap_err().message(), "Received to few arguments!");
    }

    #[test]
    fn too_many_arguments_is_reported() {
        let result = evaluate("PARAM a; BEGIN RETURN a END.", &[1, 2]);
        assert_eq!(result.unwrap_err().message(), "Received to many arguments!");
    }

    #[test]
    fn arithmetic_wraps_on_overflow() {
        let result = evaluate("BEGIN RETURN 9223372036854775807 + 1 END.", &[]);
        assert_eq!(result.unwrap(), i64::MIN);
    }
}
