//! AST-rewriting optimization passes (§4.8), grounded directly in the
//! original implementation's `ConstantPropagation`/`DeadCodeElimination`
//! passes: both mutate the AST in place and are safe to compose in the
//! order constant-propagation, then dead-code elimination.

mod constant_propagation;
mod dead_code;

pub use constant_propagation::propagate_constants;
pub use dead_code::eliminate_dead_code;

use crate::ast::Function;

/// Runs the standard pipeline: constant propagation, then dead-code
/// elimination. Each pass is individually idempotent; running the pair
/// twice in a row is a no-op on the second run.
pub fn optimize(function: &mut Function) {
    propagate_constants(function);
    eliminate_dead_code(function);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::parser::Parser;
    use crate::source::SourceCode;

    #[test]
    fn optimization_shape_matches_e6() {
        // `b`'s assignment still divides by zero at runtime regardless of
        // optimization, so this checks the rewritten AST shape rather than
        // evaluating it (the scenario is about structure, not a runtime
        // result, per its definition).
        let text = "PARAM x; VAR a,b,f; CONST c = 2, d = 3, e = 4;\nBEGIN f := 1+1; a := (3*(c*2)) + (e/+2) - (d+-e); f := x; b := (d+x)+(d/0); RETURN a; RETURN f END.";
        let source = SourceCode::new(text);
        let tree = Parser::new(&source).parse_program().unwrap();
        let mut result = build(&tree, &source).unwrap();

        optimize(&mut result.function);

        // Dead-code elimination keeps everything up to and including the
        // first RETURN; the trailing `RETURN f` is gone.
        assert_eq!(result.function.body.len(), 5);
        let crate::ast::Statement::Return(crate::ast::Expr::Literal(value)) =
            &result.function.body[4]
        else {
            panic!("expected the first RETURN's operand folded to a literal");
        };
        assert_eq!(*value, 15);
    }

    #[test]
    fn running_the_pipeline_twice_is_idempotent() {
        let text = "PARAM x; CONST c = 2; BEGIN RETURN c + x; RETURN 0 END.";
        let source = SourceCode::new(text);
        let tree = Parser::new(&source).parse_program().unwrap();
        let mut result = build(&tree, &source).unwrap();

        optimize(&mut result.function);
        let once = format!("{:?}", result.function.body);
        optimize(&mut result.function);
        let twice = format!("{:?}", result.function.body);
        assert_eq!(once, twice);
    }
}
