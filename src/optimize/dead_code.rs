//! Dead-code elimination (§4.8): finds the first `Return` statement and
//! drops everything after it. Grounded in the original implementation's
//! `DeadCodeElimination` pass, which does the identical truncation.

use crate::ast::{Function, Statement};

pub fn eliminate_dead_code(function: &mut Function) {
    if let Some(cut) = function
        .body
        .iter()
        .position(|stmt| matches!(stmt, Statement::Return(_)))
    {
        function.body.truncate(cut + 1);
    }
}
