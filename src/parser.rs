//! Recursive-descent parser: tokens to parse tree (§6 grammar), LL(1) with
//! one token of lookahead. Each non-terminal is a method that either returns
//! its node or the first [`Diagnostic`] it hit; there is no error recovery,
//! matching the fail-fast propagation rule in §7 — a parse error aborts the
//! whole `parse_program` call.
//!
//! Structurally this follows the reference codebase's parser (one method per
//! non-terminal, an `expect_*` family for terminal matching, a delimiter note
//! attached on mismatched closing brackets), generalized from its
//! `rowan`-backed green-tree builder to build the typed [`crate::cst`] nodes
//! directly, since the parse tree here has no need for a lossless token
//! stream separate from its typed structure.

use crate::cst::*;
use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::source::{SourceCode, SourceSpan};
use crate::token::{Keyword, Operator, Paren, Separator, TokenKind};

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    source: &'src SourceCode,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src SourceCode) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
        }
    }

    pub fn parse_program(mut self) -> Result<FunctionDefinition, Diagnostic> {
        let (param, var, const_decl) = self.parse_declarations()?;
        let compound = self.parse_compound()?;

        let dot_tok = self.lexer.consume()?;
        let dot = match dot_tok.kind {
            TokenKind::Separator(Separator::Dot) => dot_tok.span,
            _ => return Err(Diagnostic::error("Expected `.` terminator!", dot_tok.span)),
        };

        if !self.lexer.end_of_stream() {
            let pos = self.lexer.position();
            return Err(Diagnostic::error(
                "unexpected character after end of program terminator!",
                SourceSpan::at(pos),
            ));
        }

        Ok(FunctionDefinition {
            param,
            var,
            const_decl,
            compound,
            dot,
        })
    }

    /// Accepts 0-or-1 of `PARAM`, `VAR`, `CONST` in that order; any further
    /// declaration keyword is a duplicate or an ordering violation (§4.4).
    fn parse_declarations(
        &mut self,
    ) -> Result<(Option<ParamDecl>, Option<VarDecl>, Option<ConstDecl>), Diagnostic> {
        let mut param = None;
        let mut var = None;
        let mut const_decl = None;
        let mut stage: u8 = 0;

        loop {
            let tok = self.lexer.peek()?;
            let rank: u8 = match tok.kind {
                TokenKind::Keyword(Keyword::Param) => 1,
                TokenKind::Keyword(Keyword::Var) => 2,
                TokenKind::Keyword(Keyword::Const) => 3,
                _ => break,
            };

            if rank == stage {
                let name = match rank {
                    1 => "PARAM",
                    2 => "VAR",
                    _ => "CONST",
                };
                return Err(Diagnostic::error(
                    format!("Duplicate {name} declaration!"),
                    tok.span,
                ));
            }

            if rank < stage {
                let message = match (rank, stage) {
                    (1, 2) => "PARAM declaration must appear before VAR declaration!",
                    (1, 3) => "PARAM declaration must appear before CONST and VAR declarations!",
                    (2, 3) => "VAR declaration must appear before CONST declaration!",
                    _ => unreachable!("only three declaration ranks exist"),
                };
                return Err(Diagnostic::error(message, tok.span));
            }

            match rank {
                1 => param = Some(self.parse_param_decl()?),
                2 => var = Some(self.parse_var_decl()?),
                _ => const_decl = Some(self.parse_const_decl()?),
            }
            stage = rank;
        }

        Ok((param, var, const_decl))
    }

    fn parse_param_decl(&mut self) -> Result<ParamDecl, Diagnostic> {
        let keyword = self.expect_keyword(Keyword::Param, "Expected `PARAM` keyword!")?;
        let list = self.parse_decl_list()?;
        let semicolon =
            self.expect_separator(Separator::Semicolon, "Expected `;` to terminate statement!")?;
        Ok(ParamDecl {
            keyword,
            list,
            semicolon,
        })
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl, Diagnostic> {
        let keyword = self.expect_keyword(Keyword::Var, "Expected `VAR` keyword!")?;
        let list = self.parse_decl_list()?;
        let semicolon =
            self.expect_separator(Separator::Semicolon, "Expected `;` to terminate statement!")?;
        Ok(VarDecl {
            keyword,
            list,
            semicolon,
        })
    }

    fn parse_const_decl(&mut self) -> Result<ConstDecl, Diagnostic> {
        let keyword = self.expect_keyword(Keyword::Const, "Expected `CONST` keyword!")?;
        let list = self.parse_init_list()?;
        let semicolon =
            self.expect_separator(Separator::Semicolon, "Expected `;` to terminate statement!")?;
        Ok(ConstDecl {
            keyword,
            list,
            semicolon,
        })
    }

    fn parse_decl_list(&mut self) -> Result<DeclList, Diagnostic> {
        let mut idents = vec![self.parse_ident()?];
        let mut commas = Vec::new();
        while let TokenKind::Separator(Separator::Comma) = self.lexer.peek()?.kind {
            commas.push(self.lexer.consume()?.span);
            idents.push(self.parse_ident()?);
        }
        Ok(DeclList { idents, commas })
    }

    fn parse_init_list(&mut self) -> Result<InitList, Diagnostic> {
        let mut decls = vec![self.parse_init_decl()?];
        let mut commas = Vec::new();
        while let TokenKind::Separator(Separator::Comma) = self.lexer.peek()?.kind {
            commas.push(self.lexer.consume()?.span);
            decls.push(self.parse_init_decl()?);
        }
        Ok(InitList { decls, commas })
    }

    fn parse_init_decl(&mut self) -> Result<InitDecl, Diagnostic> {
        let ident = self.parse_ident()?;
        let equals = self.expect_operator(Operator::Equals, "Expected `=` operator!")?;
        let literal = self.parse_literal()?;
        Ok(InitDecl {
            ident,
            equals,
            literal,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound, Diagnostic> {
        let begin = self.expect_keyword(Keyword::Begin, "Expected `BEGIN` keyword!")?;
        let stmts = self.parse_stmt_list()?;
        let end = self.expect_keyword(Keyword::End, "Expected `END` keyword!")?;
        Ok(Compound { begin, stmts, end })
    }

    fn parse_stmt_list(&mut self) -> Result<StmtList, Diagnostic> {
        let mut stmts = vec![self.parse_stmt()?];
        let mut semicolons = Vec::new();
        while let TokenKind::Separator(Separator::Semicolon) = self.lexer.peek()?.kind {
            semicolons.push(self.lexer.consume()?.span);
            stmts.push(self.parse_stmt()?);
        }
        Ok(StmtList { stmts, semicolons })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        match self.lexer.peek()?.kind {
            TokenKind::Keyword(Keyword::Return) => {
                let keyword = self.lexer.consume()?.span;
                let expr = self.parse_additive()?;
                Ok(Stmt::Return { keyword, expr })
            }
            TokenKind::Identifier => {
                let ident = self.parse_ident()?;
                let assign = self.expect_operator(Operator::Assign, "Expected `:=` operator!")?;
                let expr = self.parse_additive()?;
                Ok(Stmt::Assignment {
                    ident,
                    assign,
                    expr,
                })
            }
            _ => {
                let tok = self.lexer.consume()?;
                Err(Diagnostic::error(
                    "Expected begin of statement. Assignment or RETURN expression!",
                    tok.span,
                ))
            }
        }
    }

    fn parse_additive(&mut self) -> Result<Additive, Diagnostic> {
        let head = self.parse_multiplicative()?;
        let tail = match self.lexer.peek()?.kind {
            TokenKind::Operator(Operator::Plus) => {
                let span = self.lexer.consume()?.span;
                Some((AddOp::Plus, span, Box::new(self.parse_additive()?)))
            }
            TokenKind::Operator(Operator::Minus) => {
                let span = self.lexer.consume()?.span;
                Some((AddOp::Minus, span, Box::new(self.parse_additive()?)))
            }
            _ => None,
        };
        Ok(Additive { head, tail })
    }

    fn parse_multiplicative(&mut self) -> Result<Multiplicative, Diagnostic> {
        let head = self.parse_unary()?;
        let tail = match self.lexer.peek()?.kind {
            TokenKind::Operator(Operator::Star) => {
                let span = self.lexer.consume()?.span;
                Some((MulOp::Star, span, Box::new(self.parse_multiplicative()?)))
            }
            TokenKind::Operator(Operator::Slash) => {
                let span = self.lexer.consume()?.span;
                Some((MulOp::Slash, span, Box::new(self.parse_multiplicative()?)))
            }
            _ => None,
        };
        Ok(Multiplicative { head, tail })
    }

    fn parse_unary(&mut self) -> Result<Unary, Diagnostic> {
        let op = match self.lexer.peek()?.kind {
            TokenKind::Operator(Operator::Plus) => {
                Some((UnaryOp::Plus, self.lexer.consume()?.span))
            }
            TokenKind::Operator(Operator::Minus) => {
                Some((UnaryOp::Minus, self.lexer.consume()?.span))
            }
            _ => None,
        };
        let primary = self.parse_primary()?;
        Ok(Unary { op, primary })
    }

    fn parse_primary(&mut self) -> Result<Primary, Diagnostic> {
        let tok = self.lexer.peek()?;
        match tok.kind {
            TokenKind::Identifier => Ok(Primary::Ident(self.parse_ident()?)),
            TokenKind::Literal => Ok(Primary::Literal(self.parse_literal()?)),
            TokenKind::Parenthesis(Paren::Open) => {
                let open = self.lexer.consume()?.span;
                let inner = Box::new(self.parse_additive()?);
                let close = self.expect_close_paren(open)?;
                Ok(Primary::Bracketed { open, inner, close })
            }
            TokenKind::Operator(_) => {
                self.lexer.consume()?;
                Err(Diagnostic::error("Unexpected unary operator!", tok.span))
            }
            _ => {
                self.lexer.consume()?;
                Err(Diagnostic::error(
                    "Expected identifier, literal or bracketed expression!",
                    tok.span,
                ))
            }
        }
    }

    fn parse_ident(&mut self) -> Result<Ident, Diagnostic> {
        let tok = self.lexer.consume()?;
        match tok.kind {
            TokenKind::Identifier => Ok(Ident { span: tok.span }),
            _ => Err(Diagnostic::error("Expected an identifier!", tok.span)),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, Diagnostic> {
        let tok = self.lexer.consume()?;
        match tok.kind {
            TokenKind::Literal => {
                let text = tok.span.slice(self.source);
                match text.parse::<i64>() {
                    Ok(value) => Ok(Literal {
                        span: tok.span,
                        value,
                    }),
                    Err(_) => Err(Diagnostic::error(
                        "Integer literal is out of range. Expected singed 64-bit!",
                        tok.span,
                    )),
                }
            }
            _ => Err(Diagnostic::error("Expected literal!", tok.span)),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, message: &str) -> Result<SourceSpan, Diagnostic> {
        let tok = self.lexer.consume()?;
        match tok.kind {
            TokenKind::Keyword(k) if k == keyword => Ok(tok.span),
            _ => Err(Diagnostic::error(message.to_string(), tok.span)),
        }
    }

    fn expect_separator(
        &mut self,
        separator: Separator,
        message: &str,
    ) -> Result<SourceSpan, Diagnostic> {
        let tok = self.lexer.consume()?;
        match tok.kind {
            TokenKind::Separator(s) if s == separator => Ok(tok.span),
            _ => Err(Diagnostic::error(message.to_string(), tok.span)),
        }
    }

    fn expect_operator(&mut self, operator: Operator, message: &str) -> Result<SourceSpan, Diagnostic> {
        let tok = self.lexer.consume()?;
        match tok.kind {
            TokenKind::Operator(o) if o == operator => Ok(tok.span),
            _ => Err(Diagnostic::error(message.to_string(), tok.span)),
        }
    }

    fn expect_close_paren(&mut self, open: SourceSpan) -> Result<SourceSpan, Diagnostic> {
        let tok = self.lexer.consume()?;
        match tok.kind {
            TokenKind::Parenthesis(Paren::Close) => Ok(tok.span),
            _ => Err(
                Diagnostic::error("Expected matching `)` parenthesis!", tok.span)
                    .with_cause(Diagnostic::note("opening bracket here", open)),
            ),
        }
    }
}
