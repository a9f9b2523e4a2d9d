//! Hand-written lexical scanner: character stream to typed tokens, with one
//! token of lookahead.
//!
//! Unlike the reference codebase's `logos`-derived lexer (a derive-macro
//! state machine driving a plain `Iterator`), this scanner exposes the
//! explicit `peek`/`consume` contract the language requires: callers need to
//! look one token ahead without committing to it (e.g. to decide whether
//! `PARAM`/`VAR`/`CONST` starts a new declaration), and a lexer error must be
//! latched rather than silently skipped over.

use crate::diagnostic::Diagnostic;
use crate::source::{SourceCode, SourceSpan};
use crate::token::{Keyword, Operator, Paren, Separator, Token, TokenKind};

pub struct Lexer<'src> {
    source: &'src SourceCode,
    text: &'src str,
    cursor: usize,
    peeked: Option<Result<Token, Diagnostic>>,
    returned_with_error: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src SourceCode) -> Self {
        Self {
            source,
            text: source.text(),
            cursor: 0,
            peeked: None,
            returned_with_error: false,
        }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    /// True if only whitespace remains in the stream. Side-effecting: it
    /// advances past trailing whitespace so later calls observe the same
    /// answer, matching the scanner's definition of "done".
    pub fn end_of_stream(&mut self) -> bool {
        self.skip_whitespace();
        self.cursor >= self.text.len()
    }

    /// Returns the next token without advancing. Repeated peeks are
    /// idempotent.
    pub fn peek(&mut self) -> Result<Token, Diagnostic> {
        if let Some(result) = &self.peeked {
            return result.clone();
        }
        let result = self.scan_next();
        self.peeked = Some(result.clone());
        result
    }

    /// Returns the next token and advances past it.
    pub fn consume(&mut self) -> Result<Token, Diagnostic> {
        debug_assert!(
            !self.returned_with_error,
            "consumed from a lexer that already returned an error"
        );
        let result = match self.peeked.take() {
            Some(result) => result,
            None => self.scan_next(),
        };
        if result.is_err() {
            self.returned_with_error = true;
        }
        result
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.text[self.cursor..].chars().next() {
            if is_whitespace(c) {
                self.cursor += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn scan_next(&mut self) -> Result<Token, Diagnostic> {
        self.skip_whitespace();

        let start = self.cursor;
        let Some(first) = self.text[start..].chars().next() else {
            return Err(Diagnostic::error(
                "Unexpected end of stream!",
                SourceSpan::at(start),
            ));
        };

        if is_letter(first) {
            self.cursor += first.len_utf8();
            while let Some(c) = self.text[self.cursor..].chars().next() {
                if is_letter(c) {
                    self.cursor += c.len_utf8();
                } else {
                    break;
                }
            }
            let span = SourceSpan::new(start, self.cursor);
            let text = span.slice(self.source);
            let kind = match Keyword::from_str(text) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier,
            };
            return Ok(Token::new(kind, span));
        }

        if first.is_ascii_digit() {
            self.cursor += 1;
            while matches!(self.text.as_bytes().get(self.cursor), Some(b) if b.is_ascii_digit()) {
                self.cursor += 1;
            }
            return Ok(Token::new(
                TokenKind::Literal,
                SourceSpan::new(start, self.cursor),
            ));
        }

        if let Some(paren) = paren_of(first) {
            self.cursor += 1;
            return Ok(Token::new(
                TokenKind::Parenthesis(paren),
                SourceSpan::new(start, self.cursor),
            ));
        }

        if let Some(separator) = separator_of(first) {
            self.cursor += 1;
            return Ok(Token::new(
                TokenKind::Separator(separator),
                SourceSpan::new(start, self.cursor),
            ));
        }

        if first == ':' {
            self.cursor += 1;
            return match self.text.as_bytes().get(self.cursor) {
                Some(b'=') => {
                    self.cursor += 1;
                    Ok(Token::new(
                        TokenKind::Operator(Operator::Assign),
                        SourceSpan::new(start, self.cursor),
                    ))
                }
                Some(_) => {
                    let colon_span = SourceSpan::new(start, self.cursor);
                    let error_span = SourceSpan::at(self.cursor);
                    Err(
                        Diagnostic::error("Unexpected character to complete token!", error_span)
                            .with_cause(Diagnostic::note("partial token here", colon_span)),
                    )
                }
                None => Err(Diagnostic::error(
                    "Unexpected end of stream on incomplete Token!",
                    SourceSpan::at(self.cursor),
                )),
            };
        }

        if let Some(operator) = simple_operator_of(first) {
            self.cursor += 1;
            return Ok(Token::new(
                TokenKind::Operator(operator),
                SourceSpan::new(start, self.cursor),
            ));
        }

        Err(Diagnostic::error(
            "Unexpected character!",
            SourceSpan::new(start, start + first.len_utf8()),
        ))
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn paren_of(c: char) -> Option<Paren> {
    match c {
        '(' => Some(Paren::Open),
        ')' => Some(Paren::Close),
        _ => None,
    }
}

fn separator_of(c: char) -> Option<Separator> {
    match c {
        ',' => Some(Separator::Comma),
        ';' => Some(Separator::Semicolon),
        '.' => Some(Separator::Dot),
        _ => None,
    }
}

fn simple_operator_of(c: char) -> Option<Operator> {
    match c {
        '+' => Some(Operator::Plus),
        '-' => Some(Operator::Minus),
        '*' => Some(Operator::Star),
        '/' => Some(Operator::Slash),
        '=' => Some(Operator::Equals),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_keywords_and_identifiers() {
        let source = SourceCode::new("PARAM width height");
        let mut lexer = Lexer::new(&source);
        assert_eq!(
            lexer.consume().unwrap().kind,
            TokenKind::Keyword(Keyword::Param)
        );
        assert_eq!(lexer.consume().unwrap().kind, TokenKind::Identifier);
        assert_eq!(lexer.consume().unwrap().kind, TokenKind::Identifier);
        assert!(lexer.end_of_stream());
    }

    #[test]
    fn peek_is_idempotent() {
        let source = SourceCode::new("RETURN");
        let mut lexer = Lexer::new(&source);
        let first = lexer.peek().unwrap();
        let second = lexer.peek().unwrap();
        assert_eq!(first, second);
        let consumed = lexer.consume().unwrap();
        assert_eq!(consumed, first);
    }

    #[test]
    fn assign_is_single_token() {
        let source = SourceCode::new("a := 1");
        let mut lexer = Lexer::new(&source);
        lexer.consume().unwrap(); // a
        let tok = lexer.consume().unwrap();
        assert_eq!(tok.kind, TokenKind::Operator(Operator::Assign));
        assert_eq!(tok.span.slice(&source), ":=");
    }

    #[test]
    fn lone_colon_is_an_error_with_note() {
        let source = SourceCode::new("a : 1");
        let mut lexer = Lexer::new(&source);
        lexer.consume().unwrap(); // a
        let err = lexer.consume().unwrap_err();
        assert_eq!(err.message(), "Unexpected character to complete token!");
        assert_eq!(err.causes().len(), 1);
        assert_eq!(err.causes()[0].message(), "partial token here");
    }

    #[test]
    fn trailing_colon_at_eof_is_incomplete_token() {
        let source = SourceCode::new("a :");
        let mut lexer = Lexer::new(&source);
        lexer.consume().unwrap();
        let err = lexer.consume().unwrap_err();
        assert_eq!(err.message(), "Unexpected end of stream on incomplete Token!");
    }

    #[test]
    fn unexpected_character_is_reported() {
        let source = SourceCode::new("a # b");
        let mut lexer = Lexer::new(&source);
        lexer.consume().unwrap();
        let err = lexer.consume().unwrap_err();
        assert_eq!(err.message(), "Unexpected character!");
    }

    #[test]
    fn end_of_stream_before_any_character_is_an_error() {
        let source = SourceCode::new("   ");
        let mut lexer = Lexer::new(&source);
        let err = lexer.consume().unwrap_err();
        assert_eq!(err.message(), "Unexpected end of stream!");
    }

    #[test]
    fn round_trip_reproduces_source() {
        let text = "PARAM a, b;\n  VAR c;\nBEGIN c := a + b; RETURN c END.";
        let source = SourceCode::new(text);
        let mut lexer = Lexer::new(&source);
        let mut rebuilt = String::new();
        let mut last_end = 0;
        loop {
            if lexer.end_of_stream() {
                break;
            }
            let tok = lexer.consume().unwrap();
            rebuilt.push_str(&text[last_end..tok.span.start()]);
            rebuilt.push_str(tok.span.slice(&source));
            last_end = tok.span.end();
        }
        rebuilt.push_str(&text[last_end..]);
        assert_eq!(rebuilt, text);
    }
}
