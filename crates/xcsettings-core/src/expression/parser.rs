//! Expression parser.
//!
//! All syntactically significant characters are ASCII, so the parser walks
//! bytes and only ever slices the source at ASCII positions.

use std::sync::Arc;

use super::operators::{ReplacementOperator, RetrievalOperator};
use super::{ExpressionKind, Fragment, Operator, Substitution, Target};
use crate::diagnostics::{SyntaxDiagnostic, SyntaxErrorKind};

pub(super) fn parse(source: &str, kind: ExpressionKind) -> (Vec<Fragment>, Vec<SyntaxDiagnostic>) {
    let mut parser = Parser {
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
        problems: Vec::new(),
    };
    let fragments = match kind {
        ExpressionKind::String => parser.string_expression(),
        ExpressionKind::List => parser.list_expression(),
    };
    (fragments, parser.problems)
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

fn is_operator_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'+' | b'.' | b'_')
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    problems: Vec<SyntaxDiagnostic>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn problem(&mut self, kind: SyntaxErrorKind, offset: usize) {
        self.problems.push(SyntaxDiagnostic { kind, offset });
    }

    fn scan_until(&mut self, stop: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek() {
            if stop(b) {
                break;
            }
            self.pos += 1;
        }
    }

    /// Step over one whole character.
    fn advance_char(&mut self) {
        let len = self.src[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.pos += len;
    }

    fn flush(&self, mark: usize, out: &mut Vec<Fragment>) {
        if mark < self.pos {
            out.push(Fragment::Literal(self.src[mark..self.pos].to_string()));
        }
    }

    fn string_expression(&mut self) -> Vec<Fragment> {
        let mut out = Vec::new();
        if self.at_end() {
            out.push(Fragment::Literal(String::new()));
        }
        while !self.at_end() {
            if self.peek() == Some(b'$') {
                self.substitution(true, &mut out);
            } else {
                let start = self.pos;
                self.scan_until(|b| b == b'$');
                self.flush(start, &mut out);
            }
        }
        out
    }

    fn list_expression(&mut self) -> Vec<Fragment> {
        let mut out = Vec::new();
        self.whitespace(false, &mut out);
        while !self.at_end() {
            self.list_element(&mut out);
            self.whitespace(true, &mut out);
        }
        out
    }

    /// Whitespace between elements is a separator; leading and trailing
    /// whitespace only shows up in string form.
    fn whitespace(&mut self, separates: bool, out: &mut Vec<Fragment>) {
        let start = self.pos;
        self.scan_until(|b| !b.is_ascii_whitespace());
        if self.pos == start {
            return;
        }
        let text = self.src[start..self.pos].to_string();
        if separates && !self.at_end() {
            out.push(Fragment::Separator(text));
        } else {
            out.push(Fragment::StringFormOnly(text));
        }
    }

    fn list_element(&mut self, out: &mut Vec<Fragment>) {
        let mut quote: Option<u8> = None;
        let mut quote_start = self.pos;
        let mut mark = self.pos;

        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.flush(mark, out);
                    out.push(Fragment::StringFormOnly("\\".to_string()));
                    self.pos += 1;
                    mark = self.pos;
                    if self.at_end() {
                        self.problem(SyntaxErrorKind::TrailingEscapeCharacter, self.pos - 1);
                    } else {
                        self.advance_char();
                    }
                }
                b'$' => {
                    self.flush(mark, out);
                    self.substitution(quote.is_some(), out);
                    mark = self.pos;
                }
                b'"' | b'\'' if quote.is_none() || quote == Some(b) => {
                    self.flush(mark, out);
                    let q = (b as char).to_string();
                    out.push(Fragment::StringFormOnly(q.clone()));
                    self.pos += 1;
                    if quote.is_none() && self.peek() == Some(b) {
                        // `""` is an empty element, not nothing.
                        out.push(Fragment::Literal(String::new()));
                        out.push(Fragment::StringFormOnly(q));
                        self.pos += 1;
                    } else if quote.is_none() {
                        quote = Some(b);
                        quote_start = self.pos - 1;
                    } else {
                        quote = None;
                    }
                    mark = self.pos;
                }
                b if b.is_ascii_whitespace() && quote.is_none() => break,
                _ => self.pos += 1,
            }
        }
        self.flush(mark, out);
        if quote.is_some() {
            self.problem(SyntaxErrorKind::UnterminatedQuotation, quote_start);
        }
    }

    /// Parse a `$` reference starting at the current position.
    fn substitution(&mut self, as_string: bool, out: &mut Vec<Fragment>) {
        let start = self.pos;
        self.pos += 1;

        let Some(open) = self.peek() else {
            self.problem(SyntaxErrorKind::TrailingDollarSign, start);
            out.push(Fragment::Literal("$".to_string()));
            return;
        };

        let close = match open {
            b'(' => b')',
            b'{' => b'}',
            b'[' => b']',
            b if is_name_start(b) => {
                let name_start = self.pos;
                self.scan_until(|b| !is_name_char(b));
                out.push(Fragment::Substitution(Substitution {
                    target: target_named(&self.src[name_start..self.pos]),
                    operators: Vec::new(),
                    bracketed: false,
                    as_string,
                }));
                return;
            }
            b => {
                // `$$` is an escaped `$`; any other `$` is literal.
                if b == b'$' {
                    self.pos += 1;
                }
                out.push(Fragment::Literal("$".to_string()));
                return;
            }
        };

        if open != b'(' {
            self.problem(SyntaxErrorKind::DeprecatedReferenceSyntax, start);
        }
        self.pos += 1;

        let name_start = self.pos;
        let name = self.run(close, true);
        if self.at_end() {
            self.problem(SyntaxErrorKind::UnterminatedSubstitution, start);
        } else if self.pos == name_start {
            self.problem(SyntaxErrorKind::MissingMacroName, start);
        }

        let mut operators = Vec::new();
        while self.peek() == Some(b':') {
            self.pos += 1;
            let op_start = self.pos;
            self.scan_until(|b| !is_operator_char(b));
            let op_name = &self.src[op_start..self.pos];

            match self.peek() {
                None => {
                    self.problem(SyntaxErrorKind::UnterminatedSubstitution, start);
                }
                Some(b'=') => {
                    self.pos += 1;
                    let operand = self.run(close, as_string);
                    if op_name.is_empty() {
                        self.problem(SyntaxErrorKind::MissingOperatorName, op_start);
                    } else if let Some(op) = ReplacementOperator::from_name(op_name) {
                        operators.push(Operator::Replace(op, operand));
                    } else {
                        self.problem(SyntaxErrorKind::UnknownReplacementOperator, op_start);
                    }
                    if self.at_end() {
                        self.problem(SyntaxErrorKind::UnterminatedSubstitution, start);
                    }
                }
                Some(b) if b == b':' || b == close => {
                    if op_name.is_empty() {
                        self.problem(SyntaxErrorKind::MissingOperatorName, op_start);
                    } else if let Some(op) = RetrievalOperator::from_name(op_name) {
                        operators.push(Operator::Retrieve(op));
                    } else {
                        self.problem(SyntaxErrorKind::UnknownRetrievalOperator, op_start);
                    }
                }
                Some(_) => {
                    self.problem(SyntaxErrorKind::InvalidOperatorCharacter, self.pos);
                    self.scan_until(|b| b == b':' || b == close);
                    if self.at_end() {
                        self.problem(SyntaxErrorKind::UnterminatedSubstitution, start);
                    }
                }
            }
        }
        if self.peek() == Some(close) {
            self.pos += 1;
        }

        out.push(Fragment::Substitution(Substitution {
            target: target_from(name),
            operators,
            bracketed: true,
            as_string,
        }));
    }

    /// Literal text and nested references up to `:`, `close` or the end.
    fn run(&mut self, close: u8, as_string: bool) -> Vec<Fragment> {
        let mut parts = Vec::new();
        loop {
            let start = self.pos;
            self.scan_until(|b| b == b'$' || b == b':' || b == close);
            self.flush(start, &mut parts);
            if self.peek() != Some(b'$') {
                break;
            }
            self.substitution(as_string, &mut parts);
        }
        parts
    }
}

fn target_named(name: &str) -> Target {
    if name == "inherited" {
        Target::Inherited
    } else {
        Target::Named(Arc::from(name))
    }
}

fn target_from(parts: Vec<Fragment>) -> Target {
    let mut name = String::new();
    for part in &parts {
        match part {
            Fragment::Literal(text) => name.push_str(text),
            _ => return Target::Dynamic(parts),
        }
    }
    target_named(&name)
}
