//! Module for the parser implementation.
//!
//! The parser consumes the token stream of a lexer and produces a list of
//! parser events that can be used to construct a CST.
//!
//! The design of this is very much based on `rust-analyzer`.

use std::fmt;

use crate::Diagnostic;
use crate::Span;
use crate::lexer::Lexer;
use crate::lexer::Token;
use crate::lexer::TokenSet;
use crate::tree::SyntaxKind;

/// Represents an event produced by the parser.
///
/// The parser produces a stream of events that can be used to construct
/// a CST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A new node has started.
    NodeStarted {
        /// The kind of the node.
        kind: SyntaxKind,
        /// For left-recursive syntactic constructs, the parser produces
        /// a child node before it sees a parent. `forward_parent`
        /// saves the position of current event's parent.
        forward_parent: Option<usize>,
    },

    /// A node has finished.
    NodeFinished,

    /// A token was encountered.
    Token {
        /// The syntax kind of the token.
        kind: SyntaxKind,
        /// The source span of the token.
        span: Span,
    },
}

impl Event {
    /// Gets an start node event for an abandoned node.
    pub fn abandoned() -> Self {
        Self::NodeStarted {
            kind: SyntaxKind::Abandoned,
            forward_parent: None,
        }
    }
}

/// Utility type for displaying "expected" items in a parser expectation
/// diagnostic.
struct Expected<'a> {
    /// The set of expected items.
    items: &'a [&'a str],
}

impl fmt::Display for Expected<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.items.len();
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                if count == 2 {
                    write!(f, " or ")?;
                } else if i == count - 1 {
                    write!(f, ", or ")?;
                } else {
                    write!(f, ", ")?;
                }
            }

            write!(f, "{item}")?;
        }

        Ok(())
    }
}

/// Creates an "expected, but found" diagnostic error.
pub(crate) fn expected_found(expected: &str, found: Option<&str>, span: Span) -> Diagnostic {
    let found = found.unwrap_or("end of input");
    Diagnostic::error(format!("expected {expected}, but found {found}"))
        .with_label(format!("unexpected {found}"), span)
}

/// Creates an "expected one of, but found" diagnostic error.
pub(crate) fn expected_one_of(expected: &[&str], found: Option<&str>, span: Span) -> Diagnostic {
    let found = found.unwrap_or("end of input");
    Diagnostic::error(format!(
        "expected {expected}, but found {found}",
        expected = Expected { items: expected }
    ))
    .with_label(format!("unexpected {found}"), span)
}

/// Creates an "unmatched token" diagnostic error.
pub(crate) fn unmatched(open: Token, open_span: Span, close: Token, span: Span) -> Diagnostic {
    Diagnostic::error(format!(
        "expected {close} to match {open}",
        open = open.describe(),
        close = close.describe()
    ))
    .with_label(format!("this {open} is not matched", open = open.describe()), open_span)
    .with_highlight(span)
}

/// Creates an "unknown token" diagnostic error.
pub(crate) fn unknown_token(span: Span) -> Diagnostic {
    Diagnostic::error("an unknown token was encountered")
        .with_label("this character is not valid here", span)
}

/// Marks the start of a node in the event list.
///
/// # Panics
///
/// Markers must either be completed or abandoned before being dropped;
/// otherwise, a panic will occur.
#[derive(Debug)]
pub struct Marker(usize);

impl Marker {
    /// Completes the syntax tree node.
    pub fn complete(self, parser: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        match &mut parser.events[self.0] {
            Event::NodeStarted { kind: existing, .. } => {
                *existing = kind;
            }
            _ => unreachable!(),
        }

        parser.events.push(Event::NodeFinished);
        let m = CompletedMarker {
            pos: self.0,
            kind,
        };
        std::mem::forget(self);
        m
    }

    /// Abandons the node.
    ///
    /// Any events produced since the marker was started are re-parented to
    /// the marker's parent.
    pub fn abandon(self, parser: &mut Parser<'_>) {
        if self.0 == parser.events.len() - 1 {
            match parser.events.pop() {
                Some(Event::NodeStarted {
                    kind: SyntaxKind::Abandoned,
                    forward_parent: None,
                }) => (),
                _ => unreachable!(),
            }
        }

        std::mem::forget(self);
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            panic!("marker was dropped without it being completed or abandoned");
        }
    }
}

/// Represents a marker for a node that has been completed.
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    /// Marks the position in the event list where the node was started.
    pos: usize,
    /// The kind of the completed node.
    kind: SyntaxKind,
}

impl CompletedMarker {
    /// Creates a new node that precedes the completed node.
    pub fn precede(self, parser: &mut Parser<'_>) -> Marker {
        let new_pos = parser.start();
        match &mut parser.events[self.pos] {
            Event::NodeStarted { forward_parent, .. } => {
                *forward_parent = Some(new_pos.0 - self.pos);
            }
            _ => unreachable!(),
        }
        new_pos
    }

    /// Gets the kind of the completed marker.
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }
}

/// The output of a parse: the events and the diagnostics.
pub type Output = (Vec<Event>, Vec<Diagnostic>);

/// Implements a C# parser.
///
/// The parser lexes its entire input up front so that the grammar may look
/// arbitrarily far ahead when disambiguating constructs such as lambdas,
/// casts, generic names, and local declarations.
#[allow(missing_debug_implementations)]
pub struct Parser<'a> {
    /// The source being parsed.
    source: &'a str,
    /// Every token of the source, including trivia.
    tokens: Vec<(Token, Span)>,
    /// The indexes into `tokens` of the non-trivia tokens.
    significant: Vec<usize>,
    /// The index into `tokens` of the next token to emit.
    pos: usize,
    /// The index into `significant` of the next token to consume.
    cursor: usize,
    /// The parser events.
    events: Vec<Event>,
    /// The parser diagnostics.
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source.
    pub fn new(source: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut significant = Vec::new();
        let mut diagnostics = Vec::new();
        for (result, span) in Lexer::new(source) {
            let token = match result {
                Ok(token) => token,
                Err(()) => {
                    diagnostics.push(unknown_token(span));
                    // Unknown tokens are emitted with the `Unknown` kind
                    Token::MAX
                }
            };

            if !token.is_trivia() {
                significant.push(tokens.len());
            }

            tokens.push((token, span));
        }

        Self {
            source,
            tokens,
            significant,
            pos: 0,
            cursor: 0,
            events: Vec::new(),
            diagnostics,
        }
    }

    /// Gets the source string of the given span.
    pub fn source(&self, span: Span) -> &'a str {
        &self.source[span.start()..span.end()]
    }

    /// Gets the `n`-th upcoming non-trivia token and its span.
    ///
    /// An unknown token is reported as `None` for its token.
    fn nth_entry(&self, n: usize) -> Option<(Token, Span)> {
        self.significant
            .get(self.cursor + n)
            .map(|&index| self.tokens[index])
    }

    /// Gets the `n`-th upcoming non-trivia token.
    ///
    /// Unknown tokens are returned as [`Token::MAX`].
    pub fn nth(&self, n: usize) -> Option<Token> {
        self.nth_entry(n).map(|(t, _)| t)
    }

    /// Peeks at the next non-trivia token.
    pub fn peek(&self) -> Option<Token> {
        self.nth(0)
    }

    /// Peeks at the token after the next non-trivia token.
    pub fn peek2(&self) -> Option<Token> {
        self.nth(1)
    }

    /// Gets the span of the next token.
    ///
    /// At the end of input, this is an empty span at the end of the source.
    pub fn span(&self) -> Span {
        self.nth_entry(0)
            .map(|(_, s)| s)
            .unwrap_or_else(|| Span::new(self.source.len(), 0))
    }

    /// Gets the span of the `n`-th upcoming non-trivia token.
    pub fn nth_span(&self, n: usize) -> Option<Span> {
        self.nth_entry(n).map(|(_, s)| s)
    }

    /// Determines if the `n`-th and `n + 1`-th upcoming tokens are adjacent
    /// (i.e. no trivia separates them).
    pub fn adjacent(&self, n: usize) -> bool {
        match (self.nth_span(n), self.nth_span(n + 1)) {
            (Some(a), Some(b)) => a.end() == b.start(),
            _ => false,
        }
    }

    /// Gets the source text of the `n`-th upcoming token.
    pub fn nth_text(&self, n: usize) -> Option<&'a str> {
        self.nth_entry(n).map(|(_, s)| self.source(s))
    }

    /// Determines if the next token is the given token.
    pub fn at(&self, token: Token) -> bool {
        self.peek() == Some(token)
    }

    /// Determines if the next token is an identifier with the given text.
    ///
    /// This is used for contextual keywords such as `get` or `where`.
    pub fn at_contextual(&self, text: &str) -> bool {
        self.at(Token::Ident) && self.nth_text(0) == Some(text)
    }

    /// Determines if the next token is in the given set.
    pub fn at_set(&self, set: TokenSet) -> bool {
        self.peek()
            .map(|t| t != Token::MAX && set.contains(t.into_raw()))
            .unwrap_or(false)
    }

    /// Gets the number of non-trivia tokens consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Determines if the parser has consumed every non-trivia token.
    pub fn at_end(&self) -> bool {
        self.cursor >= self.significant.len()
    }

    /// Adds a diagnostic to the parser output.
    pub fn diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Emits any trivia preceding the next non-trivia token.
    pub fn eat_trivia(&mut self) {
        let end = self
            .significant
            .get(self.cursor)
            .copied()
            .unwrap_or(self.tokens.len());
        while self.pos < end {
            let (token, span) = self.tokens[self.pos];
            self.events.push(Event::Token {
                kind: token.into_syntax(),
                span,
            });
            self.pos += 1;
        }
    }

    /// Starts a new node event.
    ///
    /// Pending trivia is emitted first so that it precedes the node.
    pub fn start(&mut self) -> Marker {
        self.eat_trivia();
        self.start_root()
    }

    /// Starts the root node event.
    ///
    /// Unlike [`Parser::start`], pending trivia is left for the node to
    /// contain, as a tree has exactly one root.
    pub fn start_root(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::abandoned());
        Marker(pos)
    }

    /// Consumes the next token, emitting it (and any preceding trivia).
    ///
    /// Does nothing at the end of input.
    pub fn bump(&mut self) {
        let Some(&index) = self.significant.get(self.cursor) else {
            return;
        };

        self.eat_trivia();
        let (token, span) = self.tokens[index];
        if token == Token::MAX {
            self.events.push(Event::Token {
                kind: SyntaxKind::Unknown,
                span,
            });
        } else {
            self.events.push(Event::Token {
                kind: token.into_syntax(),
                span,
            });
        }

        self.pos = index + 1;
        self.cursor += 1;
    }

    /// Consumes the next token if it matches the given token.
    pub fn next_if(&mut self, token: Token) -> bool {
        if self.at(token) {
            self.bump();
            return true;
        }

        false
    }

    /// Expects the next token to be the given token.
    ///
    /// If the token does not match, a diagnostic is added and the token is
    /// not consumed.
    pub fn expect(&mut self, token: Token) -> bool {
        if self.next_if(token) {
            return true;
        }

        self.diagnostic(expected_found(
            token.describe(),
            self.found(),
            self.span(),
        ));
        false
    }

    /// Expects one of the given tokens (described by `expected`).
    pub fn expect_one_of(&mut self, set: TokenSet, expected: &[&str]) -> bool {
        if self.at_set(set) {
            self.bump();
            return true;
        }

        self.diagnostic(expected_one_of(expected, self.found(), self.span()));
        false
    }

    /// Describes the next token for use in a diagnostic.
    pub fn found(&self) -> Option<&'static str> {
        self.peek().map(|t| {
            if t == Token::MAX {
                "unknown token"
            } else {
                t.describe()
            }
        })
    }

    /// Consumes a closing token that matches an already consumed opening
    /// token.
    pub fn expect_close(&mut self, open: Token, open_span: Span, close: Token) {
        if !self.next_if(close) {
            self.diagnostic(unmatched(open, open_span, close, self.span()));
        }
    }

    /// Consumes a balanced group of tokens starting at an opening token.
    ///
    /// This is used to skip over constructs the grammar does not model.
    pub fn bump_balanced(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::OpenBrace | Token::OpenParen | Token::OpenBracket => depth += 1,
                Token::CloseBrace | Token::CloseParen | Token::CloseBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }

            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    /// Recovers from an error by wrapping tokens in an error node until a
    /// token in the recovery set is at the current nesting level.
    ///
    /// At least one token is consumed unless the next token is a closing
    /// delimiter or the input has ended, so callers looping on recovery always
    /// make progress.
    pub fn recover(&mut self, diagnostic: Diagnostic, recovery: TokenSet) {
        self.diagnostic(diagnostic);
        let marker = self.start();
        let mut consumed = false;
        while let Some(token) = self.peek() {
            if consumed && self.at_set(recovery) {
                break;
            }

            match token {
                Token::CloseBrace | Token::CloseParen | Token::CloseBracket => break,
                Token::OpenBrace | Token::OpenParen | Token::OpenBracket => self.bump_balanced(),
                Token::Semicolon => {
                    self.bump();
                    consumed = true;
                    break;
                }
                _ => self.bump(),
            }

            consumed = true;
        }

        if consumed {
            marker.complete(self, SyntaxKind::ErrorNode);
        } else {
            marker.abandon(self);
        }
    }

    /// Consumes the parser and returns its events and diagnostics.
    ///
    /// Any remaining tokens (including trivia) are emitted first.
    pub fn finish(mut self) -> Output {
        while !self.at_end() {
            self.bump();
        }
        self.eat_trivia();
        (self.events, self.diagnostics)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lookahead_skips_trivia() {
        let parser = Parser::new("a /* c */ . // x\n b");
        assert_eq!(parser.peek(), Some(Token::Ident));
        assert_eq!(parser.peek2(), Some(Token::Dot));
        assert_eq!(parser.nth(2), Some(Token::Ident));
        assert_eq!(parser.nth(3), None);
        assert_eq!(parser.nth_text(2), Some("b"));
    }

    #[test]
    fn trivia_is_emitted_before_nodes() {
        let mut parser = Parser::new("  a");
        let marker = parser.start();
        parser.bump();
        marker.complete(&mut parser, SyntaxKind::NameExprNode);
        let (events, diagnostics) = parser.finish();
        assert!(diagnostics.is_empty());
        assert_eq!(
            events,
            &[
                Event::Token {
                    kind: SyntaxKind::Whitespace,
                    span: Span::new(0, 2),
                },
                Event::NodeStarted {
                    kind: SyntaxKind::NameExprNode,
                    forward_parent: None,
                },
                Event::Token {
                    kind: SyntaxKind::Ident,
                    span: Span::new(2, 1),
                },
                Event::NodeFinished,
            ]
        );
    }

    #[test]
    fn expect_reports_found_token() {
        let mut parser = Parser::new("a");
        assert!(!parser.expect(Token::Semicolon));
        let (_, diagnostics) = parser.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "expected `;`, but found identifier"
        );
    }

    #[test]
    fn recovery_skips_balanced_groups() {
        let mut parser = Parser::new("a (b; c) d; e");
        parser.recover(Diagnostic::error("bad"), TokenSet::EMPTY);
        assert_eq!(parser.nth_text(0), Some("e"));
    }

    #[test]
    fn unknown_tokens_are_diagnosed() {
        let parser = Parser::new("a ` b");
        assert_eq!(parser.nth(1), Some(Token::MAX));
        let (events, diagnostics) = parser.finish();
        assert_eq!(diagnostics.len(), 1);
        assert!(events.contains(&Event::Token {
            kind: SyntaxKind::Unknown,
            span: Span::new(2, 1),
        }));
    }
}
