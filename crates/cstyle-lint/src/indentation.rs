//! Detection and correction of indentation drift in multi-line expressions.
//!
//! A statement's governed expression (see [`IndentedStatement`]) is expected
//! one indentation unit deeper than the statement itself. Every token that
//! starts a line of the expression, after the statement's first line, is
//! checked against an expected width computed from the bracket frames open
//! at that point:
//!
//! * an opening `(`, `[`, or `{` opens a frame anchored at the indentation
//!   of its line; the content of the frame is one unit deeper;
//! * a closing `)`, `]`, or `}` closes the innermost frame and is expected at
//!   the frame's anchor;
//! * an opening `{` that starts a line is expected at the indentation of the
//!   line before it;
//! * anything else is expected at the content width of the innermost frame,
//!   or one unit deeper than the statement when no frame is open.
//!
//! When detecting, a line accepted at a width other than the computed one
//! re-anchors the lines after it at the same frame depth: they are measured
//! against the accepted width instead.
//!
//! Statements nested in the expression (e.g. the body of a lambda block) are
//! checked on their own; only their first token is checked as part of the
//! enclosing expression.

use std::collections::HashMap;
use std::ops::ControlFlow;

use cstyle_ast::AstNode;
use cstyle_ast::Expr;
use cstyle_ast::IndentedStatement;
use cstyle_ast::Span;
use cstyle_ast::SyntaxKind;
use cstyle_ast::SyntaxNode;
use cstyle_ast::SyntaxToken;
use cstyle_ast::TypeDeclaration;
use cstyle_ast::indent_span;
use cstyle_ast::leading_indent;
use cstyle_ast::line_indent;
use rowan::GreenNode;
use rowan::GreenToken;
use rowan::NodeOrToken;
use rowan::TextRange;
use tracing::debug;

use crate::Replacement;

/// Infers the indentation unit used by the type declaration enclosing the
/// given statement.
///
/// The unit is the difference between the indentation of the line holding
/// the member that contains the statement and the indentation of the line
/// holding the type declaration. The `fallback` unit is used when there is
/// no enclosing type declaration or the difference is not positive.
pub fn infer_tab_size(statement: &SyntaxNode, fallback: usize) -> usize {
    let Some(ty) = TypeDeclaration::enclosing(statement) else {
        debug!(fallback, "no enclosing type declaration; using the fallback tab size");
        return fallback;
    };

    let type_indent = ty
        .syntax()
        .first_token()
        .map(|t| line_indent(&t))
        .unwrap_or(0);
    let member_indent = ty
        .member_containing(statement)
        .and_then(|m| m.first_token())
        .map(|t| line_indent(&t));

    match member_indent
        .and_then(|m| m.checked_sub(type_indent))
        .filter(|tab| *tab > 0)
    {
        Some(tab) => tab,
        None => {
            debug!(
                fallback,
                type_indent, "member is not indented from its type; using the fallback tab size"
            );
            fallback
        }
    }
}

/// Represents indentation drift found in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drift {
    /// The span of the first token whose indentation drifted.
    span: Span,
    /// The expected indentation width of the token.
    expected: usize,
    /// The actual indentation width of the token.
    actual: usize,
    /// The indentation unit inferred for the statement.
    tab: usize,
}

impl Drift {
    /// Gets the span of the token whose indentation drifted.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Gets the expected indentation width.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Gets the actual indentation width.
    pub fn actual(&self) -> usize {
        self.actual
    }

    /// Gets the absolute difference between the actual and expected widths.
    pub fn diff(&self) -> usize {
        self.actual.abs_diff(self.expected)
    }

    /// Gets the indentation unit inferred for the statement.
    pub fn tab(&self) -> usize {
        self.tab
    }
}

/// An edit that re-indents a token starting a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentEdit {
    /// The span of the indentation being replaced.
    span: Span,
    /// The indentation width to write.
    expected: usize,
    /// The indentation width being replaced.
    actual: usize,
}

impl IndentEdit {
    /// Gets the span of the indentation being replaced.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Gets the indentation width to write.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Gets the indentation width being replaced.
    pub fn actual(&self) -> usize {
        self.actual
    }

    /// Converts the edit into a source replacement.
    pub fn replacement(&self) -> Replacement {
        Replacement::new(self.span, " ".repeat(self.expected))
    }
}

/// A token that starts a line of a governed expression.
struct LineStart {
    /// The token starting the line.
    token: SyntaxToken,
    /// The expected indentation width of the line.
    expected: usize,
    /// The actual indentation width of the line.
    actual: usize,
    /// The width of the last accepted line at the same frame depth.
    ///
    /// Only set for lines that are not a closer or an opening brace.
    anchored: Option<usize>,
}

/// Gets the governed expression of a statement if it spans multiple lines.
fn multiline_expression(statement: &IndentedStatement) -> Option<Expr> {
    statement
        .governed_expression()
        .filter(|expr| expr.is_multiline())
}

/// Determines if a line-starting token of the expression is checked as part
/// of the expression.
///
/// Tokens of statements nested in the expression are not, except for the
/// first token of the outermost such statement.
fn is_checked(token: &SyntaxToken, expr: &Expr) -> bool {
    let nested = token
        .parent_ancestors()
        .take_while(|n| n != expr.syntax())
        .filter(|n| {
            n.parent()
                .is_some_and(|p| p.kind() == SyntaxKind::BlockNode)
        })
        .last();

    match nested {
        Some(statement) => statement.first_token().as_ref() == Some(token),
        None => true,
    }
}

/// Walks the line-starting tokens of a statement's governed expression.
///
/// The callback receives each checked line and returns the indentation the
/// walk should use for that line, or breaks the walk with a result.
fn walk<T>(
    statement: &SyntaxNode,
    expr: &Expr,
    tab: usize,
    mut check: impl FnMut(&LineStart) -> ControlFlow<T, usize>,
) -> Option<T> {
    let first = statement.first_token()?;
    let statement_indent = line_indent(&first);
    let base = statement_indent + tab;
    let range = expr.syntax().text_range();

    let mut frames: Vec<usize> = Vec::new();
    let mut levels: Vec<Option<usize>> = vec![None];
    let mut current = statement_indent;
    let mut past_first_line = false;

    for token in statement
        .descendants_with_tokens()
        .filter_map(|e| e.into_token())
    {
        let kind = token.kind();
        if !kind.is_trivia() {
            let inside = range.contains_range(token.text_range());
            if let Some(actual) = leading_indent(&token).filter(|_| past_first_line) {
                if inside && is_checked(&token, expr) {
                    let plain = !kind.is_close_delimiter() && kind != SyntaxKind::OpenBrace;
                    let expected = if kind.is_close_delimiter() {
                        frames.last().copied().unwrap_or(base)
                    } else if kind == SyntaxKind::OpenBrace {
                        current
                    } else {
                        frames.last().map(|anchor| anchor + tab).unwrap_or(base)
                    };

                    let line = LineStart {
                        token: token.clone(),
                        expected,
                        actual,
                        anchored: levels.last().copied().flatten().filter(|_| plain),
                    };
                    match check(&line) {
                        ControlFlow::Continue(indent) => {
                            current = indent;
                            if plain {
                                if let Some(level) = levels.last_mut() {
                                    *level = Some(indent);
                                }
                            }
                        }
                        ControlFlow::Break(result) => return Some(result),
                    }
                } else {
                    current = actual;
                }
            }

            if inside {
                if kind.is_open_delimiter() {
                    frames.push(current);
                    levels.push(None);
                } else if kind.is_close_delimiter() && frames.pop().is_some() {
                    levels.pop();
                }
            }
        }

        if token.text().contains('\n') {
            past_first_line = true;
        }
    }

    None
}

/// Detects indentation drift in the governed expression of a statement.
///
/// A line is accepted when its indentation is the expected width or one unit
/// deeper. An accepted line's actual indentation is used for the lines that
/// follow: for the content of frames it opens, and as the expected width of
/// the next line at the same frame depth. A line back at the computed width
/// is also accepted. Only the first drifting token is reported.
///
/// Returns `None` when the statement has no multi-line governed expression
/// or no drift was found.
pub fn detect(statement: &IndentedStatement, fallback: usize) -> Option<Drift> {
    let expr = multiline_expression(statement)?;
    let tab = infer_tab_size(statement.syntax(), fallback);
    let drift = walk(statement.syntax(), &expr, tab, |line| {
        let expected = line.anchored.unwrap_or(line.expected);
        if line.actual == expected
            || line.actual == expected + tab
            || line.actual == line.expected
        {
            return ControlFlow::Continue(line.actual);
        }

        ControlFlow::Break(Drift {
            span: line.token.text_range().into(),
            expected,
            actual: line.actual,
            tab,
        })
    });

    if let Some(drift) = &drift {
        debug!(
            span = %drift.span,
            expected = drift.expected,
            actual = drift.actual,
            tab,
            "found indentation drift"
        );
    }

    drift
}

/// Computes the edits that re-indent every line of a statement's governed
/// expression to its expected width.
///
/// Unlike [`detect`], every line is measured from the expected widths of the
/// lines before it. Returns no edits when the statement has no multi-line
/// governed expression.
pub fn corrections(statement: &IndentedStatement, tab: usize) -> Vec<IndentEdit> {
    let Some(expr) = multiline_expression(statement) else {
        return Vec::new();
    };

    let mut edits = Vec::new();
    walk::<()>(statement.syntax(), &expr, tab, |line| {
        if line.actual != line.expected {
            if let Some(span) = indent_span(&line.token) {
                edits.push(IndentEdit {
                    span,
                    expected: line.expected,
                    actual: line.actual,
                });
            }
        }

        ControlFlow::Continue(line.expected)
    });

    edits
}

/// Corrects the indentation of a statement's governed expression.
///
/// Returns the root of a new tree in which the statement is replaced by its
/// corrected form; structure untouched by the edits is shared with the
/// original tree. When there is nothing to correct, the root of the
/// statement's tree is returned.
pub fn correct(statement: &IndentedStatement, tab: usize) -> SyntaxNode {
    let syntax = statement.syntax();
    let edits: HashMap<usize, IndentEdit> = corrections(statement, tab)
        .into_iter()
        .map(|e| (e.span.end(), e))
        .collect();

    if edits.is_empty() {
        return syntax
            .ancestors()
            .last()
            .unwrap_or_else(|| syntax.clone());
    }

    let green = rebuild(syntax, &edits);
    SyntaxNode::new_root(syntax.replace_with(green))
}

/// Rebuilds the green node of the given node, re-indenting the whitespace
/// tokens that end where an edit ends.
fn rebuild(node: &SyntaxNode, edits: &HashMap<usize, IndentEdit>) -> GreenNode {
    let touches = |range: TextRange| {
        edits
            .keys()
            .any(|end| usize::from(range.start()) < *end && *end <= usize::from(range.end()))
    };

    let children: Vec<_> = node
        .children_with_tokens()
        .map(|child| match child {
            NodeOrToken::Node(n) => {
                if touches(n.text_range()) {
                    NodeOrToken::Node(rebuild(&n, edits))
                } else {
                    NodeOrToken::Node(n.green().into_owned())
                }
            }
            NodeOrToken::Token(t) => {
                let range = t.text_range();
                match edits.get(&usize::from(range.end())) {
                    Some(edit) if t.kind() == SyntaxKind::Whitespace => {
                        let keep = edit.span.start() - usize::from(range.start());
                        let text = format!("{}{}", &t.text()[..keep], " ".repeat(edit.expected));
                        NodeOrToken::Token(GreenToken::new(t.kind().into(), &text))
                    }
                    _ => NodeOrToken::Token(t.green().to_owned()),
                }
            }
        })
        .collect();

    GreenNode::new(node.kind().into(), children)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use cstyle_ast::Document;

    /// Parses the source and gets the first statement with a multi-line
    /// governed expression.
    fn statement(source: &str) -> IndentedStatement {
        let (document, diagnostics) = Document::parse(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        first_statement(document.root())
    }

    /// Gets the first statement with a multi-line governed expression.
    fn first_statement(root: &SyntaxNode) -> IndentedStatement {
        root.descendants()
            .filter_map(IndentedStatement::cast)
            .find(|s| multiline_expression(s).is_some())
            .expect("should have a multi-line statement")
    }

    /// Wraps a statement in a method body, indented at eight spaces.
    fn in_method(statement: &str) -> String {
        format!("class C\n{{\n    void M()\n    {{\n{statement}    }}\n}}\n")
    }

    /// Corrects the first multi-line statement of the source.
    fn corrected(source: &str, tab: usize) -> String {
        correct(&statement(source), tab).text().to_string()
    }

    #[test]
    fn aligned_chain() {
        let source = "list\n    .Where(x => x < 1)\n    .ToList();\n";
        assert_eq!(detect(&statement(source), 4), None);
        assert_eq!(corrected(source, 4), source);
    }

    #[test]
    fn misaligned_chain() {
        let source = "list\n      .Where(x => x < 1)\n    .ToList();\n";
        let drift = detect(&statement(source), 4).expect("should drift");
        assert_eq!(drift.diff(), 2);
        assert_eq!(drift.tab(), 4);
        assert_eq!(drift.expected(), 4);
        assert_eq!(drift.actual(), 6);
        assert_eq!(drift.span(), Span::new(11, 1));

        let edits = corrections(&statement(source), drift.tab());
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].span(), Span::new(5, 6));
        assert_eq!(edits[0].replacement().value(), "    ");
        assert_eq!(
            corrected(source, drift.tab()),
            "list\n    .Where(x => x < 1)\n    .ToList();\n"
        );
    }

    #[test]
    fn single_line_exempt() {
        let source = "class C\n{\n    void M()\n    {\n        var x = a.B(c);\n        if \
                      (x) { y(); }\n    }\n}\n";
        let (document, _) = Document::parse(source);
        for statement in document.root().descendants().filter_map(IndentedStatement::cast) {
            assert_eq!(detect(&statement, 4), None);
            assert!(corrections(&statement, 4).is_empty());
        }
    }

    #[test]
    fn multiple_declarators_skipped() {
        let source = "class C\n{\n    void M()\n    {\n        int a = b\n                 .C(), \
                      d = 1;\n    }\n}\n";
        let (document, _) = Document::parse(source);
        let statement = document
            .root()
            .descendants()
            .find_map(IndentedStatement::cast)
            .expect("should have a statement");
        assert_eq!(statement.governed_expression(), None);
        assert_eq!(detect(&statement, 4), None);
        assert_eq!(correct(&statement, 4).text().to_string(), source);
    }

    #[test]
    fn tab_inference() {
        let source = "class C\n{\n  void M()\n  {\n    var x = a\n      .B();\n  }\n}\n";
        let statement = statement(source);
        assert_eq!(infer_tab_size(statement.syntax(), 4), 2);
        assert_eq!(detect(&statement, 4), None);

        let source = "var x = a\n  .B();\n";
        assert_eq!(infer_tab_size(self::statement(source).syntax(), 3), 3);

        let source = "class C { void M() {\n  var x = a\n    .B(); } }\n";
        assert_eq!(infer_tab_size(self::statement(source).syntax(), 4), 4);
    }

    #[test]
    fn tolerance_window() {
        let cases = [(12, false), (16, false), (13, true), (11, true), (20, true), (8, true)];
        for (width, drifts) in cases {
            let source = format!(
                "class C\n{{\n    void M()\n    {{\n        if (a &&\n{indent}b)\n        {{\n            \
                 c();\n        }}\n    }}\n}}\n",
                indent = " ".repeat(width)
            );
            let drift = detect(&statement(&source), 4);
            assert_eq!(drift.is_some(), drifts, "width {width}");
            if let Some(drift) = drift {
                assert_eq!(drift.diff(), width.abs_diff(12));
                assert_eq!(drift.expected(), 12);
            }
        }
    }

    #[test]
    fn over_indented_condition() {
        let source = "class C\n{\n    void M()\n    {\n        if (a &&\n                    b ||\n                    c)\n        {\n            d();\n        }\n    }\n}\n";
        let drift = detect(&statement(source), 4).expect("should drift");
        assert_eq!(drift.diff(), 8);
        assert_eq!(
            corrected(source, drift.tab()),
            "class C\n{\n    void M()\n    {\n        if (a &&\n            b ||\n            c)\n        {\n            d();\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn nested_object_initializer() {
        let source = "class C
{
    void M()
    {
        var x = new Foo
        {
            A = 1,
              B = new Bar
            {
                   C = 2,
            },
        };
    }
}
";
        let statement = statement(source);
        let drift = detect(&statement, 4).expect("should drift");
        assert_eq!((drift.expected(), drift.actual()), (12, 14));
        assert_eq!(
            correct(&statement, drift.tab()).text().to_string(),
            "class C
{
    void M()
    {
        var x = new Foo
        {
            A = 1,
            B = new Bar
            {
                C = 2,
            },
        };
    }
}
"
        );
    }

    #[test]
    fn nested_mixture() {
        let expected = "class C
{
    void M()
    {
        var result = Compute(
            new[]
            {
                items[
                    0],
                Call(a =>
                {
                    return a;
                }),
            },
            other);
    }
}
";
        let source = "class C
{
    void M()
    {
        var result = Compute(
              new[]
            {
                items[
                  0],
                Call(a =>
                {
                    return a;
                }),
            },
            other);
    }
}
";
        assert_eq!(detect(&statement(expected), 4), None);

        let drift = detect(&statement(source), 4).expect("should drift");
        assert_eq!((drift.expected(), drift.actual()), (12, 14));
        assert_eq!(corrections(&statement(source), 4).len(), 2);
        assert_eq!(corrected(source, 4), expected);
    }

    #[test]
    fn nested_statements_checked_separately() {
        let source = "class C
{
    void M()
    {
        list.ForEach(x =>
        {
            Do(x,
                   y);
        });
    }
}
";
        let (document, _) = Document::parse(source);
        let statements: Vec<_> = document
            .root()
            .descendants()
            .filter_map(IndentedStatement::cast)
            .collect();
        assert_eq!(statements.len(), 2);
        assert_eq!(detect(&statements[0], 4), None);
        assert!(corrections(&statements[0], 4).is_empty());

        let drift = detect(&statements[1], 4).expect("should drift");
        assert_eq!((drift.expected(), drift.actual()), (16, 19));
    }

    #[test]
    fn staircase_chain() {
        let source = in_method(
            "        var x = a\n            .B()\n                .C()\n                    .D();\n",
        );
        assert_eq!(detect(&statement(&source), 4), None);

        // The corrector still measures from computed widths
        let edits = corrections(&statement(&source), 4);
        assert_eq!(edits.len(), 2);
        assert!(edits.iter().all(|e| e.expected() == 12));
    }

    #[test]
    fn accepted_lines_reanchor() {
        let source = in_method("        var x = a\n                .B()\n                  .C();\n");
        let drift = detect(&statement(&source), 4).expect("should drift");
        assert_eq!((drift.expected(), drift.actual()), (16, 18));
        assert_eq!(drift.diff(), 2);

        let source = in_method("        var x = a\n                .B()\n            .C();\n");
        assert_eq!(detect(&statement(&source), 4), None);

        let source = in_method(
            "        var x = Foo(\n                a,\n                    b)\n            .C();\n",
        );
        assert_eq!(detect(&statement(&source), 4), None);
    }

    #[test]
    fn correction_is_idempotent_and_agrees() {
        let sources = [
            "list\n      .Where(x => x < 1)\n  .ToList();\n",
            "class C\n{\n    void M()\n    {\n        var x = a\n   .B(new\n {\n   C = 1,\n      \
             })\n                .D();\n    }\n}\n",
            "class C\n{\n    void M()\n    {\n        if (a &&\n   (b ||\n c))\n        {\n        \
             }\n    }\n}\n",
        ];

        for source in sources {
            let drift = detect(&statement(source), 4).expect("should drift");
            let once = correct(&statement(source), drift.tab());
            let twice = correct(&first_statement(&once), drift.tab());
            assert_eq!(twice.text().to_string(), once.text().to_string());
            assert_eq!(detect(&first_statement(&once), 4), None);
        }
    }
}
