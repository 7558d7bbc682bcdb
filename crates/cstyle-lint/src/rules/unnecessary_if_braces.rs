//! A lint rule for braces around the single statement of an `if` or `else`.

use cstyle_ast::AstNode;
use cstyle_ast::Block;
use cstyle_ast::Diagnostic;
use cstyle_ast::IfStatement;
use cstyle_ast::Span;
use cstyle_ast::Statement;
use cstyle_ast::SyntaxKind;
use cstyle_ast::VisitReason;
use cstyle_ast::Visitor;
use cstyle_ast::indent_span;
use cstyle_ast::span_of;

use crate::Diagnostics;
use crate::Fix;
use crate::Replacement;
use crate::Rule;
use crate::Tag;
use crate::TagSet;

/// The identifier for the unnecessary if braces rule.
const ID: &str = "UnnecessaryIfBraces";

/// Creates an "unnecessary braces" diagnostic.
fn unnecessary_braces(clause: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(format!(
        "unnecessary braces around the single statement of an `{clause}`"
    ))
    .with_rule(ID)
    .with_highlight(span)
    .with_fix("remove the braces and keep the statement")
}

/// Determines if a statement ends with an `if` statement that has no `else`
/// clause.
///
/// An `else` following such a statement would bind to the inner `if`.
fn ends_with_open_if(statement: &Statement) -> bool {
    match statement.kind() {
        SyntaxKind::IfStatementNode => match statement
            .as_if_statement()
            .and_then(|s| s.else_clause())
            .and_then(|e| e.statement())
        {
            Some(statement) => ends_with_open_if(&statement),
            None => true,
        },
        SyntaxKind::WhileStatementNode
        | SyntaxKind::ForStatementNode
        | SyntaxKind::ForEachStatementNode
        | SyntaxKind::UsingStatementNode => statement
            .syntax()
            .children()
            .filter_map(Statement::cast)
            .last()
            .is_some_and(|s| ends_with_open_if(&s)),
        _ => false,
    }
}

/// Gets the sole statement of a block if its braces can be removed.
fn removable(block: &Block, has_else: bool) -> Option<Statement> {
    if block.has_trivia_content() {
        return None;
    }

    let mut statements = block.statements();
    let statement = statements.next()?;
    if statements.next().is_some() || statement.is_declaration() {
        return None;
    }

    if has_else && ends_with_open_if(&statement) {
        return None;
    }

    Some(statement)
}

/// Creates the fix that replaces a block with its sole statement.
///
/// The whitespace before the opening brace is replaced too; the statement
/// keeps its own line and indentation, or follows a single space when it
/// shares a line with the opening brace.
fn unwrap_block(block: &Block, statement: &Statement) -> Option<Fix> {
    let open = block.open_brace()?;
    let first = statement.syntax().first_token()?;
    let block_span = span_of(block);
    let start = match open.prev_token() {
        Some(prev) if prev.kind() == SyntaxKind::Whitespace => {
            usize::from(prev.text_range().start())
        }
        _ => block_span.start(),
    };

    let text = statement.syntax().text().to_string();
    let value = match indent_span(&first) {
        Some(indent) => {
            let source = first
                .prev_token()
                .map(|t| {
                    let text = t.text();
                    text[text.len() - indent.len()..].to_string()
                })
                .unwrap_or_default();
            format!("\n{source}{text}")
        }
        None => format!(" {text}"),
    };

    let span = Span::new(start, block_span.end() - start);
    Some(Fix::new(span, vec![Replacement::new(span, value)]))
}

/// Detects braces around the single statement of an `if` or `else` clause
/// whose condition fits on one line.
#[derive(Default, Debug, Clone, Copy)]
pub struct UnnecessaryIfBracesRule;

impl UnnecessaryIfBracesRule {
    /// Checks a clause body, reporting it if its braces can be removed.
    fn check(
        &self,
        state: &mut Diagnostics,
        clause: &str,
        body: Option<Statement>,
        has_else: bool,
    ) {
        let Some(block) = body.and_then(|s| s.as_block()) else {
            return;
        };

        let Some(statement) = removable(&block, has_else) else {
            return;
        };

        let diagnostic = unnecessary_braces(clause, span_of(&block));
        match unwrap_block(&block, &statement) {
            Some(fix) => state.add_with_fix(diagnostic, fix),
            None => state.add(diagnostic),
        }
    }
}

impl Rule for UnnecessaryIfBracesRule {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Ensures that single statements of `if` and `else` clauses are not wrapped in braces."
    }

    fn explanation(&self) -> &'static str {
        "When an `if` statement's condition fits on one line, a clause holding a single \
         statement reads more clearly without braces. Blocks holding declarations or comments \
         are left alone, as is an `if` clause whose statement ends with an `if` lacking an \
         `else` when the outer statement has an `else`, since removing the braces would \
         change which `if` the `else` belongs to."
    }

    fn tags(&self) -> TagSet {
        TagSet::new(&[Tag::Style, Tag::Clarity])
    }

    fn related_rules(&self) -> &[&'static str] {
        &["ExpressionIndentation"]
    }
}

impl Visitor for UnnecessaryIfBracesRule {
    type State = Diagnostics;

    fn if_statement(&mut self, state: &mut Self::State, reason: VisitReason, stmt: &IfStatement) {
        if reason == VisitReason::Exit {
            return;
        }

        if stmt.condition().is_none_or(|c| c.is_multiline()) {
            return;
        }

        let else_clause = stmt.else_clause();
        self.check(state, "if", stmt.statement(), else_clause.is_some());
        self.check(
            state,
            "else",
            else_clause.and_then(|e| e.statement()),
            false,
        );
    }
}
