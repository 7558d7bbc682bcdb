//! A lint rule for the indentation of multi-line expressions.

use cstyle_ast::Diagnostic;
use cstyle_ast::ExpressionStatement;
use cstyle_ast::IfStatement;
use cstyle_ast::IndentedStatement;
use cstyle_ast::LocalDeclarationStatement;
use cstyle_ast::Span;
use cstyle_ast::VisitReason;
use cstyle_ast::Visitor;
use cstyle_ast::span_of;

use crate::Config;
use crate::Diagnostics;
use crate::Fix;
use crate::Rule;
use crate::Tag;
use crate::TagSet;
use crate::indentation::Drift;
use crate::indentation::corrections;
use crate::indentation::detect;

/// The identifier for the expression indentation rule.
const ID: &str = "ExpressionIndentation";

/// Creates an "inconsistent indentation" diagnostic.
fn inconsistent_indentation(drift: &Drift, expr: Span) -> Diagnostic {
    Diagnostic::warning("multi-line expression is not indented consistently")
        .with_rule(ID)
        .with_label(
            format!(
                "expected an indentation of {expected} but found {actual} (off by {diff} with a \
                 tab size of {tab})",
                expected = drift.expected(),
                actual = drift.actual(),
                diff = drift.diff(),
                tab = drift.tab()
            ),
            drift.span(),
        )
        .with_highlight(expr)
        .with_fix(format!(
            "indent each line of the expression in units of {tab} spaces",
            tab = drift.tab()
        ))
}

/// Detects multi-line expressions whose lines drift from the indentation
/// implied by the statement and the brackets around them.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionIndentationRule {
    /// The indentation unit used when one cannot be inferred.
    fallback_tab_size: usize,
}

impl ExpressionIndentationRule {
    /// Creates the rule with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            fallback_tab_size: config.fallback_tab_size,
        }
    }

    /// Checks a statement, reporting its drift with the corrections as a fix.
    fn check(&self, state: &mut Diagnostics, statement: IndentedStatement) {
        let Some(drift) = detect(&statement, self.fallback_tab_size) else {
            return;
        };

        let Some(expr) = statement.governed_expression() else {
            return;
        };

        let span = span_of(&expr);
        let replacements = corrections(&statement, drift.tab())
            .iter()
            .map(|edit| edit.replacement())
            .collect();
        state.add_with_fix(
            inconsistent_indentation(&drift, span),
            Fix::new(span, replacements),
        );
    }
}

impl Default for ExpressionIndentationRule {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Rule for ExpressionIndentationRule {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Ensures that the lines of multi-line expressions are indented consistently."
    }

    fn explanation(&self) -> &'static str {
        "An expression split across several lines (a chain of method calls, a long condition, \
         or a nested object initializer) should be indented one level deeper than the \
         statement that holds it, with one further level inside each bracket, brace, or \
         parenthesis opened on an earlier line. Closing brackets return to the level of the \
         line that opened them. The indentation unit is inferred from the enclosing type \
         declaration. A line indented one extra level is accepted."
    }

    fn tags(&self) -> TagSet {
        TagSet::new(&[Tag::Spacing, Tag::Clarity])
    }

    fn related_rules(&self) -> &[&'static str] {
        &[]
    }
}

impl Visitor for ExpressionIndentationRule {
    type State = Diagnostics;

    fn local_declaration_statement(
        &mut self,
        state: &mut Self::State,
        reason: VisitReason,
        stmt: &LocalDeclarationStatement,
    ) {
        if reason == VisitReason::Enter {
            self.check(state, IndentedStatement::Declaration(stmt.clone()));
        }
    }

    fn if_statement(&mut self, state: &mut Self::State, reason: VisitReason, stmt: &IfStatement) {
        if reason == VisitReason::Enter {
            self.check(state, IndentedStatement::Condition(stmt.clone()));
        }
    }

    fn expression_statement(
        &mut self,
        state: &mut Self::State,
        reason: VisitReason,
        stmt: &ExpressionStatement,
    ) {
        if reason == VisitReason::Enter {
            self.check(state, IndentedStatement::Expression(stmt.clone()));
        }
    }
}

#[cfg(test)]
mod test {
    use cstyle_ast::Document;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Runs the rule over the given source.
    fn lint(source: &str) -> Diagnostics {
        let (document, diagnostics) = Document::parse(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let mut state = Diagnostics::default();
        document.visit(&mut state, &mut ExpressionIndentationRule::default());
        state
    }

    #[test]
    fn reports_drift_with_fix() {
        let source = "class C\n{\n    void M()\n    {\n        var x = list\n          \
                      .Where(y => y)\n            .ToList();\n    }\n}\n";
        let state = lint(source);
        assert_eq!(state.diagnostics().len(), 1);

        let diagnostic = &state.diagnostics()[0];
        assert_eq!(diagnostic.rule(), Some(ID));
        let labels: Vec<_> = diagnostic.labels().map(|l| l.message()).collect();
        assert_eq!(
            labels,
            [
                "expected an indentation of 12 but found 10 (off by 2 with a tab size of 4)",
                ""
            ]
        );

        let fix = &state.fixes()[0];
        assert_eq!(fix.replacements().len(), 1);
        assert_eq!(fix.replacements()[0].value(), " ".repeat(12));
        assert_eq!(&source[fix.span().start()..fix.span().end()], "list\n          .Where(y => y)\n            .ToList()");
    }

    #[test]
    fn accepts_consistent_statements() {
        let source = "class C\n{\n    void M()\n    {\n        Run(a,\n            b);\n        if \
                      (a ||\n            b)\n        {\n        }\n        var c = d\n            \
                      .E();\n    }\n}\n";
        assert!(lint(source).is_empty());
    }
}
