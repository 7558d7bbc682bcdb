//! Implementation of the linter.

use cstyle_ast::Block;
use cstyle_ast::Document;
use cstyle_ast::ExpressionStatement;
use cstyle_ast::IfStatement;
use cstyle_ast::LocalDeclarationStatement;
use cstyle_ast::TypeDeclaration;
use cstyle_ast::VisitReason;
use cstyle_ast::Visitor;
use indexmap::IndexMap;
use tracing::debug;
use tracing::trace;

use crate::Config;
use crate::Diagnostics;
use crate::Rule;
use crate::rules;

/// A visitor that runs linting rules.
///
/// By default, the visitor runs all lint rules; rules named in
/// [`Config::disabled_rules`] are skipped.
#[allow(missing_debug_implementations)]
pub struct Linter {
    /// The map of rule name to rule.
    rules: IndexMap<&'static str, Box<dyn Rule>>,
    /// The configuration the rules were created with.
    config: Config,
}

impl Linter {
    /// Creates a new linter with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            rules: rules(config).into_iter().map(|r| (r.id(), r)).collect(),
            config: config.clone(),
        }
    }

    /// Lints a document, returning the diagnostics and fixes of every enabled
    /// rule.
    pub fn lint(&mut self, document: &Document) -> Diagnostics {
        let mut diagnostics = Diagnostics::default();
        document.visit(&mut diagnostics, self);
        debug!(
            count = diagnostics.diagnostics().len(),
            "linting produced diagnostics"
        );
        diagnostics
    }

    /// Invokes a callback on each rule
    fn each_enabled_rule<F>(&mut self, diagnostics: &mut Diagnostics, mut cb: F)
    where
        F: FnMut(&mut Diagnostics, &mut dyn Rule),
    {
        for (id, rule) in &mut self.rules {
            if !self.config.is_enabled(id) {
                continue;
            }
            trace!(rule = *id, "dispatching to rule");
            cb(diagnostics, rule.as_mut());
        }
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Visitor for Linter {
    type State = Diagnostics;

    fn document(&mut self, diagnostics: &mut Diagnostics, reason: VisitReason, doc: &Document) {
        self.each_enabled_rule(diagnostics, |diagnostics, rule| {
            rule.document(diagnostics, reason, doc);
        });
    }

    fn type_declaration(
        &mut self,
        diagnostics: &mut Diagnostics,
        reason: VisitReason,
        decl: &TypeDeclaration,
    ) {
        self.each_enabled_rule(diagnostics, |diagnostics, rule| {
            rule.type_declaration(diagnostics, reason, decl)
        });
    }

    fn block(&mut self, diagnostics: &mut Diagnostics, reason: VisitReason, block: &Block) {
        self.each_enabled_rule(diagnostics, |diagnostics, rule| {
            rule.block(diagnostics, reason, block)
        });
    }

    fn local_declaration_statement(
        &mut self,
        diagnostics: &mut Diagnostics,
        reason: VisitReason,
        stmt: &LocalDeclarationStatement,
    ) {
        self.each_enabled_rule(diagnostics, |diagnostics, rule| {
            rule.local_declaration_statement(diagnostics, reason, stmt)
        });
    }

    fn if_statement(
        &mut self,
        diagnostics: &mut Diagnostics,
        reason: VisitReason,
        stmt: &IfStatement,
    ) {
        self.each_enabled_rule(diagnostics, |diagnostics, rule| {
            rule.if_statement(diagnostics, reason, stmt)
        });
    }

    fn expression_statement(
        &mut self,
        diagnostics: &mut Diagnostics,
        reason: VisitReason,
        stmt: &ExpressionStatement,
    ) {
        self.each_enabled_rule(diagnostics, |diagnostics, rule| {
            rule.expression_statement(diagnostics, reason, stmt)
        });
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    const SOURCE: &str = "class C\n{\n    void M()\n    {\n        if (a)\n        {\n            \
                          b = c\n              .D();\n        }\n    }\n}\n";

    #[test]
    fn runs_enabled_rules() {
        let (document, _) = Document::parse(SOURCE);
        let diagnostics = Linter::default().lint(&document);
        let rules: Vec<_> = diagnostics
            .diagnostics()
            .iter()
            .filter_map(|d| d.rule())
            .collect();
        assert_eq!(rules, ["UnnecessaryIfBraces", "ExpressionIndentation"]);
        assert_eq!(diagnostics.fixes().len(), 2);
    }

    #[test]
    fn skips_disabled_rules() {
        let (document, _) = Document::parse(SOURCE);
        let config = Config {
            disabled_rules: ["UnnecessaryIfBraces".to_string()].into(),
            ..Default::default()
        };

        let diagnostics = Linter::new(&config).lint(&document);
        let rules: Vec<_> = diagnostics
            .diagnostics()
            .iter()
            .filter_map(|d| d.rule())
            .collect();
        assert_eq!(rules, ["ExpressionIndentation"]);
    }
}
