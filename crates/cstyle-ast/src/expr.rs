//! AST representation for expressions.

use rowan::ast::AstNode;

use crate::CSharpLanguage;
use crate::SyntaxKind;
use crate::SyntaxNode;

/// Represents an expression of any kind.
///
/// Use [`Expr::kind`] to distinguish the kind of expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Expr(SyntaxNode);

impl Expr {
    /// Gets the kind of the expression.
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind()
    }

    /// Determines if the expression's text crosses more than one line.
    pub fn is_multiline(&self) -> bool {
        self.0.text().contains_char('\n')
    }
}

impl AstNode for Expr {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind.is_expression()
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        if syntax.kind().is_expression() {
            Some(Self(syntax))
        } else {
            None
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Document;
    use crate::ExpressionStatement;

    #[test]
    fn multiline_invocation() {
        let (document, diagnostics) =
            Document::parse("class C { void M() { a\n    .B(c, /* d */ 1); } }");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        let expr = document
            .root()
            .descendants()
            .find_map(ExpressionStatement::cast)
            .and_then(|s| s.expr())
            .expect("should have an expression");
        assert_eq!(expr.kind(), SyntaxKind::InvocationExprNode);
        assert!(expr.is_multiline());
        assert_eq!(expr.syntax().text().to_string(), "a\n    .B(c, /* d */ 1)");
    }
}
