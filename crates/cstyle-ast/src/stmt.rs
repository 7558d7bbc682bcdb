//! AST representation for statements.

use rowan::ast::AstChildren;
use rowan::ast::AstNode;
use rowan::ast::support;
use rowan::ast::support::child;

use crate::CSharpLanguage;
use crate::Expr;
use crate::LocalDeclarationStatement;
use crate::SyntaxKind;
use crate::SyntaxNode;
use crate::SyntaxToken;

/// Represents a statement of any kind.
///
/// Local function declarations are statements when they appear in a block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Statement(SyntaxNode);

impl Statement {
    /// Gets the kind of the statement.
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind()
    }

    /// Gets the statement as a block.
    pub fn as_block(&self) -> Option<Block> {
        Block::cast(self.0.clone())
    }

    /// Gets the statement as an `if` statement.
    pub fn as_if_statement(&self) -> Option<IfStatement> {
        IfStatement::cast(self.0.clone())
    }

    /// Determines if the statement is a local declaration (including a local
    /// function declaration).
    pub fn is_declaration(&self) -> bool {
        matches!(
            self.0.kind(),
            SyntaxKind::LocalDeclarationStatementNode | SyntaxKind::MethodDeclarationNode
        )
    }
}

impl AstNode for Statement {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        matches!(
            kind,
            SyntaxKind::BlockNode
                | SyntaxKind::LocalDeclarationStatementNode
                | SyntaxKind::MethodDeclarationNode
                | SyntaxKind::IfStatementNode
                | SyntaxKind::ExpressionStatementNode
                | SyntaxKind::ReturnStatementNode
                | SyntaxKind::ThrowStatementNode
                | SyntaxKind::WhileStatementNode
                | SyntaxKind::DoStatementNode
                | SyntaxKind::ForStatementNode
                | SyntaxKind::ForEachStatementNode
                | SyntaxKind::BreakStatementNode
                | SyntaxKind::ContinueStatementNode
                | SyntaxKind::TryStatementNode
                | SyntaxKind::UsingStatementNode
                | SyntaxKind::EmptyStatementNode
                | SyntaxKind::OtherStatementNode
        )
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        if Self::can_cast(syntax.kind()) {
            Some(Self(syntax))
        } else {
            None
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

/// Represents a block of statements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Block(SyntaxNode);

impl Block {
    /// Gets the statements of the block.
    pub fn statements(&self) -> AstChildren<Statement> {
        support::children(&self.0)
    }

    /// Gets the opening brace of the block.
    pub fn open_brace(&self) -> Option<SyntaxToken> {
        support::token(&self.0, SyntaxKind::OpenBrace)
    }

    /// Gets the closing brace of the block.
    pub fn close_brace(&self) -> Option<SyntaxToken> {
        support::token(&self.0, SyntaxKind::CloseBrace)
    }

    /// Determines if the block directly contains comments or preprocessor
    /// directives.
    pub fn has_trivia_content(&self) -> bool {
        self.0
            .children_with_tokens()
            .any(|c| matches!(c.kind(), SyntaxKind::Comment | SyntaxKind::Directive))
    }
}

impl AstNode for Block {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind == SyntaxKind::BlockNode
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        match syntax.kind() {
            SyntaxKind::BlockNode => Some(Self(syntax)),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

/// Represents an `if` statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IfStatement(SyntaxNode);

impl IfStatement {
    /// Gets the condition of the `if` statement.
    pub fn condition(&self) -> Option<Expr> {
        self.0
            .children()
            .take_while(|n| !Statement::can_cast(n.kind()))
            .find_map(Expr::cast)
    }

    /// Gets the statement executed when the condition is true.
    pub fn statement(&self) -> Option<Statement> {
        child(&self.0)
    }

    /// Gets the `else` clause of the `if` statement.
    pub fn else_clause(&self) -> Option<ElseClause> {
        child(&self.0)
    }
}

impl AstNode for IfStatement {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind == SyntaxKind::IfStatementNode
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        match syntax.kind() {
            SyntaxKind::IfStatementNode => Some(Self(syntax)),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

/// Represents the `else` clause of an `if` statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElseClause(SyntaxNode);

impl ElseClause {
    /// Gets the statement of the `else` clause.
    pub fn statement(&self) -> Option<Statement> {
        child(&self.0)
    }
}

impl AstNode for ElseClause {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind == SyntaxKind::ElseClauseNode
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        match syntax.kind() {
            SyntaxKind::ElseClauseNode => Some(Self(syntax)),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

/// Represents an expression statement (e.g. `x.Y();`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExpressionStatement(SyntaxNode);

impl ExpressionStatement {
    /// Gets the expression of the statement.
    pub fn expr(&self) -> Option<Expr> {
        child(&self.0)
    }
}

impl AstNode for ExpressionStatement {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind == SyntaxKind::ExpressionStatementNode
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        match syntax.kind() {
            SyntaxKind::ExpressionStatementNode => Some(Self(syntax)),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

/// Represents a statement that can host a multi-line expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndentedStatement {
    /// A local declaration; the expression is the initializer of its sole
    /// declarator.
    Declaration(LocalDeclarationStatement),
    /// An `if` statement; the expression is its condition.
    Condition(IfStatement),
    /// An expression statement; the expression is its top-level expression.
    Expression(ExpressionStatement),
}

impl IndentedStatement {
    /// Gets the expression whose indentation the statement governs.
    ///
    /// Declarations with zero or several declarators, or whose declarator
    /// has no initializer, have no governed expression.
    pub fn governed_expression(&self) -> Option<Expr> {
        match self {
            Self::Declaration(stmt) => stmt.declaration()?.single_declarator()?.initializer(),
            Self::Condition(stmt) => stmt.condition(),
            Self::Expression(stmt) => stmt.expr(),
        }
    }
}

impl AstNode for IndentedStatement {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        matches!(
            kind,
            SyntaxKind::LocalDeclarationStatementNode
                | SyntaxKind::IfStatementNode
                | SyntaxKind::ExpressionStatementNode
        )
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        match syntax.kind() {
            SyntaxKind::LocalDeclarationStatementNode => {
                Some(Self::Declaration(LocalDeclarationStatement(syntax)))
            }
            SyntaxKind::IfStatementNode => Some(Self::Condition(IfStatement(syntax))),
            SyntaxKind::ExpressionStatementNode => {
                Some(Self::Expression(ExpressionStatement(syntax)))
            }
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Declaration(s) => s.syntax(),
            Self::Condition(s) => &s.0,
            Self::Expression(s) => &s.0,
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Document;

    /// Parses the statements of a method body.
    fn statements(body: &str) -> Vec<Statement> {
        let (document, diagnostics) = Document::parse(&format!("class C {{ void M() {body} }}"));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        document
            .root()
            .descendants()
            .find_map(Block::cast)
            .expect("should have a body")
            .statements()
            .collect()
    }

    #[test]
    fn if_statement_parts() {
        let statements = statements("{ if (a && b) { c(); } else d(); }");
        let stmt = statements[0].as_if_statement().expect("should be an if");
        assert_eq!(
            stmt.condition().map(|c| c.syntax().text().to_string()).as_deref(),
            Some("a && b")
        );
        let block = stmt
            .statement()
            .and_then(|s| s.as_block())
            .expect("should have a block");
        assert_eq!(block.statements().count(), 1);
        assert_eq!(
            stmt.else_clause()
                .and_then(|e| e.statement())
                .map(|s| s.kind()),
            Some(SyntaxKind::ExpressionStatementNode)
        );
    }

    #[test]
    fn governed_expressions() {
        let statements = statements("{ var a = 1; int b, c = 2; int d; if (e) { } f(); return g; }");
        let governed: Vec<_> = statements
            .iter()
            .map(|s| {
                IndentedStatement::cast(s.syntax().clone())
                    .and_then(|s| s.governed_expression())
                    .map(|e| e.syntax().text().to_string())
            })
            .collect();
        assert_eq!(
            governed,
            [
                Some("1".to_string()),
                None,
                None,
                Some("e".to_string()),
                Some("f()".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn block_trivia() {
        let statements = statements("{ { // note\n x(); } { y(); } }");
        let blocks: Vec<_> = statements.iter().filter_map(|s| s.as_block()).collect();
        assert!(blocks[0].has_trivia_content());
        assert!(!blocks[1].has_trivia_content());
    }
}
