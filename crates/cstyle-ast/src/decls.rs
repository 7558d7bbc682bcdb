//! AST representation for declarations.

use rowan::ast::AstChildren;
use rowan::ast::AstNode;
use rowan::ast::support;
use rowan::ast::support::child;

use crate::CSharpLanguage;
use crate::Expr;
use crate::SyntaxKind;
use crate::SyntaxNode;
use crate::SyntaxToken;

/// Represents a `class`, `struct`, `interface`, or `record` declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDeclaration(SyntaxNode);

impl TypeDeclaration {
    /// Gets the name of the declared type.
    pub fn name(&self) -> Option<SyntaxToken> {
        support::token(&self.0, SyntaxKind::Ident)
    }

    /// Gets the child of the declaration that contains the given node.
    ///
    /// Returns `None` if the node is not a descendant of the declaration.
    pub fn member_containing(&self, node: &SyntaxNode) -> Option<SyntaxNode> {
        node.ancestors()
            .find(|n| n.parent().as_ref() == Some(&self.0))
    }

    /// Finds the nearest type declaration enclosing the given node.
    pub fn enclosing(node: &SyntaxNode) -> Option<Self> {
        node.ancestors().skip(1).find_map(Self::cast)
    }
}

impl AstNode for TypeDeclaration {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind.is_type_declaration()
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        if syntax.kind().is_type_declaration() {
            Some(Self(syntax))
        } else {
            None
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

/// Represents a local declaration statement (e.g. `var x = 1;`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalDeclarationStatement(pub(crate) SyntaxNode);

impl LocalDeclarationStatement {
    /// Gets the variable declaration of the statement.
    pub fn declaration(&self) -> Option<VariableDeclaration> {
        child(&self.0)
    }

    /// Determines if the declaration is a `const` declaration.
    pub fn is_const(&self) -> bool {
        support::token(&self.0, SyntaxKind::ConstKeyword).is_some()
    }
}

impl AstNode for LocalDeclarationStatement {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind == SyntaxKind::LocalDeclarationStatementNode
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        match syntax.kind() {
            SyntaxKind::LocalDeclarationStatementNode => Some(Self(syntax)),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

/// Represents a variable declaration: a type followed by one or more
/// declarators.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableDeclaration(SyntaxNode);

impl VariableDeclaration {
    /// Gets the declarators of the declaration.
    pub fn declarators(&self) -> AstChildren<VariableDeclarator> {
        support::children(&self.0)
    }

    /// Gets the sole declarator of the declaration.
    ///
    /// Returns `None` if the declaration has zero or several declarators.
    pub fn single_declarator(&self) -> Option<VariableDeclarator> {
        let mut declarators = self.declarators();
        let first = declarators.next()?;
        match declarators.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

impl AstNode for VariableDeclaration {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind == SyntaxKind::VariableDeclarationNode
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        match syntax.kind() {
            SyntaxKind::VariableDeclarationNode => Some(Self(syntax)),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

/// Represents a variable declarator (e.g. `x = 1`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableDeclarator(SyntaxNode);

impl VariableDeclarator {
    /// Gets the name of the declared variable.
    pub fn name(&self) -> Option<SyntaxToken> {
        support::token(&self.0, SyntaxKind::Ident)
    }

    /// Gets the initializer expression of the declarator.
    pub fn initializer(&self) -> Option<Expr> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::EqualsValueClauseNode)
            .and_then(|clause| child(&clause))
    }
}

impl AstNode for VariableDeclarator {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind == SyntaxKind::VariableDeclaratorNode
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        match syntax.kind() {
            SyntaxKind::VariableDeclaratorNode => Some(Self(syntax)),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}
