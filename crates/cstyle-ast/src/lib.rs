//! A typed abstract syntax tree (AST) over C# concrete syntax trees.
//!
//! The AST is a facade over the lossless CST produced by `cstyle-grammar`:
//! every AST element wraps a `rowan` node and reads its information from the
//! underlying tree on demand, so AST elements are trivially cloned.
//!
//! See [Document::parse] for parsing C# source into an AST.
//!
//! # Examples
//!
//! ```rust
//! use cstyle_ast::AstNode;
//! use cstyle_ast::Document;
//! use cstyle_ast::IndentedStatement;
//!
//! let (document, diagnostics) = Document::parse(
//!     "class C\n{\n    void M()\n    {\n        var x = list\n            .First();\n    }\n}\n",
//! );
//! assert!(diagnostics.is_empty());
//!
//! let statement = document
//!     .root()
//!     .descendants()
//!     .find_map(IndentedStatement::cast)
//!     .expect("should have a statement");
//! let expr = statement.governed_expression().expect("should have an expression");
//! assert!(expr.is_multiline());
//! ```

use std::sync::Arc;

pub use cstyle_grammar::CSharpLanguage;
pub use cstyle_grammar::Diagnostic;
pub use cstyle_grammar::Label;
pub use cstyle_grammar::Severity;
pub use cstyle_grammar::Span;
pub use cstyle_grammar::SyntaxElement;
pub use cstyle_grammar::SyntaxKind;
pub use cstyle_grammar::SyntaxNode;
pub use cstyle_grammar::SyntaxToken;
pub use cstyle_grammar::SyntaxTree;
use line_index::LineIndex;
use line_index::TextSize;
pub use rowan::ast::AstChildren;
pub use rowan::ast::AstNode;
pub use rowan::ast::support;

mod decls;
mod expr;
mod stmt;
mod tokens;
mod visitor;

pub use decls::*;
pub use expr::*;
pub use stmt::*;
pub use tokens::*;
pub use visitor::*;

/// Gets the source span of the given node.
pub fn span_of<N: AstNode<Language = CSharpLanguage>>(node: &N) -> Span {
    node.syntax().text_range().into()
}

/// A zero-based line and column position in a document.
///
/// Columns are measured in UTF-8 bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// The zero-based line number.
    pub line: usize,
    /// The zero-based byte column.
    pub column: usize,
}

/// Represents a single C# document.
///
/// A document pairs the root of the syntax tree with a line index used for
/// position lookups.
#[derive(Debug, Clone)]
pub struct Document {
    /// The root node of the document.
    root: SyntaxNode,
    /// The line index of the document's text.
    lines: Arc<LineIndex>,
}

impl Document {
    /// Parses a document from the given source.
    ///
    /// A document is always returned, even when the source contains syntax
    /// errors; the returned diagnostics describe those errors.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use cstyle_ast::Document;
    /// let (document, diagnostics) = Document::parse("class C { }\n");
    /// assert!(diagnostics.is_empty());
    /// assert_eq!(document.text(), "class C { }\n");
    /// ```
    pub fn parse(source: &str) -> (Self, Vec<Diagnostic>) {
        let (tree, diagnostics) = SyntaxTree::parse(source);
        let document = Self {
            root: tree.into_syntax(),
            lines: Arc::new(LineIndex::new(source)),
        };

        (document, diagnostics)
    }

    /// Gets the root syntax node of the document.
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Gets the full text of the document.
    pub fn text(&self) -> String {
        self.root.text().to_string()
    }

    /// Gets the type declarations of the document, at any depth.
    pub fn type_declarations(&self) -> impl Iterator<Item = TypeDeclaration> {
        self.root.descendants().filter_map(TypeDeclaration::cast)
    }

    /// Gets the line and column of the given byte offset.
    ///
    /// Returns `None` if the offset is outside of the document.
    pub fn position(&self, offset: usize) -> Option<Position> {
        let offset = TextSize::from(u32::try_from(offset).ok()?);
        let position = self.lines.try_line_col(offset)?;
        Some(Position {
            line: position.line as usize,
            column: position.col as usize,
        })
    }

    /// Visits the document with a pre-order traversal using the provided
    /// visitor.
    pub fn visit<V: Visitor>(&self, state: &mut V::State, visitor: &mut V) {
        visit(self, state, visitor)
    }
}

impl AstNode for Document {
    type Language = CSharpLanguage;

    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized,
    {
        kind == SyntaxKind::CompilationUnitNode
    }

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized,
    {
        match syntax.kind() {
            SyntaxKind::CompilationUnitNode => {
                let lines = Arc::new(LineIndex::new(&syntax.text().to_string()));
                Some(Self {
                    root: syntax,
                    lines,
                })
            }
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.root
    }
}
