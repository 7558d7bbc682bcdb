//! Lexing and parsing of C# source into a lossless concrete syntax tree.
//!
//! The lexer is built on [`logos`] and the tree on [`rowan`]. Parsing is
//! infallible: every byte of the source, including whitespace and comments,
//! is present in the resulting tree and problems are reported as
//! [`Diagnostic`]s alongside it.
//!
//! The grammar covers the parts of C# that matter to formatting rules:
//! namespaces, type and member declarations, statements, and expressions.
//! Constructs it does not model in detail (e.g. `switch` sections) are kept
//! as opaque nodes whose tokens are still in the tree.
//!
//! # Examples
//!
//! ```rust
//! use cstyle_grammar::SyntaxKind;
//! use cstyle_grammar::SyntaxTree;
//!
//! let (tree, diagnostics) = SyntaxTree::parse("class C { int x = 1; }");
//! assert!(diagnostics.is_empty());
//! assert_eq!(
//!     tree.root().first_child().map(|n| n.kind()),
//!     Some(SyntaxKind::ClassDeclarationNode)
//! );
//! ```

mod diagnostic;
mod grammar;
pub mod lexer;
pub mod parser;
mod tree;

pub use diagnostic::*;
pub use tree::*;
