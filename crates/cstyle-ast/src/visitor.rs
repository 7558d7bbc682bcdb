//! Implementation for AST visitation.
//!
//! An AST visitor is called when a C# document is being visited (see
//! [Document::visit]); callbacks correspond to specific nodes in the AST
//! based on [SyntaxKind]. Nodes without a callback are still traversed, so
//! visitors receive callbacks for nodes nested at any depth (e.g. statements
//! inside lambda bodies).

use rowan::WalkEvent;
use rowan::ast::AstNode;
use tracing::trace;

use crate::Block;
use crate::Document;
use crate::ExpressionStatement;
use crate::IfStatement;
use crate::LocalDeclarationStatement;
use crate::SyntaxKind;
use crate::TypeDeclaration;

/// Represents the reason an AST node has been visited.
///
/// Each node is visited exactly once, but the visitor will receive a call for
/// entering the node and a call for exiting the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisitReason {
    /// The visit has entered the node.
    Enter,
    /// The visit has exited the node.
    Exit,
}

/// A trait used to implement an AST visitor.
///
/// Each encountered node will receive a corresponding method call
/// that receives both a [VisitReason::Enter] call and a
/// matching [VisitReason::Exit] call.
#[allow(unused_variables)]
pub trait Visitor {
    /// Represents the external visitation state.
    type State;

    /// Visits the root document node.
    fn document(&mut self, state: &mut Self::State, reason: VisitReason, doc: &Document) {}

    /// Visits a type declaration node.
    fn type_declaration(
        &mut self,
        state: &mut Self::State,
        reason: VisitReason,
        decl: &TypeDeclaration,
    ) {
    }

    /// Visits a block node.
    fn block(&mut self, state: &mut Self::State, reason: VisitReason, block: &Block) {}

    /// Visits a local declaration statement node.
    fn local_declaration_statement(
        &mut self,
        state: &mut Self::State,
        reason: VisitReason,
        stmt: &LocalDeclarationStatement,
    ) {
    }

    /// Visits an `if` statement node.
    fn if_statement(&mut self, state: &mut Self::State, reason: VisitReason, stmt: &IfStatement) {}

    /// Visits an expression statement node.
    fn expression_statement(
        &mut self,
        state: &mut Self::State,
        reason: VisitReason,
        stmt: &ExpressionStatement,
    ) {
    }
}

/// Used to visit each descendant node of the given root in a preorder
/// traversal.
pub fn visit<V: Visitor>(document: &Document, state: &mut V::State, visitor: &mut V) {
    trace!("beginning document traversal");
    for event in document.root().preorder() {
        let (reason, node) = match event {
            WalkEvent::Enter(node) => (VisitReason::Enter, node),
            WalkEvent::Leave(node) => (VisitReason::Exit, node),
        };

        let kind = node.kind();
        trace!(?reason, ?kind);
        match kind {
            SyntaxKind::CompilationUnitNode => visitor.document(state, reason, document),
            k if k.is_type_declaration() => {
                if let Some(decl) = TypeDeclaration::cast(node) {
                    visitor.type_declaration(state, reason, &decl);
                }
            }
            SyntaxKind::BlockNode => {
                if let Some(block) = Block::cast(node) {
                    visitor.block(state, reason, &block);
                }
            }
            SyntaxKind::LocalDeclarationStatementNode => {
                if let Some(stmt) = LocalDeclarationStatement::cast(node) {
                    visitor.local_declaration_statement(state, reason, &stmt);
                }
            }
            SyntaxKind::IfStatementNode => {
                if let Some(stmt) = IfStatement::cast(node) {
                    visitor.if_statement(state, reason, &stmt);
                }
            }
            SyntaxKind::ExpressionStatementNode => {
                if let Some(stmt) = ExpressionStatement::cast(node) {
                    visitor.expression_statement(state, reason, &stmt);
                }
            }
            _ => {
                // Other nodes are traversed without a callback
            }
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Records the callbacks it receives.
    #[derive(Default)]
    struct Recorder;

    impl Visitor for Recorder {
        type State = Vec<String>;

        fn document(&mut self, state: &mut Self::State, reason: VisitReason, _: &Document) {
            state.push(format!("{reason:?} document"));
        }

        fn type_declaration(
            &mut self,
            state: &mut Self::State,
            reason: VisitReason,
            decl: &TypeDeclaration,
        ) {
            let name = decl.name().map(|t| t.text().to_string()).unwrap_or_default();
            state.push(format!("{reason:?} type {name}"));
        }

        fn local_declaration_statement(
            &mut self,
            state: &mut Self::State,
            reason: VisitReason,
            _: &LocalDeclarationStatement,
        ) {
            state.push(format!("{reason:?} local"));
        }

        fn if_statement(&mut self, state: &mut Self::State, reason: VisitReason, _: &IfStatement) {
            state.push(format!("{reason:?} if"));
        }

        fn expression_statement(
            &mut self,
            state: &mut Self::State,
            reason: VisitReason,
            _: &ExpressionStatement,
        ) {
            state.push(format!("{reason:?} expression"));
        }
    }

    #[test]
    fn visit_order() {
        let (document, _) =
            Document::parse("class C { void M() { var a = F(() => { b(); }); if (a) c(); } }");
        let mut state = Vec::new();
        document.visit(&mut state, &mut Recorder);
        assert_eq!(
            state,
            [
                "Enter document",
                "Enter type C",
                "Enter local",
                "Enter expression",
                "Exit expression",
                "Exit local",
                "Enter if",
                "Enter expression",
                "Exit expression",
                "Exit if",
                "Exit type C",
                "Exit document",
            ]
        );
    }
}
