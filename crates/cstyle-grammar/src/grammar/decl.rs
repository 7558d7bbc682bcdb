//! Grammar functions for namespaces, type declarations, and members.

use super::attributes;
use super::block;
use super::bump_error;
use super::constraint_clauses;
use super::expression;
use super::modifiers;
use super::scan_type;
use super::statement;
use super::ty;
use super::type_parameter_list;
use crate::lexer::Token;
use crate::lexer::TokenSet;
use crate::parser::Marker;
use crate::parser::Parser;
use crate::parser::expected_found;
use crate::parser::expected_one_of;
use crate::tree::SyntaxKind;

/// The tokens that introduce a type declaration.
const TYPE_KEYWORDS: TokenSet = TokenSet::new(&[
    Token::ClassKeyword as u8,
    Token::StructKeyword as u8,
    Token::InterfaceKeyword as u8,
    Token::RecordKeyword as u8,
    Token::EnumKeyword as u8,
]);

/// The tokens at which member recovery stops.
const MEMBER_RECOVERY: TokenSet = TokenSet::new(&[
    Token::OpenBracket as u8,
    Token::ClassKeyword as u8,
    Token::StructKeyword as u8,
    Token::InterfaceKeyword as u8,
    Token::RecordKeyword as u8,
    Token::EnumKeyword as u8,
    Token::PublicKeyword as u8,
    Token::PrivateKeyword as u8,
    Token::ProtectedKeyword as u8,
    Token::InternalKeyword as u8,
    Token::StaticKeyword as u8,
]);

/// Parses a member of a compilation unit or namespace.
///
/// Besides `using` directives, namespaces, and type declarations, top-level
/// statements are accepted here.
pub(super) fn namespace_member(parser: &mut Parser<'_>) {
    match parser.peek() {
        Some(Token::UsingKeyword)
            if !matches!(parser.peek2(), Some(Token::OpenParen))
                && !parser.nth_text(1).is_some_and(|t| t == "var") =>
        {
            using_directive(parser)
        }
        Some(Token::NamespaceKeyword) => namespace(parser),
        Some(Token::CloseBrace | Token::CloseParen | Token::CloseBracket) => {
            bump_error(parser, "a declaration or statement")
        }
        _ => {
            let marker = parser.start();
            attributes(parser);
            let has_modifiers = modifiers(parser);
            if parser.at_set(TYPE_KEYWORDS) {
                type_declaration(parser, marker);
            } else if has_modifiers {
                member_rest(parser, marker);
            } else {
                marker.abandon(parser);
                statement(parser);
            }
        }
    }
}

/// Parses a `using` directive.
fn using_directive(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    while let Some(token) = parser.peek() {
        if matches!(
            token,
            Token::Semicolon | Token::OpenBrace | Token::CloseBrace
        ) {
            break;
        }
        parser.bump();
    }
    parser.expect(Token::Semicolon);
    marker.complete(parser, SyntaxKind::UsingDirectiveNode);
}

/// Parses a block or file-scoped namespace declaration.
fn namespace(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    if parser.expect(Token::Ident) {
        while parser.at(Token::Dot) && parser.peek2() == Some(Token::Ident) {
            parser.bump();
            parser.bump();
        }
    }

    if parser.next_if(Token::Semicolon) {
        while !parser.at_end() {
            namespace_member(parser);
        }
    } else if parser.at(Token::OpenBrace) {
        let open_span = parser.span();
        parser.bump();
        while !parser.at_end() && !parser.at(Token::CloseBrace) {
            namespace_member(parser);
        }
        parser.expect_close(Token::OpenBrace, open_span, Token::CloseBrace);
    } else {
        parser.diagnostic(expected_one_of(
            &["`{`", "`;`"],
            parser.found(),
            parser.span(),
        ));
    }

    marker.complete(parser, SyntaxKind::NamespaceDeclarationNode);
}

/// Parses the remainder of a type declaration after its attributes and
/// modifiers.
fn type_declaration(parser: &mut Parser<'_>, marker: Marker) {
    let kind = match parser.peek() {
        Some(Token::ClassKeyword) => SyntaxKind::ClassDeclarationNode,
        Some(Token::StructKeyword) => SyntaxKind::StructDeclarationNode,
        Some(Token::InterfaceKeyword) => SyntaxKind::InterfaceDeclarationNode,
        Some(Token::RecordKeyword) => SyntaxKind::RecordDeclarationNode,
        Some(Token::EnumKeyword) => {
            enum_declaration(parser, marker);
            return;
        }
        _ => unreachable!("expected a type keyword"),
    };

    parser.bump();
    if kind == SyntaxKind::RecordDeclarationNode {
        // `record class` and `record struct`
        if parser.at(Token::ClassKeyword) || parser.at(Token::StructKeyword) {
            parser.bump();
        }
    }

    parser.expect(Token::Ident);
    if parser.at(Token::Less) {
        type_parameter_list(parser);
    }

    if parser.at(Token::OpenParen) {
        parameter_list(parser);
    }

    if parser.at(Token::Colon) {
        base_list(parser);
    }

    constraint_clauses(parser);

    if parser.at(Token::OpenBrace) {
        let open_span = parser.span();
        parser.bump();
        while !parser.at_end() && !parser.at(Token::CloseBrace) {
            member(parser);
        }
        parser.expect_close(Token::OpenBrace, open_span, Token::CloseBrace);
        parser.next_if(Token::Semicolon);
    } else if !parser.next_if(Token::Semicolon) {
        parser.diagnostic(expected_one_of(
            &["`{`", "`;`"],
            parser.found(),
            parser.span(),
        ));
    }

    marker.complete(parser, kind);
}

/// Parses a base type list (e.g. `: Base, IThing`).
fn base_list(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    loop {
        if ty(parser, true).is_none() {
            break;
        }

        // Records may pass arguments to their base type
        if parser.at(Token::OpenParen) {
            super::expr::argument_list(parser);
        }

        if !parser.next_if(Token::Comma) {
            break;
        }
    }
    marker.complete(parser, SyntaxKind::BaseListNode);
}

/// Parses the remainder of an enum declaration.
fn enum_declaration(parser: &mut Parser<'_>, marker: Marker) {
    parser.bump();
    parser.expect(Token::Ident);
    if parser.at(Token::Colon) {
        base_list(parser);
    }

    if parser.at(Token::OpenBrace) {
        let open_span = parser.span();
        parser.bump();
        while parser.at(Token::Ident) || parser.at(Token::OpenBracket) {
            let member = parser.start();
            attributes(parser);
            parser.expect(Token::Ident);
            if parser.next_if(Token::Assignment) && expression(parser).is_none() {
                parser.diagnostic(expected_found(
                    "expression",
                    parser.found(),
                    parser.span(),
                ));
            }
            member.complete(parser, SyntaxKind::EnumMemberNode);
            if !parser.next_if(Token::Comma) {
                break;
            }
        }
        parser.expect_close(Token::OpenBrace, open_span, Token::CloseBrace);
        parser.next_if(Token::Semicolon);
    } else {
        parser.diagnostic(expected_found("`{`", parser.found(), parser.span()));
    }

    marker.complete(parser, SyntaxKind::EnumDeclarationNode);
}

/// Parses a member of a type declaration.
fn member(parser: &mut Parser<'_>) {
    if matches!(
        parser.peek(),
        Some(Token::CloseParen | Token::CloseBracket)
    ) {
        bump_error(parser, "a member declaration");
        return;
    }

    let marker = parser.start();
    attributes(parser);
    modifiers(parser);
    if parser.at_set(TYPE_KEYWORDS) {
        type_declaration(parser, marker);
        return;
    }

    member_rest(parser, marker);
}

/// Parses the remainder of a member after its attributes and modifiers.
///
/// This is also used for local functions.
pub(super) fn member_rest(parser: &mut Parser<'_>, marker: Marker) {
    // Constructors and finalizers
    if parser.at(Token::Tilde) {
        parser.bump();
    }

    if parser.at(Token::Ident) && parser.peek2() == Some(Token::OpenParen) {
        parser.bump();
        parameter_list(parser);
        if parser.at(Token::Colon) {
            let initializer = parser.start();
            parser.bump();
            parser.expect_one_of(
                TokenSet::new(&[Token::BaseKeyword as u8, Token::ThisKeyword as u8]),
                &["`base`", "`this`"],
            );
            if parser.at(Token::OpenParen) {
                super::expr::argument_list(parser);
            }
            initializer.complete(parser, SyntaxKind::ConstructorInitializerNode);
        }
        body(parser);
        marker.complete(parser, SyntaxKind::ConstructorDeclarationNode);
        return;
    }

    if scan_type(parser, 0).is_none() {
        parser.recover(
            expected_found("a member declaration", parser.found(), parser.span()),
            MEMBER_RECOVERY,
        );
        marker.complete(parser, SyntaxKind::ErrorNode);
        return;
    }

    let declaration = parser.start();
    ty(parser, true);

    // Operators and conversions
    if parser.at_contextual("operator") {
        declaration.abandon(parser);
        parser.bump();
        parser.bump();
        parameter_list(parser);
        body(parser);
        marker.complete(parser, SyntaxKind::MethodDeclarationNode);
        return;
    }

    // Indexers
    if parser.at(Token::ThisKeyword) {
        declaration.abandon(parser);
        parser.bump();
        if parser.at(Token::OpenBracket) {
            let parameters = parser.start();
            parser.bump_balanced();
            parameters.complete(parser, SyntaxKind::ParameterListNode);
        }
        property_rest(parser, marker);
        return;
    }

    // Explicit interface implementations (e.g. `IFoo.Bar`) are consumed by the
    // type above; the member name follows
    if !parser.at(Token::Ident) {
        declaration.abandon(parser);
        parser.recover(
            expected_found("member name", parser.found(), parser.span()),
            MEMBER_RECOVERY,
        );
        marker.complete(parser, SyntaxKind::ErrorNode);
        return;
    }

    match parser.peek2() {
        Some(Token::OpenParen | Token::Less) => {
            declaration.abandon(parser);
            parser.bump();
            method_rest(parser, marker);
        }
        Some(Token::OpenBrace | Token::FatArrow) => {
            declaration.abandon(parser);
            parser.bump();
            property_rest(parser, marker);
        }
        _ => {
            variable_declarators(parser);
            declaration.complete(parser, SyntaxKind::VariableDeclarationNode);
            parser.expect(Token::Semicolon);
            marker.complete(parser, SyntaxKind::FieldDeclarationNode);
        }
    }
}

/// Parses the remainder of a method after its name.
fn method_rest(parser: &mut Parser<'_>, marker: Marker) {
    if parser.at(Token::Less) {
        type_parameter_list(parser);
    }

    parameter_list(parser);
    constraint_clauses(parser);
    body(parser);
    marker.complete(parser, SyntaxKind::MethodDeclarationNode);
}

/// Parses the remainder of a property or indexer after its name.
fn property_rest(parser: &mut Parser<'_>, marker: Marker) {
    if parser.at(Token::FatArrow) {
        expression_body(parser);
        parser.expect(Token::Semicolon);
        marker.complete(parser, SyntaxKind::PropertyDeclarationNode);
        return;
    }

    if parser.at(Token::OpenBrace) {
        accessor_list(parser);
    } else {
        parser.diagnostic(expected_one_of(
            &["`{`", "`=>`"],
            parser.found(),
            parser.span(),
        ));
    }

    if parser.at(Token::Assignment) {
        equals_value_clause(parser);
        parser.expect(Token::Semicolon);
    }

    marker.complete(parser, SyntaxKind::PropertyDeclarationNode);
}

/// Parses a property accessor list (e.g. `{ get; private set; }`).
fn accessor_list(parser: &mut Parser<'_>) {
    let marker = parser.start();
    let open_span = parser.span();
    parser.bump();
    while !parser.at_end() && !parser.at(Token::CloseBrace) {
        let accessor = parser.start();
        attributes(parser);
        modifiers(parser);
        if !parser.at(Token::Ident) {
            accessor.abandon(parser);
            parser.recover(
                expected_one_of(
                    &["`get`", "`set`", "`init`"],
                    parser.found(),
                    parser.span(),
                ),
                TokenSet::new(&[Token::Ident as u8]),
            );
            if parser.at(Token::CloseParen) || parser.at(Token::CloseBracket) {
                bump_error(parser, "an accessor");
            }
            continue;
        }

        parser.bump();
        body(parser);
        accessor.complete(parser, SyntaxKind::AccessorNode);
    }
    parser.expect_close(Token::OpenBrace, open_span, Token::CloseBrace);
    marker.complete(parser, SyntaxKind::AccessorListNode);
}

/// Parses a member body: a block, an expression body, or `;`.
fn body(parser: &mut Parser<'_>) {
    match parser.peek() {
        Some(Token::OpenBrace) => {
            block(parser);
        }
        Some(Token::FatArrow) => {
            expression_body(parser);
            parser.expect(Token::Semicolon);
        }
        _ => {
            if !parser.next_if(Token::Semicolon) {
                parser.diagnostic(expected_one_of(
                    &["`{`", "`=>`", "`;`"],
                    parser.found(),
                    parser.span(),
                ));
            }
        }
    }
}

/// Parses an expression body (e.g. `=> x`).
fn expression_body(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    if expression(parser).is_none() {
        parser.diagnostic(expected_found(
            "expression",
            parser.found(),
            parser.span(),
        ));
    }
    marker.complete(parser, SyntaxKind::ExpressionBodyNode);
}

/// Parses a parameter list, including lambda parameter lists where types are
/// optional.
pub(super) fn parameter_list(parser: &mut Parser<'_>) {
    let marker = parser.start();
    let open_span = parser.span();
    if !parser.expect(Token::OpenParen) {
        marker.complete(parser, SyntaxKind::ParameterListNode);
        return;
    }

    if !parser.at(Token::CloseParen) {
        loop {
            parameter(parser);
            if !parser.next_if(Token::Comma) {
                break;
            }
        }
    }

    parser.expect_close(Token::OpenParen, open_span, Token::CloseParen);
    marker.complete(parser, SyntaxKind::ParameterListNode);
}

/// Parses a single parameter.
fn parameter(parser: &mut Parser<'_>) {
    let marker = parser.start();
    attributes(parser);
    while matches!(
        parser.peek(),
        Some(
            Token::RefKeyword
                | Token::OutKeyword
                | Token::InKeyword
                | Token::ParamsKeyword
                | Token::ThisKeyword
                | Token::ReadonlyKeyword
        )
    ) {
        parser.bump();
    }

    // The type is optional for lambda parameters
    if scan_type(parser, 0).is_some_and(|n| parser.nth(n) == Some(Token::Ident)) {
        ty(parser, true);
    }

    parser.expect(Token::Ident);
    if parser.at(Token::Assignment) {
        equals_value_clause(parser);
    }
    marker.complete(parser, SyntaxKind::ParameterNode);
}

/// Parses a comma-separated list of variable declarators.
pub(super) fn variable_declarators(parser: &mut Parser<'_>) {
    loop {
        let marker = parser.start();
        parser.expect(Token::Ident);
        if parser.at(Token::OpenBracket) {
            super::expr::bracketed_argument_list(parser);
        }

        if parser.at(Token::Assignment) {
            equals_value_clause(parser);
        }
        marker.complete(parser, SyntaxKind::VariableDeclaratorNode);

        if !parser.next_if(Token::Comma) {
            break;
        }
    }
}

/// Parses an equals value clause (e.g. `= 1`).
pub(super) fn equals_value_clause(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    let value = if parser.at(Token::OpenBrace) {
        // Array initializers (e.g. `int[] a = { 1, 2 };`)
        Some(super::expr::initializer(parser))
    } else {
        expression(parser)
    };

    if value.is_none() {
        parser.diagnostic(expected_found(
            "expression",
            parser.found(),
            parser.span(),
        ));
    }
    marker.complete(parser, SyntaxKind::EqualsValueClauseNode);
}
