//! Grammar functions for statements.

use super::bump_error;
use super::decl;
use super::expression;
use super::modifiers;
use super::scan_type;
use super::ty;
use crate::lexer::Token;
use crate::lexer::TokenSet;
use crate::parser::CompletedMarker;
use crate::parser::Parser;
use crate::parser::expected_found;
use crate::tree::SyntaxKind;

/// The tokens at which statement recovery stops.
const STATEMENT_RECOVERY: TokenSet = TokenSet::new(&[
    Token::Semicolon as u8,
    Token::IfKeyword as u8,
    Token::ReturnKeyword as u8,
    Token::WhileKeyword as u8,
    Token::ForKeyword as u8,
    Token::ForeachKeyword as u8,
    Token::TryKeyword as u8,
]);

/// Contextual keywords that begin statements the grammar does not model in
/// detail.
const OTHER_STATEMENTS: &[&str] = &[
    "switch", "lock", "fixed", "unsafe", "checked", "unchecked", "goto", "yield",
];

/// Parses a block.
pub(crate) fn block(parser: &mut Parser<'_>) -> CompletedMarker {
    let marker = parser.start();
    let open_span = parser.span();
    parser.expect(Token::OpenBrace);
    while !parser.at_end() && !parser.at(Token::CloseBrace) {
        if matches!(
            parser.peek(),
            Some(Token::CloseParen | Token::CloseBracket)
        ) {
            bump_error(parser, "statement");
            continue;
        }

        statement(parser);
    }

    parser.expect_close(Token::OpenBrace, open_span, Token::CloseBrace);
    marker.complete(parser, SyntaxKind::BlockNode)
}

/// Parses a statement.
///
/// A statement always consumes at least one token unless the next token is a
/// closing delimiter or the input has ended.
pub(crate) fn statement(parser: &mut Parser<'_>) {
    match parser.peek() {
        Some(Token::OpenBrace) => {
            block(parser);
        }
        Some(Token::Semicolon) => {
            let marker = parser.start();
            parser.bump();
            marker.complete(parser, SyntaxKind::EmptyStatementNode);
        }
        Some(Token::IfKeyword) => if_statement(parser),
        Some(Token::ReturnKeyword) => {
            jump_statement(parser, SyntaxKind::ReturnStatementNode, true)
        }
        Some(Token::ThrowKeyword) => jump_statement(parser, SyntaxKind::ThrowStatementNode, true),
        Some(Token::BreakKeyword) => jump_statement(parser, SyntaxKind::BreakStatementNode, false),
        Some(Token::ContinueKeyword) => {
            jump_statement(parser, SyntaxKind::ContinueStatementNode, false)
        }
        Some(Token::WhileKeyword) => while_statement(parser),
        Some(Token::DoKeyword) => do_statement(parser),
        Some(Token::ForKeyword) => for_statement(parser),
        Some(Token::ForeachKeyword) => foreach_statement(parser),
        Some(Token::TryKeyword) => try_statement(parser),
        Some(Token::UsingKeyword) => using_statement(parser),
        Some(Token::ConstKeyword) => local_declaration(parser),
        Some(Token::StaticKeyword | Token::AsyncKeyword | Token::ExternKeyword)
            if !is_lambda_statement(parser) =>
        {
            local_function(parser)
        }
        Some(Token::Ident) if OTHER_STATEMENTS.iter().any(|k| parser.at_contextual(k)) => {
            other_statement(parser)
        }
        _ if is_local_function(parser) => local_function(parser),
        _ if is_local_declaration(parser) => local_declaration(parser),
        _ => expression_statement(parser),
    }
}

/// Determines if an `async` at the start of a statement begins a lambda
/// rather than a local function.
fn is_lambda_statement(parser: &Parser<'_>) -> bool {
    parser.at(Token::AsyncKeyword)
        && matches!(parser.peek2(), Some(Token::OpenParen))
        && super::expr::is_lambda_at(parser, 1)
}

/// Determines if the next tokens begin a local function declaration.
fn is_local_function(parser: &Parser<'_>) -> bool {
    scan_type(parser, 0).is_some_and(|n| {
        parser.nth(n) == Some(Token::Ident)
            && matches!(parser.nth(n + 1), Some(Token::OpenParen | Token::Less))
    })
}

/// Determines if the next tokens begin a local variable declaration.
fn is_local_declaration(parser: &Parser<'_>) -> bool {
    scan_type(parser, 0).is_some_and(|n| {
        parser.nth(n) == Some(Token::Ident)
            && matches!(
                parser.nth(n + 1),
                Some(Token::Assignment | Token::Semicolon | Token::Comma)
            )
    })
}

/// Parses a local function declaration.
fn local_function(parser: &mut Parser<'_>) {
    let marker = parser.start();
    modifiers(parser);
    decl::member_rest(parser, marker);
}

/// Parses a local declaration statement.
///
/// The `using` and `const` prefixes are included in the statement.
fn local_declaration(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.next_if(Token::UsingKeyword);
    parser.next_if(Token::ConstKeyword);
    variable_declaration(parser);
    parser.expect(Token::Semicolon);
    marker.complete(parser, SyntaxKind::LocalDeclarationStatementNode);
}

/// Parses a variable declaration: a type followed by declarators.
fn variable_declaration(parser: &mut Parser<'_>) {
    let marker = parser.start();
    ty(parser, true);
    decl::variable_declarators(parser);
    marker.complete(parser, SyntaxKind::VariableDeclarationNode);
}

/// Parses an expression statement.
fn expression_statement(parser: &mut Parser<'_>) {
    let marker = parser.start();
    if expression(parser).is_none() {
        marker.abandon(parser);
        parser.recover(
            expected_found("statement", parser.found(), parser.span()),
            STATEMENT_RECOVERY,
        );
        return;
    }

    parser.expect(Token::Semicolon);
    marker.complete(parser, SyntaxKind::ExpressionStatementNode);
}

/// Parses a parenthesized expression that is part of a statement (e.g. the
/// condition of an `if` statement).
fn parenthesized_condition(parser: &mut Parser<'_>) {
    let open_span = parser.span();
    if !parser.expect(Token::OpenParen) {
        return;
    }

    if expression(parser).is_none() {
        parser.diagnostic(expected_found(
            "expression",
            parser.found(),
            parser.span(),
        ));
    }
    parser.expect_close(Token::OpenParen, open_span, Token::CloseParen);
}

/// Parses an embedded statement (e.g. the body of an `if` statement).
fn embedded_statement(parser: &mut Parser<'_>) {
    if parser.at_end()
        || matches!(
            parser.peek(),
            Some(Token::CloseBrace | Token::CloseParen | Token::CloseBracket)
        )
    {
        parser.diagnostic(expected_found(
            "statement",
            parser.found(),
            parser.span(),
        ));
        return;
    }

    statement(parser);
}

/// Parses an `if` statement.
fn if_statement(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    parenthesized_condition(parser);
    embedded_statement(parser);
    if parser.at(Token::ElseKeyword) {
        let clause = parser.start();
        parser.bump();
        embedded_statement(parser);
        clause.complete(parser, SyntaxKind::ElseClauseNode);
    }
    marker.complete(parser, SyntaxKind::IfStatementNode);
}

/// Parses a `return`, `throw`, `break`, or `continue` statement.
fn jump_statement(parser: &mut Parser<'_>, kind: SyntaxKind, operand: bool) {
    let marker = parser.start();
    parser.bump();
    if operand && !parser.at(Token::Semicolon) && expression(parser).is_none() {
        parser.diagnostic(expected_found(
            "expression",
            parser.found(),
            parser.span(),
        ));
    }
    parser.expect(Token::Semicolon);
    marker.complete(parser, kind);
}

/// Parses a `while` statement.
fn while_statement(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    parenthesized_condition(parser);
    embedded_statement(parser);
    marker.complete(parser, SyntaxKind::WhileStatementNode);
}

/// Parses a `do` statement.
fn do_statement(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    embedded_statement(parser);
    if parser.expect(Token::WhileKeyword) {
        parenthesized_condition(parser);
    }
    parser.expect(Token::Semicolon);
    marker.complete(parser, SyntaxKind::DoStatementNode);
}

/// Parses a `for` statement.
fn for_statement(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    let open_span = parser.span();
    if parser.expect(Token::OpenParen) {
        if is_local_declaration(parser) {
            variable_declaration(parser);
        } else {
            expression_list(parser);
        }
        parser.expect(Token::Semicolon);
        if !parser.at(Token::Semicolon) {
            expression(parser);
        }
        parser.expect(Token::Semicolon);
        expression_list(parser);
        parser.expect_close(Token::OpenParen, open_span, Token::CloseParen);
    }
    embedded_statement(parser);
    marker.complete(parser, SyntaxKind::ForStatementNode);
}

/// Parses an optional comma-separated list of expressions.
fn expression_list(parser: &mut Parser<'_>) {
    if expression(parser).is_none() {
        return;
    }

    while parser.next_if(Token::Comma) {
        if expression(parser).is_none() {
            parser.diagnostic(expected_found(
                "expression",
                parser.found(),
                parser.span(),
            ));
            break;
        }
    }
}

/// Parses a `foreach` statement.
fn foreach_statement(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    let open_span = parser.span();
    if parser.expect(Token::OpenParen) {
        ty(parser, true);
        if parser.at(Token::OpenParen) {
            // Deconstruction (e.g. `var (key, value)`)
            parser.bump_balanced();
        } else {
            parser.expect(Token::Ident);
        }
        parser.expect(Token::InKeyword);
        if expression(parser).is_none() {
            parser.diagnostic(expected_found(
                "expression",
                parser.found(),
                parser.span(),
            ));
        }
        parser.expect_close(Token::OpenParen, open_span, Token::CloseParen);
    }
    embedded_statement(parser);
    marker.complete(parser, SyntaxKind::ForEachStatementNode);
}

/// Parses a `try` statement.
fn try_statement(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    block(parser);
    while parser.at(Token::CatchKeyword) {
        let clause = parser.start();
        parser.bump();
        if parser.at(Token::OpenParen) {
            let open_span = parser.span();
            parser.bump();
            ty(parser, true);
            parser.next_if(Token::Ident);
            parser.expect_close(Token::OpenParen, open_span, Token::CloseParen);
        }

        if parser.at_contextual("when") {
            parser.bump();
            parenthesized_condition(parser);
        }

        block(parser);
        clause.complete(parser, SyntaxKind::CatchClauseNode);
    }

    if parser.at(Token::FinallyKeyword) {
        let clause = parser.start();
        parser.bump();
        block(parser);
        clause.complete(parser, SyntaxKind::FinallyClauseNode);
    }
    marker.complete(parser, SyntaxKind::TryStatementNode);
}

/// Parses a `using` statement or a `using` local declaration.
fn using_statement(parser: &mut Parser<'_>) {
    if parser.peek2() != Some(Token::OpenParen) {
        local_declaration(parser);
        return;
    }

    let marker = parser.start();
    parser.bump();
    let open_span = parser.span();
    parser.bump();
    if is_local_declaration(parser) {
        variable_declaration(parser);
    } else if expression(parser).is_none() {
        parser.diagnostic(expected_found(
            "expression",
            parser.found(),
            parser.span(),
        ));
    }
    parser.expect_close(Token::OpenParen, open_span, Token::CloseParen);
    embedded_statement(parser);
    marker.complete(parser, SyntaxKind::UsingStatementNode);
}

/// Parses a statement introduced by a contextual keyword (e.g. `switch` or
/// `lock`) without modeling its structure.
///
/// A parenthesized header is skipped, after which either a `;`-terminated
/// tail, a block, or an embedded statement follows.
fn other_statement(parser: &mut Parser<'_>) {
    let marker = parser.start();
    let switch = parser.at_contextual("switch");
    parser.bump();
    if parser.at(Token::OpenParen) {
        parser.bump_balanced();
        if switch {
            // The switch sections are not modeled
            if parser.at(Token::OpenBrace) {
                parser.bump_balanced();
            }
        } else {
            embedded_statement(parser);
        }
    } else if parser.at(Token::OpenBrace) {
        block(parser);
    } else {
        while let Some(token) = parser.peek() {
            match token {
                Token::Semicolon => {
                    parser.bump();
                    break;
                }
                Token::OpenParen | Token::OpenBracket | Token::OpenBrace => {
                    parser.bump_balanced()
                }
                Token::CloseParen | Token::CloseBracket | Token::CloseBrace => break,
                _ => parser.bump(),
            }
        }
    }
    marker.complete(parser, SyntaxKind::OtherStatementNode);
}
