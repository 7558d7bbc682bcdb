//! Grammar functions for expressions.
//!
//! Binary operators are parsed by precedence climbing; everything else is
//! recursive descent with bounded lookahead.

use super::at_generic_arguments;
use super::block;
use super::bump_error;
use super::decl;
use super::scan_balanced;
use super::scan_type;
use super::ty;
use super::type_argument_list;
use crate::lexer::Token;
use crate::parser::CompletedMarker;
use crate::parser::Parser;
use crate::parser::expected_found;
use crate::tree::SyntaxKind;

/// Type names that may be cast from a signed operand (e.g. `(long)-1`).
const PREDEFINED_TYPES: &[&str] = &[
    "bool", "byte", "char", "decimal", "double", "float", "int", "long", "object", "sbyte",
    "short", "string", "uint", "ulong", "ushort",
];

/// The precedence of the null-coalescing operator.
const COALESCE_PRECEDENCE: u8 = 1;

/// The precedence of the relational and type-testing operators.
const RELATIONAL_PRECEDENCE: u8 = 8;

/// Reports an "expected expression" diagnostic at the next token.
fn expected_expression(parser: &mut Parser<'_>) {
    parser.diagnostic(expected_found(
        "expression",
        parser.found(),
        parser.span(),
    ));
}

/// Parses an expression.
///
/// Returns `None` without consuming anything if the next token cannot begin
/// an expression; the caller is responsible for reporting that.
pub(crate) fn expression(parser: &mut Parser<'_>) -> Option<CompletedMarker> {
    if is_lambda_at(parser, 0) {
        return Some(lambda(parser));
    }

    let lhs = conditional(parser)?;
    if !matches!(
        parser.peek(),
        Some(Token::Assignment | Token::CompoundAssignment)
    ) {
        return Some(lhs);
    }

    let marker = lhs.precede(parser);
    parser.bump();
    let rhs = if parser.at(Token::OpenBrace) {
        // Nested object initializers (e.g. `Inner = { Count = 2 }`)
        Some(initializer(parser))
    } else {
        expression(parser)
    };

    if rhs.is_none() {
        expected_expression(parser);
    }

    Some(marker.complete(parser, SyntaxKind::AssignmentExprNode))
}

/// Determines if a lambda expression begins at the `n`-th upcoming token.
pub(super) fn is_lambda_at(parser: &Parser<'_>, mut n: usize) -> bool {
    while matches!(
        parser.nth(n),
        Some(Token::AsyncKeyword | Token::StaticKeyword)
    ) {
        n += 1;
    }

    match parser.nth(n) {
        Some(Token::Ident) => parser.nth(n + 1) == Some(Token::FatArrow),
        Some(Token::OpenParen) => scan_balanced(parser, n)
            .is_some_and(|n| parser.nth(n) == Some(Token::FatArrow)),
        _ => false,
    }
}

/// Parses a lambda expression.
fn lambda(parser: &mut Parser<'_>) -> CompletedMarker {
    let marker = parser.start();
    while matches!(
        parser.peek(),
        Some(Token::AsyncKeyword | Token::StaticKeyword)
    ) {
        parser.bump();
    }

    if parser.at(Token::Ident) {
        let parameter = parser.start();
        parser.bump();
        parameter.complete(parser, SyntaxKind::ParameterNode);
    } else {
        decl::parameter_list(parser);
    }

    parser.expect(Token::FatArrow);
    if parser.at(Token::OpenBrace) {
        block(parser);
    } else if expression(parser).is_none() {
        expected_expression(parser);
    }

    marker.complete(parser, SyntaxKind::LambdaExprNode)
}

/// Parses a conditional expression (e.g. `a ? b : c`).
fn conditional(parser: &mut Parser<'_>) -> Option<CompletedMarker> {
    let condition = binary(parser, COALESCE_PRECEDENCE)?;
    if !parser.at(Token::Question) {
        return Some(condition);
    }

    let marker = condition.precede(parser);
    parser.bump();
    if expression(parser).is_none() {
        expected_expression(parser);
    }

    if parser.expect(Token::Colon) && expression(parser).is_none() {
        expected_expression(parser);
    }

    Some(marker.complete(parser, SyntaxKind::ConditionalExprNode))
}

/// Gets the precedence of the binary operator at the next token and the
/// number of tokens that spell it.
fn binary_operator(parser: &Parser<'_>) -> Option<(u8, usize)> {
    let precedence = match parser.peek()? {
        Token::QuestionQuestion => COALESCE_PRECEDENCE,
        Token::LogicalOr => 2,
        Token::LogicalAnd => 3,
        Token::Pipe => 4,
        Token::Caret => 5,
        Token::Ampersand => 6,
        Token::Equal | Token::NotEqual => 7,
        // Shift operators are lexed as two adjacent angle brackets
        Token::Less | Token::Greater
            if parser.peek2() == parser.peek() && parser.adjacent(0) =>
        {
            return Some((9, 2));
        }
        Token::Less
        | Token::LessEqual
        | Token::Greater
        | Token::GreaterEqual
        | Token::IsKeyword
        | Token::AsKeyword => RELATIONAL_PRECEDENCE,
        Token::Plus | Token::Minus => 10,
        Token::Asterisk | Token::Slash | Token::Percent => 11,
        _ => return None,
    };

    Some((precedence, 1))
}

/// Parses a binary expression whose operators bind at least as tightly as
/// `min`.
fn binary(parser: &mut Parser<'_>, min: u8) -> Option<CompletedMarker> {
    let mut lhs = unary(parser)?;
    loop {
        let Some((precedence, width)) = binary_operator(parser) else {
            break;
        };

        if precedence < min {
            break;
        }

        let marker = lhs.precede(parser);
        if matches!(parser.peek(), Some(Token::IsKeyword | Token::AsKeyword)) {
            let is = parser.at(Token::IsKeyword);
            parser.bump();
            if is {
                pattern(parser);
            } else {
                ty(parser, false);
            }

            lhs = marker.complete(parser, SyntaxKind::TypeTestExprNode);
            continue;
        }

        for _ in 0..width {
            parser.bump();
        }

        // The null-coalescing operator is right-associative
        let next = if precedence == COALESCE_PRECEDENCE {
            precedence
        } else {
            precedence + 1
        };

        if binary(parser, next).is_none() {
            expected_expression(parser);
        }

        lhs = marker.complete(parser, SyntaxKind::BinaryExprNode);
    }

    Some(lhs)
}

/// Parses the pattern of an `is` expression.
///
/// Patterns are not given nodes of their own; their types and constant
/// operands are parsed in place.
fn pattern(parser: &mut Parser<'_>) {
    loop {
        if parser.at_contextual("not") {
            parser.bump();
        }

        match parser.peek() {
            Some(
                Token::Less | Token::LessEqual | Token::Greater | Token::GreaterEqual,
            ) => {
                parser.bump();
                if unary(parser).is_none() {
                    expected_expression(parser);
                }
            }
            Some(Token::OpenBrace) => {
                // Property patterns are not modeled beyond their extent
                parser.bump_balanced();
                if parser.at(Token::Ident) && !at_pattern_combinator(parser) {
                    parser.bump();
                }
            }
            Some(Token::Ident | Token::OpenParen) if scan_type(parser, 0).is_some() => {
                ty(parser, false);
                if parser.at(Token::OpenBrace) {
                    parser.bump_balanced();
                }

                if parser.at(Token::Ident) && !at_pattern_combinator(parser) {
                    parser.bump();
                }
            }
            _ => {
                if unary(parser).is_none() {
                    parser.diagnostic(expected_found(
                        "pattern",
                        parser.found(),
                        parser.span(),
                    ));
                    return;
                }
            }
        }

        if !at_pattern_combinator(parser) {
            return;
        }

        parser.bump();
    }
}

/// Determines if the next token combines patterns (`and` or `or`).
fn at_pattern_combinator(parser: &Parser<'_>) -> bool {
    parser.at_contextual("and") || parser.at_contextual("or")
}

/// Determines if the next tokens begin a cast expression.
fn is_cast(parser: &Parser<'_>) -> bool {
    let Some(n) = scan_type(parser, 1) else {
        return false;
    };

    if parser.nth(n) != Some(Token::CloseParen) {
        return false;
    }

    match parser.nth(n + 1) {
        Some(
            Token::Ident
            | Token::Integer
            | Token::Real
            | Token::String
            | Token::VerbatimString
            | Token::Char
            | Token::TrueKeyword
            | Token::FalseKeyword
            | Token::NullKeyword
            | Token::ThisKeyword
            | Token::BaseKeyword
            | Token::NewKeyword
            | Token::DefaultKeyword
            | Token::OpenParen
            | Token::Exclamation
            | Token::Tilde,
        ) => true,
        Some(Token::Minus | Token::Plus) => {
            n == 3
                && parser
                    .nth_text(1)
                    .is_some_and(|t| PREDEFINED_TYPES.contains(&t))
        }
        _ => false,
    }
}

/// Parses a unary expression.
fn unary(parser: &mut Parser<'_>) -> Option<CompletedMarker> {
    let kind = match parser.peek()? {
        Token::Exclamation
        | Token::Minus
        | Token::Plus
        | Token::Tilde
        | Token::PlusPlus
        | Token::MinusMinus
        | Token::Ampersand
        | Token::Asterisk
        | Token::ThrowKeyword => SyntaxKind::PrefixExprNode,
        Token::AwaitKeyword => SyntaxKind::AwaitExprNode,
        Token::OpenParen if is_cast(parser) => {
            let marker = parser.start();
            let open_span = parser.span();
            parser.bump();
            ty(parser, true);
            parser.expect_close(Token::OpenParen, open_span, Token::CloseParen);
            if unary(parser).is_none() {
                expected_expression(parser);
            }
            return Some(marker.complete(parser, SyntaxKind::CastExprNode));
        }
        _ => return postfix(parser),
    };

    let marker = parser.start();
    parser.bump();
    if unary(parser).is_none() {
        expected_expression(parser);
    }
    Some(marker.complete(parser, kind))
}

/// Parses a primary expression followed by any postfix operators.
fn postfix(parser: &mut Parser<'_>) -> Option<CompletedMarker> {
    let mut lhs = primary(parser)?;
    loop {
        lhs = match parser.peek() {
            Some(Token::Dot | Token::QuestionDot) => {
                let marker = lhs.precede(parser);
                parser.bump();
                if parser.expect(Token::Ident)
                    && parser.at(Token::Less)
                    && at_generic_arguments(parser)
                {
                    type_argument_list(parser);
                }
                marker.complete(parser, SyntaxKind::MemberAccessExprNode)
            }
            Some(Token::OpenParen) => {
                let marker = lhs.precede(parser);
                argument_list(parser);
                marker.complete(parser, SyntaxKind::InvocationExprNode)
            }
            Some(Token::OpenBracket) => {
                let marker = lhs.precede(parser);
                bracketed_argument_list(parser);
                marker.complete(parser, SyntaxKind::ElementAccessExprNode)
            }
            Some(Token::Question)
                if parser.peek2() == Some(Token::OpenBracket) && parser.adjacent(0) =>
            {
                // Null-conditional element access (e.g. `a?[0]`)
                let marker = lhs.precede(parser);
                parser.bump();
                bracketed_argument_list(parser);
                marker.complete(parser, SyntaxKind::ElementAccessExprNode)
            }
            Some(Token::PlusPlus | Token::MinusMinus | Token::Exclamation) => {
                let marker = lhs.precede(parser);
                parser.bump();
                marker.complete(parser, SyntaxKind::PostfixExprNode)
            }
            Some(Token::Ident)
                if parser.at_contextual("switch") && parser.peek2() == Some(Token::OpenBrace) =>
            {
                let marker = lhs.precede(parser);
                parser.bump();
                parser.bump_balanced();
                marker.complete(parser, SyntaxKind::SwitchExprNode)
            }
            Some(Token::Ident)
                if parser.at_contextual("with") && parser.peek2() == Some(Token::OpenBrace) =>
            {
                let marker = lhs.precede(parser);
                parser.bump();
                initializer(parser);
                marker.complete(parser, SyntaxKind::WithExprNode)
            }
            _ => break,
        };
    }

    Some(lhs)
}

/// Parses a primary expression.
fn primary(parser: &mut Parser<'_>) -> Option<CompletedMarker> {
    match parser.peek()? {
        Token::Integer
        | Token::Real
        | Token::String
        | Token::VerbatimString
        | Token::Char
        | Token::TrueKeyword
        | Token::FalseKeyword
        | Token::NullKeyword => {
            let marker = parser.start();
            parser.bump();
            Some(marker.complete(parser, SyntaxKind::LiteralExprNode))
        }
        Token::Ident => {
            let marker = parser.start();
            parser.bump();
            while parser.at(Token::ColonColon) && parser.peek2() == Some(Token::Ident) {
                parser.bump();
                parser.bump();
            }

            if parser.at(Token::Less) && at_generic_arguments(parser) {
                type_argument_list(parser);
                return Some(marker.complete(parser, SyntaxKind::GenericNameExprNode));
            }

            Some(marker.complete(parser, SyntaxKind::NameExprNode))
        }
        Token::ThisKeyword | Token::BaseKeyword => {
            let marker = parser.start();
            parser.bump();
            Some(marker.complete(parser, SyntaxKind::ThisExprNode))
        }
        Token::OpenParen => Some(parenthesized(parser)),
        Token::NewKeyword => Some(creation(parser)),
        Token::DefaultKeyword => {
            let marker = parser.start();
            parser.bump();
            if parser.at(Token::OpenParen) {
                let open_span = parser.span();
                parser.bump();
                ty(parser, true);
                parser.expect_close(Token::OpenParen, open_span, Token::CloseParen);
            }
            Some(marker.complete(parser, SyntaxKind::DefaultExprNode))
        }
        _ => None,
    }
}

/// Parses a parenthesized expression or a tuple literal.
fn parenthesized(parser: &mut Parser<'_>) -> CompletedMarker {
    let marker = parser.start();
    let open_span = parser.span();
    parser.bump();
    loop {
        // Tuple elements may be named (e.g. `(count: 1, total: 2)`)
        if parser.at(Token::Ident) && parser.peek2() == Some(Token::Colon) {
            parser.bump();
            parser.bump();
        }

        if expression(parser).is_none() {
            expected_expression(parser);
            break;
        }

        if !parser.next_if(Token::Comma) {
            break;
        }
    }
    parser.expect_close(Token::OpenParen, open_span, Token::CloseParen);
    marker.complete(parser, SyntaxKind::ParenthesizedExprNode)
}

/// Parses a `new` expression.
fn creation(parser: &mut Parser<'_>) -> CompletedMarker {
    let marker = parser.start();
    parser.bump();
    match parser.peek() {
        Some(Token::OpenBrace) => {
            initializer(parser);
            marker.complete(parser, SyntaxKind::AnonymousObjectCreationExprNode)
        }
        Some(Token::OpenBracket) => {
            // Implicitly typed arrays (e.g. `new[] { 1, 2 }`)
            parser.bump();
            while parser.next_if(Token::Comma) {}
            parser.expect(Token::CloseBracket);
            if parser.at(Token::OpenBrace) {
                initializer(parser);
            }
            marker.complete(parser, SyntaxKind::ArrayCreationExprNode)
        }
        Some(Token::OpenParen) => {
            // Target-typed creation (e.g. `new()`)
            argument_list(parser);
            if parser.at(Token::OpenBrace) {
                initializer(parser);
            }
            marker.complete(parser, SyntaxKind::ObjectCreationExprNode)
        }
        _ => {
            let mut array = scan_type(parser, 0)
                .is_some_and(|n| n > 0 && parser.nth(n - 1) == Some(Token::CloseBracket));
            ty(parser, true);
            if parser.at(Token::OpenBracket) {
                // Array sizes followed by any further rank specifiers
                array = true;
                bracketed_argument_list(parser);
                while parser.at(Token::OpenBracket) {
                    parser.bump_balanced();
                }
            } else if parser.at(Token::OpenParen) {
                argument_list(parser);
            }

            if parser.at(Token::OpenBrace) {
                initializer(parser);
            }

            marker.complete(
                parser,
                if array {
                    SyntaxKind::ArrayCreationExprNode
                } else {
                    SyntaxKind::ObjectCreationExprNode
                },
            )
        }
    }
}

/// Parses an object, collection, or array initializer (e.g. `{ A = 1 }`).
pub(super) fn initializer(parser: &mut Parser<'_>) -> CompletedMarker {
    let marker = parser.start();
    let open_span = parser.span();
    parser.expect(Token::OpenBrace);
    while !parser.at_end() && !parser.at(Token::CloseBrace) {
        match parser.peek() {
            Some(Token::OpenBrace) => {
                initializer(parser);
            }
            Some(Token::OpenBracket) => {
                // Indexed element (e.g. `["a"] = 1`)
                let element = parser.start();
                bracketed_argument_list(parser);
                if parser.next_if(Token::Assignment) {
                    let value = if parser.at(Token::OpenBrace) {
                        Some(initializer(parser))
                    } else {
                        expression(parser)
                    };

                    if value.is_none() {
                        expected_expression(parser);
                    }
                }
                element.complete(parser, SyntaxKind::AssignmentExprNode);
            }
            Some(Token::CloseParen | Token::CloseBracket) => break,
            _ => {
                if expression(parser).is_none() {
                    bump_error(parser, "expression");
                    continue;
                }
            }
        }

        if !parser.next_if(Token::Comma) {
            break;
        }
    }

    parser.expect_close(Token::OpenBrace, open_span, Token::CloseBrace);
    marker.complete(parser, SyntaxKind::InitializerExprNode)
}

/// Parses a parenthesized argument list.
pub(super) fn argument_list(parser: &mut Parser<'_>) {
    delimited_arguments(
        parser,
        Token::OpenParen,
        Token::CloseParen,
        SyntaxKind::ArgumentListNode,
    );
}

/// Parses a bracketed argument list (e.g. the index of an element access).
pub(super) fn bracketed_argument_list(parser: &mut Parser<'_>) {
    delimited_arguments(
        parser,
        Token::OpenBracket,
        Token::CloseBracket,
        SyntaxKind::BracketedArgumentListNode,
    );
}

/// Parses a delimited, comma-separated list of arguments.
fn delimited_arguments(parser: &mut Parser<'_>, open: Token, close: Token, kind: SyntaxKind) {
    let marker = parser.start();
    let open_span = parser.span();
    if !parser.expect(open) {
        marker.complete(parser, kind);
        return;
    }

    if !parser.at(close) {
        loop {
            if argument(parser).is_none() {
                expected_expression(parser);
                break;
            }

            if !parser.next_if(Token::Comma) {
                break;
            }
        }
    }

    parser.expect_close(open, open_span, close);
    marker.complete(parser, kind);
}

/// Parses a single argument.
///
/// Arguments may be named (`name: value`), passed by reference (`ref x`), or
/// declare an out variable (`out var x`).
fn argument(parser: &mut Parser<'_>) -> Option<CompletedMarker> {
    let marker = parser.start();
    if parser.at(Token::Ident) && parser.peek2() == Some(Token::Colon) {
        parser.bump();
        parser.bump();
    }

    let out = parser.at(Token::OutKeyword);
    if matches!(
        parser.peek(),
        Some(Token::RefKeyword | Token::OutKeyword | Token::InKeyword)
    ) {
        parser.bump();
    }

    let declaration = out
        && scan_type(parser, 0).is_some_and(|n| {
            parser.nth(n) == Some(Token::Ident)
                && matches!(
                    parser.nth(n + 1),
                    Some(Token::Comma | Token::CloseParen)
                )
        });

    if declaration {
        ty(parser, true);
        parser.bump();
    } else if expression(parser).is_none() {
        marker.abandon(parser);
        return None;
    }

    Some(marker.complete(parser, SyntaxKind::ArgumentNode))
}
