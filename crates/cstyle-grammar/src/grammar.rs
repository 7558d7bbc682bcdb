//! Module for the C# grammar functions.
//!
//! The grammar is split into declarations, statements, and expressions.
//! Shared constructs (types, attributes, modifiers) and lookahead helpers
//! live in this module.

use crate::lexer::Token;
use crate::lexer::TokenSet;
use crate::parser::CompletedMarker;
use crate::parser::Output;
use crate::parser::Parser;
use crate::parser::expected_found;
use crate::tree::SyntaxKind;

mod decl;
mod expr;
mod stmt;

pub(crate) use expr::expression;
pub(crate) use stmt::block;
pub(crate) use stmt::statement;

/// The tokens that may appear as declaration modifiers.
const MODIFIERS: TokenSet = TokenSet::new(&[
    Token::AbstractKeyword as u8,
    Token::AsyncKeyword as u8,
    Token::ConstKeyword as u8,
    Token::ExternKeyword as u8,
    Token::InternalKeyword as u8,
    Token::NewKeyword as u8,
    Token::OverrideKeyword as u8,
    Token::PartialKeyword as u8,
    Token::PrivateKeyword as u8,
    Token::ProtectedKeyword as u8,
    Token::PublicKeyword as u8,
    Token::ReadonlyKeyword as u8,
    Token::SealedKeyword as u8,
    Token::StaticKeyword as u8,
    Token::VirtualKeyword as u8,
]);

/// The tokens that may follow a generic name's type argument list in an
/// expression.
const GENERIC_FOLLOW: TokenSet = TokenSet::new(&[
    Token::OpenParen as u8,
    Token::CloseParen as u8,
    Token::CloseBracket as u8,
    Token::CloseBrace as u8,
    Token::Colon as u8,
    Token::Semicolon as u8,
    Token::Comma as u8,
    Token::Dot as u8,
    Token::QuestionDot as u8,
    Token::Question as u8,
    Token::Equal as u8,
    Token::NotEqual as u8,
    Token::Pipe as u8,
    Token::Caret as u8,
    Token::LogicalAnd as u8,
    Token::LogicalOr as u8,
    Token::Ampersand as u8,
    Token::OpenBracket as u8,
]);

/// Parses a C# compilation unit.
pub(crate) fn compilation_unit(mut parser: Parser<'_>) -> Output {
    let root = parser.start_root();
    while !parser.at_end() {
        decl::namespace_member(&mut parser);
    }

    parser.eat_trivia();
    root.complete(&mut parser, SyntaxKind::CompilationUnitNode);
    parser.finish()
}

/// Wraps the next token in an error node with an "expected" diagnostic.
///
/// This guarantees progress for callers that loop on a token the grammar
/// cannot otherwise consume (e.g. a stray closing brace).
fn bump_error(parser: &mut Parser<'_>, expected: &str) {
    parser.diagnostic(expected_found(expected, parser.found(), parser.span()));
    let marker = parser.start();
    parser.bump();
    marker.complete(parser, SyntaxKind::ErrorNode);
}

/// Parses any attribute lists (e.g. `[Obsolete]`).
///
/// The content of an attribute list is not modeled.
fn attributes(parser: &mut Parser<'_>) {
    while parser.at(Token::OpenBracket) {
        let marker = parser.start();
        parser.bump_balanced();
        marker.complete(parser, SyntaxKind::AttributeListNode);
    }
}

/// Parses any declaration modifiers, returning whether one was present.
fn modifiers(parser: &mut Parser<'_>) -> bool {
    let mut any = false;
    while parser.at_set(MODIFIERS) {
        parser.bump();
        any = true;
    }
    any
}

/// Parses a type.
///
/// When `nullable` is `false`, a trailing `?` is left for the caller (as in
/// `x is T ? a : b`).
fn ty(parser: &mut Parser<'_>, nullable: bool) -> Option<CompletedMarker> {
    let marker = parser.start();
    match parser.peek() {
        Some(Token::Ident) => {
            parser.bump();
            loop {
                if parser.at(Token::Less) {
                    type_argument_list(parser);
                }

                if (parser.at(Token::Dot) || parser.at(Token::ColonColon))
                    && parser.peek2() == Some(Token::Ident)
                {
                    parser.bump();
                    parser.bump();
                    continue;
                }

                break;
            }
        }
        Some(Token::OpenParen) => {
            // Tuple types are not modeled beyond their extent
            parser.bump_balanced();
        }
        _ => {
            parser.diagnostic(expected_found("type", parser.found(), parser.span()));
            marker.abandon(parser);
            return None;
        }
    }

    loop {
        match parser.peek() {
            Some(Token::Question) if nullable => parser.bump(),
            Some(Token::OpenBracket)
                if matches!(parser.peek2(), Some(Token::Comma | Token::CloseBracket)) =>
            {
                parser.bump();
                while parser.next_if(Token::Comma) {}
                parser.expect(Token::CloseBracket);
            }
            _ => break,
        }
    }

    Some(marker.complete(parser, SyntaxKind::TypeNode))
}

/// Parses a type argument list (e.g. `<int, string>`).
fn type_argument_list(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    if !parser.at(Token::Greater) {
        loop {
            if ty(parser, true).is_none() || !parser.next_if(Token::Comma) {
                break;
            }
        }
    }
    parser.expect(Token::Greater);
    marker.complete(parser, SyntaxKind::TypeArgumentListNode);
}

/// Parses a type parameter list (e.g. `<T, in U>`).
fn type_parameter_list(parser: &mut Parser<'_>) {
    let marker = parser.start();
    parser.bump();
    loop {
        attributes(parser);
        if parser.at(Token::InKeyword) || parser.at(Token::OutKeyword) {
            parser.bump();
        }
        if !parser.expect(Token::Ident) || !parser.next_if(Token::Comma) {
            break;
        }
    }
    parser.expect(Token::Greater);
    marker.complete(parser, SyntaxKind::TypeParameterListNode);
}

/// Parses any generic constraint clauses (e.g. `where T : class`).
fn constraint_clauses(parser: &mut Parser<'_>) {
    while parser.at_contextual("where") {
        let marker = parser.start();
        parser.bump();
        while let Some(token) = parser.peek() {
            if matches!(
                token,
                Token::OpenBrace | Token::Semicolon | Token::FatArrow | Token::CloseBrace
            ) || parser.at_contextual("where")
            {
                break;
            }

            if token == Token::OpenParen {
                parser.bump_balanced();
            } else {
                parser.bump();
            }
        }
        marker.complete(parser, SyntaxKind::ConstraintClauseNode);
    }
}

/// Scans a type starting at the `n`-th upcoming token without consuming
/// anything.
///
/// Returns the lookahead index immediately after the type.
fn scan_type(parser: &Parser<'_>, mut n: usize) -> Option<usize> {
    match parser.nth(n)? {
        Token::Ident => {
            n += 1;
            loop {
                if parser.nth(n) == Some(Token::Less) {
                    n = scan_type_arguments(parser, n)?;
                }

                if matches!(parser.nth(n), Some(Token::Dot | Token::ColonColon))
                    && parser.nth(n + 1) == Some(Token::Ident)
                {
                    n += 2;
                    continue;
                }

                break;
            }
        }
        Token::OpenParen => n = scan_balanced(parser, n)?,
        _ => return None,
    }

    loop {
        match parser.nth(n) {
            Some(Token::Question) => n += 1,
            Some(Token::OpenBracket)
                if matches!(parser.nth(n + 1), Some(Token::Comma | Token::CloseBracket)) =>
            {
                n += 1;
                while parser.nth(n) == Some(Token::Comma) {
                    n += 1;
                }
                if parser.nth(n) != Some(Token::CloseBracket) {
                    return None;
                }
                n += 1;
            }
            _ => break,
        }
    }

    Some(n)
}

/// Scans a type argument list starting at the `n`-th upcoming token (a `<`).
///
/// Returns the lookahead index immediately after the closing `>`.
fn scan_type_arguments(parser: &Parser<'_>, mut n: usize) -> Option<usize> {
    if parser.nth(n) != Some(Token::Less) {
        return None;
    }

    n += 1;
    if parser.nth(n) == Some(Token::Greater) {
        return Some(n + 1);
    }

    loop {
        n = scan_type(parser, n)?;
        match parser.nth(n)? {
            Token::Comma => n += 1,
            Token::Greater => return Some(n + 1),
            _ => return None,
        }
    }
}

/// Scans a balanced group starting at the `n`-th upcoming token (an opening
/// delimiter).
///
/// Returns the lookahead index immediately after the matching closing
/// delimiter.
fn scan_balanced(parser: &Parser<'_>, mut n: usize) -> Option<usize> {
    let mut depth = 0usize;
    loop {
        match parser.nth(n)? {
            Token::OpenParen | Token::OpenBracket | Token::OpenBrace => depth += 1,
            Token::CloseParen | Token::CloseBracket | Token::CloseBrace => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(n + 1);
                }
            }
            _ => {}
        }
        n += 1;
    }
}

/// Determines if the next tokens are a type argument list that makes the
/// preceding identifier a generic name in an expression.
fn at_generic_arguments(parser: &Parser<'_>) -> bool {
    match scan_type_arguments(parser, 0) {
        Some(n) => parser
            .nth(n)
            .map(|t| t != Token::MAX && GENERIC_FOLLOW.contains(t.into_raw()))
            .unwrap_or(true),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::SyntaxKind;
    use crate::SyntaxTree;

    /// Parses the source and asserts it has no diagnostics.
    fn parse(source: &str) -> SyntaxTree {
        let (tree, diagnostics) = SyntaxTree::parse(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:#?}");
        assert_eq!(tree.root().text().to_string(), source);
        tree
    }

    /// Counts the nodes of the given kind.
    fn count(tree: &SyntaxTree, kind: SyntaxKind) -> usize {
        tree.root().descendants().filter(|n| n.kind() == kind).count()
    }

    #[test]
    fn declarations() {
        let tree = parse(
            r#"using System;
using System.Linq;

namespace App.Core
{
    [Serializable]
    public sealed class Widget<T> : Base, IThing where T : class, new()
    {
        private const int Size = 4, Other = 5;
        private readonly List<T> items = new();
        public string Name { get; private set; } = "w";
        public int Count => items.Count;
        public T this[int i] { get { return items[i]; } }

        public Widget(string name) : base(name)
        {
            Name = name;
        }

        public static async Task<int> RunAsync<U>(U value, int count = 1) where U : struct
        {
            return await Task.FromResult(count);
        }

        public override string ToString() => Name;
    }

    internal record Point(int X, int Y);

    public enum Color { Red, Green = 2, Blue, }

    public interface IThing
    {
        void Run();
    }

    public struct Pair { public int A; }
}
"#,
        );

        assert_eq!(count(&tree, SyntaxKind::UsingDirectiveNode), 2);
        assert_eq!(count(&tree, SyntaxKind::ClassDeclarationNode), 1);
        assert_eq!(count(&tree, SyntaxKind::RecordDeclarationNode), 1);
        assert_eq!(count(&tree, SyntaxKind::EnumMemberNode), 3);
        assert_eq!(count(&tree, SyntaxKind::InterfaceDeclarationNode), 1);
        assert_eq!(count(&tree, SyntaxKind::StructDeclarationNode), 1);
        assert_eq!(count(&tree, SyntaxKind::FieldDeclarationNode), 3);
        assert_eq!(count(&tree, SyntaxKind::PropertyDeclarationNode), 3);
        assert_eq!(count(&tree, SyntaxKind::MethodDeclarationNode), 3);
        assert_eq!(count(&tree, SyntaxKind::ConstructorDeclarationNode), 1);
    }

    #[test]
    fn file_scoped_namespace() {
        let tree = parse("namespace App;\n\nclass A { }\nclass B { }\n");
        let namespace = tree
            .root()
            .children()
            .find(|n| n.kind() == SyntaxKind::NamespaceDeclarationNode)
            .expect("should have a namespace");
        assert_eq!(
            namespace
                .children()
                .filter(|n| n.kind() == SyntaxKind::ClassDeclarationNode)
                .count(),
            2
        );
    }

    #[test]
    fn statements() {
        let tree = parse(
            r#"class C
{
    void M(int[] values)
    {
        int a = 1, b = 2;
        const string s = "x";
        using var stream = Open();
        if (a > b) a = b; else if (a < b) { b = a; } else { }
        while (a < 10) a++;
        do { a--; } while (a > 0);
        for (var i = 0; i < values.Length; i++) { continue; }
        foreach (var value in values) { break; }
        try { Run(); } catch (Exception e) when (e != null) { throw; } finally { }
        using (var x = Open()) { }
        lock (this) { Run(); }
        switch (a) { case 1: break; default: break; }
        return;
        ;
        int Local(int x) => x * 2;
    }

    IEnumerable<int> Items()
    {
        yield return 1;
    }
}
"#,
        );

        assert_eq!(count(&tree, SyntaxKind::LocalDeclarationStatementNode), 3);
        assert_eq!(count(&tree, SyntaxKind::VariableDeclaratorNode), 6);
        assert_eq!(count(&tree, SyntaxKind::IfStatementNode), 2);
        assert_eq!(count(&tree, SyntaxKind::ElseClauseNode), 2);
        assert_eq!(count(&tree, SyntaxKind::WhileStatementNode), 1);
        assert_eq!(count(&tree, SyntaxKind::DoStatementNode), 1);
        assert_eq!(count(&tree, SyntaxKind::ForStatementNode), 1);
        assert_eq!(count(&tree, SyntaxKind::ForEachStatementNode), 1);
        assert_eq!(count(&tree, SyntaxKind::TryStatementNode), 1);
        assert_eq!(count(&tree, SyntaxKind::CatchClauseNode), 1);
        assert_eq!(count(&tree, SyntaxKind::FinallyClauseNode), 1);
        assert_eq!(count(&tree, SyntaxKind::UsingStatementNode), 1);
        assert_eq!(count(&tree, SyntaxKind::OtherStatementNode), 3);
        assert_eq!(count(&tree, SyntaxKind::EmptyStatementNode), 1);
        assert_eq!(count(&tree, SyntaxKind::MethodDeclarationNode), 3);
    }

    #[test]
    fn expressions() {
        let tree = parse(
            r#"class C
{
    void M()
    {
        var list = items
            .Where(x => x.Value > 1 && !x.Hidden)
            .Select((x, i) => new { x.Name, Index = i })
            .OrderBy<Item, int>(x => x.Index)
            .ToList();
        var dict = new Dictionary<string, int> { ["a"] = 1, { "b", 2 } };
        var array = new[] { 1, 2, 3 };
        var sized = new int[3];
        var widget = new Widget(1) { Name = "w", Inner = { Count = 2 } };
        var cast = (int)value + (long)-1;
        var text = value?.ToString() ?? throw new InvalidOperationException();
        var check = value is string s && value is not null ? s : default(string);
        Func<int, int> square = async x => { return await Compute(x); };
        total += values[0] * (a - b) / c % d;
        Call(out var result, ref total, name: "n", typeof(List<int>));
        flag = a < b || c >= d;
    }
}
"#,
        );

        assert_eq!(count(&tree, SyntaxKind::LambdaExprNode), 4);
        assert_eq!(count(&tree, SyntaxKind::AnonymousObjectCreationExprNode), 1);
        assert_eq!(count(&tree, SyntaxKind::ArrayCreationExprNode), 2);
        assert_eq!(count(&tree, SyntaxKind::ObjectCreationExprNode), 3);
        assert_eq!(count(&tree, SyntaxKind::CastExprNode), 2);
        assert_eq!(count(&tree, SyntaxKind::ConditionalExprNode), 1);
        assert_eq!(count(&tree, SyntaxKind::DefaultExprNode), 1);
        assert_eq!(count(&tree, SyntaxKind::GenericNameExprNode), 1);
        assert_eq!(count(&tree, SyntaxKind::TypeTestExprNode), 2);
        assert_eq!(count(&tree, SyntaxKind::ExpressionStatementNode), 3);
    }

    #[test]
    fn top_level_statements() {
        let tree = parse("var x = Compute();\nConsole.WriteLine(x);\n");
        assert_eq!(count(&tree, SyntaxKind::LocalDeclarationStatementNode), 1);
        assert_eq!(count(&tree, SyntaxKind::ExpressionStatementNode), 1);
    }

    #[test]
    fn recovery() {
        let source = "class C\n{\n    void M()\n    {\n        var x = ;\n        y = 1\n        z();\n    }\n    } }\n";
        let (tree, diagnostics) = crate::SyntaxTree::parse(source);
        assert_eq!(tree.root().text().to_string(), source);
        assert!(!diagnostics.is_empty());
        assert!(count(&tree, SyntaxKind::ErrorNode) > 0);
    }
}
