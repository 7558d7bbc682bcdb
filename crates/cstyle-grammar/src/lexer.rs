//! Module for the lexer implementation.

use logos::Logos;

use crate::Span;
use crate::tree::SyntaxKind;

/// Represents a set of tokens as a bitset.
///
/// `TokenSet` operates on the raw `u8` form of [`Token`] so that sets can be
/// built in const contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenSet(u128);

impl TokenSet {
    /// An empty token set.
    pub const EMPTY: Self = Self(0);

    /// Constructs a token set from a slice of tokens.
    pub const fn new(tokens: &[u8]) -> Self {
        let mut bits = 0u128;
        let mut i = 0;
        while i < tokens.len() {
            bits |= Self::mask(tokens[i]);
            i += 1;
        }
        Self(bits)
    }

    /// Unions two token sets together.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Checks if the token is contained in the set.
    pub const fn contains(&self, token: u8) -> bool {
        self.0 & Self::mask(token) != 0
    }

    /// Gets the count of tokens in the set.
    pub const fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Masks the given token to a `u128`.
    const fn mask(token: u8) -> u128 {
        1u128 << (token as usize)
    }
}

/// Represents a C# token.
///
/// Type names such as `int` or `string` and contextual keywords such as
/// `var`, `get` or `where` lex as identifiers; the parser decides their role
/// from context.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Token {
    /// Contiguous whitespace.
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// A line or block comment.
    #[regex(r"//[^\r\n]*", allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    /// A preprocessor directive (e.g. `#region`).
    #[regex(r"#[^\r\n]*", allow_greedy = true)]
    Directive,

    /// An integer literal.
    #[regex(r"[0-9][0-9_]*([uU][lL]?|[lL][uU]?)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+([uU][lL]?|[lL][uU]?)?")]
    #[regex(r"0[bB][01_]+([uU][lL]?|[lL][uU]?)?")]
    Integer,

    /// A real literal.
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdDmM]?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fFdDmM]?")]
    #[regex(r"[0-9][0-9_]*[fFdDmM]")]
    Real,

    /// A regular or interpolated string literal.
    #[regex(r#""([^"\\\r\n]|\\[^\r\n])*""#)]
    #[regex(r#"\$"([^"\\\r\n]|\\[^\r\n])*""#)]
    String,

    /// A verbatim string literal; these may span lines.
    #[regex(r#"@"([^"]|"")*""#)]
    #[regex(r#"(\$@|@\$)"([^"]|"")*""#)]
    VerbatimString,

    /// A character literal.
    #[regex(r"'([^'\\\r\n]|\\[^\r\n][^'\r\n]*)'")]
    Char,

    /// An identifier.
    #[regex(r"@?[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// The `abstract` keyword.
    #[token("abstract")]
    AbstractKeyword,
    /// The `as` keyword.
    #[token("as")]
    AsKeyword,
    /// The `async` keyword.
    #[token("async")]
    AsyncKeyword,
    /// The `await` keyword.
    #[token("await")]
    AwaitKeyword,
    /// The `base` keyword.
    #[token("base")]
    BaseKeyword,
    /// The `break` keyword.
    #[token("break")]
    BreakKeyword,
    /// The `catch` keyword.
    #[token("catch")]
    CatchKeyword,
    /// The `class` keyword.
    #[token("class")]
    ClassKeyword,
    /// The `const` keyword.
    #[token("const")]
    ConstKeyword,
    /// The `continue` keyword.
    #[token("continue")]
    ContinueKeyword,
    /// The `default` keyword.
    #[token("default")]
    DefaultKeyword,
    /// The `do` keyword.
    #[token("do")]
    DoKeyword,
    /// The `else` keyword.
    #[token("else")]
    ElseKeyword,
    /// The `enum` keyword.
    #[token("enum")]
    EnumKeyword,
    /// The `extern` keyword.
    #[token("extern")]
    ExternKeyword,
    /// The `false` keyword.
    #[token("false")]
    FalseKeyword,
    /// The `finally` keyword.
    #[token("finally")]
    FinallyKeyword,
    /// The `for` keyword.
    #[token("for")]
    ForKeyword,
    /// The `foreach` keyword.
    #[token("foreach")]
    ForeachKeyword,
    /// The `if` keyword.
    #[token("if")]
    IfKeyword,
    /// The `in` keyword.
    #[token("in")]
    InKeyword,
    /// The `interface` keyword.
    #[token("interface")]
    InterfaceKeyword,
    /// The `internal` keyword.
    #[token("internal")]
    InternalKeyword,
    /// The `is` keyword.
    #[token("is")]
    IsKeyword,
    /// The `namespace` keyword.
    #[token("namespace")]
    NamespaceKeyword,
    /// The `new` keyword.
    #[token("new")]
    NewKeyword,
    /// The `null` keyword.
    #[token("null")]
    NullKeyword,
    /// The `out` keyword.
    #[token("out")]
    OutKeyword,
    /// The `override` keyword.
    #[token("override")]
    OverrideKeyword,
    /// The `params` keyword.
    #[token("params")]
    ParamsKeyword,
    /// The `partial` keyword.
    #[token("partial")]
    PartialKeyword,
    /// The `private` keyword.
    #[token("private")]
    PrivateKeyword,
    /// The `protected` keyword.
    #[token("protected")]
    ProtectedKeyword,
    /// The `public` keyword.
    #[token("public")]
    PublicKeyword,
    /// The `readonly` keyword.
    #[token("readonly")]
    ReadonlyKeyword,
    /// The `record` keyword.
    #[token("record")]
    RecordKeyword,
    /// The `ref` keyword.
    #[token("ref")]
    RefKeyword,
    /// The `return` keyword.
    #[token("return")]
    ReturnKeyword,
    /// The `sealed` keyword.
    #[token("sealed")]
    SealedKeyword,
    /// The `static` keyword.
    #[token("static")]
    StaticKeyword,
    /// The `struct` keyword.
    #[token("struct")]
    StructKeyword,
    /// The `this` keyword.
    #[token("this")]
    ThisKeyword,
    /// The `throw` keyword.
    #[token("throw")]
    ThrowKeyword,
    /// The `true` keyword.
    #[token("true")]
    TrueKeyword,
    /// The `try` keyword.
    #[token("try")]
    TryKeyword,
    /// The `using` keyword.
    #[token("using")]
    UsingKeyword,
    /// The `virtual` keyword.
    #[token("virtual")]
    VirtualKeyword,
    /// The `while` keyword.
    #[token("while")]
    WhileKeyword,

    /// The `{` symbol.
    #[token("{")]
    OpenBrace,
    /// The `}` symbol.
    #[token("}")]
    CloseBrace,
    /// The `(` symbol.
    #[token("(")]
    OpenParen,
    /// The `)` symbol.
    #[token(")")]
    CloseParen,
    /// The `[` symbol.
    #[token("[")]
    OpenBracket,
    /// The `]` symbol.
    #[token("]")]
    CloseBracket,
    /// The `;` symbol.
    #[token(";")]
    Semicolon,
    /// The `,` symbol.
    #[token(",")]
    Comma,
    /// The `.` symbol.
    #[token(".")]
    Dot,
    /// The `?.` symbol.
    #[token("?.")]
    QuestionDot,
    /// The `:` symbol.
    #[token(":")]
    Colon,
    /// The `::` symbol.
    #[token("::")]
    ColonColon,
    /// The `?` symbol.
    #[token("?")]
    Question,
    /// The `??` symbol.
    #[token("??")]
    QuestionQuestion,
    /// The `=>` symbol.
    #[token("=>")]
    FatArrow,
    /// The `=` symbol.
    #[token("=")]
    Assignment,
    /// The `==` symbol.
    #[token("==")]
    Equal,
    /// The `!=` symbol.
    #[token("!=")]
    NotEqual,
    /// The `<` symbol.
    #[token("<")]
    Less,
    /// The `<=` symbol.
    #[token("<=")]
    LessEqual,
    /// The `>` symbol.
    ///
    /// Shift operators are not tokenized so that nested generic argument
    /// lists close correctly.
    #[token(">")]
    Greater,
    /// The `>=` symbol.
    #[token(">=")]
    GreaterEqual,
    /// The `+` symbol.
    #[token("+")]
    Plus,
    /// The `-` symbol.
    #[token("-")]
    Minus,
    /// The `*` symbol.
    #[token("*")]
    Asterisk,
    /// The `/` symbol.
    #[token("/")]
    Slash,
    /// The `%` symbol.
    #[token("%")]
    Percent,
    /// The `!` symbol.
    #[token("!")]
    Exclamation,
    /// The `~` symbol.
    #[token("~")]
    Tilde,
    /// The `&` symbol.
    #[token("&")]
    Ampersand,
    /// The `|` symbol.
    #[token("|")]
    Pipe,
    /// The `^` symbol.
    #[token("^")]
    Caret,
    /// The `&&` symbol.
    #[token("&&")]
    LogicalAnd,
    /// The `||` symbol.
    #[token("||")]
    LogicalOr,
    /// The `++` symbol.
    #[token("++")]
    PlusPlus,
    /// The `--` symbol.
    #[token("--")]
    MinusMinus,
    /// A compound assignment symbol (e.g. `+=`).
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("??=")]
    CompoundAssignment,

    // WARNING: this must always be the last variant.
    /// The exclusive maximum token value.
    MAX,
}

/// Asserts that Token can fit in a TokenSet.
const _: () = assert!(Token::MAX as u8 <= 128);

impl Token {
    /// Converts the token into its syntax representation.
    pub fn into_syntax(self) -> SyntaxKind {
        match self {
            Self::Whitespace => SyntaxKind::Whitespace,
            Self::Comment => SyntaxKind::Comment,
            Self::Directive => SyntaxKind::Directive,
            Self::Integer => SyntaxKind::Integer,
            Self::Real => SyntaxKind::Real,
            Self::String => SyntaxKind::String,
            Self::VerbatimString => SyntaxKind::VerbatimString,
            Self::Char => SyntaxKind::Char,
            Self::Ident => SyntaxKind::Ident,
            Self::AbstractKeyword => SyntaxKind::AbstractKeyword,
            Self::AsKeyword => SyntaxKind::AsKeyword,
            Self::AsyncKeyword => SyntaxKind::AsyncKeyword,
            Self::AwaitKeyword => SyntaxKind::AwaitKeyword,
            Self::BaseKeyword => SyntaxKind::BaseKeyword,
            Self::BreakKeyword => SyntaxKind::BreakKeyword,
            Self::CatchKeyword => SyntaxKind::CatchKeyword,
            Self::ClassKeyword => SyntaxKind::ClassKeyword,
            Self::ConstKeyword => SyntaxKind::ConstKeyword,
            Self::ContinueKeyword => SyntaxKind::ContinueKeyword,
            Self::DefaultKeyword => SyntaxKind::DefaultKeyword,
            Self::DoKeyword => SyntaxKind::DoKeyword,
            Self::ElseKeyword => SyntaxKind::ElseKeyword,
            Self::EnumKeyword => SyntaxKind::EnumKeyword,
            Self::ExternKeyword => SyntaxKind::ExternKeyword,
            Self::FalseKeyword => SyntaxKind::FalseKeyword,
            Self::FinallyKeyword => SyntaxKind::FinallyKeyword,
            Self::ForKeyword => SyntaxKind::ForKeyword,
            Self::ForeachKeyword => SyntaxKind::ForeachKeyword,
            Self::IfKeyword => SyntaxKind::IfKeyword,
            Self::InKeyword => SyntaxKind::InKeyword,
            Self::InterfaceKeyword => SyntaxKind::InterfaceKeyword,
            Self::InternalKeyword => SyntaxKind::InternalKeyword,
            Self::IsKeyword => SyntaxKind::IsKeyword,
            Self::NamespaceKeyword => SyntaxKind::NamespaceKeyword,
            Self::NewKeyword => SyntaxKind::NewKeyword,
            Self::NullKeyword => SyntaxKind::NullKeyword,
            Self::OutKeyword => SyntaxKind::OutKeyword,
            Self::OverrideKeyword => SyntaxKind::OverrideKeyword,
            Self::ParamsKeyword => SyntaxKind::ParamsKeyword,
            Self::PartialKeyword => SyntaxKind::PartialKeyword,
            Self::PrivateKeyword => SyntaxKind::PrivateKeyword,
            Self::ProtectedKeyword => SyntaxKind::ProtectedKeyword,
            Self::PublicKeyword => SyntaxKind::PublicKeyword,
            Self::ReadonlyKeyword => SyntaxKind::ReadonlyKeyword,
            Self::RecordKeyword => SyntaxKind::RecordKeyword,
            Self::RefKeyword => SyntaxKind::RefKeyword,
            Self::ReturnKeyword => SyntaxKind::ReturnKeyword,
            Self::SealedKeyword => SyntaxKind::SealedKeyword,
            Self::StaticKeyword => SyntaxKind::StaticKeyword,
            Self::StructKeyword => SyntaxKind::StructKeyword,
            Self::ThisKeyword => SyntaxKind::ThisKeyword,
            Self::ThrowKeyword => SyntaxKind::ThrowKeyword,
            Self::TrueKeyword => SyntaxKind::TrueKeyword,
            Self::TryKeyword => SyntaxKind::TryKeyword,
            Self::UsingKeyword => SyntaxKind::UsingKeyword,
            Self::VirtualKeyword => SyntaxKind::VirtualKeyword,
            Self::WhileKeyword => SyntaxKind::WhileKeyword,
            Self::OpenBrace => SyntaxKind::OpenBrace,
            Self::CloseBrace => SyntaxKind::CloseBrace,
            Self::OpenParen => SyntaxKind::OpenParen,
            Self::CloseParen => SyntaxKind::CloseParen,
            Self::OpenBracket => SyntaxKind::OpenBracket,
            Self::CloseBracket => SyntaxKind::CloseBracket,
            Self::Semicolon => SyntaxKind::Semicolon,
            Self::Comma => SyntaxKind::Comma,
            Self::Dot => SyntaxKind::Dot,
            Self::QuestionDot => SyntaxKind::QuestionDot,
            Self::Colon => SyntaxKind::Colon,
            Self::ColonColon => SyntaxKind::ColonColon,
            Self::Question => SyntaxKind::Question,
            Self::QuestionQuestion => SyntaxKind::QuestionQuestion,
            Self::FatArrow => SyntaxKind::FatArrow,
            Self::Assignment => SyntaxKind::Assignment,
            Self::Equal => SyntaxKind::Equal,
            Self::NotEqual => SyntaxKind::NotEqual,
            Self::Less => SyntaxKind::Less,
            Self::LessEqual => SyntaxKind::LessEqual,
            Self::Greater => SyntaxKind::Greater,
            Self::GreaterEqual => SyntaxKind::GreaterEqual,
            Self::Plus => SyntaxKind::Plus,
            Self::Minus => SyntaxKind::Minus,
            Self::Asterisk => SyntaxKind::Asterisk,
            Self::Slash => SyntaxKind::Slash,
            Self::Percent => SyntaxKind::Percent,
            Self::Exclamation => SyntaxKind::Exclamation,
            Self::Tilde => SyntaxKind::Tilde,
            Self::Ampersand => SyntaxKind::Ampersand,
            Self::Pipe => SyntaxKind::Pipe,
            Self::Caret => SyntaxKind::Caret,
            Self::LogicalAnd => SyntaxKind::LogicalAnd,
            Self::LogicalOr => SyntaxKind::LogicalOr,
            Self::PlusPlus => SyntaxKind::PlusPlus,
            Self::MinusMinus => SyntaxKind::MinusMinus,
            Self::CompoundAssignment => SyntaxKind::CompoundAssignment,
            Self::MAX => unreachable!(),
        }
    }

    /// Converts the token into its raw representation.
    pub const fn into_raw(self) -> u8 {
        self as u8
    }

    /// Describes the token for use in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Directive => "preprocessor directive",
            Self::Integer => "integer",
            Self::Real => "real number",
            Self::String | Self::VerbatimString => "string",
            Self::Char => "character",
            Self::Ident => "identifier",
            Self::OpenBrace => "`{`",
            Self::CloseBrace => "`}`",
            Self::OpenParen => "`(`",
            Self::CloseParen => "`)`",
            Self::OpenBracket => "`[`",
            Self::CloseBracket => "`]`",
            Self::Semicolon => "`;`",
            Self::Comma => "`,`",
            Self::Dot => "`.`",
            Self::QuestionDot => "`?.`",
            Self::Colon => "`:`",
            Self::ColonColon => "`::`",
            Self::Question => "`?`",
            Self::QuestionQuestion => "`??`",
            Self::FatArrow => "`=>`",
            Self::Assignment => "`=`",
            Self::Equal => "`==`",
            Self::NotEqual => "`!=`",
            Self::Less => "`<`",
            Self::LessEqual => "`<=`",
            Self::Greater => "`>`",
            Self::GreaterEqual => "`>=`",
            Self::Plus => "`+`",
            Self::Minus => "`-`",
            Self::Asterisk => "`*`",
            Self::Slash => "`/`",
            Self::Percent => "`%`",
            Self::Exclamation => "`!`",
            Self::Tilde => "`~`",
            Self::Ampersand => "`&`",
            Self::Pipe => "`|`",
            Self::Caret => "`^`",
            Self::LogicalAnd => "`&&`",
            Self::LogicalOr => "`||`",
            Self::PlusPlus => "`++`",
            Self::MinusMinus => "`--`",
            Self::CompoundAssignment => "compound assignment",
            Self::MAX => unreachable!(),
            _ => self.into_syntax().describe(),
        }
    }

    /// Determines if the token is trivia that should be skipped over by the
    /// parser.
    ///
    /// Trivia tokens are still added to the concrete syntax tree.
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment | Self::Directive)
    }
}

/// The result type for the lexer.
pub type LexerResult<T> = Result<T, ()>;

/// Implements a C# lexer.
///
/// A lexer produces a stream of tokens and their spans from a source string.
#[allow(missing_debug_implementations)]
#[derive(Clone)]
pub struct Lexer<'a> {
    /// The underlying logos lexer.
    lexer: logos::Lexer<'a, Token>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source string.
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Token::lexer(source),
        }
    }

    /// Gets the source string being lexed.
    pub fn source(&self) -> &'a str {
        self.lexer.source()
    }
}

impl Iterator for Lexer<'_> {
    type Item = (LexerResult<Token>, Span);

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.lexer.next()?;
        Some((result, self.lexer.span().into()))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lex(source: &str) -> Vec<(LexerResult<Token>, std::ops::Range<usize>)> {
        Lexer::new(source)
            .map(|(t, s)| (t, s.start()..s.end()))
            .collect()
    }

    #[test]
    fn whitespace() {
        assert_eq!(
            lex(" \t\r\n"),
            &[(Ok(Token::Whitespace), 0..4)],
            "produced tokens did not match the expected set"
        );
    }

    #[test]
    fn comments() {
        use Token::*;
        assert_eq!(
            lex("// line\n/* block\n * comment */ #region x"),
            &[
                (Ok(Comment), 0..7),
                (Ok(Whitespace), 7..8),
                (Ok(Comment), 8..30),
                (Ok(Whitespace), 30..31),
                (Ok(Directive), 31..40),
            ],
            "produced tokens did not match the expected set"
        );
    }

    #[test]
    fn literals() {
        use Token::*;
        assert_eq!(
            lex(r#"0 42L 0xFF 1.5 2e10 3f "a\"b" $"{x}" @"c""d" 'e' '\n'"#),
            &[
                (Ok(Integer), 0..1),
                (Ok(Whitespace), 1..2),
                (Ok(Integer), 2..5),
                (Ok(Whitespace), 5..6),
                (Ok(Integer), 6..10),
                (Ok(Whitespace), 10..11),
                (Ok(Real), 11..14),
                (Ok(Whitespace), 14..15),
                (Ok(Real), 15..19),
                (Ok(Whitespace), 19..20),
                (Ok(Real), 20..22),
                (Ok(Whitespace), 22..23),
                (Ok(String), 23..29),
                (Ok(Whitespace), 29..30),
                (Ok(String), 30..36),
                (Ok(Whitespace), 36..37),
                (Ok(VerbatimString), 37..44),
                (Ok(Whitespace), 44..45),
                (Ok(Char), 45..48),
                (Ok(Whitespace), 48..49),
                (Ok(Char), 49..53),
            ],
            "produced tokens did not match the expected set"
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        use Token::*;
        assert_eq!(
            lex("var x = new Foo(); @class"),
            &[
                (Ok(Ident), 0..3),
                (Ok(Whitespace), 3..4),
                (Ok(Ident), 4..5),
                (Ok(Whitespace), 5..6),
                (Ok(Assignment), 6..7),
                (Ok(Whitespace), 7..8),
                (Ok(NewKeyword), 8..11),
                (Ok(Whitespace), 11..12),
                (Ok(Ident), 12..15),
                (Ok(OpenParen), 15..16),
                (Ok(CloseParen), 16..17),
                (Ok(Semicolon), 17..18),
                (Ok(Whitespace), 18..19),
                (Ok(Ident), 19..25),
            ],
            "produced tokens did not match the expected set"
        );
    }

    #[test]
    fn symbols() {
        use Token::*;
        assert_eq!(
            lex("a?.b ?? c => d >= e && f || !g += 1 ??= h"),
            &[
                (Ok(Ident), 0..1),
                (Ok(QuestionDot), 1..3),
                (Ok(Ident), 3..4),
                (Ok(Whitespace), 4..5),
                (Ok(QuestionQuestion), 5..7),
                (Ok(Whitespace), 7..8),
                (Ok(Ident), 8..9),
                (Ok(Whitespace), 9..10),
                (Ok(FatArrow), 10..12),
                (Ok(Whitespace), 12..13),
                (Ok(Ident), 13..14),
                (Ok(Whitespace), 14..15),
                (Ok(GreaterEqual), 15..17),
                (Ok(Whitespace), 17..18),
                (Ok(Ident), 18..19),
                (Ok(Whitespace), 19..20),
                (Ok(LogicalAnd), 20..22),
                (Ok(Whitespace), 22..23),
                (Ok(Ident), 23..24),
                (Ok(Whitespace), 24..25),
                (Ok(LogicalOr), 25..27),
                (Ok(Whitespace), 27..28),
                (Ok(Exclamation), 28..29),
                (Ok(Ident), 29..30),
                (Ok(Whitespace), 30..31),
                (Ok(CompoundAssignment), 31..33),
                (Ok(Whitespace), 33..34),
                (Ok(Integer), 34..35),
                (Ok(Whitespace), 35..36),
                (Ok(CompoundAssignment), 36..39),
                (Ok(Whitespace), 39..40),
                (Ok(Ident), 40..41),
            ],
            "produced tokens did not match the expected set"
        );
    }

    #[test]
    fn unknown() {
        assert_eq!(
            lex("a ` b"),
            &[
                (Ok(Token::Ident), 0..1),
                (Ok(Token::Whitespace), 1..2),
                (Err(()), 2..3),
                (Ok(Token::Whitespace), 3..4),
                (Ok(Token::Ident), 4..5),
            ],
            "produced tokens did not match the expected set"
        );
    }
}
