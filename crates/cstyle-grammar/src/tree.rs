//! Module for the concrete syntax tree (CST) representation.

use std::borrow::Cow;
use std::fmt;

use rowan::GreenNodeBuilder;
use rowan::GreenNodeData;

use crate::Diagnostic;
use crate::grammar;
use crate::parser::Event;
use crate::parser::Parser;

/// Represents the kind of syntax element (node or token) in a C# concrete
/// syntax tree (CST).
///
/// Nodes have at least one token child and represent a syntactic construct.
///
/// Tokens are terminal and represent any span of the source.
///
/// This enumeration is a union of all supported C# tokens and nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    /// The token is unknown to the lexer.
    Unknown,
    /// A whitespace token.
    Whitespace,
    /// A comment token.
    Comment,
    /// A preprocessor directive token.
    Directive,
    /// A literal integer token.
    Integer,
    /// A literal real token.
    Real,
    /// A string token.
    String,
    /// A verbatim string token.
    VerbatimString,
    /// A character token.
    Char,
    /// An identifier token.
    Ident,
    /// The `abstract` keyword token.
    AbstractKeyword,
    /// The `as` keyword token.
    AsKeyword,
    /// The `async` keyword token.
    AsyncKeyword,
    /// The `await` keyword token.
    AwaitKeyword,
    /// The `base` keyword token.
    BaseKeyword,
    /// The `break` keyword token.
    BreakKeyword,
    /// The `catch` keyword token.
    CatchKeyword,
    /// The `class` keyword token.
    ClassKeyword,
    /// The `const` keyword token.
    ConstKeyword,
    /// The `continue` keyword token.
    ContinueKeyword,
    /// The `default` keyword token.
    DefaultKeyword,
    /// The `do` keyword token.
    DoKeyword,
    /// The `else` keyword token.
    ElseKeyword,
    /// The `enum` keyword token.
    EnumKeyword,
    /// The `extern` keyword token.
    ExternKeyword,
    /// The `false` keyword token.
    FalseKeyword,
    /// The `finally` keyword token.
    FinallyKeyword,
    /// The `for` keyword token.
    ForKeyword,
    /// The `foreach` keyword token.
    ForeachKeyword,
    /// The `if` keyword token.
    IfKeyword,
    /// The `in` keyword token.
    InKeyword,
    /// The `interface` keyword token.
    InterfaceKeyword,
    /// The `internal` keyword token.
    InternalKeyword,
    /// The `is` keyword token.
    IsKeyword,
    /// The `namespace` keyword token.
    NamespaceKeyword,
    /// The `new` keyword token.
    NewKeyword,
    /// The `null` keyword token.
    NullKeyword,
    /// The `out` keyword token.
    OutKeyword,
    /// The `override` keyword token.
    OverrideKeyword,
    /// The `params` keyword token.
    ParamsKeyword,
    /// The `partial` keyword token.
    PartialKeyword,
    /// The `private` keyword token.
    PrivateKeyword,
    /// The `protected` keyword token.
    ProtectedKeyword,
    /// The `public` keyword token.
    PublicKeyword,
    /// The `readonly` keyword token.
    ReadonlyKeyword,
    /// The `record` keyword token.
    RecordKeyword,
    /// The `ref` keyword token.
    RefKeyword,
    /// The `return` keyword token.
    ReturnKeyword,
    /// The `sealed` keyword token.
    SealedKeyword,
    /// The `static` keyword token.
    StaticKeyword,
    /// The `struct` keyword token.
    StructKeyword,
    /// The `this` keyword token.
    ThisKeyword,
    /// The `throw` keyword token.
    ThrowKeyword,
    /// The `true` keyword token.
    TrueKeyword,
    /// The `try` keyword token.
    TryKeyword,
    /// The `using` keyword token.
    UsingKeyword,
    /// The `virtual` keyword token.
    VirtualKeyword,
    /// The `while` keyword token.
    WhileKeyword,
    /// The `{` symbol token.
    OpenBrace,
    /// The `}` symbol token.
    CloseBrace,
    /// The `(` symbol token.
    OpenParen,
    /// The `)` symbol token.
    CloseParen,
    /// The `[` symbol token.
    OpenBracket,
    /// The `]` symbol token.
    CloseBracket,
    /// The `;` symbol token.
    Semicolon,
    /// The `,` symbol token.
    Comma,
    /// The `.` symbol token.
    Dot,
    /// The `?.` symbol token.
    QuestionDot,
    /// The `:` symbol token.
    Colon,
    /// The `::` symbol token.
    ColonColon,
    /// The `?` symbol token.
    Question,
    /// The `??` symbol token.
    QuestionQuestion,
    /// The `=>` symbol token.
    FatArrow,
    /// The `=` symbol token.
    Assignment,
    /// The `==` symbol token.
    Equal,
    /// The `!=` symbol token.
    NotEqual,
    /// The `<` symbol token.
    Less,
    /// The `<=` symbol token.
    LessEqual,
    /// The `>` symbol token.
    Greater,
    /// The `>=` symbol token.
    GreaterEqual,
    /// The `+` symbol token.
    Plus,
    /// The `-` symbol token.
    Minus,
    /// The `*` symbol token.
    Asterisk,
    /// The `/` symbol token.
    Slash,
    /// The `%` symbol token.
    Percent,
    /// The `!` symbol token.
    Exclamation,
    /// The `~` symbol token.
    Tilde,
    /// The `&` symbol token.
    Ampersand,
    /// The `|` symbol token.
    Pipe,
    /// The `^` symbol token.
    Caret,
    /// The `&&` symbol token.
    LogicalAnd,
    /// The `||` symbol token.
    LogicalOr,
    /// The `++` symbol token.
    PlusPlus,
    /// The `--` symbol token.
    MinusMinus,
    /// A compound assignment symbol token.
    CompoundAssignment,

    /// Abandoned nodes are nodes that encountered errors.
    ///
    /// Children of abandoned nodes are re-parented to the parent of
    /// the abandoned node.
    ///
    /// As this is an internal implementation of error recovery,
    /// hide this variant from the documentation.
    #[doc(hidden)]
    Abandoned,
    /// Represents the C# compilation unit (i.e. the root node).
    CompilationUnitNode,
    /// Represents a node of source skipped during error recovery.
    ErrorNode,
    /// Represents a `using` directive node.
    UsingDirectiveNode,
    /// Represents a namespace declaration node.
    NamespaceDeclarationNode,
    /// Represents an attribute list node.
    AttributeListNode,
    /// Represents a class declaration node.
    ClassDeclarationNode,
    /// Represents a struct declaration node.
    StructDeclarationNode,
    /// Represents an interface declaration node.
    InterfaceDeclarationNode,
    /// Represents a record declaration node.
    RecordDeclarationNode,
    /// Represents an enum declaration node.
    EnumDeclarationNode,
    /// Represents an enum member node.
    EnumMemberNode,
    /// Represents a base type list node.
    BaseListNode,
    /// Represents a type parameter list node.
    TypeParameterListNode,
    /// Represents a generic constraint clause node.
    ConstraintClauseNode,
    /// Represents a field declaration node.
    FieldDeclarationNode,
    /// Represents a property declaration node.
    PropertyDeclarationNode,
    /// Represents a property accessor list node.
    AccessorListNode,
    /// Represents a property accessor node.
    AccessorNode,
    /// Represents a method declaration node.
    MethodDeclarationNode,
    /// Represents a constructor declaration node.
    ConstructorDeclarationNode,
    /// Represents a constructor initializer node (e.g. `: base(x)`).
    ConstructorInitializerNode,
    /// Represents a parameter list node.
    ParameterListNode,
    /// Represents a parameter node.
    ParameterNode,
    /// Represents an expression body node (e.g. `=> x`).
    ExpressionBodyNode,
    /// Represents a type node.
    TypeNode,
    /// Represents a type argument list node.
    TypeArgumentListNode,
    /// Represents a block node.
    BlockNode,
    /// Represents a local declaration statement node.
    LocalDeclarationStatementNode,
    /// Represents a variable declaration node.
    VariableDeclarationNode,
    /// Represents a variable declarator node.
    VariableDeclaratorNode,
    /// Represents an equals value clause node (e.g. `= 1`).
    EqualsValueClauseNode,
    /// Represents an `if` statement node.
    IfStatementNode,
    /// Represents an `else` clause node.
    ElseClauseNode,
    /// Represents an expression statement node.
    ExpressionStatementNode,
    /// Represents a `return` statement node.
    ReturnStatementNode,
    /// Represents a `throw` statement node.
    ThrowStatementNode,
    /// Represents a `while` statement node.
    WhileStatementNode,
    /// Represents a `do` statement node.
    DoStatementNode,
    /// Represents a `for` statement node.
    ForStatementNode,
    /// Represents a `foreach` statement node.
    ForEachStatementNode,
    /// Represents a `break` statement node.
    BreakStatementNode,
    /// Represents a `continue` statement node.
    ContinueStatementNode,
    /// Represents a `try` statement node.
    TryStatementNode,
    /// Represents a `catch` clause node.
    CatchClauseNode,
    /// Represents a `finally` clause node.
    FinallyClauseNode,
    /// Represents a `using` statement node.
    UsingStatementNode,
    /// Represents an empty statement node.
    EmptyStatementNode,
    /// Represents a statement the grammar does not model in detail (e.g.
    /// `switch`, `lock`, or `yield return`).
    OtherStatementNode,
    /// Represents a literal expression node.
    LiteralExprNode,
    /// Represents a name reference expression node.
    NameExprNode,
    /// Represents a generic name expression node (e.g. `Cast<int>`).
    GenericNameExprNode,
    /// Represents a `this` or `base` expression node.
    ThisExprNode,
    /// Represents a parenthesized expression node.
    ParenthesizedExprNode,
    /// Represents a member access expression node.
    MemberAccessExprNode,
    /// Represents an invocation expression node.
    InvocationExprNode,
    /// Represents an element access expression node.
    ElementAccessExprNode,
    /// Represents an argument list node.
    ArgumentListNode,
    /// Represents a bracketed argument list node.
    BracketedArgumentListNode,
    /// Represents an argument node.
    ArgumentNode,
    /// Represents an object creation expression node.
    ObjectCreationExprNode,
    /// Represents an anonymous object creation expression node.
    AnonymousObjectCreationExprNode,
    /// Represents an array creation expression node.
    ArrayCreationExprNode,
    /// Represents an initializer expression node (e.g. `{ A = 1 }`).
    InitializerExprNode,
    /// Represents a lambda expression node.
    LambdaExprNode,
    /// Represents a cast expression node.
    CastExprNode,
    /// Represents a prefix unary expression node.
    PrefixExprNode,
    /// Represents a postfix unary expression node.
    PostfixExprNode,
    /// Represents an `await` expression node.
    AwaitExprNode,
    /// Represents a binary expression node.
    BinaryExprNode,
    /// Represents a type test or conversion expression node (`is`/`as`).
    TypeTestExprNode,
    /// Represents a conditional (ternary) expression node.
    ConditionalExprNode,
    /// Represents an assignment expression node.
    AssignmentExprNode,
    /// Represents a `default` expression node.
    DefaultExprNode,
    /// Represents a `switch` expression node; its arms are not modeled.
    SwitchExprNode,
    /// Represents a `with` expression node.
    WithExprNode,

    // WARNING: this must always be the last variant.
    /// The exclusive maximum syntax kind value.
    MAX,
}

impl SyntaxKind {
    /// Returns whether the token is a symbolic [`SyntaxKind`].
    ///
    /// Generally speaking, symbolic [`SyntaxKind`]s have special meanings
    /// during parsing. They are not real elements of the grammar but rather an
    /// implementation detail.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Abandoned | Self::MAX)
    }

    /// Determines if the kind is trivia.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment | Self::Directive)
    }

    /// Determines if the kind is a type declaration node.
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self,
            Self::ClassDeclarationNode
                | Self::StructDeclarationNode
                | Self::InterfaceDeclarationNode
                | Self::RecordDeclarationNode
        )
    }

    /// Determines if the kind is an expression node.
    pub fn is_expression(&self) -> bool {
        (*self as u16) >= (Self::LiteralExprNode as u16)
            && (*self as u16) <= (Self::WithExprNode as u16)
            && !matches!(
                self,
                Self::ArgumentListNode | Self::BracketedArgumentListNode | Self::ArgumentNode
            )
    }

    /// Determines if the kind is an opening bracket, parenthesis, or brace.
    pub fn is_open_delimiter(&self) -> bool {
        matches!(self, Self::OpenParen | Self::OpenBracket | Self::OpenBrace)
    }

    /// Determines if the kind is a closing bracket, parenthesis, or brace.
    pub fn is_close_delimiter(&self) -> bool {
        matches!(
            self,
            Self::CloseParen | Self::CloseBracket | Self::CloseBrace
        )
    }

    /// Describes the syntax kind.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Directive => "preprocessor directive",
            Self::Integer => "integer",
            Self::Real => "real number",
            Self::String | Self::VerbatimString => "string",
            Self::Char => "character",
            Self::Ident => "identifier",
            Self::AbstractKeyword => "`abstract` keyword",
            Self::AsKeyword => "`as` keyword",
            Self::AsyncKeyword => "`async` keyword",
            Self::AwaitKeyword => "`await` keyword",
            Self::BaseKeyword => "`base` keyword",
            Self::BreakKeyword => "`break` keyword",
            Self::CatchKeyword => "`catch` keyword",
            Self::ClassKeyword => "`class` keyword",
            Self::ConstKeyword => "`const` keyword",
            Self::ContinueKeyword => "`continue` keyword",
            Self::DefaultKeyword => "`default` keyword",
            Self::DoKeyword => "`do` keyword",
            Self::ElseKeyword => "`else` keyword",
            Self::EnumKeyword => "`enum` keyword",
            Self::ExternKeyword => "`extern` keyword",
            Self::FalseKeyword => "`false` keyword",
            Self::FinallyKeyword => "`finally` keyword",
            Self::ForKeyword => "`for` keyword",
            Self::ForeachKeyword => "`foreach` keyword",
            Self::IfKeyword => "`if` keyword",
            Self::InKeyword => "`in` keyword",
            Self::InterfaceKeyword => "`interface` keyword",
            Self::InternalKeyword => "`internal` keyword",
            Self::IsKeyword => "`is` keyword",
            Self::NamespaceKeyword => "`namespace` keyword",
            Self::NewKeyword => "`new` keyword",
            Self::NullKeyword => "`null` keyword",
            Self::OutKeyword => "`out` keyword",
            Self::OverrideKeyword => "`override` keyword",
            Self::ParamsKeyword => "`params` keyword",
            Self::PartialKeyword => "`partial` keyword",
            Self::PrivateKeyword => "`private` keyword",
            Self::ProtectedKeyword => "`protected` keyword",
            Self::PublicKeyword => "`public` keyword",
            Self::ReadonlyKeyword => "`readonly` keyword",
            Self::RecordKeyword => "`record` keyword",
            Self::RefKeyword => "`ref` keyword",
            Self::ReturnKeyword => "`return` keyword",
            Self::SealedKeyword => "`sealed` keyword",
            Self::StaticKeyword => "`static` keyword",
            Self::StructKeyword => "`struct` keyword",
            Self::ThisKeyword => "`this` keyword",
            Self::ThrowKeyword => "`throw` keyword",
            Self::TrueKeyword => "`true` keyword",
            Self::TryKeyword => "`try` keyword",
            Self::UsingKeyword => "`using` keyword",
            Self::VirtualKeyword => "`virtual` keyword",
            Self::WhileKeyword => "`while` keyword",
            Self::OpenBrace => "`{` symbol",
            Self::CloseBrace => "`}` symbol",
            Self::OpenParen => "`(` symbol",
            Self::CloseParen => "`)` symbol",
            Self::OpenBracket => "`[` symbol",
            Self::CloseBracket => "`]` symbol",
            Self::Semicolon => "`;` symbol",
            Self::Comma => "`,` symbol",
            Self::Dot => "`.` symbol",
            Self::QuestionDot => "`?.` symbol",
            Self::Colon => "`:` symbol",
            Self::ColonColon => "`::` symbol",
            Self::Question => "`?` symbol",
            Self::QuestionQuestion => "`??` symbol",
            Self::FatArrow => "`=>` symbol",
            Self::Assignment => "`=` symbol",
            Self::Equal => "`==` symbol",
            Self::NotEqual => "`!=` symbol",
            Self::Less => "`<` symbol",
            Self::LessEqual => "`<=` symbol",
            Self::Greater => "`>` symbol",
            Self::GreaterEqual => "`>=` symbol",
            Self::Plus => "`+` symbol",
            Self::Minus => "`-` symbol",
            Self::Asterisk => "`*` symbol",
            Self::Slash => "`/` symbol",
            Self::Percent => "`%` symbol",
            Self::Exclamation => "`!` symbol",
            Self::Tilde => "`~` symbol",
            Self::Ampersand => "`&` symbol",
            Self::Pipe => "`|` symbol",
            Self::Caret => "`^` symbol",
            Self::LogicalAnd => "`&&` symbol",
            Self::LogicalOr => "`||` symbol",
            Self::PlusPlus => "`++` symbol",
            Self::MinusMinus => "`--` symbol",
            Self::CompoundAssignment => "compound assignment symbol",
            Self::CompilationUnitNode => "compilation unit",
            Self::ErrorNode => "error",
            Self::UsingDirectiveNode => "using directive",
            Self::NamespaceDeclarationNode => "namespace declaration",
            Self::AttributeListNode => "attribute list",
            Self::ClassDeclarationNode => "class declaration",
            Self::StructDeclarationNode => "struct declaration",
            Self::InterfaceDeclarationNode => "interface declaration",
            Self::RecordDeclarationNode => "record declaration",
            Self::EnumDeclarationNode => "enum declaration",
            Self::EnumMemberNode => "enum member",
            Self::BaseListNode => "base list",
            Self::TypeParameterListNode => "type parameter list",
            Self::ConstraintClauseNode => "constraint clause",
            Self::FieldDeclarationNode => "field declaration",
            Self::PropertyDeclarationNode => "property declaration",
            Self::AccessorListNode => "accessor list",
            Self::AccessorNode => "accessor",
            Self::MethodDeclarationNode => "method declaration",
            Self::ConstructorDeclarationNode => "constructor declaration",
            Self::ConstructorInitializerNode => "constructor initializer",
            Self::ParameterListNode => "parameter list",
            Self::ParameterNode => "parameter",
            Self::ExpressionBodyNode => "expression body",
            Self::TypeNode => "type",
            Self::TypeArgumentListNode => "type argument list",
            Self::BlockNode => "block",
            Self::LocalDeclarationStatementNode => "local declaration statement",
            Self::VariableDeclarationNode => "variable declaration",
            Self::VariableDeclaratorNode => "variable declarator",
            Self::EqualsValueClauseNode => "initializer",
            Self::IfStatementNode => "`if` statement",
            Self::ElseClauseNode => "`else` clause",
            Self::ExpressionStatementNode => "expression statement",
            Self::ReturnStatementNode => "`return` statement",
            Self::ThrowStatementNode => "`throw` statement",
            Self::WhileStatementNode => "`while` statement",
            Self::DoStatementNode => "`do` statement",
            Self::ForStatementNode => "`for` statement",
            Self::ForEachStatementNode => "`foreach` statement",
            Self::BreakStatementNode => "`break` statement",
            Self::ContinueStatementNode => "`continue` statement",
            Self::TryStatementNode => "`try` statement",
            Self::CatchClauseNode => "`catch` clause",
            Self::FinallyClauseNode => "`finally` clause",
            Self::UsingStatementNode => "`using` statement",
            Self::EmptyStatementNode => "empty statement",
            Self::OtherStatementNode => "statement",
            Self::LiteralExprNode => "literal expression",
            Self::NameExprNode => "name expression",
            Self::GenericNameExprNode => "generic name expression",
            Self::ThisExprNode => "`this` expression",
            Self::ParenthesizedExprNode => "parenthesized expression",
            Self::MemberAccessExprNode => "member access expression",
            Self::InvocationExprNode => "invocation expression",
            Self::ElementAccessExprNode => "element access expression",
            Self::ArgumentListNode => "argument list",
            Self::BracketedArgumentListNode => "bracketed argument list",
            Self::ArgumentNode => "argument",
            Self::ObjectCreationExprNode => "object creation expression",
            Self::AnonymousObjectCreationExprNode => "anonymous object creation expression",
            Self::ArrayCreationExprNode => "array creation expression",
            Self::InitializerExprNode => "initializer expression",
            Self::LambdaExprNode => "lambda expression",
            Self::CastExprNode => "cast expression",
            Self::PrefixExprNode => "prefix expression",
            Self::PostfixExprNode => "postfix expression",
            Self::AwaitExprNode => "`await` expression",
            Self::BinaryExprNode => "binary expression",
            Self::TypeTestExprNode => "type test expression",
            Self::ConditionalExprNode => "conditional expression",
            Self::AssignmentExprNode => "assignment expression",
            Self::DefaultExprNode => "`default` expression",
            Self::SwitchExprNode => "`switch` expression",
            Self::WithExprNode => "`with` expression",
            Self::Abandoned | Self::MAX => unreachable!(),
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

/// Represents the C# language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CSharpLanguage;

impl rowan::Language for CSharpLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::MAX as u16);
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Represents a node in the concrete syntax tree.
pub type SyntaxNode = rowan::SyntaxNode<CSharpLanguage>;
/// Represents a token in the concrete syntax tree.
pub type SyntaxToken = rowan::SyntaxToken<CSharpLanguage>;
/// Represents an element (node or token) in the concrete syntax tree.
pub type SyntaxElement = rowan::SyntaxElement<CSharpLanguage>;
/// Represents node children in the concrete syntax tree.
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<CSharpLanguage>;

/// Represents an untyped concrete syntax tree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxTree(SyntaxNode);

impl SyntaxTree {
    /// Parses C# source to produce a syntax tree.
    ///
    /// A syntax tree is always returned, even for invalid source; the tree
    /// is lossless, so its text always equals the input.
    ///
    /// Additionally, the list of diagnostics encountered during the parse is
    /// returned; if the list is empty, the tree is syntactically correct.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use cstyle_grammar::SyntaxTree;
    /// let (tree, diagnostics) = SyntaxTree::parse("class C { }");
    /// assert!(diagnostics.is_empty());
    /// assert_eq!(tree.root().text().to_string(), "class C { }");
    /// ```
    pub fn parse(source: &str) -> (Self, Vec<Diagnostic>) {
        let parser = Parser::new(source);
        let (events, mut diagnostics) = grammar::compilation_unit(parser);
        diagnostics.sort();

        Self::build(source, events, diagnostics)
    }

    /// Builds the concrete syntax tree from a list of parser events.
    fn build(
        source: &str,
        mut events: Vec<Event>,
        diagnostics: Vec<Diagnostic>,
    ) -> (Self, Vec<Diagnostic>) {
        let mut builder = GreenNodeBuilder::default();
        let mut ancestors = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::abandoned()) {
                Event::NodeStarted {
                    kind,
                    forward_parent,
                } => {
                    // Collect the forward parent chain so the outermost node
                    // starts first
                    ancestors.push(kind);
                    let mut idx = i;
                    let mut fp: Option<usize> = forward_parent;
                    while let Some(distance) = fp {
                        idx += distance;
                        fp = match std::mem::replace(&mut events[idx], Event::abandoned()) {
                            Event::NodeStarted {
                                kind,
                                forward_parent,
                            } => {
                                ancestors.push(kind);
                                forward_parent
                            }
                            _ => unreachable!(),
                        };
                    }

                    for kind in ancestors.drain(..).rev() {
                        if kind != SyntaxKind::Abandoned {
                            builder.start_node(kind.into());
                        }
                    }
                }
                Event::NodeFinished => builder.finish_node(),
                Event::Token { kind, span } => {
                    builder.token(kind.into(), &source[span.start()..span.end()])
                }
            }
        }

        (Self(SyntaxNode::new_root(builder.finish())), diagnostics)
    }

    /// Gets the root syntax node of the tree.
    pub fn root(&self) -> &SyntaxNode {
        &self.0
    }

    /// Gets a copy of the underlying root green node for the tree.
    pub fn green(&self) -> Cow<'_, GreenNodeData> {
        self.0.green()
    }

    /// Converts the tree into a syntax node.
    pub fn into_syntax(self) -> SyntaxNode {
        self.0
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Renders the node kinds of a tree as an indented outline.
    fn outline(node: &SyntaxNode) -> String {
        let mut out = String::new();
        for event in node.preorder() {
            if let rowan::WalkEvent::Enter(n) = event {
                let depth = n.ancestors().count() - 1;
                out.push_str(&"  ".repeat(depth));
                out.push_str(&format!("{:?}\n", n.kind()));
            }
        }
        out
    }

    #[test]
    fn lossless() {
        let source = "namespace N\n{\n    // comment\n    class C\n    {\n        void M() { \
                      var x = a\n            .B(); }\n    }\n}\n";
        let (tree, diagnostics) = SyntaxTree::parse(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(tree.root().text().to_string(), source);
    }

    #[test]
    fn lossless_with_errors() {
        let source = "class C { void M() { var = ; x } ` }";
        let (tree, diagnostics) = SyntaxTree::parse(source);
        assert!(!diagnostics.is_empty());
        assert_eq!(tree.root().text().to_string(), source);
    }

    #[test]
    fn leading_trivia() {
        for source in [
            "// Copyright (c) Example\nusing System;\n\nclass C\n{\n}\n",
            "\nclass C\n{\n}\n",
            "  \n",
            "",
        ] {
            let (tree, diagnostics) = SyntaxTree::parse(source);
            assert!(diagnostics.is_empty(), "{diagnostics:?}");
            assert_eq!(tree.root().kind(), SyntaxKind::CompilationUnitNode);
            assert_eq!(tree.root().text().to_string(), source);
        }
    }

    #[test]
    fn statement_shapes() {
        let (tree, diagnostics) =
            SyntaxTree::parse("class C { void M() { var a = b.C(d); if (a) { } a(); } }");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(
            outline(tree.root()),
            "CompilationUnitNode
  ClassDeclarationNode
    MethodDeclarationNode
      TypeNode
      ParameterListNode
      BlockNode
        LocalDeclarationStatementNode
          VariableDeclarationNode
            TypeNode
            VariableDeclaratorNode
              EqualsValueClauseNode
                InvocationExprNode
                  MemberAccessExprNode
                    NameExprNode
                  ArgumentListNode
                    ArgumentNode
                      NameExprNode
        IfStatementNode
          NameExprNode
          BlockNode
        ExpressionStatementNode
          InvocationExprNode
            NameExprNode
            ArgumentListNode
"
        );
    }

    #[test]
    fn trivia_precedes_nodes() {
        let (tree, _) = SyntaxTree::parse("class C { void M() {\n    x();\n} }");
        let statement = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::ExpressionStatementNode)
            .expect("should have a statement");
        assert_eq!(statement.text().to_string(), "x();");
        let previous = statement
            .first_token()
            .and_then(|t| t.prev_token())
            .expect("should have a previous token");
        assert_eq!(previous.kind(), SyntaxKind::Whitespace);
        assert_eq!(previous.text(), "\n    ");
    }
}
