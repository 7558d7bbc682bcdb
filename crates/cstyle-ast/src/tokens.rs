//! Helpers for the line layout of tokens.

use crate::Span;
use crate::SyntaxKind;
use crate::SyntaxToken;

/// Gets the width of the indentation preceding a token that starts its line.
///
/// The width is the number of whitespace characters between the last
/// preceding newline and the token; a tab counts as one character.
///
/// Returns `None` when the token is not the first token on its line.
pub fn leading_indent(token: &SyntaxToken) -> Option<usize> {
    let Some(prev) = token.prev_token() else {
        return Some(0);
    };

    if prev.kind() != SyntaxKind::Whitespace {
        return None;
    }

    let text = prev.text();
    match text.rfind('\n') {
        Some(index) => Some(text[index + 1..].chars().count()),
        None if prev.prev_token().is_none() => Some(text.chars().count()),
        None => None,
    }
}

/// Gets the span of the indentation preceding a token that starts its line.
///
/// The span covers the text after the last newline of the preceding
/// whitespace and is empty when the token starts at column zero.
///
/// Returns `None` when the token is not the first token on its line.
pub fn indent_span(token: &SyntaxToken) -> Option<Span> {
    let width = leading_indent(token)?;
    let start = usize::from(token.text_range().start());
    let len = match token.prev_token() {
        Some(prev) => {
            let text = prev.text();
            text.len() - text.rfind('\n').map(|i| i + 1).unwrap_or(0)
        }
        None => 0,
    };

    debug_assert!(len >= width);
    Some(Span::new(start - len, len))
}

/// Gets the indentation of the line on which a token appears.
///
/// This is the leading indentation of the first token on the token's line.
pub fn line_indent(token: &SyntaxToken) -> usize {
    let mut current = Some(token.clone());
    while let Some(token) = current {
        if token.kind() != SyntaxKind::Whitespace {
            if let Some(width) = leading_indent(&token) {
                return width;
            }
        }

        current = token.prev_token();
    }

    0
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Document;

    /// Finds the first token with the given text.
    fn find(document: &Document, text: &str) -> SyntaxToken {
        document
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.text() == text)
            .expect("should have token")
    }

    #[test]
    fn leading_indents() {
        let (document, _) = Document::parse("  class C\n{\n\t  int x =\n      1;\n}\n");
        assert_eq!(leading_indent(&find(&document, "class")), Some(2));
        assert_eq!(leading_indent(&find(&document, "C")), None);
        assert_eq!(leading_indent(&find(&document, "{")), Some(0));
        assert_eq!(leading_indent(&find(&document, "int")), Some(3));
        assert_eq!(leading_indent(&find(&document, "x")), None);
        assert_eq!(leading_indent(&find(&document, "1")), Some(6));
    }

    #[test]
    fn indent_spans() {
        let (document, _) = Document::parse("class C\n{\n    int x =\n1;\n}\n");
        assert_eq!(indent_span(&find(&document, "int")), Some(Span::new(10, 4)));
        assert_eq!(indent_span(&find(&document, "1")), Some(Span::new(22, 0)));
        assert_eq!(indent_span(&find(&document, "class")), Some(Span::new(0, 0)));
        assert_eq!(indent_span(&find(&document, "x")), None);
    }

    #[test]
    fn line_indents() {
        let (document, _) = Document::parse("class C\n{\n    int x = a(\n        b);\n}\n");
        assert_eq!(line_indent(&find(&document, "a")), 4);
        assert_eq!(line_indent(&find(&document, ")")), 8);
        assert_eq!(line_indent(&find(&document, "C")), 0);
    }
}
