//! Module for applying fixes for diagnostics.

use cstyle_ast::Span;
use ftree::FenwickTree;
use thiserror::Error;
use tracing::debug;

/// An error that occurred while applying replacements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    /// The replacement does not fall within the bounds of the source.
    #[error("replacement at {span} is out of bounds for a source of length {len}")]
    OutOfBounds {
        /// The span of the replacement.
        span: Span,
        /// The length of the original source.
        len: usize,
    },
    /// The replacement does not start or end on a character boundary.
    #[error("replacement at {span} does not fall on a character boundary")]
    CharBoundary {
        /// The span of the replacement.
        span: Span,
    },
    /// The source is too large to track replacements.
    #[error("source of length {len} is too large to fix")]
    TooLarge {
        /// The length of the source.
        len: usize,
    },
}

/// A replacement of a span of the original source with new text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Replacement {
    /// The span of the original source to replace.
    span: Span,
    /// The replacement text.
    value: String,
}

impl Replacement {
    /// Creates a new replacement.
    pub fn new(span: Span, value: impl Into<String>) -> Self {
        Self {
            span,
            value: value.into(),
        }
    }

    /// Gets the span of the original source to replace.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Gets the replacement text.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A fix for a diagnostic: a set of replacements applied together.
///
/// The span of a fix covers every replacement; fixes with overlapping spans
/// are never applied in the same pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fix {
    /// The span covered by the fix.
    span: Span,
    /// The replacements of the fix.
    replacements: Vec<Replacement>,
}

impl Fix {
    /// Creates a new fix covering the given span.
    pub fn new(span: Span, replacements: Vec<Replacement>) -> Self {
        Self { span, replacements }
    }

    /// Gets the span covered by the fix.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Gets the replacements of the fix.
    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }
}

/// Selects a set of non-overlapping fixes to apply in a single pass.
///
/// Outer fixes are preferred; a fix overlapping one already selected is
/// deferred. Returns the selected fixes and the number deferred.
pub fn select_fixes(mut fixes: Vec<Fix>) -> (Vec<Fix>, usize) {
    fixes.sort_by(|a, b| {
        a.span
            .start()
            .cmp(&b.span.start())
            .then_with(|| b.span.end().cmp(&a.span.end()))
    });

    let mut selected: Vec<Fix> = Vec::with_capacity(fixes.len());
    let mut deferred = 0;
    for fix in fixes {
        if selected.iter().any(|s| s.span.overlaps(fix.span)) {
            debug!(span = %fix.span, "deferring overlapping fix");
            deferred += 1;
            continue;
        }

        selected.push(fix);
    }

    (selected, deferred)
}

/// Applies a series of [`Replacement`]s to a string.
///
/// Replacement spans always refer to the original string; a [Fenwick
/// tree](https://en.wikipedia.org/wiki/Fenwick_tree) records the change in
/// length made by each applied replacement at the end of its span, so later
/// replacements can be mapped into the modified string in any order.
///
/// A replacement starting where another ends is placed after it; a
/// replacement ending where an empty replacement (an insertion) starts is
/// placed before it.
#[derive(Clone, Debug)]
pub struct Fixer {
    /// The string to be modified.
    value: String,
    /// The length of the original string.
    len: usize,
    /// A Fenwick tree for tracking modifications.
    tree: FenwickTree<i32>,
}

impl Fixer {
    /// Creates a new fixer for the given string.
    pub fn new(value: String) -> Result<Self, FixError> {
        let len = value.len();
        if i32::try_from(len + 2).is_err() {
            return Err(FixError::TooLarge { len });
        }

        Ok(Self {
            tree: FenwickTree::from_iter(vec![0; len + 2]),
            len,
            value,
        })
    }

    /// Applies a [`Replacement`] to the value contained in the fixer.
    ///
    /// Replacements must not overlap one another.
    pub fn apply_replacement(&mut self, replacement: &Replacement) -> Result<(), FixError> {
        let span = replacement.span;
        if span.end() > self.len {
            return Err(FixError::OutOfBounds {
                span,
                len: self.len,
            });
        }

        let start = self.transform_start(span.start());
        let end = if span.is_empty() {
            start
        } else {
            self.transform_end(span.end())
        };

        if !self.value.is_char_boundary(start) || !self.value.is_char_boundary(end) {
            return Err(FixError::CharBoundary { span });
        }

        let shift = i32::try_from(replacement.value.len())
            .ok()
            .and_then(|n| i32::try_from(span.len()).ok().map(|r| n - r))
            .ok_or(FixError::TooLarge {
                len: replacement.value.len(),
            })?;

        self.tree.add_at(span.end(), shift);
        self.value.replace_range(start..end, &replacement.value);
        Ok(())
    }

    /// Applies multiple [`Replacement`]s.
    pub fn apply_replacements<'a>(
        &mut self,
        replacements: impl IntoIterator<Item = &'a Replacement>,
    ) -> Result<(), FixError> {
        for replacement in replacements {
            self.apply_replacement(replacement)?;
        }

        Ok(())
    }

    /// Returns a reference to the value of the fixer with any applied
    /// replacements.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Converts the fixer into its modified value.
    pub fn into_value(self) -> String {
        self.value
    }

    /// Maps the start of an original span into the modified string.
    fn transform_start(&self, index: usize) -> usize {
        self.shifted(index, self.tree.prefix_sum(index + 1, 0i32))
    }

    /// Maps the end of an original span into the modified string.
    fn transform_end(&self, index: usize) -> usize {
        self.shifted(index, self.tree.prefix_sum(index, 0i32))
    }

    /// Shifts an original index by the given change in length.
    fn shifted(&self, index: usize, shift: i32) -> usize {
        // Both values are bounded by `i32::MAX` by construction
        (index as i64 + i64::from(shift)).max(0) as usize
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Applies the replacements in the given order.
    fn apply(value: &str, replacements: &[Replacement]) -> String {
        let mut fixer = Fixer::new(value.to_string()).expect("should create fixer");
        fixer
            .apply_replacements(replacements)
            .expect("should apply replacements");
        fixer.into_value()
    }

    #[test]
    fn insertion() {
        let replacements = [
            Replacement::new(Span::new(5, 0), " world"),
            Replacement::new(Span::new(0, 0), "> "),
        ];
        assert_eq!(apply("hello", &replacements), "> hello world");

        let mut reversed = replacements.to_vec();
        reversed.reverse();
        assert_eq!(apply("hello", &reversed), "> hello world");
    }

    #[test]
    fn deletion() {
        let replacements = [
            Replacement::new(Span::new(11, 3), ""),
            Replacement::new(Span::new(14, 7), "bad"),
        ];
        assert_eq!(
            apply("My grammar is perfect.", &replacements),
            "My grammar bad."
        );

        let mut reversed = replacements.to_vec();
        reversed.reverse();
        assert_eq!(apply("My grammar is perfect.", &reversed), "My grammar bad.");
    }

    #[test]
    fn indel() {
        let replacements = [
            Replacement::new(Span::new(18, 5), ""),
            Replacement::new(Span::new(23, 0), "true"),
        ];
        assert_eq!(
            apply("This statement is false.", &replacements),
            "This statement is true."
        );

        let mut reversed = replacements.to_vec();
        reversed.reverse();
        assert_eq!(
            apply("This statement is false.", &reversed),
            "This statement is true."
        );
    }

    #[test]
    fn indentation() {
        let source = "a\n  .B()\n      .C();";
        let replacements = [
            Replacement::new(Span::new(2, 2), "    "),
            Replacement::new(Span::new(9, 6), "    "),
        ];
        assert_eq!(apply(source, &replacements), "a\n    .B()\n    .C();");
    }

    #[test]
    fn out_of_bounds() {
        let mut fixer = Fixer::new("012345".to_string()).expect("should create fixer");
        assert_eq!(
            fixer.apply_replacement(&Replacement::new(Span::new(7, 0), "6")),
            Err(FixError::OutOfBounds {
                span: Span::new(7, 0),
                len: 6
            })
        );
    }

    #[test]
    fn char_boundary() {
        let mut fixer = Fixer::new("é".to_string()).expect("should create fixer");
        assert_eq!(
            fixer.apply_replacement(&Replacement::new(Span::new(1, 0), "x")),
            Err(FixError::CharBoundary {
                span: Span::new(1, 0)
            })
        );
    }

    #[test]
    fn outermost_fix_wins() {
        let outer = Fix::new(Span::new(0, 20), vec![]);
        let inner = Fix::new(Span::new(5, 5), vec![]);
        let after = Fix::new(Span::new(20, 3), vec![]);
        let (selected, deferred) = select_fixes(vec![inner, after.clone(), outer.clone()]);
        assert_eq!(selected, [outer, after]);
        assert_eq!(deferred, 1);
    }
}
