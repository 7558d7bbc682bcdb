//! Diagnostics reported by the parser and the linter.

use std::cmp::Ordering;
use std::fmt;

use rowan::TextRange;
use rowan::TextSize;

/// A byte span of source text.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// The byte offset of the start of the span.
    start: usize,
    /// The exclusive byte offset of the end of the span.
    end: usize,
}

impl Span {
    /// Creates a span from a start offset and a length.
    pub const fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    /// Gets the start offset.
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Gets the exclusive end offset.
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Gets the length in bytes.
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Determines if the span is empty.
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Determines if the span contains the given offset.
    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Determines if this span overlaps another.
    ///
    /// Empty spans overlap a span that strictly contains their offset.
    pub fn overlaps(&self, other: Span) -> bool {
        if self.is_empty() || other.is_empty() {
            return (other.contains(self.start) && other.start != self.start)
                || (self.contains(other.start) && self.start != other.start);
        }

        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{start}..{end}", start = self.start, end = self.end)
    }
}

impl From<logos::Span> for Span {
    fn from(value: logos::Span) -> Self {
        Self {
            start: value.start,
            end: value.end,
        }
    }
}

impl From<TextRange> for Span {
    fn from(value: TextRange) -> Self {
        Self {
            start: value.start().into(),
            end: value.end().into(),
        }
    }
}

impl From<Span> for TextRange {
    fn from(value: Span) -> Self {
        // Sources larger than 4 GiB are not supported by `rowan`
        TextRange::new(
            TextSize::new(value.start as u32),
            TextSize::new(value.end as u32),
        )
    }
}

/// The severity of a diagnostic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The diagnostic is an error.
    Error,
    /// The diagnostic is a warning.
    Warning,
    /// The diagnostic is a note.
    Note,
}

impl Severity {
    /// Determines if the severity is [`Severity::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Note => write!(f, "note"),
        }
    }
}

/// A message annotating a span of source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Label {
    /// The span being annotated.
    ///
    /// This is declared first so that labels order by position.
    span: Span,
    /// The message of the label; may be empty for a bare highlight.
    message: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(message: impl Into<String>, span: impl Into<Span>) -> Self {
        Self {
            span: span.into(),
            message: message.into(),
        }
    }

    /// Gets the message of the label.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the span of the label.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// A diagnostic reported to the user.
///
/// Diagnostics order by their primary label, then by severity, rule, and
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The identifier of the rule that reported the diagnostic, if any.
    rule: Option<String>,
    /// The severity of the diagnostic.
    severity: Severity,
    /// The message of the diagnostic.
    message: String,
    /// A description of how to fix the problem.
    fix: Option<String>,
    /// The labels of the diagnostic; the first is the primary label.
    labels: Vec<Label>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given severity and message.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: None,
            severity,
            message: message.into(),
            fix: None,
            labels: Vec::new(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Creates a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Creates a note diagnostic.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    /// Sets the rule that reported the diagnostic.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Sets the fix description of the diagnostic.
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    /// Adds a label without a message.
    pub fn with_highlight(self, span: impl Into<Span>) -> Self {
        self.with_label(String::new(), span)
    }

    /// Adds a label; the first label added is the primary label.
    pub fn with_label(mut self, message: impl Into<String>, span: impl Into<Span>) -> Self {
        self.labels.push(Label::new(message, span));
        self
    }

    /// Sets the severity of the diagnostic.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Gets the rule that reported the diagnostic, if any.
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    /// Gets the severity of the diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Gets the message of the diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the fix description of the diagnostic, if any.
    pub fn fix(&self) -> Option<&str> {
        self.fix.as_deref()
    }

    /// Gets the labels of the diagnostic.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Gets the span of the primary label, if there is one.
    pub fn span(&self) -> Option<Span> {
        self.labels.first().map(Label::span)
    }

    /// Converts the diagnostic into a `codespan-reporting` diagnostic for the
    /// given file.
    pub fn to_codespan<FileId: Copy>(
        &self,
        file_id: FileId,
    ) -> codespan_reporting::diagnostic::Diagnostic<FileId> {
        use codespan_reporting::diagnostic as codespan;

        let diagnostic = match self.severity {
            Severity::Error => codespan::Diagnostic::error(),
            Severity::Warning => codespan::Diagnostic::warning(),
            Severity::Note => codespan::Diagnostic::note(),
        }
        .with_message(&self.message);

        let diagnostic = match &self.rule {
            Some(rule) => diagnostic.with_code(rule),
            None => diagnostic,
        };

        let diagnostic = match &self.fix {
            Some(fix) => diagnostic.with_notes(vec![format!("fix: {fix}")]),
            None => diagnostic,
        };

        diagnostic.with_labels(
            self.labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let style = if i == 0 {
                        codespan::LabelStyle::Primary
                    } else {
                        codespan::LabelStyle::Secondary
                    };
                    codespan::Label::new(style, file_id, label.span.start..label.span.end)
                        .with_message(&label.message)
                })
                .collect(),
        )
    }
}

impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.labels
            .first()
            .cmp(&other.labels.first())
            .then_with(|| self.severity.cmp(&other.severity))
            .then_with(|| self.rule.cmp(&other.rule))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.labels.cmp(&other.labels))
            .then_with(|| self.fix.cmp(&other.fix))
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod test {
    use codespan_reporting::diagnostic::LabelStyle;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn span_overlap() {
        assert!(Span::new(0, 5).overlaps(Span::new(4, 2)));
        assert!(!Span::new(0, 5).overlaps(Span::new(5, 2)));
        assert!(Span::new(3, 0).overlaps(Span::new(0, 5)));
        assert!(!Span::new(0, 0).overlaps(Span::new(0, 5)));
    }

    #[test]
    fn diagnostics_order_by_position() {
        let mut diagnostics = vec![
            Diagnostic::warning("later").with_highlight(Span::new(10, 1)),
            Diagnostic::error("first").with_highlight(Span::new(2, 1)),
            Diagnostic::warning("same position").with_highlight(Span::new(2, 1)),
        ];
        diagnostics.sort();
        let messages: Vec<_> = diagnostics.iter().map(Diagnostic::message).collect();
        assert_eq!(messages, ["first", "same position", "later"]);
    }

    #[test]
    fn codespan_conversion() {
        let diagnostic = Diagnostic::warning("bad indentation")
            .with_rule("ExpressionIndentation")
            .with_fix("indent the line")
            .with_label("here", Span::new(4, 2))
            .with_highlight(Span::new(0, 1))
            .to_codespan(());

        assert_eq!(diagnostic.message, "bad indentation");
        assert_eq!(diagnostic.code.as_deref(), Some("ExpressionIndentation"));
        assert_eq!(diagnostic.notes, ["fix: indent the line"]);
        assert_eq!(diagnostic.labels.len(), 2);
        assert_eq!(diagnostic.labels[0].style, LabelStyle::Primary);
        assert_eq!(diagnostic.labels[0].range, 4..6);
        assert_eq!(diagnostic.labels[0].message, "here");
        assert_eq!(diagnostic.labels[1].style, LabelStyle::Secondary);
    }
}
