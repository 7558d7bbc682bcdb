//! Lint rules for the layout of C# source files.
//!
//! Two rules are provided:
//!
//! * `ExpressionIndentation` reports multi-line expressions whose lines
//!   drift from the indentation implied by the enclosing statement and the
//!   brackets open on earlier lines (see the [`indentation`] module).
//! * `UnnecessaryIfBraces` reports braces around the single statement of an
//!   `if` or `else` clause.
//!
//! Both rules contribute fixes that can be applied to the source.
//!
//! # Examples
//!
//! An example of linting a C# document and fixing it:
//!
//! ```rust
//! use cstyle_lint::Config;
//! use cstyle_lint::fix_document;
//! use cstyle_lint::lint_document;
//!
//! let source = "class C\n{\n    void M()\n    {\n        var x = list\n          \
//!               .ToList();\n    }\n}\n";
//!
//! let config = Config::default();
//! let diagnostics = lint_document(source, &config);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].rule(), Some("ExpressionIndentation"));
//!
//! let fixed = fix_document(source, &config).expect("fixes should apply");
//! assert!(lint_document(&fixed, &config).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

use cstyle_ast::Diagnostic;
use cstyle_ast::Document;
use tracing::debug;

mod config;
mod diagnostics;
mod fix;
pub mod indentation;
mod linter;
mod rules;
mod tags;

pub use config::*;
pub use cstyle_ast as ast;
pub use diagnostics::*;
pub use fix::*;
pub use linter::*;
pub use rules::*;
pub use tags::*;

/// The maximum number of passes made by [`fix_document`].
///
/// Fixes that overlap a fix applied in one pass are recomputed and applied
/// in a later pass.
pub const MAX_FIX_PASSES: usize = 8;

/// Parses and lints a document.
///
/// The returned diagnostics include any parse errors and are sorted by
/// their primary label.
pub fn lint_document(source: &str, config: &Config) -> Vec<Diagnostic> {
    let (document, parse) = Document::parse(source);
    let mut diagnostics = Linter::new(config).lint(&document);
    diagnostics.extend(parse);
    diagnostics.sort();
    diagnostics.into_parts().0
}

/// Parses a document and applies the fixes of every enabled rule, returning
/// the fixed source.
///
/// Overlapping fixes are resolved in favor of the outermost; the others are
/// recomputed against the fixed source in a later pass. At most
/// [`MAX_FIX_PASSES`] passes are made.
pub fn fix_document(source: &str, config: &Config) -> Result<String, FixError> {
    let mut value = source.to_string();
    for pass in 0..MAX_FIX_PASSES {
        let (document, _) = Document::parse(&value);
        let (_, fixes) = Linter::new(config).lint(&document).into_parts();
        if fixes.is_empty() {
            debug!(pass, "no fixes remain");
            break;
        }

        let (fixes, deferred) = select_fixes(fixes);
        debug!(pass, applied = fixes.len(), deferred, "applying fixes");

        let mut fixer = Fixer::new(value)?;
        for fix in &fixes {
            fixer.apply_replacements(fix.replacements())?;
        }

        value = fixer.into_value();
    }

    Ok(value)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn parse_errors_are_reported() {
        let diagnostics = lint_document("class C\n{\n    void M(\n}\n", &Config::default());
        assert!(diagnostics.iter().any(|d| d.severity().is_error()));
        assert!(diagnostics.iter().all(|d| d.rule().is_none()));
    }

    #[test]
    fn leading_trivia() {
        let config = Config::default();
        for source in [
            "// Copyright (c) Example\nusing System;\n\nclass C\n{\n}\n",
            "\nclass C\n{\n}\n",
        ] {
            assert!(lint_document(source, &config).is_empty());
            assert_eq!(fix_document(source, &config).expect("should fix"), source);
        }

        let source = "// Header\n\nclass C\n{\n    void M()\n    {\n        var x = a\n          \
                      .B();\n    }\n}\n";
        let diagnostics = lint_document(source, &config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule(), Some("ExpressionIndentation"));
        assert_eq!(
            fix_document(source, &config).expect("should fix"),
            "// Header\n\nclass C\n{\n    void M()\n    {\n        var x = a\n            \
             .B();\n    }\n}\n"
        );
    }

    #[test]
    #[traced_test]
    fn nested_fixes_converge() {
        let source = concat!(
            "class C\n{\n    void M()\n    {\n",
            "        Run(items\n",
            "              .Select(x =>\n",
            "              {\n",
            "                    var y = x\n",
            "                   .Trim();\n",
            "                    return y;\n",
            "              }));\n",
            "    }\n}\n",
        );
        let expected = concat!(
            "class C\n{\n    void M()\n    {\n",
            "        Run(items\n",
            "            .Select(x =>\n",
            "            {\n",
            "                var y = x\n",
            "                    .Trim();\n",
            "                return y;\n",
            "            }));\n",
            "    }\n}\n",
        );

        let config = Config::default();
        let fixed = fix_document(source, &config).expect("fixes should apply");
        assert_eq!(fixed, expected);
        assert!(lint_document(&fixed, &config).is_empty());
        assert!(logs_contain("deferring overlapping fix"));
    }

    #[test]
    fn disabled_rules_are_not_fixed() {
        let source = "class C\n{\n    void M()\n    {\n        if (a)\n        {\n            \
                      b();\n        }\n    }\n}\n";
        let config = Config {
            disabled_rules: ["UnnecessaryIfBraces".to_string()].into(),
            ..Default::default()
        };

        assert_eq!(fix_document(source, &config).expect("should fix"), source);
        assert_eq!(
            fix_document(source, &Config::default()).expect("should fix"),
            "class C\n{\n    void M()\n    {\n        if (a)\n            b();\n    }\n}\n"
        );
    }
}
