//! The lint file tests.
//!
//! This test looks for directories in `tests/lints`.
//!
//! Each directory is expected to contain:
//!
//! * `source.cs` - the test input source to lint with the default
//!   configuration.
//! * `source.errors` - the expected set of diagnostics, one per line.
//! * `source.fixed` - the expected source after applying every fix.
//!
//! The `source.errors` and `source.fixed` files may be automatically
//! generated or updated by setting the `BLESS` environment variable when
//! running this test.

use std::collections::HashSet;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::Config as TermConfig;
use codespan_reporting::term::DisplayStyle;
use codespan_reporting::term::termcolor::Buffer;
use colored::Colorize;
use cstyle_lint::Config;
use cstyle_lint::ast::Diagnostic;
use cstyle_lint::fix_document;
use cstyle_lint::lint_document;
use pretty_assertions::StrComparison;

/// Finds tests for this package.
fn find_tests() -> Result<Vec<PathBuf>> {
    // Check for filter arguments consisting of test names
    let mut filter = HashSet::new();
    for arg in std::env::args().skip_while(|a| a != "--").skip(1) {
        if !arg.starts_with('-') {
            filter.insert(arg);
        }
    }

    let mut tests: Vec<PathBuf> = Vec::new();
    for entry in Path::new("tests/lints")
        .read_dir()
        .context("failed to read `tests/lints`")?
    {
        let entry = entry.context("failed to read directory")?;
        let path = entry.path();
        if !path.is_dir()
            || (!filter.is_empty()
                && !filter.contains(entry.file_name().to_str().context("name should be UTF-8")?))
        {
            continue;
        }

        tests.push(path);
    }

    tests.sort();
    Ok(tests)
}

/// Normalizes a path.
fn normalize(s: &str) -> String {
    // Normalize paths in any error messages
    s.replace('\\', "/").replace("\r\n", "\n")
}

/// Formats diagnostics, one line per diagnostic.
fn format_diagnostics(diagnostics: &[Diagnostic], path: &Path, source: &str) -> Result<String> {
    let file = SimpleFile::new(path.to_str().context("path should be UTF-8")?, source);
    let config = TermConfig {
        display_style: DisplayStyle::Short,
        ..Default::default()
    };

    let mut buffer = Buffer::no_color();
    for diagnostic in diagnostics {
        term::emit(&mut buffer, &config, &file, &diagnostic.to_codespan(()))
            .context("failed to emit diagnostic")?;
    }

    String::from_utf8(buffer.into_inner()).context("output should be UTF-8")
}

/// Compares a test result.
fn compare_result(path: &Path, result: &str) -> Result<()> {
    let result = normalize(result);
    if env::var_os("BLESS").is_some() {
        fs::write(path, &result).with_context(|| {
            format!(
                "failed to write result file `{path}`",
                path = path.display()
            )
        })?;
        return Ok(());
    }

    let expected = fs::read_to_string(path)
        .with_context(|| format!("failed to read result file `{path}`", path = path.display()))?
        .replace("\r\n", "\n");

    if expected != result {
        bail!(
            "result from `{path}` is not as expected:\n{diff}",
            path = path.display(),
            diff = StrComparison::new(&expected, &result),
        );
    }

    Ok(())
}

/// Runs a single test.
fn run_test(test: &Path) -> Result<()> {
    let path = test.join("source.cs");
    let source = fs::read_to_string(&path)
        .with_context(|| format!("failed to read source file `{path}`", path = path.display()))?
        .replace("\r\n", "\n");

    let config = Config::default();
    let diagnostics = lint_document(&source, &config);
    compare_result(
        &test.join("source.errors"),
        &format_diagnostics(&diagnostics, &path, &source)?,
    )?;

    let fixed = fix_document(&source, &config).context("failed to apply fixes")?;
    compare_result(&test.join("source.fixed"), &fixed)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let tests = find_tests()?;
    println!("\nrunning {} tests\n", tests.len());

    let mut errors = Vec::new();
    for test in &tests {
        let test_name = test
            .file_stem()
            .and_then(OsStr::to_str)
            .context("test name should be UTF-8")?;

        match run_test(test) {
            Ok(()) => {
                println!("test {test_name} ... {ok}", ok = "ok".green());
            }
            Err(e) => {
                println!("test {test_name} ... {failed}", failed = "failed".red());
                errors.push((test_name, format!("{e:#}")));
            }
        }
    }

    if !errors.is_empty() {
        eprintln!(
            "\n{count} test(s) {failed}:",
            count = errors.len(),
            failed = "failed".red()
        );

        for (name, msg) in errors.iter() {
            eprintln!("{name}: {msg}", msg = msg.red());
        }

        std::process::exit(1);
    }

    println!("\ntest result: ok. {count} passed\n", count = tests.len());
    Ok(())
}
