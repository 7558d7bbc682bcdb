//! Collection of the diagnostics and fixes produced by lint rules.

use cstyle_ast::Diagnostic;

use crate::Fix;

/// Represents a collection of lint diagnostics and their fixes.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    /// The diagnostics that were reported.
    diagnostics: Vec<Diagnostic>,
    /// The fixes contributed alongside the diagnostics.
    fixes: Vec<Fix>,
}

impl Diagnostics {
    /// Adds a diagnostic to the collection.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds a diagnostic that can be fixed with the given fix.
    pub fn add_with_fix(&mut self, diagnostic: Diagnostic, fix: Fix) {
        self.diagnostics.push(diagnostic);
        self.fixes.push(fix);
    }

    /// Extends the collection with the given diagnostics.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Determines if the collection has no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Sorts the diagnostics by their primary label.
    pub fn sort(&mut self) {
        self.diagnostics.sort();
    }

    /// Gets the diagnostics of the collection.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Gets the fixes of the collection.
    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    /// Splits the collection into its diagnostics and fixes.
    pub fn into_parts(self) -> (Vec<Diagnostic>, Vec<Fix>) {
        (self.diagnostics, self.fixes)
    }
}
