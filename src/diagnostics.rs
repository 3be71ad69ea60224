//! Diagnostic infrastructure
//!
//! Errors and warnings are values collected into a [`DiagnosticBag`];
//! nothing here aborts a pass. A [`DiagnosticType`] is a static record
//! (stable key, severity, message template); reporting instantiates it
//! with arguments and the source location of the offending node.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ast::SourceInfo;

/// The severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning = 2,
    Error = 1,
}

impl DiagnosticSeverity {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DiagnosticSeverity::Error)
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A statically declared diagnostic kind.
pub struct DiagnosticType {
    /// Stable key, e.g. `JSC_CANNOT_CONVERT`.
    pub key: &'static str,
    pub severity: DiagnosticSeverity,
    /// Message template with `{0}`, `{1}`, ... placeholders.
    pub format: &'static str,
}

impl DiagnosticType {
    pub const fn error(key: &'static str, format: &'static str) -> DiagnosticType {
        DiagnosticType {
            key,
            severity: DiagnosticSeverity::Error,
            format,
        }
    }

    pub const fn warning(key: &'static str, format: &'static str) -> DiagnosticType {
        DiagnosticType {
            key,
            severity: DiagnosticSeverity::Warning,
            format,
        }
    }
}

/// A single reported diagnostic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    pub key: String,
    pub severity: DiagnosticSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub column: Option<u32>,
}

impl Diagnostic {
    pub fn make(ty: &DiagnosticType, source: Option<&SourceInfo>, args: &[&str]) -> Diagnostic {
        Diagnostic {
            key: ty.key.to_string(),
            severity: ty.severity,
            message: format_message(ty.format, args),
            file: source.map(|s| s.file.to_string()),
            line: source.map(|s| s.line),
            column: source.map(|s| s.column),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    /// `file:line: severity - message`, or `severity - message` without a
    /// source location.
    pub fn format(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => {
                format!("{}:{}: {} - {}", file, line, self.severity, self.message)
            }
            _ => format!("{} - {}", self.severity, self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// A collection of diagnostics for one compilation.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticBag {
    pub fn new() -> DiagnosticBag {
        DiagnosticBag::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            DiagnosticSeverity::Error => self.error_count += 1,
            DiagnosticSeverity::Warning => self.warning_count += 1,
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn report(&mut self, ty: &DiagnosticType, source: Option<&SourceInfo>, args: &[&str]) {
        self.add(Diagnostic::make(ty, source, args));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Keys of all reported diagnostics, for tests.
    pub fn keys(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.key.as_str()).collect()
    }

    /// Take all diagnostics, leaving the bag empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.warning_count = 0;
        std::mem::take(&mut self.diagnostics)
    }

    pub fn merge(&mut self, other: DiagnosticBag) {
        for diag in other.diagnostics {
            self.add(diag);
        }
    }
}

impl<'a> IntoIterator for &'a DiagnosticBag {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

/// Replace `{0}`, `{1}`, ... in a template with the given arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}
