//! Parse diagnostics: non-fatal warnings and fatal structure errors.
//!
//! Every parser stage reports through a [`Diagnostics`] collector owned by
//! the module being parsed, so findings never leak across source units.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Where a finding was made: module name plus 1-based physical line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub module: String,
    pub line: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.line)
    }
}

/// Category of a non-fatal finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Declaration line inside `arguments`/`properties` that does not match the grammar.
    ParameterSyntax,
    /// Validator list entry that is not `name` or `name(args)`.
    Validator,
    /// Structured doc section and signature disagree.
    DocMismatch,
    /// Block attribute not supported for the block kind, or a bad value.
    Attribute,
    /// `function` or `classdef` header that could not be parsed.
    Signature,
    /// Primary function or class named differently from its module.
    NameMismatch,
    /// Non-dotted `arguments` entry absent from the function header.
    UnknownArgument,
    /// Statement that has no meaning at its position (e.g. code directly in a classdef).
    UnexpectedStatement,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WarningKind::ParameterSyntax => "parameter-syntax",
            WarningKind::Validator => "validator",
            WarningKind::DocMismatch => "doc-mismatch",
            WarningKind::Attribute => "attribute",
            WarningKind::Signature => "signature",
            WarningKind::NameMismatch => "name-mismatch",
            WarningKind::UnknownArgument => "unknown-argument",
            WarningKind::UnexpectedStatement => "unexpected-statement",
        };
        f.write_str(name)
    }
}

/// A recoverable finding. Never blocks model construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub location: Location,
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.location, self.kind, self.message)
    }
}

/// Unmatched or unterminated block delimiter. Fatal for the containing unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{location}: {message}")]
pub struct StructureError {
    pub location: Location,
    pub message: String,
}

/// Outcome of a unit that could not be parsed.
///
/// Carries every structure error found (the scanner resynchronizes after
/// each one) and the warnings recorded before parsing was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{module}: {}", summarize(.errors))]
pub struct ParseFailure {
    pub module: String,
    pub errors: Vec<StructureError>,
    pub warnings: Vec<Warning>,
}

fn summarize(errors: &[StructureError]) -> String {
    match errors {
        [] => "unparsed".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

/// Per-module collector threaded through every parser stage.
#[derive(Debug)]
pub struct Diagnostics {
    module: String,
    warnings: Vec<Warning>,
    errors: Vec<StructureError>,
}

impl Diagnostics {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn location(&self, line: usize) -> Location {
        Location {
            module: self.module.clone(),
            line,
        }
    }

    pub fn warn(&mut self, line: usize, kind: WarningKind, message: impl Into<String>) {
        let warning = Warning {
            location: self.location(line),
            kind,
            message: message.into(),
        };
        tracing::debug!(target: "matdoc_syntax", "{warning}");
        self.warnings.push(warning);
    }

    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        let error = StructureError {
            location: self.location(line),
            message: message.into(),
        };
        tracing::debug!(target: "matdoc_syntax", "structure error: {error}");
        self.errors.push(error);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn errors(&self) -> &[StructureError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Split into warnings and errors, consuming the collector.
    pub fn into_parts(self) -> (Vec<Warning>, Vec<StructureError>) {
        (self.warnings, self.errors)
    }
}
