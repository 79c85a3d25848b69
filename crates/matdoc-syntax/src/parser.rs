//! Module-level parse: one source unit to one [`Module`].

use crate::class::parse_class;
use crate::diagnostics::{Diagnostics, ParseFailure, WarningKind};
use crate::docstring::{comment_run, extract_docblock};
use crate::function::{parse_function, Owner};
use crate::model::{FunctionKind, Item, Module};
use crate::scanner::{block_end, scan, BlockKind, LineKind};
use crate::{ParseOptions, ParseOutcome, Parsed};

/// Parse one source unit.
///
/// `name` is the module name (`pkg.sub.file` for package members); its last
/// segment is what the primary function or class is expected to be called.
/// A unit with structure errors is not modelled at all: the outcome is a
/// [`ParseFailure`] carrying every error found.
pub fn parse_module(name: &str, source: &str, options: &ParseOptions) -> ParseOutcome {
    let mut diag = Diagnostics::new(name);
    let lines = scan(source, &mut diag);
    if diag.has_errors() {
        let (warnings, errors) = diag.into_parts();
        tracing::debug!(target: "matdoc_syntax", module = name, errors = errors.len(), "unparsed");
        return Err(ParseFailure {
            module: name.to_string(),
            errors,
            warnings,
        });
    }

    let first = lines
        .iter()
        .position(|l| !matches!(l.kind, LineKind::Blank))
        .unwrap_or(lines.len());
    let header = extract_docblock(&comment_run(&lines, first));
    let doc = (!header.is_empty()).then_some(header);

    let expected = name.rsplit('.').next().unwrap_or(name);
    let mut items = Vec::new();
    let mut primary_taken = false;
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        match &line.kind {
            LineKind::BlockOpen {
                kind: BlockKind::Function,
                ..
            } => {
                let kind = if primary_taken {
                    FunctionKind::Local
                } else {
                    FunctionKind::Primary
                };
                primary_taken = true;
                let (function, next) = parse_function(&lines, i, kind, Owner::Free, options, &mut diag);
                if let Some(function) = function {
                    if kind == FunctionKind::Primary && function.name() != expected {
                        diag.warn(
                            line.number,
                            WarningKind::NameMismatch,
                            format!("function `{}` does not match module `{name}`", function.name()),
                        );
                    }
                    items.push(Item::Function(function));
                }
                i = next;
            }
            LineKind::BlockOpen {
                kind: BlockKind::Classdef,
                ..
            } => {
                primary_taken = true;
                let (class, next) = parse_class(&lines, i, options, &mut diag);
                if let Some(class) = class {
                    if class.name != expected {
                        diag.warn(
                            line.number,
                            WarningKind::NameMismatch,
                            format!("class `{}` does not match module `{name}`", class.name),
                        );
                    }
                    items.push(Item::Class(class));
                }
                i = next;
            }
            LineKind::BlockOpen { .. } => {
                // script-level control flow
                primary_taken = true;
                i = block_end(&lines, i) + 1;
            }
            LineKind::Code(_) => {
                // a script: every function that follows is local
                primary_taken = true;
                i += 1;
            }
            LineKind::Blank | LineKind::Comment(_) | LineKind::BlockClose => i += 1,
        }
    }

    let (warnings, _) = diag.into_parts();
    tracing::debug!(
        target: "matdoc_syntax",
        module = name,
        items = items.len(),
        warnings = warnings.len(),
        "parsed"
    );
    Ok(Parsed {
        module: Module {
            name: name.to_string(),
            doc,
            items,
        },
        warnings,
    })
}
