//! `function` and `classdef` headers, and signature assembly.
//!
//! The header only names inputs and outputs. Those names seed parameter
//! stubs that `arguments` blocks then enrich by name; dotted `ns.field`
//! declarations are grouped right after the `ns` stub.

use crate::arguments::ArgumentsBlock;
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::model::{DocBlock, Direction, Parameter, SectionEntry, Signature, StructuredSection};
use regex::Regex;
use std::sync::LazyLock;

static RE_FUNCTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\[[^\]]*\]|[A-Za-z]\w*)\s*=\s*)?([A-Za-z]\w*(?:\.[A-Za-z]\w*)*)\s*(?:\(([^)]*)\))?$")
        .unwrap()
});

static RE_CLASSDEF_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]\w*(?:\.[A-Za-z]\w*)*)\s*(?:<\s*(.+))?$").unwrap());

static RE_IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]\w*$").unwrap());

static RE_QUALIFIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]\w*(?:\.[A-Za-z]\w*)*$").unwrap());

// -- Headers ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHeader {
    pub name: String,
    pub outputs: Vec<String>,
    pub inputs: Vec<String>,
}

/// Parse the text after `function`: `[a, b] = name(x, y)`, `a = name`, `name(x)`.
///
/// Inputs may be `~` placeholders. Returns `None` for anything else.
pub fn parse_function_header(header: &str) -> Option<FunctionHeader> {
    let caps = RE_FUNCTION_HEADER.captures(header.trim())?;

    let outputs: Vec<String> = match caps.get(1) {
        Some(m) => m
            .as_str()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };
    let inputs: Vec<String> = match caps.get(3) {
        Some(m) => m
            .as_str()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    let valid_outputs = outputs.iter().all(|o| RE_IDENT.is_match(o));
    let valid_inputs = inputs.iter().all(|i| i == "~" || RE_IDENT.is_match(i));
    if !valid_outputs || !valid_inputs {
        return None;
    }
    Some(FunctionHeader {
        name: caps[2].to_string(),
        outputs,
        inputs,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub name: String,
    pub superclasses: Vec<String>,
}

/// Parse the text after `classdef` and its attributes: `Name < A & pkg.B`.
pub fn parse_classdef_header(header: &str) -> Option<ClassHeader> {
    let caps = RE_CLASSDEF_HEADER.captures(header.trim())?;
    let superclasses: Vec<String> = match caps.get(2) {
        Some(m) => m.as_str().split('&').map(|s| s.trim().to_string()).collect(),
        None => Vec::new(),
    };
    if !superclasses.iter().all(|s| RE_QUALIFIED.is_match(s)) {
        return None;
    }
    Some(ClassHeader {
        name: caps[1].to_string(),
        superclasses,
    })
}

// -- Assembly -----------------------------------------------------------------

/// Combine a header with its `arguments` blocks and doc comment.
///
/// With `implicit_self`, the first header input (the object of an instance
/// method) is left out of the published inputs along with any declaration
/// of it. Mismatches between a structured `Parameters`/`Returns` section and
/// the final parameter lists are reported as `DocMismatch`.
pub fn build_signature(
    header: &FunctionHeader,
    blocks: Vec<ArgumentsBlock>,
    doc: DocBlock,
    implicit_self: bool,
    line: usize,
    diag: &mut Diagnostics,
) -> Signature {
    let self_name = header.inputs.first().filter(|_| implicit_self).cloned();
    let mut inputs: Vec<Parameter> = header
        .inputs
        .iter()
        .skip(usize::from(self_name.is_some()))
        .map(|name| Parameter::stub(name.as_str(), Direction::Input))
        .collect();
    let mut outputs: Vec<Parameter> = header
        .outputs
        .iter()
        .map(|name| Parameter::stub(name.as_str(), Direction::Output))
        .collect();

    for param in blocks.into_iter().flat_map(|b| b.parameters) {
        if param.namespace.is_none() && self_name.as_deref() == Some(param.name.as_str()) {
            continue;
        }
        let list = match param.direction {
            Direction::Input => &mut inputs,
            Direction::Output => &mut outputs,
        };
        place(list, param, &header.name, line, diag);
    }

    if let Some(section) = &doc.structured {
        fill_docs(&mut inputs, section, Direction::Input);
        fill_docs(&mut outputs, section, Direction::Output);
        check_docs(&inputs, section, Direction::Input, line, diag);
        check_docs(&outputs, section, Direction::Output, line, diag);
    }

    Signature {
        name: header.name.clone(),
        inputs,
        outputs,
        doc,
    }
}

/// Merge one declared parameter into a direction's list.
fn place(list: &mut Vec<Parameter>, param: Parameter, function: &str, line: usize, diag: &mut Diagnostics) {
    if let Some(existing) = list
        .iter_mut()
        .find(|p| p.namespace == param.namespace && p.name == param.name)
    {
        *existing = param;
        return;
    }

    let Some(ns) = param.namespace.clone() else {
        diag.warn(
            line,
            WarningKind::UnknownArgument,
            format!("`{}` is declared in `arguments` but not in the header of `{function}`", param.name),
        );
        list.push(param);
        return;
    };

    // after the group's head stub and any fields already placed
    let anchor = list
        .iter()
        .rposition(|p| p.namespace.as_deref() == Some(ns.as_str()))
        .or_else(|| {
            list.iter()
                .position(|p| p.namespace.is_none() && p.name == ns)
        });
    match anchor {
        Some(at) => list.insert(at + 1, param),
        None => list.push(param),
    }
}

fn section_entry<'a>(
    section: &'a StructuredSection,
    direction: Direction,
    param: &Parameter,
) -> Option<&'a SectionEntry> {
    section
        .lookup(direction, &param.qualified_name())
        .or_else(|| section.lookup(direction, &param.name))
}

/// Use section descriptions where no inline doc exists.
fn fill_docs(list: &mut [Parameter], section: &StructuredSection, direction: Direction) {
    for param in list.iter_mut().filter(|p| p.doc.is_none()) {
        if let Some(entry) = section_entry(section, direction, param) {
            if !entry.description.is_empty() {
                param.doc = Some(entry.description.clone());
            }
        }
    }
}

fn check_docs(list: &[Parameter], section: &StructuredSection, direction: Direction, line: usize, diag: &mut Diagnostics) {
    let label = match direction {
        Direction::Input => "parameter",
        Direction::Output => "return value",
    };
    for entry in section.entries(direction) {
        let known = list
            .iter()
            .any(|p| p.qualified_name() == entry.name || p.name == entry.name);
        if !known {
            diag.warn(
                line,
                WarningKind::DocMismatch,
                format!("documented {label} `{}` is not in the signature", entry.name),
            );
        }
    }
    for param in list {
        let is_group_head = param.namespace.is_none()
            && list
                .iter()
                .any(|p| p.namespace.as_deref() == Some(param.name.as_str()));
        if param.name == "~" || is_group_head {
            continue;
        }
        if param.doc.is_none() && section_entry(section, direction, param).is_none() {
            diag.warn(
                line,
                WarningKind::DocMismatch,
                format!("{label} `{}` is not documented", param.qualified_name()),
            );
        }
    }
}
