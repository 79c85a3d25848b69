//! Function blocks: header, doc comment, leading `arguments` blocks and
//! nested functions. Used for free functions and class methods alike.

use crate::arguments::parse_arguments_block;
use crate::attributes::Attributes;
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::docstring::{comment_run, extract_docblock};
use crate::model::{DocBlock, Function, FunctionKind, Signature};
use crate::scanner::{block_end, BlockKind, Line, LineKind};
use crate::signature::{build_signature, parse_function_header, FunctionHeader};
use crate::{DocPlacement, ParseOptions};

/// What encloses a function, which decides whether its first input is the
/// implicit object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner<'a> {
    Free,
    Class { name: &'a str, is_static: bool },
}

impl Owner<'_> {
    fn implicit_self(&self, header: &FunctionHeader) -> bool {
        match *self {
            Owner::Free => false,
            Owner::Class { name, is_static } => !is_static && !is_constructor_name(name, &header.name),
        }
    }
}

/// A method named like its class (last package segment) is the constructor.
pub fn is_constructor_name(class: &str, function: &str) -> bool {
    class.rsplit('.').next() == Some(function)
}

/// Doc comment for the declaration at `lines[at]`.
///
/// After-header placement reads the declaration's trailing comment and the
/// comment lines directly below it; the second value is how many of those
/// lines were consumed. Before-header placement reads the comment lines
/// directly above.
pub fn declaration_doc(lines: &[Line], at: usize, placement: DocPlacement) -> (DocBlock, usize) {
    match placement {
        DocPlacement::AfterHeader => {
            let below = comment_run(lines, at + 1);
            let consumed = below.len();
            let text: Vec<&str> = lines[at]
                .trailing_comment
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .into_iter()
                .chain(below)
                .collect();
            (extract_docblock(&text), consumed)
        }
        DocPlacement::BeforeHeader => {
            let mut start = at;
            while start > 0 && matches!(lines[start - 1].kind, LineKind::Comment(_)) {
                start -= 1;
            }
            (extract_docblock(&comment_run(lines, start)), 0)
        }
    }
}

/// Parse the function whose `BlockOpen` is at `lines[open]`.
///
/// Returns the function (`None` if its header is malformed, which is
/// reported as a `Signature` warning) and the index just past its `end`.
pub fn parse_function(
    lines: &[Line],
    open: usize,
    kind: FunctionKind,
    owner: Owner<'_>,
    options: &ParseOptions,
    diag: &mut Diagnostics,
) -> (Option<Function>, usize) {
    let close = block_end(lines, open);
    let next = (close + 1).min(lines.len());
    match parse_signature(lines, open, close, owner, options, diag) {
        Some((signature, nested)) => (
            Some(Function {
                signature,
                kind,
                nested,
            }),
            next,
        ),
        None => (None, next),
    }
}

/// Signature and nested functions of the function block `lines[open..=close]`.
pub(crate) fn parse_signature(
    lines: &[Line],
    open: usize,
    close: usize,
    owner: Owner<'_>,
    options: &ParseOptions,
    diag: &mut Diagnostics,
) -> Option<(Signature, Vec<Function>)> {
    let line = &lines[open];
    let LineKind::BlockOpen { header: text, .. } = &line.kind else {
        return None;
    };
    let Some(header) = parse_function_header(text) else {
        diag.warn(
            line.number,
            WarningKind::Signature,
            format!("cannot parse function header `{text}`"),
        );
        return None;
    };

    let (doc, consumed) = declaration_doc(lines, open, options.doc_placement);
    let body = &lines[open + 1..close.min(lines.len())];

    let mut i = consumed;
    let mut blocks = Vec::new();
    while i < body.len() {
        match &body[i].kind {
            LineKind::Blank | LineKind::Comment(_) => i += 1,
            LineKind::BlockOpen {
                kind: BlockKind::Arguments,
                attributes,
                ..
            } => {
                let attrs = Attributes::parse(attributes.as_deref(), BlockKind::Arguments, body[i].number, diag);
                let end = block_end(body, i);
                blocks.push(parse_arguments_block(&attrs, &body[i + 1..end.min(body.len())], diag));
                i = end + 1;
            }
            _ => break,
        }
    }

    let mut nested = Vec::new();
    while i < body.len() {
        if matches!(body[i].kind, LineKind::BlockOpen { kind: BlockKind::Function, .. }) {
            let (function, next) = parse_function(body, i, FunctionKind::Nested, Owner::Free, options, diag);
            nested.extend(function);
            i = next;
        } else {
            i += 1;
        }
    }

    let implicit_self = owner.implicit_self(&header);
    let signature = build_signature(&header, blocks, doc, implicit_self, line.number, diag);
    Some((signature, nested))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;
    use crate::scanner::scan;

    fn parse(source: &str, options: &ParseOptions) -> (Option<Function>, Diagnostics) {
        let mut diag = Diagnostics::new("test");
        let lines = scan(source, &mut diag);
        assert!(!diag.has_errors(), "{:?}", diag.errors());
        let (function, _) = parse_function(&lines, 0, FunctionKind::Primary, Owner::Free, options, &mut diag);
        (function, diag)
    }

    #[test]
    fn doc_after_header_and_arguments() {
        let src = "\
function y = scale(x, factor)
% SCALE Multiply by a factor.
%
%   Longer description.
arguments
    x double % Values to scale
    factor (1,1) double = 2
end
y = x * factor;
end
";
        let (function, diag) = parse(src, &ParseOptions::default());
        let function = function.unwrap();
        assert!(diag.warnings().is_empty());
        assert_eq!(function.name(), "scale");
        assert_eq!(function.signature.doc.paragraphs.len(), 2);
        assert_eq!(function.signature.doc.summary(), Some("SCALE Multiply by a factor."));
        let inputs = &function.signature.inputs;
        assert_eq!(inputs[0].doc.as_deref(), Some("Values to scale"));
        assert_eq!(inputs[1].default.as_deref(), Some("2"));
        assert_eq!(function.signature.outputs[0].direction, Direction::Output);
    }

    #[test]
    fn doc_before_header() {
        let src = "% Adds one.\nfunction y = inc(x)\ny = x + 1;\nend\n";
        let mut diag = Diagnostics::new("test");
        let lines = scan(src, &mut diag);
        let options = ParseOptions {
            doc_placement: DocPlacement::BeforeHeader,
        };
        let (function, _) = parse_function(&lines, 1, FunctionKind::Primary, Owner::Free, &options, &mut diag);
        assert_eq!(function.unwrap().signature.doc.summary(), Some("Adds one."));
    }

    #[test]
    fn nested_functions_are_collected() {
        let src = "function outer()\n  helper();\n  function helper()\n  % Inner.\n  end\nend\n";
        let (function, _) = parse(src, &ParseOptions::default());
        let function = function.unwrap();
        assert_eq!(function.nested.len(), 1);
        assert_eq!(function.nested[0].name(), "helper");
        assert_eq!(function.nested[0].kind, FunctionKind::Nested);
    }

    #[test]
    fn arguments_after_code_are_ignored() {
        let src = "function f(x)\ndisp(x)\nend\n";
        let (function, _) = parse(src, &ParseOptions::default());
        assert!(function.unwrap().signature.inputs[0].type_name.is_none());
    }

    #[test]
    fn malformed_header_warns_and_skips() {
        let (function, diag) = parse("function = broken(x)\nend\n", &ParseOptions::default());
        assert!(function.is_none());
        assert_eq!(diag.warnings()[0].kind, WarningKind::Signature);
    }

    #[test]
    fn method_owner_drops_object_except_for_constructor() {
        let src = "function r = run(obj, n)\nend\n";
        let mut diag = Diagnostics::new("test");
        let lines = scan(src, &mut diag);
        let options = ParseOptions::default();
        let owner = Owner::Class {
            name: "Runner",
            is_static: false,
        };
        let (sig, _) = parse_signature(&lines, 0, 1, owner, &options, &mut diag).unwrap();
        assert_eq!(sig.inputs.len(), 1);

        let src = "function obj = Runner(n)\nend\n";
        let lines = scan(src, &mut diag);
        let (sig, _) = parse_signature(&lines, 0, 1, owner, &options, &mut diag).unwrap();
        assert_eq!(sig.inputs[0].name, "n");
    }

    #[test]
    fn constructor_name_uses_last_package_segment() {
        assert!(is_constructor_name("pkg.Runner", "Runner"));
        assert!(!is_constructor_name("Runner", "run"));
    }
}
