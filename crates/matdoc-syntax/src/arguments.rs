//! `arguments ... end` blocks.

use crate::attributes::Attributes;
use crate::declaration::parse_declaration;
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::docstring::{argument_doc, comment_run};
use crate::model::{Direction, Parameter};
use crate::scanner::{block_end, Line, LineKind};

/// Parameters declared by one `arguments` block, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentsBlock {
    pub direction: Direction,
    pub is_repeating: bool,
    pub parameters: Vec<Parameter>,
}

/// Parse the lines between an `arguments` opener and its `end`.
///
/// `Output` selects the output direction unless `Input` is also given;
/// `Repeating` marks every parameter of the block.
pub fn parse_arguments_block(attributes: &Attributes, body: &[Line], diag: &mut Diagnostics) -> ArgumentsBlock {
    let direction = if attributes.flag("Output") && !attributes.flag("Input") {
        Direction::Output
    } else {
        Direction::Input
    };
    let is_repeating = attributes.flag("Repeating");

    let mut parameters = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let line = &body[i];
        match &line.kind {
            LineKind::Code(text) => {
                let following = comment_run(body, i + 1);
                let doc = argument_doc(line.trailing_comment.as_deref(), &following);
                i += 1 + following.len();
                let Some(decl) = parse_declaration(text, true, line.number, diag) else {
                    continue;
                };
                parameters.push(Parameter {
                    name: decl.name,
                    namespace: decl.namespace,
                    size: decl.size,
                    type_name: decl.type_name,
                    validators: decl.validators,
                    default: decl.default,
                    is_repeating,
                    direction,
                    doc,
                });
            }
            LineKind::BlockOpen { kind, .. } => {
                diag.warn(
                    line.number,
                    WarningKind::UnexpectedStatement,
                    format!("`{}` block inside `arguments` ignored", kind.keyword()),
                );
                i = block_end(body, i) + 1;
            }
            LineKind::Blank | LineKind::Comment(_) | LineKind::BlockClose => i += 1,
        }
    }

    ArgumentsBlock {
        direction,
        is_repeating,
        parameters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{scan, BlockKind};

    /// Scan `source` (a function with one arguments block) and parse that block.
    fn parse(source: &str) -> (ArgumentsBlock, Diagnostics) {
        let mut diag = Diagnostics::new("test");
        let lines = scan(source, &mut diag);
        assert!(!diag.has_errors());
        let open = lines
            .iter()
            .position(|l| matches!(l.kind, LineKind::BlockOpen { kind: BlockKind::Arguments, .. }))
            .unwrap();
        let LineKind::BlockOpen { attributes, .. } = &lines[open].kind else {
            unreachable!()
        };
        let attrs = Attributes::parse(attributes.as_deref(), BlockKind::Arguments, lines[open].number, &mut diag);
        let close = block_end(&lines, open);
        let block = parse_arguments_block(&attrs, &lines[open + 1..close], &mut diag);
        (block, diag)
    }

    #[test]
    fn input_block_defaults() {
        let (block, diag) = parse(
            "function f(arg1, x)\narguments (Input)\n    arg1 (1,1) double {MustBePositive} = 1\n    x\nend\nend\n",
        );
        assert!(diag.warnings().is_empty());
        assert_eq!(block.direction, Direction::Input);
        assert!(!block.is_repeating);
        assert_eq!(block.parameters.len(), 2);
        let p = &block.parameters[0];
        assert_eq!(p.name, "arg1");
        assert_eq!(p.default.as_deref(), Some("1"));
        assert_eq!(p.direction, Direction::Input);
    }

    #[test]
    fn output_repeating_one_liner() {
        let (block, _) = parse(
            "function output = f()\narguments(Output, Repeating) output (1,1) float {MustBeInteger}; end\nend\n",
        );
        assert_eq!(block.direction, Direction::Output);
        assert_eq!(block.parameters.len(), 1);
        let p = &block.parameters[0];
        assert_eq!(p.name, "output");
        assert!(p.is_repeating);
        assert_eq!(p.type_name.as_deref(), Some("float"));
        assert_eq!(p.validators[0].name, "MustBeInteger");
    }

    #[test]
    fn trailing_and_following_comments_become_doc() {
        let (block, _) = parse(
            "function f(a, b)\narguments\n    a double % First input\n    % continued here\n\n    % heading for b\n    b char\nend\nend\n",
        );
        assert_eq!(block.parameters[0].doc.as_deref(), Some("First input continued here"));
        assert_eq!(block.parameters[1].doc, None);
    }

    #[test]
    fn comment_below_declaration_is_its_doc() {
        let (block, _) = parse("function f(a, b)\narguments\n    a double\n    % Describes a\n    b char\nend\nend\n");
        assert_eq!(block.parameters[0].doc.as_deref(), Some("Describes a"));
        assert_eq!(block.parameters[1].doc, None);
    }

    #[test]
    fn comment_lines_are_not_declarations() {
        let (block, _) = parse("function f(a)\narguments\n    % just a note\n    a\n    % another\nend\nend\n");
        assert_eq!(block.parameters.len(), 1);
    }

    #[test]
    fn empty_block_is_valid() {
        let (block, diag) = parse("function y = f()\narguments (Output)\nend\nend\n");
        assert!(block.parameters.is_empty());
        assert_eq!(block.direction, Direction::Output);
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn dotted_fields_share_namespace() {
        let (block, _) = parse(
            "function f(opts)\narguments\n    opts.Color char = 'red'\n    opts.Width (1,1) double = 1\nend\nend\n",
        );
        assert_eq!(block.parameters.len(), 2);
        assert!(block
            .parameters
            .iter()
            .all(|p| p.namespace.as_deref() == Some("opts")));
        assert_eq!(block.parameters[1].name, "Width");
    }
}
