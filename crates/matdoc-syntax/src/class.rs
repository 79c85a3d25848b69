//! `classdef` bodies: `properties`, `methods`, `events` and `enumeration`
//! sections. Section attributes apply to every member of the section.

use crate::attributes::Attributes;
use crate::declaration::parse_declaration;
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::docstring::{comment_run, trailing_doc};
use crate::function::{declaration_doc, is_constructor_name, parse_signature, Owner};
use crate::model::{Access, Class, EnumMember, Event, Method, Property};
use crate::scanner::{block_end, BlockKind, Line, LineKind};
use crate::signature::{build_signature, parse_classdef_header, parse_function_header};
use crate::ParseOptions;
use regex::Regex;
use std::sync::LazyLock;

static RE_EVENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]\w*$").unwrap());

static RE_ENUM_MEMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]\w*)\s*(?:\((.*)\))?$").unwrap());

/// Parse the class whose `BlockOpen` is at `lines[open]`.
///
/// Returns the class (`None` if the header is malformed, reported as a
/// `Signature` warning) and the index just past its `end`.
pub fn parse_class(
    lines: &[Line],
    open: usize,
    options: &ParseOptions,
    diag: &mut Diagnostics,
) -> (Option<Class>, usize) {
    let close = block_end(lines, open);
    let next = (close + 1).min(lines.len());
    let line = &lines[open];
    let LineKind::BlockOpen {
        attributes, header, ..
    } = &line.kind
    else {
        return (None, next);
    };
    let Some(parsed) = parse_classdef_header(header) else {
        diag.warn(
            line.number,
            WarningKind::Signature,
            format!("cannot parse classdef header `{header}`"),
        );
        return (None, next);
    };
    let attrs = Attributes::parse(attributes.as_deref(), BlockKind::Classdef, line.number, diag);
    let (doc, consumed) = declaration_doc(lines, open, options.doc_placement);

    let mut class = Class {
        name: parsed.name,
        superclasses: parsed.superclasses,
        is_abstract: attrs.flag("Abstract"),
        is_sealed: attrs.flag("Sealed"),
        is_hidden: attrs.flag("Hidden"),
        doc,
        properties: Vec::new(),
        methods: Vec::new(),
        events: Vec::new(),
        enumeration: Vec::new(),
    };

    let body = &lines[open + 1..close.min(lines.len())];
    let mut property_blocks = 0;
    let mut i = consumed;
    while i < body.len() {
        let line = &body[i];
        match &line.kind {
            LineKind::BlockOpen { kind, attributes, .. } => {
                let end = block_end(body, i);
                let section = &body[i + 1..end.min(body.len())];
                let attrs = Attributes::parse(attributes.as_deref(), *kind, line.number, diag);
                match kind {
                    BlockKind::Properties => {
                        parse_properties(section, &attrs, property_blocks, line.number, &mut class, diag);
                        property_blocks += 1;
                    }
                    BlockKind::Methods => {
                        parse_methods(section, &attrs, line.number, &mut class, options, diag)
                    }
                    BlockKind::Events => parse_events(section, &mut class, diag),
                    BlockKind::Enumeration => parse_enumeration(section, &mut class, diag),
                    other => diag.warn(
                        line.number,
                        WarningKind::UnexpectedStatement,
                        format!("`{}` block directly inside `classdef` ignored", other.keyword()),
                    ),
                }
                i = end + 1;
            }
            LineKind::Code(text) => {
                diag.warn(
                    line.number,
                    WarningKind::UnexpectedStatement,
                    format!("statement `{text}` directly inside `classdef` ignored"),
                );
                i += 1;
            }
            LineKind::Blank | LineKind::Comment(_) | LineKind::BlockClose => i += 1,
        }
    }

    tracing::debug!(
        target: "matdoc_syntax",
        class = %class.name,
        properties = class.properties.len(),
        methods = class.methods.len(),
        "parsed classdef"
    );
    (Some(class), next)
}

// -- properties ---------------------------------------------------------------

fn parse_properties(
    body: &[Line],
    attrs: &Attributes,
    block: usize,
    line: usize,
    class: &mut Class,
    diag: &mut Diagnostics,
) {
    // read access decides visibility; `Access` sets both
    let access = match attrs.access("GetAccess", line, diag) {
        Some(access) => access,
        None => attrs.access("Access", line, diag).unwrap_or(Access::Public),
    };
    let is_constant = attrs.flag("Constant");
    let is_dependent = attrs.flag("Dependent");
    let is_hidden = attrs.flag("Hidden");
    let is_abstract = attrs.flag("Abstract");

    let mut i = 0;
    while i < body.len() {
        let line = &body[i];
        match &line.kind {
            LineKind::Code(text) => {
                let following = comment_run(body, i + 1);
                let doc = trailing_doc(line.trailing_comment.as_deref(), &following);
                i += 1 + following.len();
                let Some(decl) = parse_declaration(text, false, line.number, diag) else {
                    continue;
                };
                class.properties.push(Property {
                    name: decl.name,
                    size: decl.size,
                    type_name: decl.type_name,
                    validators: decl.validators,
                    default: decl.default,
                    access: access.clone(),
                    doc,
                    block,
                    is_constant,
                    is_dependent,
                    is_hidden,
                    is_abstract,
                });
            }
            LineKind::BlockOpen { kind, .. } => {
                diag.warn(
                    line.number,
                    WarningKind::UnexpectedStatement,
                    format!("`{}` block inside `properties` ignored", kind.keyword()),
                );
                i = block_end(body, i) + 1;
            }
            LineKind::Blank | LineKind::Comment(_) | LineKind::BlockClose => i += 1,
        }
    }
}

// -- methods ------------------------------------------------------------------

fn parse_methods(
    body: &[Line],
    attrs: &Attributes,
    line: usize,
    class: &mut Class,
    options: &ParseOptions,
    diag: &mut Diagnostics,
) {
    let access = attrs.access("Access", line, diag).unwrap_or(Access::Public);
    let is_static = attrs.flag("Static");
    let is_abstract = attrs.flag("Abstract");
    let is_hidden = attrs.flag("Hidden");
    let is_sealed = attrs.flag("Sealed");
    let owner = Owner::Class {
        name: &class.name,
        is_static,
    };

    let mut methods = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let line = &body[i];
        let (signature, has_body) = match &line.kind {
            LineKind::BlockOpen {
                kind: BlockKind::Function,
                ..
            } => {
                let end = block_end(body, i);
                let parsed = parse_signature(body, i, end, owner, options, diag);
                i = end + 1;
                // nested functions of a method are implementation detail
                (parsed.map(|(signature, _)| signature), true)
            }
            LineKind::BlockOpen { kind, .. } => {
                diag.warn(
                    line.number,
                    WarningKind::UnexpectedStatement,
                    format!("`{}` block inside `methods` ignored", kind.keyword()),
                );
                i = block_end(body, i) + 1;
                continue;
            }
            LineKind::Code(text) => {
                // signature without body: abstract, or defined in its own file
                let (doc, consumed) = declaration_doc(body, i, options.doc_placement);
                i += 1 + consumed;
                let Some(header) = parse_function_header(text) else {
                    diag.warn(
                        line.number,
                        WarningKind::UnexpectedStatement,
                        format!("statement `{text}` inside `methods` ignored"),
                    );
                    continue;
                };
                let implicit_self = !is_static && !is_constructor_name(&class.name, &header.name);
                let signature = build_signature(&header, Vec::new(), doc, implicit_self, line.number, diag);
                (Some(signature), false)
            }
            LineKind::Blank | LineKind::Comment(_) | LineKind::BlockClose => {
                i += 1;
                continue;
            }
        };

        if let Some(signature) = signature {
            methods.push(Method {
                is_constructor: is_constructor_name(&class.name, &signature.name),
                signature,
                access: access.clone(),
                is_static,
                is_abstract,
                is_hidden,
                is_sealed,
                has_body,
            });
        }
    }
    class.methods.extend(methods);
}

// -- events / enumeration -----------------------------------------------------

fn parse_events(body: &[Line], class: &mut Class, diag: &mut Diagnostics) {
    let mut i = 0;
    while i < body.len() {
        let line = &body[i];
        i += 1;
        let LineKind::Code(text) = &line.kind else {
            continue;
        };
        let following = comment_run(body, i);
        i += following.len();
        if RE_EVENT.is_match(text) {
            class.events.push(Event {
                name: text.clone(),
                doc: trailing_doc(line.trailing_comment.as_deref(), &following),
            });
        } else {
            diag.warn(
                line.number,
                WarningKind::ParameterSyntax,
                format!("cannot parse event `{text}`"),
            );
        }
    }
}

fn parse_enumeration(body: &[Line], class: &mut Class, diag: &mut Diagnostics) {
    let mut i = 0;
    while i < body.len() {
        let line = &body[i];
        i += 1;
        let LineKind::Code(text) = &line.kind else {
            continue;
        };
        let following = comment_run(body, i);
        i += following.len();
        match RE_ENUM_MEMBER.captures(text) {
            Some(caps) => class.enumeration.push(EnumMember {
                name: caps[1].to_string(),
                args: caps.get(2).map(|m| m.as_str().trim().to_string()),
                doc: trailing_doc(line.trailing_comment.as_deref(), &following),
            }),
            None => diag.warn(
                line.number,
                WarningKind::ParameterSyntax,
                format!("cannot parse enumeration member `{text}`"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    fn parse(source: &str) -> (Class, Diagnostics) {
        let mut diag = Diagnostics::new("test");
        let lines = scan(source, &mut diag);
        assert!(!diag.has_errors(), "{:?}", diag.errors());
        let (class, _) = parse_class(&lines, 0, &ParseOptions::default(), &mut diag);
        (class.unwrap(), diag)
    }

    const ACCOUNT: &str = "\
classdef (Sealed) Account < handle & matlab.mixin.Copyable
    % ACCOUNT A bank account.

    properties
        Balance (1,1) double = 0 % Current balance
        Owner string              % Account holder
    end

    properties (Access = private)
        privateProp
    end

    properties (SetAccess = private, GetAccess = protected, Constant)
        Limit = 100 % Overdraft limit
    end

    methods
        function obj = Account(owner)
            % Create an account.
            obj.Owner = owner;
        end

        function deposit(obj, amount)
            % Add money.
            arguments
                obj
                amount (1,1) double {mustBePositive}
            end
            obj.Balance = obj.Balance + amount;
        end
    end

    methods (Static)
        function a = empty()
        end
    end

    methods (Access = protected)
        function audit(obj)
        end
    end
end
";

    #[test]
    fn header_and_doc() {
        let (class, diag) = parse(ACCOUNT);
        assert!(diag.warnings().is_empty(), "{:?}", diag.warnings());
        assert_eq!(class.name, "Account");
        assert_eq!(class.superclasses, vec!["handle", "matlab.mixin.Copyable"]);
        assert!(class.is_sealed);
        assert!(!class.is_abstract);
        assert_eq!(class.doc.summary(), Some("ACCOUNT A bank account."));
    }

    #[test]
    fn properties_keep_order_access_and_docs() {
        let (class, _) = parse(ACCOUNT);
        let names: Vec<_> = class.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Balance", "Owner", "privateProp", "Limit"]);

        let balance = class.property("Balance").unwrap();
        assert_eq!(balance.doc.as_deref(), Some("Current balance"));
        assert_eq!(balance.default.as_deref(), Some("0"));
        assert_eq!(balance.block, 0);

        let private = class.property("privateProp").unwrap();
        assert_eq!(private.access, Access::Private);
        assert_eq!(private.doc, None);
        assert!(!private.is_documentable());

        let limit = class.property("Limit").unwrap();
        assert_eq!(limit.access, Access::Protected);
        assert!(limit.is_constant);
        assert_eq!(limit.block, 2);
    }

    #[test]
    fn methods_flags_and_implicit_object() {
        let (class, _) = parse(ACCOUNT);
        let ctor = class.constructor().unwrap();
        assert_eq!(ctor.name(), "Account");
        assert_eq!(ctor.signature.inputs[0].name, "owner");

        let deposit = class.method("deposit").unwrap();
        assert!(!deposit.is_constructor);
        assert_eq!(deposit.signature.inputs.len(), 1);
        assert_eq!(deposit.signature.inputs[0].name, "amount");
        assert_eq!(deposit.signature.doc.summary(), Some("Add money."));

        let empty = class.method("empty").unwrap();
        assert!(empty.is_static);
        assert!(empty.signature.inputs.is_empty());

        let audit = class.method("audit").unwrap();
        assert_eq!(audit.access, Access::Protected);
        assert!(!audit.is_documentable());
    }

    #[test]
    fn abstract_declarations_without_body() {
        let (class, _) = parse(
            "classdef (Abstract) Shape\n methods (Abstract)\n  a = area(obj) % Area of the shape\n  draw(obj, ax)\n end\nend\n",
        );
        assert!(class.is_abstract);
        assert_eq!(class.methods.len(), 2);
        let area = class.method("area").unwrap();
        assert!(!area.has_body);
        assert!(area.is_abstract);
        assert!(area.signature.inputs.is_empty());
        assert_eq!(area.signature.doc.summary(), Some("Area of the shape"));
        assert_eq!(class.method("draw").unwrap().signature.inputs[0].name, "ax");
    }

    #[test]
    fn events_and_enumeration() {
        let (class, _) = parse(
            "classdef Color\n enumeration\n  Red (1, 0, 0) % Pure red\n  Green, Blue\n end\n events\n  Changed % Fired on change\n end\nend\n",
        );
        let names: Vec<_> = class.enumeration.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Red", "Green", "Blue"]);
        assert_eq!(class.enumeration[0].args.as_deref(), Some("1, 0, 0"));
        assert_eq!(class.enumeration[0].doc.as_deref(), Some("Pure red"));
        assert_eq!(class.events[0].name, "Changed");
        assert_eq!(class.events[0].doc.as_deref(), Some("Fired on change"));
    }

    #[test]
    fn unsupported_section_attribute_warns() {
        let (_, diag) = parse("classdef C\n properties (Static)\n  x\n end\nend\n");
        assert_eq!(diag.warnings()[0].kind, WarningKind::Attribute);
    }
}
