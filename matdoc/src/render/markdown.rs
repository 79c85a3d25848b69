//! GitHub-flavored markdown renderer.
//!
//! Walks the model through [`Node`] so every entity kind is handled in one
//! exhaustive match.

use crate::render::Renderer;
use crate::toc;
use anyhow::Result;
use matdoc_syntax::model::{
    Access, Class, DocBlock, EnumMember, Event, FunctionKind, Item, Method, Parameter, Property, Signature,
    Validator,
};
use matdoc_syntax::{Module, Node};

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, module: &Module) -> Result<String> {
        let mut lines: Vec<String> = Vec::new();
        render_node(&mut lines, Node::Module(module), 1, "");
        let mut output = lines.join("\n");
        output.push('\n');
        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

fn render_node(lines: &mut Vec<String>, node: Node<'_>, level: usize, parent: &str) {
    match node {
        Node::Module(module) => {
            lines.push(format!("# {}\n", module.name));
            if let Some(doc) = &module.doc {
                render_doc(lines, doc);
            }
            let index = index_entries(module);
            if !index.is_empty() {
                lines.push("## Index\n".to_string());
                for entry in &index {
                    lines.push(toc::render_toc_item(entry));
                }
                lines.push(String::new());
            }
            for child in node.children() {
                render_node(lines, child, level + 1, "");
            }
        }
        Node::Function(function) => {
            let name = qualified(parent, function.name());
            lines.push(format!("{} {}\n", heading(level), name));
            let badge = match function.kind {
                FunctionKind::Primary => None,
                FunctionKind::Local => Some("`local`"),
                FunctionKind::Nested => Some("`nested`"),
            };
            if let Some(badge) = badge {
                lines.push(format!("> {}\n", badge));
            }
            render_signature(lines, &function.signature, "function ", level);
            for child in node.children() {
                render_node(lines, child, level + 1, &name);
            }
        }
        Node::Class(class) => {
            lines.push(format!("{} {}\n", heading(level), class.name));
            let badges = class_badges(class);
            if !badges.is_empty() {
                lines.push(format!("> {}\n", badges.join(" ")));
            }
            lines.push("```matlab".to_string());
            lines.push(classdef_line(class));
            lines.push("```\n".to_string());
            render_doc(lines, &class.doc);

            let children = node.children();
            let (properties, methods): (Vec<_>, Vec<_>) =
                children.into_iter().partition(|c| matches!(c, Node::Property(_)));
            if !properties.is_empty() {
                lines.push(format!("{} Properties\n", heading(level + 1)));
                for child in properties {
                    render_node(lines, child, level + 1, &class.name);
                }
                lines.push(String::new());
            }
            render_members(lines, "Events", class.events.iter().map(render_event), level + 1);
            render_members(
                lines,
                "Enumeration",
                class.enumeration.iter().map(render_enum_member),
                level + 1,
            );
            for child in methods {
                render_node(lines, child, level + 1, &class.name);
            }
        }
        Node::Property(property) => lines.push(format!("* {}", render_property(property))),
        Node::Method(method) => {
            lines.push(format!("{} {}\n", heading(level), qualified(parent, method.name())));
            let badges = method_badges(method);
            if !badges.is_empty() {
                lines.push(format!("> {}\n", badges.join(" ")));
            }
            let keyword = if method.has_body { "function " } else { "" };
            render_signature(lines, &method.signature, keyword, level);
        }
    }
}

/// Top-level items plus class methods, in document order.
fn index_entries(module: &Module) -> Vec<String> {
    let mut entries = Vec::new();
    for item in &module.items {
        entries.push(item.name().to_string());
        if let Item::Class(class) = item {
            for method in &class.methods {
                entries.push(qualified(&class.name, method.name()));
            }
        }
    }
    entries
}

fn heading(level: usize) -> String {
    "#".repeat(level.min(6))
}

fn qualified(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn render_doc(lines: &mut Vec<String>, doc: &DocBlock) {
    for paragraph in &doc.paragraphs {
        lines.push(paragraph.text());
        lines.push(String::new());
    }
}

fn render_signature(lines: &mut Vec<String>, signature: &Signature, keyword: &str, level: usize) {
    lines.push("```matlab".to_string());
    lines.push(format!("{}{}", keyword, call_line(signature)));
    lines.push("```\n".to_string());
    render_doc(lines, &signature.doc);
    render_parameters(lines, "Parameters", &signature.inputs, level + 1);
    render_parameters(lines, "Returns", &signature.outputs, level + 1);
}

fn render_parameters(lines: &mut Vec<String>, title: &str, params: &[Parameter], level: usize) {
    if params.is_empty() {
        return;
    }
    lines.push(format!("{} {}\n", heading(level), title));
    for param in params {
        lines.push(format!("* {}", render_parameter(param)));
    }
    lines.push(String::new());
}

fn render_members(lines: &mut Vec<String>, title: &str, entries: impl Iterator<Item = String>, level: usize) {
    let entries: Vec<String> = entries.collect();
    if entries.is_empty() {
        return;
    }
    lines.push(format!("{} {}\n", heading(level), title));
    for entry in entries {
        lines.push(format!("* {}", entry));
    }
    lines.push(String::new());
}

// -- Entries ------------------------------------------------------------------

/// `[a, b] = name(x, y)`, listing header-level parameters only.
fn call_line(signature: &Signature) -> String {
    let names = |params: &[Parameter]| -> Vec<String> {
        params
            .iter()
            .filter(|p| p.namespace.is_none())
            .map(|p| p.name.clone())
            .collect()
    };
    let inputs = names(&signature.inputs).join(", ");
    let outputs = names(&signature.outputs);
    let call = format!("{}({})", signature.name, inputs);
    match outputs.as_slice() {
        [] => call,
        [single] => format!("{} = {}", single, call),
        _ => format!("[{}] = {}", outputs.join(", "), call),
    }
}

fn classdef_line(class: &Class) -> String {
    if class.superclasses.is_empty() {
        format!("classdef {}", class.name)
    } else {
        format!("classdef {} < {}", class.name, class.superclasses.join(" & "))
    }
}

/// `**name** (details): doc`
fn entry(name: &str, details: &[String], doc: Option<&str>) -> String {
    let mut out = format!("**{}**", name);
    if !details.is_empty() {
        out.push_str(&format!(" ({})", details.join(", ")));
    }
    if let Some(doc) = doc {
        out.push_str(&format!(": {}", doc));
    }
    out
}

fn type_details(
    size: Option<&str>,
    type_name: Option<&str>,
    validators: &[Validator],
    default: Option<&str>,
) -> Vec<String> {
    let mut details = Vec::new();
    let declared: Vec<&str> = [size, type_name].into_iter().flatten().collect();
    if !declared.is_empty() {
        details.push(format!("`{}`", declared.join(" ")));
    }
    if !validators.is_empty() {
        let list: Vec<String> = validators
            .iter()
            .map(|v| match &v.args {
                Some(args) => format!("{}({})", v.name, args),
                None => v.name.clone(),
            })
            .collect();
        details.push(format!("`{{{}}}`", list.join(", ")));
    }
    if let Some(default) = default {
        details.push(format!("default `{}`", default));
    }
    details
}

fn render_parameter(param: &Parameter) -> String {
    let mut details = type_details(
        param.size.as_deref(),
        param.type_name.as_deref(),
        &param.validators,
        param.default.as_deref(),
    );
    if param.is_repeating {
        details.push("repeating".to_string());
    }
    entry(&param.qualified_name(), &details, param.doc.as_deref())
}

fn render_property(property: &Property) -> String {
    let mut details = type_details(
        property.size.as_deref(),
        property.type_name.as_deref(),
        &property.validators,
        property.default.as_deref(),
    );
    if let Some(access) = access_badge(&property.access) {
        details.push(access);
    }
    for (flag, label) in [
        (property.is_constant, "constant"),
        (property.is_dependent, "dependent"),
        (property.is_hidden, "hidden"),
        (property.is_abstract, "abstract"),
    ] {
        if flag {
            details.push(label.to_string());
        }
    }
    entry(&property.name, &details, property.doc.as_deref())
}

fn render_event(event: &Event) -> String {
    entry(&event.name, &[], event.doc.as_deref())
}

fn render_enum_member(member: &EnumMember) -> String {
    let details: Vec<String> = member.args.iter().map(|a| format!("`({})`", a)).collect();
    entry(&member.name, &details, member.doc.as_deref())
}

// -- Badges -------------------------------------------------------------------

fn access_badge(access: &Access) -> Option<String> {
    match access {
        Access::Public => None,
        Access::Protected => Some("protected".to_string()),
        Access::Private => Some("private".to_string()),
        Access::Restricted(classes) => Some(format!("access: {}", classes.join(", "))),
    }
}

fn class_badges(class: &Class) -> Vec<String> {
    [
        (class.is_abstract, "abstract"),
        (class.is_sealed, "sealed"),
        (class.is_hidden, "hidden"),
    ]
    .into_iter()
    .filter(|(flag, _)| *flag)
    .map(|(_, label)| format!("`{}`", label))
    .collect()
}

fn method_badges(method: &Method) -> Vec<String> {
    let mut badges: Vec<String> = Vec::new();
    if method.is_constructor {
        badges.push("`constructor`".to_string());
    }
    if let Some(access) = access_badge(&method.access) {
        badges.push(format!("`{}`", access));
    }
    for (flag, label) in [
        (method.is_static, "static"),
        (method.is_abstract, "abstract"),
        (method.is_sealed, "sealed"),
        (method.is_hidden, "hidden"),
    ] {
        if flag {
            badges.push(format!("`{}`", label));
        }
    }
    badges
}

#[cfg(test)]
mod tests {
    use super::*;
    use matdoc_syntax::model::Direction;
    use matdoc_syntax::{parse_module, ParseOptions};

    fn render(name: &str, source: &str) -> String {
        let parsed = parse_module(name, source, &ParseOptions::default()).unwrap();
        MarkdownRenderer.render(&parsed.module).unwrap()
    }

    #[test]
    fn parameter_with_everything() {
        let param = Parameter {
            size: Some("(1,1)".into()),
            type_name: Some("double".into()),
            validators: vec![Validator {
                name: "mustBePositive".into(),
                args: None,
            }],
            default: Some("1".into()),
            is_repeating: true,
            doc: Some("Step size.".into()),
            ..Parameter::stub("step", Direction::Input)
        };
        assert_eq!(
            render_parameter(&param),
            "**step** (`(1,1) double`, `{mustBePositive}`, default `1`, repeating): Step size."
        );
    }

    #[test]
    fn bare_parameter() {
        assert_eq!(render_parameter(&Parameter::stub("x", Direction::Input)), "**x**");
    }

    #[test]
    fn dotted_parameter_uses_qualified_name() {
        let param = Parameter {
            namespace: Some("opts".into()),
            type_name: Some("char".into()),
            ..Parameter::stub("Color", Direction::Input)
        };
        assert_eq!(render_parameter(&param), "**opts.Color** (`char`)");
    }

    #[test]
    fn call_line_shapes() {
        let sig = |inputs: &[&str], outputs: &[&str]| Signature {
            name: "f".into(),
            inputs: inputs.iter().map(|n| Parameter::stub(*n, Direction::Input)).collect(),
            outputs: outputs.iter().map(|n| Parameter::stub(*n, Direction::Output)).collect(),
            doc: DocBlock::default(),
        };
        assert_eq!(call_line(&sig(&[], &[])), "f()");
        assert_eq!(call_line(&sig(&["x"], &["y"])), "y = f(x)");
        assert_eq!(call_line(&sig(&["x", "y"], &["a", "b"])), "[a, b] = f(x, y)");
    }

    #[test]
    fn function_document() {
        let out = render(
            "scale",
            "\
function y = scale(x, factor)
% SCALE Multiply by a factor.
arguments
    x double % Values
    factor (1,1) double = 2 % Multiplier
end
y = x * factor;
end
",
        );
        assert!(out.starts_with("# scale\n\n## Index\n\n* [scale](#scale)\n"));
        assert!(out.contains("## scale\n"));
        assert!(out.contains("```matlab\nfunction y = scale(x, factor)\n```\n"));
        assert!(out.contains("SCALE Multiply by a factor.\n"));
        assert!(out.contains("### Parameters\n\n* **x** (`double`): Values\n"));
        assert!(out.contains("* **factor** (`(1,1) double`, default `2`): Multiplier\n"));
        assert!(out.contains("### Returns\n\n* **y**\n"));
    }

    #[test]
    fn class_document() {
        let out = render(
            "Point",
            "\
classdef (Sealed) Point < handle
    % POINT A point in the plane.
    properties
        X double = 0 % Abscissa
    end
    properties (Constant)
        Origin = 0 % Fixed origin
    end
    events
        Moved % Position changed
    end
    methods
        function d = norm(obj)
            % NORM Distance to the origin.
        end
    end
    methods (Static)
        function p = zero()
        end
    end
end
",
        );
        assert!(out.contains("* [Point.norm](#pointnorm)"));
        assert!(out.contains("## Point\n\n> `sealed`\n\n```matlab\nclassdef Point < handle\n```\n"));
        assert!(out.contains("POINT A point in the plane."));
        assert!(out.contains("### Properties\n\n* **X** (`double`, default `0`): Abscissa\n"));
        assert!(out.contains("* **Origin** (default `0`, constant): Fixed origin\n"));
        assert!(out.contains("### Events\n\n* **Moved**: Position changed\n"));
        assert!(out.contains("### Point.norm\n\n```matlab\nfunction d = norm()\n```\n"));
        assert!(out.contains("### Point.zero\n\n> `static`\n"));
    }
}
