//! Documentation object model for one MATLAB source unit.
//!
//! Built bottom-up in a single forward pass and immutable afterwards.
//! Ownership is strictly hierarchical: a [`Module`] owns its items, a
//! [`Class`] owns its properties and methods, a [`Signature`] owns its
//! parameters. Reverse lookups go through [`Module::owner_of`].

use serde::Serialize;

// -- Documentation ------------------------------------------------------------

/// A run of non-blank doc comment lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub lines: Vec<String>,
}

impl Paragraph {
    /// Lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// One `name : type` entry of a `Parameters`/`Returns` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionEntry {
    pub name: String,
    pub type_hint: Option<String>,
    pub description: String,
}

/// `Parameters` and `Returns` tables extracted from a doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredSection {
    pub parameters: Vec<SectionEntry>,
    pub returns: Vec<SectionEntry>,
}

impl StructuredSection {
    /// Entries of the table describing parameters of `direction`.
    pub fn entries(&self, direction: Direction) -> &[SectionEntry] {
        match direction {
            Direction::Input => &self.parameters,
            Direction::Output => &self.returns,
        }
    }

    pub fn lookup(&self, direction: Direction, name: &str) -> Option<&SectionEntry> {
        self.entries(direction).iter().find(|e| e.name == name)
    }
}

/// Paragraph-structured documentation attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocBlock {
    pub paragraphs: Vec<Paragraph>,
    pub structured: Option<StructuredSection>,
}

impl DocBlock {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.structured.is_none()
    }

    /// First line of the first paragraph, if any.
    pub fn summary(&self) -> Option<&str> {
        self.paragraphs
            .first()
            .and_then(|p| p.lines.first())
            .map(String::as_str)
    }
}

// -- Parameters and signatures ------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// Validator from a `{...}` list, kept as opaque name + call arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validator {
    pub name: String,
    pub args: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Set for `name.field` declarations: the grouping argument's name.
    pub namespace: Option<String>,
    /// Size spec stored verbatim, e.g. `(1,:)`.
    pub size: Option<String>,
    pub type_name: Option<String>,
    pub validators: Vec<Validator>,
    /// Raw default-value expression.
    pub default: Option<String>,
    pub is_repeating: bool,
    pub direction: Direction,
    pub doc: Option<String>,
}

impl Parameter {
    /// Header-only parameter: a name with everything else defaulted.
    pub fn stub(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            size: None,
            type_name: None,
            validators: Vec::new(),
            default: None,
            is_repeating: false,
            direction,
            doc: None,
        }
    }

    /// `namespace.name` for dotted parameters, `name` otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub doc: DocBlock,
}

impl Signature {
    pub fn input(&self, name: &str) -> Option<&Parameter> {
        self.inputs
            .iter()
            .find(|p| p.namespace.is_none() && p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&Parameter> {
        self.outputs
            .iter()
            .find(|p| p.namespace.is_none() && p.name == name)
    }

    /// Fields declared as `namespace.field` for the given grouping argument.
    pub fn namespace_fields<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a Parameter> + 'a {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .filter(move |p| p.namespace.as_deref() == Some(namespace))
    }
}

// -- Functions ----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    /// First function of a function file.
    Primary,
    /// Further top-level function in the same file.
    Local,
    /// Function defined inside another function's body.
    Nested,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub signature: Signature,
    pub kind: FunctionKind,
    pub nested: Vec<Function>,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.signature.name
    }
}

// -- Classes ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Protected,
    Private,
    /// Cell-array access list, e.g. `Access = {?OtherClass}`.
    Restricted(Vec<String>),
}

impl Access {
    pub fn is_public(&self) -> bool {
        matches!(self, Access::Public)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: String,
    pub size: Option<String>,
    pub type_name: Option<String>,
    pub validators: Vec<Validator>,
    pub default: Option<String>,
    pub access: Access,
    /// Same-line trailing comment (plus directly following comment lines).
    pub doc: Option<String>,
    /// Index of the `properties` section this property was declared in.
    pub block: usize,
    pub is_constant: bool,
    pub is_dependent: bool,
    pub is_hidden: bool,
    pub is_abstract: bool,
}

impl Property {
    /// Private (or access-list restricted) properties are kept but not documented.
    pub fn is_documentable(&self) -> bool {
        matches!(self.access, Access::Public | Access::Protected) && !self.is_hidden
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub signature: Signature,
    pub access: Access,
    pub is_static: bool,
    pub is_constructor: bool,
    pub is_abstract: bool,
    pub is_hidden: bool,
    pub is_sealed: bool,
    /// False for declaration-only methods (abstract or defined in a separate file).
    pub has_body: bool,
}

impl Method {
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Only public, visible methods are documented by default.
    pub fn is_documentable(&self) -> bool {
        self.access.is_public() && !self.is_hidden
    }
}

/// Member of an `events` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    pub doc: Option<String>,
}

/// Member of an `enumeration` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub args: Option<String>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class {
    pub name: String,
    pub superclasses: Vec<String>,
    pub is_abstract: bool,
    pub is_sealed: bool,
    pub is_hidden: bool,
    pub doc: DocBlock,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    pub events: Vec<Event>,
    pub enumeration: Vec<EnumMember>,
}

impl Class {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }

    pub fn constructor(&self) -> Option<&Method> {
        self.methods.iter().find(|m| m.is_constructor)
    }
}

// -- Modules ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Function(Function),
    Class(Class),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Function(f) => f.name(),
            Item::Class(c) => &c.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    /// Header comment block at the top of the unit (the script doc for scripts).
    pub doc: Option<DocBlock>,
    pub items: Vec<Item>,
}

impl Module {
    /// A unit with neither `function` nor `classdef` definitions.
    pub fn is_script(&self) -> bool {
        self.items.is_empty()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(f),
            Item::Class(_) => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(c) => Some(c),
            Item::Function(_) => None,
        })
    }

    pub fn find(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name() == name)
    }

    /// Class owning `method`, resolved by identity.
    pub fn owner_of(&self, method: &Method) -> Option<&Class> {
        self.classes()
            .find(|class| class.methods.iter().any(|m| std::ptr::eq(m, method)))
    }
}

// -- Traversal ----------------------------------------------------------------

/// Closed set of doc-bearing entities, for exhaustive-match traversal.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Module(&'a Module),
    Function(&'a Function),
    Class(&'a Class),
    Property(&'a Property),
    Method(&'a Method),
}

impl<'a> Node<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Node::Module(m) => &m.name,
            Node::Function(f) => f.name(),
            Node::Class(c) => &c.name,
            Node::Property(p) => &p.name,
            Node::Method(m) => m.name(),
        }
    }

    /// Direct children in declaration order.
    pub fn children(&self) -> Vec<Node<'a>> {
        match *self {
            Node::Module(m) => m
                .items
                .iter()
                .map(|item| match item {
                    Item::Function(f) => Node::Function(f),
                    Item::Class(c) => Node::Class(c),
                })
                .collect(),
            Node::Function(f) => f.nested.iter().map(Node::Function).collect(),
            Node::Class(c) => c
                .properties
                .iter()
                .map(Node::Property)
                .chain(c.methods.iter().map(Node::Method))
                .collect(),
            Node::Property(_) | Node::Method(_) => Vec::new(),
        }
    }

    /// Depth-first pre-order walk; `visit` receives each node and its depth.
    pub fn walk(self, visit: &mut impl FnMut(Node<'a>, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at(self, depth: usize, visit: &mut impl FnMut(Node<'a>, usize)) {
        visit(self, depth);
        for child in self.children() {
            child.walk_at(depth + 1, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str) -> Method {
        Method {
            signature: Signature {
                name: name.into(),
                inputs: Vec::new(),
                outputs: Vec::new(),
                doc: DocBlock::default(),
            },
            access: Access::Public,
            is_static: false,
            is_constructor: false,
            is_abstract: false,
            is_hidden: false,
            is_sealed: false,
            has_body: true,
        }
    }

    fn class(name: &str, methods: Vec<Method>) -> Class {
        Class {
            name: name.into(),
            superclasses: Vec::new(),
            is_abstract: false,
            is_sealed: false,
            is_hidden: false,
            doc: DocBlock::default(),
            properties: Vec::new(),
            methods,
            events: Vec::new(),
            enumeration: Vec::new(),
        }
    }

    #[test]
    fn qualified_name_of_dotted_parameter() {
        let mut p = Parameter::stub("Name", Direction::Input);
        assert_eq!(p.qualified_name(), "Name");
        p.namespace = Some("opts".into());
        assert_eq!(p.qualified_name(), "opts.Name");
    }

    #[test]
    fn owner_of_resolves_by_identity() {
        let module = Module {
            name: "m".into(),
            doc: None,
            items: vec![
                Item::Class(class("A", vec![method("run")])),
                Item::Class(class("B", vec![method("run")])),
            ],
        };
        let b = module.classes().nth(1).unwrap();
        let owner = module.owner_of(&b.methods[0]).unwrap();
        assert_eq!(owner.name, "B");
    }

    #[test]
    fn walk_visits_members_in_order() {
        let module = Module {
            name: "m".into(),
            doc: None,
            items: vec![Item::Class(class("A", vec![method("a"), method("b")]))],
        };
        let mut seen = Vec::new();
        Node::Module(&module).walk(&mut |node, depth| seen.push((node.name().to_string(), depth)));
        assert_eq!(
            seen,
            vec![
                ("m".to_string(), 0),
                ("A".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 2),
            ]
        );
    }

    #[test]
    fn private_property_is_not_documentable() {
        let prop = Property {
            name: "secret".into(),
            size: None,
            type_name: None,
            validators: Vec::new(),
            default: None,
            access: Access::Private,
            doc: None,
            block: 0,
            is_constant: false,
            is_dependent: false,
            is_hidden: false,
            is_abstract: false,
        };
        assert!(!prop.is_documentable());
    }
}
