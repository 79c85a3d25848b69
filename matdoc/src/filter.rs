//! Member selection for rendering.
//!
//! The parsed model always holds every member; this decides which of them a
//! rendered document shows.

use matdoc_syntax::model::{Class, Function, FunctionKind, Item, Method, Module, Property};

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Show private, protected, access-restricted and hidden members.
    pub private_members: bool,
    /// Show members without any doc comment.
    pub undoc_members: bool,
}

impl RenderOptions {
    fn admits(&self, documentable: bool, documented: bool) -> bool {
        (documentable || self.private_members) && (documented || self.undoc_members)
    }
}

/// Copy of `module` holding only what should be rendered.
pub fn visible_module(module: &Module, options: &RenderOptions) -> Module {
    let items = module
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Function(f) => visible_function(f, options).map(Item::Function),
            Item::Class(c) => visible_class(c, options).map(Item::Class),
        })
        .collect();
    Module {
        name: module.name.clone(),
        doc: module.doc.clone(),
        items,
    }
}

/// The primary function is the module's public entry point and always
/// shown; local and nested helpers count as private.
fn visible_function(function: &Function, options: &RenderOptions) -> Option<Function> {
    let is_primary = function.kind == FunctionKind::Primary;
    if !is_primary && !options.admits(false, !function.signature.doc.is_empty()) {
        return None;
    }
    Some(Function {
        signature: function.signature.clone(),
        kind: function.kind,
        nested: function
            .nested
            .iter()
            .filter_map(|f| visible_function(f, options))
            .collect(),
    })
}

fn visible_class(class: &Class, options: &RenderOptions) -> Option<Class> {
    if class.is_hidden && !options.private_members {
        return None;
    }
    Some(Class {
        properties: class
            .properties
            .iter()
            .filter(|p| property_visible(p, options))
            .cloned()
            .collect(),
        methods: class
            .methods
            .iter()
            .filter(|m| method_visible(m, options))
            .cloned()
            .collect(),
        events: class
            .events
            .iter()
            .filter(|e| e.doc.is_some() || options.undoc_members)
            .cloned()
            .collect(),
        ..class.clone()
    })
}

fn property_visible(property: &Property, options: &RenderOptions) -> bool {
    options.admits(property.is_documentable(), property.doc.is_some())
}

fn method_visible(method: &Method, options: &RenderOptions) -> bool {
    options.admits(method.is_documentable(), !method.signature.doc.is_empty())
}
