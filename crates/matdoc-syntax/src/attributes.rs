//! Block attribute lists such as `(Access = private, Static, ~Hidden)`.
//!
//! The scanner hands these over verbatim; this module splits them into
//! name/value pairs and checks the names against what each block accepts.

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::model::Access;
use crate::scanner::{split_top_level, BlockKind};
use regex::Regex;
use std::sync::LazyLock;

static RE_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(~)?\s*([A-Za-z]\w*)\s*(?:=\s*(.*\S))?\s*$").unwrap());

static RE_META_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\?\s*([A-Za-z][\w.]*)$").unwrap());

// -- Accepted names per block -------------------------------------------------

const ARGUMENTS: &[&str] = &["Input", "Output", "Repeating"];

const PROPERTIES: &[&str] = &[
    "AbortSet",
    "Abstract",
    "Access",
    "Constant",
    "Dependent",
    "GetAccess",
    "GetObservable",
    "Hidden",
    "NonCopyable",
    "SetAccess",
    "SetObservable",
    "Transient",
    "ClassSetupParameter",
    "MethodSetupParameter",
    "TestParameter",
];

const METHODS: &[&str] = &[
    "Abstract",
    "Access",
    "Hidden",
    "Sealed",
    "Static",
    "Test",
    "TestClassSetup",
    "TestMethodSetup",
    "TestClassTeardown",
    "TestMethodTeardown",
    "ParameterCombination",
];

const CLASSDEF: &[&str] = &[
    "Abstract",
    "AllowedSubclasses",
    "ConstructOnLoad",
    "HandleCompatible",
    "Hidden",
    "InferiorClasses",
    "Sealed",
];

const EVENTS: &[&str] = &["Hidden", "ListenAccess", "NotifyAccess"];

/// Attribute names a block of `kind` accepts.
pub fn accepted(kind: BlockKind) -> &'static [&'static str] {
    match kind {
        BlockKind::Arguments => ARGUMENTS,
        BlockKind::Properties => PROPERTIES,
        BlockKind::Methods => METHODS,
        BlockKind::Classdef => CLASSDEF,
        BlockKind::Events => EVENTS,
        BlockKind::Function | BlockKind::Enumeration | BlockKind::Control => &[],
    }
}

// -- Parsed list --------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Raw text after `=`; `None` for a bare name. `~Name` is stored as `false`.
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    /// Parse the verbatim `( ... )` list of a block opened on `line`.
    ///
    /// Malformed entries and names `kind` does not accept are reported as
    /// `Attribute` warnings; unknown names are still kept.
    pub fn parse(raw: Option<&str>, kind: BlockKind, line: usize, diag: &mut Diagnostics) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let inner = raw
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(raw);

        let mut items = Vec::new();
        for entry in split_top_level(inner, &[',']) {
            let Some(caps) = RE_ATTRIBUTE.captures(&entry) else {
                diag.warn(
                    line,
                    WarningKind::Attribute,
                    format!("malformed `{}` attribute `{entry}`", kind.keyword()),
                );
                continue;
            };
            let name = caps[2].to_string();
            let value = if caps.get(1).is_some() {
                Some("false".to_string())
            } else {
                caps.get(3).map(|m| m.as_str().to_string())
            };
            if !accepted(kind).iter().any(|a| a.eq_ignore_ascii_case(&name)) {
                diag.warn(
                    line,
                    WarningKind::Attribute,
                    format!("attribute `{name}` is not supported on `{}` blocks", kind.keyword()),
                );
            }
            items.push(Attribute { name, value });
        }
        Self { items }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        // last occurrence wins, as in MATLAB
        self.items
            .iter()
            .rev()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|a| a.value.as_deref())
    }

    /// Boolean attribute. A bare name is true; `= expr` other than
    /// `true`/`false` cannot be evaluated and counts as true.
    pub fn flag(&self, name: &str) -> bool {
        match self.get(name) {
            None => false,
            Some(Attribute { value: None, .. }) => true,
            Some(Attribute { value: Some(v), .. }) => !v.eq_ignore_ascii_case("false") && v != "0",
        }
    }

    /// Access level from attribute `name`, if present.
    pub fn access(&self, name: &str, line: usize, diag: &mut Diagnostics) -> Option<Access> {
        let value = self.value(name)?;
        match parse_access(value) {
            Some(access) => Some(access),
            None => {
                diag.warn(
                    line,
                    WarningKind::Attribute,
                    format!("unrecognized `{name}` value `{value}`"),
                );
                None
            }
        }
    }
}

/// `public`, `protected`, `private`, `immutable` (readable by everyone), or
/// a meta-class list `{?A, ?B}` / `?A`.
pub fn parse_access(value: &str) -> Option<Access> {
    let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
    match value.to_ascii_lowercase().as_str() {
        "public" | "immutable" => return Some(Access::Public),
        "protected" => return Some(Access::Protected),
        "private" => return Some(Access::Private),
        _ => {}
    }

    let list = match value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
        Some(inner) => inner,
        None => value,
    };
    let entries = split_top_level(list, &[',', ' ']);
    if entries.is_empty() {
        // `{}` grants access to nobody outside the class
        return Some(Access::Private);
    }
    entries
        .iter()
        .map(|e| RE_META_CLASS.captures(e).map(|c| c[1].to_string()))
        .collect::<Option<Vec<_>>>()
        .map(Access::Restricted)
}
