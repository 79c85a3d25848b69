//! Declaration lines shared by `arguments` and `properties` blocks:
//!
//! ```text
//! name[.field] [(size)] [type] [{validators}] [= default]
//! ```

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::model::Validator;
use crate::scanner::{split_top_level, take_group};
use regex::Regex;
use std::sync::LazyLock;

static RE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]\w*)(?:\.([A-Za-z]\w*))?").unwrap());

static RE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]\w*(?:\.[A-Za-z]\w*)*").unwrap());

static RE_VALIDATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]\w*(?:\.[A-Za-z]\w*)*)\s*(?:\((.*)\))?$").unwrap());

/// One parsed declaration line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub namespace: Option<String>,
    pub size: Option<String>,
    pub type_name: Option<String>,
    pub validators: Vec<Validator>,
    pub default: Option<String>,
}

/// Parse a declaration, recovering from grammar errors.
///
/// A line that does not fit the grammar is reported as `ParameterSyntax` and
/// kept as an opaque declaration named by its leading identifier. Returns
/// `None` only when there is no leading identifier at all.
pub fn parse_declaration(
    text: &str,
    allow_namespace: bool,
    line: usize,
    diag: &mut Diagnostics,
) -> Option<Declaration> {
    match parse_strict(text, allow_namespace, line, diag) {
        Ok(decl) => Some(decl),
        Err(reason) => {
            let name = RE_NAME.captures(text.trim()).map(|c| c[1].to_string());
            let message = match &name {
                Some(name) => format!("cannot parse declaration of `{name}`: {reason}"),
                None => format!("cannot parse declaration `{}`: {reason}", text.trim()),
            };
            diag.warn(line, WarningKind::ParameterSyntax, message);
            name.map(|name| Declaration {
                name,
                ..Declaration::default()
            })
        }
    }
}

fn parse_strict(
    text: &str,
    allow_namespace: bool,
    line: usize,
    diag: &mut Diagnostics,
) -> Result<Declaration, String> {
    let text = text.trim();
    let caps = RE_NAME
        .captures(text)
        .ok_or_else(|| "expected a name".to_string())?;
    let whole = caps.get(0).map_or(0, |m| m.end());
    let mut decl = Declaration::default();
    match caps.get(2) {
        Some(field) if allow_namespace => {
            decl.namespace = Some(caps[1].to_string());
            decl.name = field.as_str().to_string();
        }
        Some(_) => return Err("dotted names are not allowed here".to_string()),
        None => decl.name = caps[1].to_string(),
    }

    let mut rest = text[whole..].trim_start();
    if rest.starts_with('(') {
        let (size, after) = take_group(rest, '(', ')').ok_or("unclosed size specification")?;
        decl.size = Some(size.to_string());
        rest = after.trim_start();
    }
    if let Some(m) = RE_TYPE.find(rest) {
        decl.type_name = Some(m.as_str().to_string());
        rest = rest[m.end()..].trim_start();
    }
    if rest.starts_with('{') {
        let (group, after) = take_group(rest, '{', '}').ok_or("unclosed validator list")?;
        decl.validators = parse_validators(&group[1..group.len() - 1], line, diag);
        rest = after.trim_start();
    }
    if let Some(default) = rest.strip_prefix('=') {
        let default = default.trim();
        if default.is_empty() {
            return Err("missing default value after `=`".to_string());
        }
        decl.default = Some(default.to_string());
        rest = "";
    }
    if !rest.is_empty() {
        return Err(format!("unexpected `{rest}`"));
    }
    Ok(decl)
}

/// Split a `{...}` body into validators. Entries that are not `name` or
/// `name(args)` are kept verbatim as the name and reported.
pub fn parse_validators(list: &str, line: usize, diag: &mut Diagnostics) -> Vec<Validator> {
    split_top_level(list, &[','])
        .into_iter()
        .map(|entry| match RE_VALIDATOR.captures(&entry) {
            Some(caps) => Validator {
                name: caps[1].to_string(),
                args: caps.get(2).map(|m| m.as_str().trim().to_string()),
            },
            None => {
                diag.warn(
                    line,
                    WarningKind::Validator,
                    format!("unrecognized validator `{entry}`"),
                );
                Validator {
                    name: entry,
                    args: None,
                }
            }
        })
        .collect()
}
