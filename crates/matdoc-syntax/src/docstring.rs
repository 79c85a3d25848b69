//! Doc-comment extraction.
//!
//! A doc comment is a run of comment lines (leading `%` already removed by
//! the scanner). Blank lines split it into paragraphs; a paragraph opening
//! with a `Parameters`/`Returns` header is read as a `name : type` table.

use crate::model::{DocBlock, Paragraph, SectionEntry, StructuredSection};
use crate::scanner::{Line, LineKind};
use regex::Regex;
use std::sync::LazyLock;

static RE_SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(parameters|parameter|params|arguments|args|inputs|input|returns|return|outputs|output)\s*:?\s*$",
    )
    .unwrap()
});

static RE_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:-{2,}|={2,}|~{2,})\s*$").unwrap());

static RE_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]\w*(?:\.\w+)*)\s*(?::\s*(.*\S))?\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Parameters,
    Returns,
}

fn section_kind(line: &str) -> Option<SectionKind> {
    let caps = RE_SECTION_HEADER.captures(line)?;
    match caps[1].to_ascii_lowercase().as_str() {
        "returns" | "return" | "outputs" | "output" => Some(SectionKind::Returns),
        _ => Some(SectionKind::Parameters),
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Remove the indentation shared by all non-blank lines.
fn dedent<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(common..).unwrap_or(l.trim_start()).trim_end()
            }
        })
        .collect()
}

fn paragraphs<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut out: Vec<Vec<&str>> = Vec::new();
    let mut current = Vec::new();
    for line in lines {
        if line.is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(*line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Read `name : type` entries with more-indented description lines.
fn parse_entries(body: &[&str]) -> Vec<SectionEntry> {
    let Some(base) = body.first().map(|l| indent_of(l)) else {
        return Vec::new();
    };
    let mut entries: Vec<SectionEntry> = Vec::new();
    for line in body {
        let text = line.trim();
        if indent_of(line) <= base {
            if let Some(caps) = RE_ENTRY.captures(text) {
                entries.push(SectionEntry {
                    name: caps[1].to_string(),
                    type_hint: caps.get(2).map(|m| m.as_str().to_string()),
                    description: String::new(),
                });
                continue;
            }
        }
        if let Some(entry) = entries.last_mut() {
            if !entry.description.is_empty() {
                entry.description.push(' ');
            }
            entry.description.push_str(text);
        }
    }
    entries
}

/// Build a [`DocBlock`] from comment lines.
pub fn extract_docblock(lines: &[&str]) -> DocBlock {
    let lines = dedent(lines);
    let groups = paragraphs(&lines);
    let mut doc = DocBlock::default();
    let mut structured: Option<StructuredSection> = None;

    let mut i = 0;
    while i < groups.len() {
        let group = &groups[i];
        i += 1;
        let Some(kind) = section_kind(group[0]) else {
            doc.paragraphs.push(Paragraph {
                lines: group.iter().map(|l| l.to_string()).collect(),
            });
            continue;
        };

        let skip = if group.get(1).is_some_and(|l| RE_UNDERLINE.is_match(l)) {
            2
        } else {
            1
        };
        let mut body: &[&str] = &group[skip..];
        if body.is_empty() {
            // header separated from its table by a blank line
            if let Some(next) = groups.get(i).filter(|g| section_kind(g[0]).is_none()) {
                body = next;
                i += 1;
            }
        }

        let section = structured.get_or_insert_with(StructuredSection::default);
        let entries = parse_entries(body);
        match kind {
            SectionKind::Parameters => section.parameters.extend(entries),
            SectionKind::Returns => section.returns.extend(entries),
        }
    }

    doc.structured = structured;
    doc
}

/// Inline doc for a single declaration line.
///
/// `trailing` is the same-line comment (exactly one leading space dropped);
/// `following` are the comment-only lines directly below, which only
/// continue an existing trailing comment. Parts are joined with single spaces.
pub fn trailing_doc(trailing: Option<&str>, following: &[&str]) -> Option<String> {
    let first = trailing?;
    let first = first.strip_prefix(' ').unwrap_or(first).trim_end();
    let parts: Vec<&str> = std::iter::once(first)
        .filter(|t| !t.trim().is_empty())
        .chain(following.iter().map(|l| l.trim()).filter(|l| !l.is_empty()))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Doc for an `arguments` declaration: the same-line comment and the
/// comment-only lines directly below, either of which may be missing.
pub fn argument_doc(trailing: Option<&str>, following: &[&str]) -> Option<String> {
    trailing_doc(Some(trailing.unwrap_or_default()), following)
}

/// Comment texts of the contiguous comment lines starting at `from`.
pub fn comment_run(lines: &[Line], from: usize) -> Vec<&str> {
    lines
        .get(from..)
        .unwrap_or_default()
        .iter()
        .map_while(|line| match &line.kind {
            LineKind::Comment(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_splits_paragraphs() {
        let doc = extract_docblock(&[" First line", " still first", "", " Second"]);
        assert_eq!(doc.paragraphs.len(), 2);
        assert_eq!(doc.paragraphs[0].lines, vec!["First line", "still first"]);
        assert_eq!(doc.paragraphs[1].text(), "Second");
        assert!(doc.structured.is_none());
    }

    #[test]
    fn keeps_relative_indentation() {
        let doc = extract_docblock(&["  Example:", "      y = f(1)"]);
        assert_eq!(doc.paragraphs[0].lines, vec!["Example:", "    y = f(1)"]);
    }

    #[test]
    fn parameters_section_with_underline() {
        let doc = extract_docblock(&[
            " Add numbers.",
            "",
            " Parameters",
            " ----------",
            " a : double",
            "     First addend",
            "     spanning two lines.",
            " b",
            "     Second addend.",
            "",
            " Returns",
            " -------",
            " c : double",
            "     The sum.",
        ]);
        assert_eq!(doc.paragraphs.len(), 1);
        let section = doc.structured.unwrap();
        assert_eq!(section.parameters.len(), 2);
        assert_eq!(section.parameters[0].name, "a");
        assert_eq!(section.parameters[0].type_hint.as_deref(), Some("double"));
        assert_eq!(section.parameters[0].description, "First addend spanning two lines.");
        assert_eq!(section.parameters[1].type_hint, None);
        assert_eq!(section.returns[0].name, "c");
    }

    #[test]
    fn header_is_case_insensitive_and_may_stand_alone() {
        let doc = extract_docblock(&["ARGUMENTS:", "", "opts.Name : char", "  Display name"]);
        let section = doc.structured.unwrap();
        assert_eq!(section.parameters[0].name, "opts.Name");
        assert_eq!(section.parameters[0].description, "Display name");
        assert!(doc.paragraphs.is_empty());
    }

    #[test]
    fn empty_input_is_empty_doc() {
        assert!(extract_docblock(&[]).is_empty());
        assert!(extract_docblock(&["", "   "]).is_empty());
    }

    #[test]
    fn trailing_doc_drops_exactly_one_space() {
        assert_eq!(trailing_doc(Some("  indented"), &[]).as_deref(), Some(" indented"));
        assert_eq!(trailing_doc(Some(" plain"), &[]).as_deref(), Some("plain"));
    }

    #[test]
    fn trailing_doc_joins_following_comments() {
        assert_eq!(
            trailing_doc(Some(" Window length"), &["   in samples", ""]).as_deref(),
            Some("Window length in samples")
        );
        assert_eq!(trailing_doc(Some(""), &[" below an empty marker"]).as_deref(), Some("below an empty marker"));
        assert_eq!(trailing_doc(None, &[" comment above the next line"]), None);
        assert_eq!(trailing_doc(Some(""), &[]), None);
        assert_eq!(trailing_doc(None, &[]), None);
    }
}
