//! Lexical scanner: raw MATLAB text to classified logical lines.
//!
//! Three phases:
//!
//! 1. **Logical lines**: join `...` continuations and multi-line `[...]`/`{...}`
//!    literals, split code from trailing `%` comments, unfold `%{ ... %}`.
//! 2. **Statements**: split each logical line at top-level `,`/`;` and tag
//!    statements that start with a block keyword.
//! 3. **Balancing**: resolve context-dependent keywords (`properties`,
//!    `methods`, `arguments` are only keywords in the right parent block),
//!    match `end`s, and resynchronize after malformed nesting.
//!
//! Function files may omit `end` on every function. That style is detected
//! per unit: when the only blocks left open at end of file are functions,
//! the unit is rebalanced with each `function` line closing the previous one.

use crate::diagnostics::Diagnostics;
use crate::quote::QuoteTracker;
use regex::Regex;
use std::str::Lines;
use std::iter::Enumerate;
use std::sync::LazyLock;

static RE_LEADING_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]\w*)(.*)$").unwrap());

// -- Line model ---------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Classdef,
    Function,
    Arguments,
    Properties,
    Methods,
    Events,
    Enumeration,
    /// `if`, `for`, `parfor`, `while`, `switch`, `try`, `spmd`.
    Control,
}

impl BlockKind {
    pub fn keyword(self) -> &'static str {
        match self {
            BlockKind::Classdef => "classdef",
            BlockKind::Function => "function",
            BlockKind::Arguments => "arguments",
            BlockKind::Properties => "properties",
            BlockKind::Methods => "methods",
            BlockKind::Events => "events",
            BlockKind::Enumeration => "enumeration",
            BlockKind::Control => "control",
        }
    }

    /// Sections that may only appear directly inside a classdef.
    fn is_class_section(self) -> bool {
        matches!(
            self,
            BlockKind::Properties | BlockKind::Methods | BlockKind::Events | BlockKind::Enumeration
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// Comment-only line; text after the leading `%` run, indentation kept.
    Comment(String),
    Code(String),
    BlockOpen {
        kind: BlockKind,
        /// Parenthesized attribute list, verbatim, e.g. `(Access=private)`.
        attributes: Option<String>,
        /// Text after the keyword and attributes (signature for `function`/`classdef`).
        header: String,
    },
    BlockClose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based physical line the logical line starts on.
    pub number: usize,
    pub kind: LineKind,
    /// Text after `%` on the same line, leading `%` run removed.
    pub trailing_comment: Option<String>,
}

impl Line {
    fn new(number: usize, kind: LineKind) -> Self {
        Self {
            number,
            kind,
            trailing_comment: None,
        }
    }
}

// -- Phase 1: logical lines ---------------------------------------------------

/// A source line after continuation joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalLine {
    Blank(usize),
    Comment(usize, String),
    Code {
        number: usize,
        code: String,
        comment: Option<String>,
    },
}

/// Physical line split at its first code-level `%` or `...`.
struct SplitLine {
    code: String,
    comment: Option<String>,
    continued: bool,
}

fn split_code_comment(line: &str) -> SplitLine {
    let mask = QuoteTracker::literal_mask(line);
    for (ci, (byte, ch)) in line.char_indices().enumerate() {
        if mask[ci] {
            continue;
        }
        if ch == '%' {
            return SplitLine {
                code: line[..byte].to_string(),
                comment: Some(line[byte..].trim_start_matches('%').trim_end().to_string()),
                continued: false,
            };
        }
        if ch == '.' && line[byte..].starts_with("...") {
            // anything after the ellipsis is commentary
            return SplitLine {
                code: line[..byte].to_string(),
                comment: None,
                continued: true,
            };
        }
    }
    SplitLine {
        code: line.to_string(),
        comment: None,
        continued: false,
    }
}

/// Net count of open `[`/`{` outside literals.
fn open_brackets(code: &str) -> i32 {
    let mask = QuoteTracker::literal_mask(code);
    code.chars()
        .zip(mask)
        .filter(|(_, in_literal)| !in_literal)
        .map(|(ch, _)| match ch {
            '[' | '{' => 1,
            ']' | '}' => -1,
            _ => 0,
        })
        .sum()
}

/// Lazy iterator over logical lines.
pub struct LogicalLines<'a> {
    lines: Enumerate<Lines<'a>>,
    in_block_comment: bool,
}

impl<'a> LogicalLines<'a> {
    pub fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            lines: source.lines().enumerate(),
            in_block_comment: false,
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = LogicalLine;

    fn next(&mut self) -> Option<LogicalLine> {
        let (index, raw) = self.lines.next()?;
        let number = index + 1;
        let trimmed = raw.trim();

        if self.in_block_comment {
            if trimmed == "%}" {
                self.in_block_comment = false;
                return Some(LogicalLine::Comment(number, String::new()));
            }
            return Some(LogicalLine::Comment(number, raw.trim_end().to_string()));
        }
        if trimmed == "%{" {
            self.in_block_comment = true;
            return Some(LogicalLine::Comment(number, String::new()));
        }

        let first = split_code_comment(raw);
        let mut code = first.code;
        let mut comment = first.comment;
        let mut continued = first.continued;
        let mut depth = open_brackets(&code);

        while continued || depth > 0 {
            let Some((_, next)) = self.lines.next() else {
                break;
            };
            if !continued && next.trim().is_empty() {
                // unbalanced bracket; do not swallow the rest of the file
                break;
            }
            let part = split_code_comment(next);
            let joined = code.trim_end();
            let separator = if continued || joined.ends_with([';', ',', '[', '{']) {
                " "
            } else {
                "; "
            };
            code = format!("{}{}{}", joined, separator, part.code.trim_start());
            comment = part.comment;
            continued = part.continued;
            depth = open_brackets(&code);
        }

        if code.trim().is_empty() {
            return Some(match comment {
                Some(text) => LogicalLine::Comment(number, text),
                None => LogicalLine::Blank(number),
            });
        }
        Some(LogicalLine::Code {
            number,
            code,
            comment,
        })
    }
}

// -- Phase 2: statements ------------------------------------------------------

/// Split code at `,`/`;` outside literals and brackets.
pub fn split_statements(code: &str) -> Vec<String> {
    split_top_level(code, &[',', ';'])
}

/// Split `text` at any of `separators` outside literals and brackets.
/// Pieces are trimmed; empty pieces are dropped.
pub fn split_top_level(text: &str, separators: &[char]) -> Vec<String> {
    let mask = QuoteTracker::literal_mask(text);
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    let mut push = |piece: &str| {
        let piece = piece.trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
    };

    for (ci, (byte, ch)) in text.char_indices().enumerate() {
        if mask[ci] {
            continue;
        }
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = (depth - 1).max(0),
            c if depth == 0 && separators.contains(&c) => {
                push(&text[start..byte]);
                start = byte + c.len_utf8();
            }
            _ => {}
        }
    }
    push(&text[start..]);
    pieces
}

/// Split a leading `( ... )` group off `text`, respecting literals and nesting.
pub fn take_parenthesized(text: &str) -> Option<(&str, &str)> {
    take_group(text, '(', ')')
}

/// Split a leading `open ... close` group off `text`; `None` when `text` does
/// not start with `open` or the group never closes.
pub fn take_group(text: &str, open: char, close: char) -> Option<(&str, &str)> {
    if !text.starts_with(open) {
        return None;
    }
    let mask = QuoteTracker::literal_mask(text);
    let mut depth = 0i32;
    for (ci, (byte, ch)) in text.char_indices().enumerate() {
        if mask[ci] {
            continue;
        }
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let end = byte + ch.len_utf8();
                return Some((&text[..end], &text[end..]));
            }
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Candidate {
    Code,
    Close,
    Open {
        kind: BlockKind,
        attributes: Option<String>,
        header: String,
        /// Statement text sharing the opener's line, e.g. `arguments x double`.
        remainder: Option<String>,
    },
}

fn classify(statement: &str) -> Candidate {
    let Some(caps) = RE_LEADING_WORD.captures(statement) else {
        return Candidate::Code;
    };
    let word = caps.get(1).map_or("", |m| m.as_str());
    let rest = caps.get(2).map_or("", |m| m.as_str());
    let separated = rest.is_empty() || rest.starts_with(char::is_whitespace);

    match word {
        "end" if rest.trim().is_empty() => Candidate::Close,
        "function" if separated || rest.starts_with('[') => Candidate::Open {
            kind: BlockKind::Function,
            attributes: None,
            header: rest.trim().to_string(),
            remainder: None,
        },
        "classdef" if separated || rest.starts_with('(') => {
            let rest = rest.trim_start();
            let (attributes, header) = match take_parenthesized(rest) {
                Some((attrs, after)) => (Some(attrs.to_string()), after),
                None => (None, rest),
            };
            Candidate::Open {
                kind: BlockKind::Classdef,
                attributes,
                header: header.trim().to_string(),
                remainder: None,
            }
        }
        "arguments" | "properties" | "methods" | "events" | "enumeration" => {
            let kind = match word {
                "arguments" => BlockKind::Arguments,
                "properties" => BlockKind::Properties,
                "methods" => BlockKind::Methods,
                "events" => BlockKind::Events,
                _ => BlockKind::Enumeration,
            };
            let trimmed = rest.trim_start();
            let (attributes, after) = if let Some((attrs, after)) = take_parenthesized(trimmed) {
                (Some(attrs.to_string()), after.trim())
            } else if separated && !trimmed.starts_with('=') {
                (None, trimmed.trim())
            } else {
                return Candidate::Code;
            };
            Candidate::Open {
                kind,
                attributes,
                header: String::new(),
                remainder: (!after.is_empty()).then(|| after.to_string()),
            }
        }
        "if" | "for" | "parfor" | "while" | "switch" | "try" | "spmd"
            if separated || rest.starts_with(['(', '~', '[', '-', '\'']) =>
        {
            Candidate::Open {
                kind: BlockKind::Control,
                attributes: None,
                header: rest.trim().to_string(),
                remainder: None,
            }
        }
        _ => Candidate::Code,
    }
}

#[derive(Debug)]
enum Unit {
    Blank(usize),
    Comment(usize, String),
    Statement {
        number: usize,
        text: String,
        comment: Option<String>,
        candidate: Candidate,
    },
}

fn units(source: &str) -> Vec<Unit> {
    let mut units = Vec::new();
    for logical in LogicalLines::new(source) {
        match logical {
            LogicalLine::Blank(n) => units.push(Unit::Blank(n)),
            LogicalLine::Comment(n, text) => units.push(Unit::Comment(n, text)),
            LogicalLine::Code {
                number,
                code,
                comment,
            } => {
                let statements = split_statements(&code);
                let last = statements.len().saturating_sub(1);
                for (i, text) in statements.into_iter().enumerate() {
                    let candidate = classify(&text);
                    units.push(Unit::Statement {
                        number,
                        text,
                        comment: if i == last { comment.clone() } else { None },
                        candidate,
                    });
                }
            }
        }
    }
    units
}

// -- Phase 3: balancing -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    /// Every function is closed by `end`.
    Terminated,
    /// No function is closed by `end`; the next `function` line closes it.
    Unterminated,
}

#[derive(Debug)]
struct Frame {
    kind: BlockKind,
    line: usize,
    body_started: bool,
}

struct Balanced {
    lines: Vec<Line>,
    errors: Vec<(usize, String)>,
    /// Only function frames were left open at end of file, with no other error.
    endless_functions: bool,
}

struct Balancer {
    style: Style,
    stack: Vec<Frame>,
    lines: Vec<Line>,
    errors: Vec<(usize, String)>,
    saw_classdef: bool,
    /// Function frames closed by an explicit `end`.
    functions_ended: usize,
}

impl Balancer {
    fn new(style: Style) -> Self {
        Self {
            style,
            stack: Vec::new(),
            lines: Vec::new(),
            errors: Vec::new(),
            saw_classdef: false,
            functions_ended: 0,
        }
    }

    fn top_kind(&self) -> Option<BlockKind> {
        self.stack.last().map(|f| f.kind)
    }

    fn close(&mut self, number: usize) {
        self.stack.pop();
        self.lines.push(Line::new(number, LineKind::BlockClose));
    }

    /// Close the top frame because something arrived that cannot live inside it.
    fn close_unterminated(&mut self, number: usize) {
        if let Some(frame) = self.stack.last() {
            let message = format!(
                "unterminated `{}` block opened at line {}",
                frame.kind.keyword(),
                frame.line
            );
            self.errors.push((number, message));
        }
        self.close(number);
    }

    fn mark_body_started(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.kind == BlockKind::Function {
                frame.body_started = true;
            }
        }
    }

    fn code(&mut self, number: usize, text: String, comment: Option<String>) {
        self.mark_body_started();
        self.lines.push(Line {
            number,
            kind: LineKind::Code(text),
            trailing_comment: comment,
        });
    }

    fn open(
        &mut self,
        number: usize,
        kind: BlockKind,
        attributes: Option<String>,
        header: String,
        remainder: Option<String>,
        comment: Option<String>,
    ) {
        self.stack.push(Frame {
            kind,
            line: number,
            body_started: false,
        });
        let (open_comment, rest_comment) = match remainder {
            Some(_) => (None, comment),
            None => (comment, None),
        };
        self.lines.push(Line {
            number,
            kind: LineKind::BlockOpen {
                kind,
                attributes,
                header,
            },
            trailing_comment: open_comment,
        });
        if let Some(rest) = remainder {
            // `arguments x double`: the declaration belongs to the new block
            self.lines.push(Line {
                number,
                kind: LineKind::Code(rest),
                trailing_comment: rest_comment,
            });
        }
    }

    fn statement(&mut self, number: usize, text: String, comment: Option<String>, candidate: Candidate) {
        match candidate {
            Candidate::Code => self.code(number, text, comment),
            Candidate::Close => {
                if self.stack.is_empty() {
                    self.errors.push((number, "unmatched `end`".to_string()));
                } else {
                    if self.top_kind() == Some(BlockKind::Function) {
                        self.functions_ended += 1;
                    }
                    self.close(number);
                    if let Some(last) = self.lines.last_mut() {
                        last.trailing_comment = comment;
                    }
                }
            }
            Candidate::Open {
                kind,
                attributes,
                header,
                remainder,
            } => match kind {
                k if k.is_class_section() => {
                    let depth = self.stack.len();
                    let in_class = self.top_kind() == Some(BlockKind::Classdef);
                    let in_stale_section = depth >= 2
                        && self.stack[depth - 1].kind.is_class_section()
                        && self.stack[depth - 2].kind == BlockKind::Classdef;
                    if in_class {
                        self.open(number, kind, attributes, header, remainder, comment);
                    } else if in_stale_section {
                        self.close_unterminated(number);
                        self.open(number, kind, attributes, header, remainder, comment);
                    } else {
                        // e.g. `methods(obj)` called from a function body
                        self.code(number, text, comment);
                    }
                }
                BlockKind::Arguments => {
                    let accepts = matches!(
                        self.stack.last(),
                        Some(Frame { kind: BlockKind::Function, body_started: false, .. })
                    );
                    if accepts {
                        self.open(number, kind, attributes, header, remainder, comment);
                    } else {
                        self.code(number, text, comment);
                    }
                }
                BlockKind::Function => {
                    self.before_function(number);
                    self.mark_body_started();
                    self.open(number, kind, attributes, header, remainder, comment);
                }
                BlockKind::Classdef => {
                    if !self.stack.is_empty() {
                        self.errors
                            .push((number, "`classdef` must be the outermost block".to_string()));
                    }
                    self.saw_classdef = true;
                    self.open(number, kind, attributes, header, remainder, comment);
                }
                _ => {
                    self.mark_body_started();
                    self.open(number, kind, attributes, header, remainder, comment);
                }
            },
        }
    }

    fn before_function(&mut self, number: usize) {
        match self.style {
            Style::Unterminated => {
                while let Some(kind) = self.top_kind() {
                    if kind == BlockKind::Function {
                        self.close(number);
                    } else {
                        self.close_unterminated(number);
                    }
                }
            }
            Style::Terminated => {
                while matches!(
                    self.top_kind(),
                    Some(
                        BlockKind::Arguments
                            | BlockKind::Properties
                            | BlockKind::Events
                            | BlockKind::Enumeration
                    )
                ) {
                    self.close_unterminated(number);
                }
                if self.top_kind() == Some(BlockKind::Classdef) {
                    self.errors
                        .push((number, "`function` outside of a `methods` block".to_string()));
                }
            }
        }
    }

    fn finish(mut self, last_line: usize) -> Balanced {
        let clean = self.errors.is_empty();
        // a file either ends all of its functions or none of them
        let endless_functions = clean
            && self.functions_ended == 0
            && !self.saw_classdef
            && !self.stack.is_empty()
            && self.stack.iter().all(|f| f.kind == BlockKind::Function);

        while let Some(kind) = self.top_kind() {
            if self.style == Style::Unterminated && kind == BlockKind::Function {
                self.close(last_line);
            } else {
                self.close_unterminated(last_line);
            }
        }
        Balanced {
            lines: self.lines,
            errors: self.errors,
            endless_functions,
        }
    }
}

fn balance(units: &[Unit], style: Style) -> Balanced {
    let mut balancer = Balancer::new(style);
    let mut last_line = 0;
    for unit in units {
        match unit {
            Unit::Blank(n) => {
                last_line = *n;
                balancer.lines.push(Line::new(*n, LineKind::Blank));
            }
            Unit::Comment(n, text) => {
                last_line = *n;
                balancer
                    .lines
                    .push(Line::new(*n, LineKind::Comment(text.clone())));
            }
            Unit::Statement {
                number,
                text,
                comment,
                candidate,
            } => {
                last_line = *number;
                balancer.statement(*number, text.clone(), comment.clone(), candidate.clone());
            }
        }
    }
    balancer.finish(last_line)
}

// -- Public API ---------------------------------------------------------------

/// Scan a source unit into classified lines.
///
/// Structure errors are recorded in `diag`; the returned lines are always
/// balanced (every `BlockOpen` has a matching `BlockClose`, synthesized where
/// the source lacked one) so downstream parsers can keep going.
pub fn scan(source: &str, diag: &mut Diagnostics) -> Vec<Line> {
    let units = units(source);
    let mut balanced = balance(&units, Style::Terminated);
    if balanced.endless_functions {
        tracing::debug!(target: "matdoc_syntax", module = diag.module(), "functions without `end`");
        balanced = balance(&units, Style::Unterminated);
    }
    for (line, message) in balanced.errors {
        diag.error(line, message);
    }
    balanced.lines
}

/// Index of the `BlockClose` matching the `BlockOpen` at `open`
/// (`lines.len()` if there is none).
pub fn block_end(lines: &[Line], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, line) in lines.iter().enumerate().skip(open) {
        match line.kind {
            LineKind::BlockOpen { .. } => depth += 1,
            LineKind::BlockClose => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    lines.len()
}
