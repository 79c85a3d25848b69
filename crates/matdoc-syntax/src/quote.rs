//! Quote-tracking utilities for MATLAB source lines.
//!
//! MATLAB overloads `'` as both the char-array delimiter and the transpose
//! operator, so whether a quote opens a literal depends on the character in
//! front of it. Everything that scans for `%`, `...`, `,` or brackets has to
//! skip literal contents first.

/// Characters after which `'` starts a char-array literal rather than a transpose.
const STRING_OPENERS: &str = "([{,;=&|~<>+-*/\\^:@!";

/// Stateless quote analysis.
pub struct QuoteTracker;

impl QuoteTracker {
    /// Per-char mask (indexed like `line.chars()`): true when the char is part
    /// of a string literal, delimiters included.
    pub fn literal_mask(line: &str) -> Vec<bool> {
        let chars: Vec<char> = line.chars().collect();
        let mut mask = vec![false; chars.len()];
        let mut in_single = false;
        let mut in_double = false;
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            if in_single {
                mask[i] = true;
                if ch == '\'' {
                    // '' inside a char array is an escaped quote
                    if chars.get(i + 1) == Some(&'\'') {
                        mask[i + 1] = true;
                        i += 2;
                        continue;
                    }
                    in_single = false;
                }
            } else if in_double {
                mask[i] = true;
                if ch == '"' {
                    if chars.get(i + 1) == Some(&'"') {
                        mask[i + 1] = true;
                        i += 2;
                        continue;
                    }
                    in_double = false;
                }
            } else if ch == '"' {
                mask[i] = true;
                in_double = true;
            } else if ch == '\'' && Self::opens_literal(i.checked_sub(1).map(|p| chars[p])) {
                mask[i] = true;
                in_single = true;
            }
            i += 1;
        }
        mask
    }

    fn opens_literal(prev: Option<char>) -> bool {
        match prev {
            None => true,
            Some(c) => c.is_whitespace() || STRING_OPENERS.contains(c),
        }
    }
}
