//! Caller-owned parse cache keyed by module name.
//!
//! Each entry remembers a SHA-256 digest of the text it was parsed from, so
//! handing in changed text for the same module re-parses it.

use crate::parser::parse_module;
use crate::{ParseOptions, ParseOutcome};
use sha2::{Digest, Sha256};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

fn digest(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug)]
struct Cached {
    digest: String,
    outcome: ParseOutcome,
}

#[derive(Debug, Default)]
pub struct ParseCache {
    options: ParseOptions,
    entries: HashMap<String, Cached>,
}

impl ParseCache {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Outcome for `name`, parsing `source` unless the cached entry was
    /// built from identical text.
    pub fn get_or_parse(&mut self, name: &str, source: &str) -> &ParseOutcome {
        let digest = digest(source);
        let options = self.options;
        let parse = || {
            tracing::debug!(target: "matdoc_syntax", module = name, "cache miss");
            Cached {
                digest: digest.clone(),
                outcome: parse_module(name, source, &options),
            }
        };
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                if slot.get().digest != digest {
                    slot.insert(parse());
                }
                &slot.into_mut().outcome
            }
            Entry::Vacant(slot) => &slot.insert(parse()).outcome,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParseOutcome> {
        self.entries.get(name).map(|c| &c.outcome)
    }

    /// Drop the entry for `name`; returns whether there was one.
    pub fn invalidate(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
