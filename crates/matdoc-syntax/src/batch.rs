//! Parallel parsing of independent source units.

use crate::parser::parse_module;
use crate::{ParseOptions, ParseOutcome};
use rayon::prelude::*;

/// One module's name and full text, read before parsing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub name: String,
    pub outcome: ParseOutcome,
}

/// Parse every unit on the rayon pool. Outcomes come back in input order;
/// a unit that fails never affects its siblings.
pub fn parse_batch(units: &[SourceUnit], options: &ParseOptions) -> Vec<BatchOutcome> {
    units
        .par_iter()
        .map(|unit| BatchOutcome {
            name: unit.name.clone(),
            outcome: parse_module(&unit.name, &unit.text, options),
        })
        .collect()
}
