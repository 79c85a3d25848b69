//! MATLAB source parsing for documentation generation.
//!
//! Turns the text of a `.m` file into a [`Module`](model::Module): functions
//! and classes with their signatures, `arguments`-block metadata, properties,
//! methods and doc comments. Recoverable oddities are returned as
//! [`Warning`]s next to the model; malformed block nesting fails the unit
//! with a [`ParseFailure`].
//!
//! ```
//! use matdoc_syntax::{parse_module, ParseOptions};
//!
//! let source = "function y = double_it(x)\n% DOUBLE_IT Twice the input.\ny = 2 * x;\nend\n";
//! let parsed = parse_module("double_it", source, &ParseOptions::default()).unwrap();
//! let function = parsed.module.functions().next().unwrap();
//! assert_eq!(function.signature.doc.summary(), Some("DOUBLE_IT Twice the input."));
//! ```

pub mod arguments;
pub mod attributes;
pub mod batch;
pub mod cache;
pub mod class;
pub mod declaration;
pub mod diagnostics;
pub mod docstring;
pub mod function;
pub mod model;
pub mod parser;
pub mod quote;
pub mod scanner;
pub mod signature;

pub use batch::{parse_batch, BatchOutcome, SourceUnit};
pub use cache::ParseCache;
pub use diagnostics::{Location, ParseFailure, StructureError, Warning, WarningKind};
pub use model::{Module, Node};
pub use parser::parse_module;

/// Where doc comments sit relative to the `function`/`classdef` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DocPlacement {
    /// MATLAB convention: comment lines right below the header.
    #[default]
    AfterHeader,
    /// Comment lines right above the header.
    BeforeHeader,
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    pub doc_placement: DocPlacement,
}

/// A successfully parsed unit and the warnings raised on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub module: Module,
    pub warnings: Vec<Warning>,
}

pub type ParseOutcome = Result<Parsed, ParseFailure>;
