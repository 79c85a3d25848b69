//! matdoc: generate documentation from MATLAB `.m` source files.
//!
//! Two modes:
//!
//! - **stdin mode**: `matdoc --name pkg.func < func.m` renders to stdout
//! - **file mode**: `matdoc -o docs/api src/ +pkg/*.m` writes one file per module

mod filter;
mod logging;
mod render;
mod toc;

use anyhow::{Context, Result};
use clap::Parser;
use matdoc_syntax::{parse_batch, parse_module, DocPlacement, ParseOptions, SourceUnit, Warning};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use crate::filter::{visible_module, RenderOptions};

#[derive(Parser)]
#[command(
    name = "matdoc",
    about = "Generate documentation from MATLAB source files"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads one unit from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: markdown (default), json
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Module name for stdin input
    #[arg(long, default_value = "stdin")]
    name: String,

    /// Document private, protected and hidden members
    #[arg(long)]
    private_members: bool,

    /// Document members that have no doc comment
    #[arg(long)]
    undoc_members: bool,

    /// Read doc comments from the lines above `function`/`classdef`
    #[arg(long)]
    doc_before_header: bool,

    /// Log parse progress (RUST_LOG overrides)
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            doc_placement: if self.doc_before_header {
                DocPlacement::BeforeHeader
            } else {
                DocPlacement::AfterHeader
            },
        }
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            private_members: self.private_members,
            undoc_members: self.undoc_members,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.files.is_empty() {
        return stdin_mode(&cli);
    }

    file_mode(&cli)
}

/// stdin mode: parse one unit from stdin, render to stdout.
fn stdin_mode(cli: &Cli) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let renderer = render::create_renderer(&cli.format)?;
    let parsed = parse_module(&cli.name, &input, &cli.parse_options())?;
    report(&parsed.warnings);
    let module = visible_module(&parsed.module, &cli.render_options());
    print!("{}", renderer.render(&module)?);
    Ok(())
}

/// file mode: parse every unit in parallel, write one document per module.
fn file_mode(cli: &Cli) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;
    let renderer = render::create_renderer(&cli.format)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let input_files = expand_globs(&cli.files)?;
    let mut units = Vec::with_capacity(input_files.len());
    for (name, path) in unique_modules(&input_files) {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        units.push(SourceUnit::new(name, text));
    }

    let ext = renderer.file_extension();
    let render_options = cli.render_options();
    for batch in parse_batch(&units, &cli.parse_options()) {
        let parsed = match batch.outcome {
            Ok(parsed) => parsed,
            Err(failure) => {
                report(&failure.warnings);
                for error in &failure.errors {
                    tracing::error!("{error}");
                }
                tracing::error!("skipping {}", batch.name);
                continue;
            }
        };
        report(&parsed.warnings);

        let module = visible_module(&parsed.module, &render_options);
        let out_path = output_dir.join(format!("{}.{}", batch.name, ext));
        let output = renderer.render(&module)?;
        fs::write(&out_path, &output)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        tracing::debug!(module = %batch.name, path = %out_path.display(), "written");
    }

    Ok(())
}

fn report(warnings: &[Warning]) {
    for warning in warnings {
        tracing::warn!("{warning}");
    }
}

/// Expand glob patterns into a list of `.m` files.
/// Directories are searched recursively so package folders are picked up.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let pattern = if path.is_dir() {
            format!("{}/**/*.m", pattern.trim_end_matches('/'))
        } else {
            pattern.clone()
        };
        let matches: Vec<_> = glob::glob(&pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file() && is_source(p))
            .collect();
        if matches.is_empty() {
            tracing::warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Pair each file with its module name. Output files are named after the
/// module, so a later file whose name is already taken is skipped.
fn unique_modules(files: &[PathBuf]) -> Vec<(String, &PathBuf)> {
    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    let mut modules = Vec::with_capacity(files.len());
    for path in files {
        let name = derive_module_name(path);
        if let Some(first) = seen.get(&name) {
            tracing::warn!(
                "skipping {}: module `{}` already comes from {}",
                path.display(),
                name,
                first.display()
            );
            continue;
        }
        seen.insert(name.clone(), path);
        modules.push((name, path));
    }
    modules
}

fn is_source(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("m")
}

/// Module name from a source path: the file stem, prefixed by the
/// enclosing `+package` folders.
/// "src/+bank/+io/load.m" → "bank.io.load", "src/Account.m" → "Account"
fn derive_module_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut packages: Vec<String> = Vec::new();
    if let Some(parent) = path.parent() {
        for component in parent.components().rev() {
            match component {
                Component::Normal(dir) => match dir.to_string_lossy().strip_prefix('+') {
                    Some(package) => packages.push(package.to_string()),
                    None => break,
                },
                _ => break,
            }
        }
    }
    packages.reverse();
    packages.push(stem);
    packages.join(".")
}
