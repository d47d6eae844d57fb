//! pasdoc: outline Pascal/Delphi sources for documentation tooling.
//!
//! Two modes, as for any filter-style tool:
//!
//! - **stdin mode**: `pasdoc < unit.pas` prints the outline to stdout
//! - **file mode**: `pasdoc -f json -o out/ src/*.pas` writes one output per input
//!
//! `--prototype` parses a single signature instead of a file.

mod render;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use pasdoc_syntax::{outline_parser_for, OutlineParser, PascalOutlineParser, ScanOptions, PASCAL_EXTENSIONS};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pasdoc",
    about = "Outline Pascal/Delphi source files: declarations, signatures and documentation comments"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory; one `<name>.<ext>` per input. Stdout when omitted.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: tree (default), json
    #[arg(short = 'f', long, default_value = "tree")]
    format: String,

    /// Parse a single routine or property signature and print it.
    #[arg(long, value_name = "SIGNATURE")]
    prototype: Option<String>,

    /// Let comments of the same style nest (Free Pascal modes).
    #[arg(long)]
    nested_comments: bool,

    /// Only `{!`, `(**`, `///` and `//!` comments are documentation.
    #[arg(long)]
    strict_docs: bool,

    /// Blank lines allowed between a comment and the declaration it documents.
    #[arg(long, value_name = "LINES")]
    doc_gap: Option<u32>,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            nested_comments: self.nested_comments,
            brace_docs: !self.strict_docs,
            doc_gap: self.doc_gap,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(text) = cli.prototype.as_deref() {
        return prototype_mode(&cli, text);
    }
    if cli.files.is_empty() {
        return stdin_mode(&cli);
    }
    file_mode(&cli)
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "pasdoc=info,pasdoc_syntax=warn",
        1 => "pasdoc=debug,pasdoc_syntax=debug",
        _ => "pasdoc=trace,pasdoc_syntax=trace",
    }
}

/// prototype mode: parse one signature, print the entry.
fn prototype_mode(cli: &Cli, text: &str) -> Result<()> {
    let renderer = render::create_renderer(&cli.format)?;
    let entry = PascalOutlineParser::new(cli.scan_options()).parse_prototype(text);
    if entry.name.is_empty() {
        tracing::warn!(prototype = text, "not a routine or property signature");
    }
    print!("{}", renderer.render_entry(&entry)?);
    Ok(())
}

/// stdin mode: read from stdin, scan as Pascal, write to stdout.
fn stdin_mode(cli: &Cli) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let renderer = render::create_renderer(&cli.format)?;
    let parser = PascalOutlineParser::new(cli.scan_options());
    let output = parser.scan_file("<stdin>", &input);
    report_diagnostics("<stdin>", &output.diagnostics);
    print!("{}", renderer.render(&output)?);
    Ok(())
}

/// file mode: scan every input, write per-file outputs or concatenate to stdout.
fn file_mode(cli: &Cli) -> Result<()> {
    let renderer = render::create_renderer(&cli.format)?;
    let ext = renderer.file_extension();
    let options = cli.scan_options();

    if let Some(dir) = cli.output.as_deref() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    }

    let input_files = expand_globs(&cli.files)?;
    let mut stdout = String::new();
    for path in &input_files {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parser = match outline_parser_for(extension, &options) {
            Ok(parser) => parser,
            Err(e) => {
                tracing::warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let file = path.to_string_lossy();
        let output = parser.scan_file(&file, &content);
        tracing::debug!(file = %file, entries = output.tree.len(), "scanned");
        report_diagnostics(&file, &output.diagnostics);
        let rendered = renderer.render(&output)?;

        match cli.output.as_deref() {
            Some(dir) => {
                let out_path = dir.join(format!("{}.{}", derive_output_name(path), ext));
                fs::write(&out_path, &rendered)
                    .with_context(|| format!("failed to write {}", out_path.display()))?;
            }
            None => stdout.push_str(&rendered),
        }
    }
    print!("{}", stdout);
    Ok(())
}

fn report_diagnostics(file: &str, diagnostics: &[pasdoc_syntax::Diagnostic]) {
    for d in diagnostics {
        tracing::warn!("{}:{}", file, d);
    }
}

/// Resolve each argument as a file, a directory (its Pascal sources, not
/// recursive) or a glob pattern. The result is sorted and deduplicated.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let found = expand_one(pattern)?;
        if found.is_empty() {
            tracing::warn!("no files matched: {}", pattern);
        }
        files.extend(found);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn expand_one(pattern: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(pattern);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if path.is_dir() {
        let entries = fs::read_dir(path)
            .with_context(|| format!("failed to read directory: {}", path.display()))?;
        return Ok(entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && is_pascal_source(p))
            .collect());
    }
    Ok(glob::glob(pattern)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
        .flatten()
        .filter(|p| p.is_file())
        .collect())
}

fn is_pascal_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PASCAL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Derive the output file name (without extension) from a source path.
/// "src/Shapes.pas" → "Shapes", "Project1.dpr" → "Project1"
fn derive_output_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_from_pas() {
        assert_eq!(derive_output_name(Path::new("src/Shapes.pas")), "Shapes");
        assert_eq!(derive_output_name(Path::new("Shapes.pas")), "Shapes");
    }

    #[test]
    fn output_name_keeps_inner_dots() {
        assert_eq!(derive_output_name(Path::new("System.SysUtils.pas")), "System.SysUtils");
    }

    #[test]
    fn output_name_no_extension() {
        assert_eq!(derive_output_name(Path::new("Makefile")), "Makefile");
    }

    #[test]
    fn pascal_sources_by_extension() {
        assert!(is_pascal_source(Path::new("a.pas")));
        assert!(is_pascal_source(Path::new("Project.DPR")));
        assert!(is_pascal_source(Path::new("defs.inc")));
        assert!(!is_pascal_source(Path::new("readme.md")));
    }

    #[test]
    fn expansion_of_directories_and_globs() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["b.pas", "a.dpr", "notes.md"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let root = dir.path().to_string_lossy().into_owned();

        let from_dir = expand_globs(&[root.clone()]).unwrap();
        assert_eq!(from_dir, vec![dir.path().join("a.dpr"), dir.path().join("b.pas")]);

        let from_glob = expand_globs(&[format!("{}/*.pas", root), format!("{}/b.pas", root)]).unwrap();
        assert_eq!(from_glob, vec![dir.path().join("b.pas")]);

        assert!(expand_globs(&[format!("{}/*.none", root)]).unwrap().is_empty());
    }

    #[test]
    fn options_from_flags() {
        let cli = Cli::parse_from(["pasdoc", "--strict-docs", "--doc-gap", "2", "--nested-comments"]);
        assert_eq!(
            cli.scan_options(),
            ScanOptions {
                nested_comments: true,
                brace_docs: false,
                doc_gap: Some(2),
            }
        );
    }

    #[test]
    fn directive_defaults() {
        assert_eq!(directive_for_verbosity(0), "pasdoc=info,pasdoc_syntax=warn");
        assert_eq!(directive_for_verbosity(1), "pasdoc=debug,pasdoc_syntax=debug");
        assert_eq!(directive_for_verbosity(3), "pasdoc=trace,pasdoc_syntax=trace");
    }
}
