//! Renderer module: trait-based format dispatch.

pub mod json;
pub mod tree;

use anyhow::{anyhow, Result};
use pasdoc_syntax::{Entry, ScanOutput};

/// Trait for rendering scan results into a specific output format.
pub trait Renderer {
    /// Render the outline of one file.
    fn render(&self, output: &ScanOutput) -> Result<String>;
    /// Render a single entry, e.g. a parsed prototype.
    fn render_entry(&self, entry: &Entry) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "tree" | "text" => Ok(Box::new(tree::TreeRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use tree or json", format)),
    }
}
