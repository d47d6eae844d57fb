//! JSON renderer: structured output for tooling integration.
//!
//! Serializes the scan output directly: the flat entry arena (children and
//! parents by id) followed by the diagnostics.

use crate::render::Renderer;
use anyhow::{Context, Result};
use pasdoc_syntax::{Entry, ScanOutput};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, output: &ScanOutput) -> Result<String> {
        let mut out = serde_json::to_string_pretty(output).context("failed to serialize outline")?;
        out.push('\n');
        Ok(out)
    }

    fn render_entry(&self, entry: &Entry) -> Result<String> {
        let mut out = serde_json::to_string_pretty(entry).context("failed to serialize entry")?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
