//! Tree renderer: indented plain-text outline, one entry per line.
//!
//! ```text
//! unit Shapes (1:1)
//!   class TShape [public] (5:3)
//!     /// Base of all shapes.
//!     function Area [public, forward, virtual, abstract] (8:5)
//! ```

use crate::render::Renderer;
use anyhow::Result;
use pasdoc_syntax::{Entry, ScanOutput};

pub struct TreeRenderer;

impl Renderer for TreeRenderer {
    fn render(&self, output: &ScanOutput) -> Result<String> {
        let mut out = String::new();
        for (depth, entry) in output.tree.walk() {
            write_entry(&mut out, depth, entry);
        }
        for diagnostic in &output.diagnostics {
            out.push_str(&format!("! {}\n", diagnostic));
        }
        Ok(out)
    }

    fn render_entry(&self, entry: &Entry) -> Result<String> {
        let mut out = String::new();
        write_entry(&mut out, 0, entry);
        if !entry.signature.is_empty() {
            out.push_str(&format!("  signature: {}\n", entry.signature));
        }
        if !entry.args.is_empty() {
            out.push_str(&format!("  args: {}\n", entry.args));
        }
        if !entry.type_text.is_empty() {
            out.push_str(&format!("  type: {}\n", entry.type_text));
        }
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}

fn write_entry(out: &mut String, depth: usize, entry: &Entry) {
    let indent = "  ".repeat(depth);
    let name = match &entry.qualifier {
        Some(qualifier) => format!("{}.{}", qualifier, entry.name),
        None => entry.name.clone(),
    };

    let mut flags: Vec<&str> = Vec::new();
    if let Some(visibility) = entry.visibility {
        flags.push(visibility.as_str());
    }
    if entry.forward {
        flags.push("forward");
    }
    flags.extend(entry.specifiers.iter().map(String::as_str));

    out.push_str(&indent);
    out.push_str(entry.kind.as_str());
    if !name.is_empty() {
        out.push(' ');
        out.push_str(&name);
    }
    if !flags.is_empty() {
        out.push_str(&format!(" [{}]", flags.join(", ")));
    }
    out.push_str(&format!(" ({}:{})\n", entry.start.line, entry.start.column));

    for line in entry.doc.lines() {
        out.push_str(&indent);
        out.push_str("  ///");
        if !line.is_empty() {
            out.push(' ');
            out.push_str(line);
        }
        out.push('\n');
    }
}
