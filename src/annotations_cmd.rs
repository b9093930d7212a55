use anyhow::{Context, Result};
use codanna_lci::annotation::{parse_comment_block, preceding_comment_lines, Annotation};
use std::path::Path;

/// Treats every non-comment, non-blank line as a candidate symbol start and
/// parses its preceding `@lci:` comment block (spec.md §4.4's up-to-10-line
/// lookback). This command has no parser to locate real symbol boundaries
/// with, so "candidate symbol start" is a line-shape heuristic rather than a
/// parsed declaration — good enough to sanity-check directive syntax against
/// a real file.
pub fn run(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let lines: Vec<&str> = text.lines().collect();

    let mut found_any = false;
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with("//") {
            continue;
        }
        let symbol_line = (idx + 1) as u32;
        let comment_lines = preceding_comment_lines(&lines, symbol_line);
        if comment_lines.is_empty() {
            continue;
        }
        let annotation = parse_comment_block(&comment_lines);
        if annotation == Annotation::default() {
            continue;
        }
        found_any = true;
        println!("line {symbol_line} ({}):", line.trim());
        println!("{annotation:#?}");
    }

    if !found_any {
        println!("no @lci: directives found in {}", path.display());
    }
    Ok(())
}
