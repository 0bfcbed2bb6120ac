//! Triple-slash directive extraction.
//!
//! Directives are recognized strictly in the prologue: the scan stops at
//! the first non-comment, non-empty line, and nothing is collected at all
//! unless the prologue *begins* with `///`.

const DIRECTIVE_HEADS: &[&str] = &["<reference", "<amd-module", "<amd-dependency"];

/// Extract the prologue's triple-slash directives, verbatim and trimmed.
pub fn extract(source: &str) -> Vec<String> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut out = Vec::new();
    let mut seen_directive_line = false;
    let mut in_block_comment = false;

    for line in source.lines() {
        let t = line.trim();
        if in_block_comment {
            if t.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if t.is_empty() {
            continue;
        }
        if let Some(rest) = t.strip_prefix("///") {
            seen_directive_line = true;
            let rest = rest.trim_start();
            if DIRECTIVE_HEADS.iter().any(|h| rest.starts_with(h)) {
                out.push(t.to_string());
            }
            continue;
        }
        if !seen_directive_line {
            // The prologue does not begin with `///`.
            return Vec::new();
        }
        if t.starts_with("//") {
            continue;
        }
        if t.starts_with("/*") {
            if !t.contains("*/") {
                in_block_comment = true;
            }
            continue;
        }
        // First non-comment, non-empty line ends the prologue.
        break;
    }
    out
}
