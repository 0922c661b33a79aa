//! Paste classification heuristic.
//!
//! Decides whether a pasted text snippet should be stored as code or plain
//! text. Image and table detection happen in the platform collaborator; this
//! covers the text path only.

use super::ItemKind;

const CODE_KEYWORDS: &[&str] = &[
    "function", "const", "let", "var", "import", "export", "class", "<div>", "SELECT",
];

/// Classify a trimmed text snippet as [`ItemKind::Code`] or [`ItemKind::Text`].
///
/// Multi-line snippets count as code when they carry braces or at least two
/// indented lines; single-line snippets fall back to a keyword check.
pub fn classify_snippet(text: &str) -> ItemKind {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() >= 3 {
        let has_braces = text.contains('{') && text.contains('}');
        let indented = lines
            .iter()
            .filter(|line| line.starts_with("    ") || line.starts_with('\t'))
            .count();
        if has_braces || indented >= 2 {
            return ItemKind::Code;
        }
    }

    if CODE_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        ItemKind::Code
    } else {
        ItemKind::Text
    }
}
