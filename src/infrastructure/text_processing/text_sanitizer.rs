use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SOFT_WRAPPED_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<head>\w)-[ \t]*\r?\n[ \t]*(?P<tail>[a-z])").expect("static regex is valid")
});

/// Cleans backend output before chunking.
///
/// NFKC-normalises, drops control characters other than newline and tab,
/// joins words hyphenated across a line break, collapses runs of spaces, and
/// keeps at most one blank line between paragraphs.
pub fn sanitize_extracted_text(raw: &str) -> String {
    let normalized: String = raw
        .nfkc()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let joined = SOFT_WRAPPED_WORD.replace_all(&normalized, "$head$tail");

    let mut out = String::with_capacity(joined.len());
    let mut pending_break: Option<&str> = None;

    for line in joined.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if !out.is_empty() {
                pending_break = Some("\n\n");
            }
            continue;
        }

        if !out.is_empty() {
            out.push_str(pending_break.unwrap_or("\n"));
        }
        pending_break = None;
        push_collapsed(trimmed, &mut out);
    }

    out
}

fn push_collapsed(line: &str, out: &mut String) {
    let mut words = line.split_whitespace();
    if let Some(first) = words.next() {
        out.push_str(first);
        for word in words {
            out.push(' ');
            out.push_str(word);
        }
    }
}
