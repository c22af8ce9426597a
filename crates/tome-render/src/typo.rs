//! Case correction of known technical terms.

use std::collections::HashMap;

/// Bytes that separate terms: non-ASCII, ASCII whitespace and punctuation.
fn is_separator(b: u8) -> bool {
    !b.is_ascii() || b.is_ascii_whitespace() || b.is_ascii_punctuation()
}

/// Rewrite every whole ASCII word found in `terms` (keyed by its lowercase
/// form) to the dictionary spelling.
///
/// Words touching ASCII punctuation are left alone, so `github.com` and
/// `test.github` stay as written. Corrections must keep the byte length of
/// the word; entries that don't are ignored.
///
/// # Examples
///
/// ```
/// use tome_render::fix_term_typo;
///
/// let terms = tome_config::default_terms();
/// assert_eq!(fix_term_typo("用 github 和 mysql", &terms), "用 GitHub 和 MySQL");
/// assert_eq!(fix_term_typo("github.com", &terms), "github.com");
/// ```
#[must_use]
pub fn fix_term_typo(text: &str, terms: &HashMap<String, String>) -> String {
    let bytes = text.as_bytes();
    let mut fixes: Vec<(usize, usize, &str)> = Vec::new();
    let mut before = 0u8;

    for i in 0..bytes.len() {
        if is_separator(bytes[i]) {
            continue;
        }
        if i >= 1 {
            before = bytes[i - 1];
            if !is_separator(before) {
                continue;
            }
        }
        if before.is_ascii_punctuation() {
            continue;
        }

        let mut j = i;
        let mut after = bytes[i];
        while j < bytes.len() {
            after = bytes[j];
            if is_separator(after) || after == b'.' {
                break;
            }
            j += 1;
        }
        if after.is_ascii_punctuation() {
            continue;
        }

        let word = text[i..j].to_ascii_lowercase();
        if let Some(to) = terms.get(&word)
            && to.len() == j - i
            && to.is_ascii()
        {
            fixes.push((i, j, to));
        }
    }

    let mut out = text.to_owned();
    for (start, end, to) in fixes {
        out.replace_range(start..end, to);
    }
    out
}
