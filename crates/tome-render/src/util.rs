//! Small text helpers shared by the dialects.

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Display width used for table and setext alignment: one column per ASCII
/// character, two for anything else.
#[must_use]
pub fn show_len(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

/// Rewrite a link destination with the configured base and prefix.
///
/// `base` is joined to relative destinations only; `prefix` is prepended to
/// every destination once `base` has been applied.
///
/// # Examples
///
/// ```
/// use tome_render::link_path;
///
/// assert_eq!(link_path("img/a.png", "https://cdn.example.com", ""), "https://cdn.example.com/img/a.png");
/// assert_eq!(link_path("/abs.png", "https://cdn.example.com/", ""), "/abs.png");
/// assert_eq!(link_path("a.png", "", "docs/"), "docs/a.png");
/// ```
#[must_use]
pub fn link_path(dest: &str, base: &str, prefix: &str) -> String {
    let mut path = dest.to_owned();
    if !base.is_empty() && is_relative(dest) {
        let dest = dest.replace("%5C", "\\");
        path = if base.ends_with('/') {
            format!("{base}{dest}")
        } else {
            format!("{base}/{dest}")
        };
    }
    if !prefix.is_empty() {
        path.insert_str(0, prefix);
    }
    path
}

fn is_relative(dest: &str) -> bool {
    if dest.is_empty() {
        return true;
    }
    !dest.starts_with('/') && !dest.contains(":/") && !dest.contains(":\\") && !dest.contains(":%5C")
}

/// Whether a line holds nothing but spaces and tabs.
pub(crate) fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_show_len_counts_wide_chars_twice() {
        assert_eq!(show_len("AB"), 2);
        assert_eq!(show_len("中文"), 4);
        assert_eq!(show_len("a中"), 3);
        assert_eq!(show_len(""), 0);
    }

    #[test]
    fn test_link_path_relative_only() {
        assert_eq!(link_path("a.png", "https://x.io/", ""), "https://x.io/a.png");
        assert_eq!(link_path("https://y.io/a.png", "https://x.io/", ""), "https://y.io/a.png");
        assert_eq!(link_path("C:\\img.png", "https://x.io/", ""), "C:\\img.png");
        assert_eq!(link_path("", "https://x.io/", ""), "https://x.io/");
    }

    #[test]
    fn test_link_path_decodes_backslash_for_base() {
        assert_eq!(link_path("dir%5Ca.png", "base", ""), "base/dir\\a.png");
    }

    #[test]
    fn test_link_path_prefix_after_base() {
        assert_eq!(link_path("a.png", "assets/", "/static/"), "/static/assets/a.png");
        assert_eq!(link_path("/abs", "", "p:"), "p:/abs");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \t "));
        assert!(!is_blank(" a"));
    }
}
