//! Spacing between CJK and Latin runs.
//!
//! A single ASCII space goes between a CJK character and an adjacent Latin
//! letter or digit. Punctuation on either side, whitespace, and runs that
//! are both CJK or both non-CJK never get one, so already-spaced text comes
//! back unchanged.

use tome_ast::{NodeId, NodeType, Tree};
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::renderer::{Dialect, Renderer};

/// Variation selector that turns a digit into a keycap emoji.
const VARIATION_SELECTOR_16: char = '\u{FE0F}';

/// Han, Hiragana, Katakana and Hangul script ranges.
const CJK_RANGES: &[(u32, u32)] = &[
    (0x1100, 0x11FF),
    (0x2E80, 0x2E99),
    (0x2E9B, 0x2EF3),
    (0x2F00, 0x2FD5),
    (0x3005, 0x3005),
    (0x3007, 0x3007),
    (0x3021, 0x3029),
    (0x302E, 0x302F),
    (0x3038, 0x303B),
    (0x3041, 0x3096),
    (0x309D, 0x309F),
    (0x30A1, 0x30FA),
    (0x30FD, 0x30FF),
    (0x3131, 0x318E),
    (0x31F0, 0x31FF),
    (0x3200, 0x321E),
    (0x3260, 0x327E),
    (0x32D0, 0x32FE),
    (0x3300, 0x3357),
    (0x3400, 0x4DBF),
    (0x4E00, 0x9FFF),
    (0xA960, 0xA97C),
    (0xAC00, 0xD7A3),
    (0xD7B0, 0xD7C6),
    (0xD7CB, 0xD7FB),
    (0xF900, 0xFA6D),
    (0xFA70, 0xFAD9),
    (0xFF66, 0xFF6F),
    (0xFF71, 0xFF9D),
    (0xFFA0, 0xFFBE),
    (0xFFC2, 0xFFC7),
    (0xFFCA, 0xFFCF),
    (0xFFD2, 0xFFD7),
    (0xFFDA, 0xFFDC),
    (0x1AFF0, 0x1AFFE),
    (0x1B000, 0x1B122),
    (0x1B132, 0x1B132),
    (0x1B150, 0x1B152),
    (0x1B155, 0x1B155),
    (0x1B164, 0x1B167),
    (0x16FF0, 0x16FF1),
    (0x1F200, 0x1F200),
    (0x20000, 0x323AF),
];

fn is_han(c: char) -> bool {
    let cp = u32::from(c);
    (0x2E80..=0x2FD5).contains(&cp)
        || matches!(cp, 0x3005 | 0x3007)
        || (0x3021..=0x3029).contains(&cp)
        || (0x3038..=0x303B).contains(&cp)
        || (0x3400..=0x4DBF).contains(&cp)
        || (0x4E00..=0x9FFF).contains(&cp)
        || (0xF900..=0xFAD9).contains(&cp)
        || (0x16FF0..=0x16FF1).contains(&cp)
        || (0x20000..=0x323AF).contains(&cp)
}

/// Whether `c` belongs to the CJK side of the spacing rule.
#[must_use]
pub fn is_cjk(c: char) -> bool {
    let cp = u32::from(c);
    CJK_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
        || get_general_category(c) == GeneralCategory::ModifierLetter
}

fn is_punct(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

/// Letters, marks, numbers, punctuation, symbols and the ASCII space.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::SpaceSeparator
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
    )
}

/// Punctuation for spacing purposes: `%` and `@` behave like letters,
/// `~`, `=` and `#` like punctuation.
fn is_spacing_punct(c: char) -> bool {
    c != '%' && c != '@' && (is_punct(c) || matches!(c, '~' | '=' | '#'))
}

/// Whether a space belongs between `current` and `next`.
#[must_use]
pub fn allow_space(current: char, next: char) -> bool {
    if current.is_whitespace()
        || next.is_whitespace()
        || !is_printable(current)
        || !is_printable(next)
    {
        return false;
    }

    let current_cjk = is_cjk(current);
    let next_cjk = is_cjk(next);
    if current_cjk && is_spacing_punct(next) {
        return false;
    }
    if next_cjk && is_spacing_punct(current) {
        return false;
    }
    current_cjk != next_cjk
}

/// Insert spaces at every CJK/Latin boundary inside `text`.
///
/// A Han character directly followed by `ing` keeps the suffix attached
/// (`打码ing`), and a keycap digit keeps its variation selector.
///
/// # Examples
///
/// ```
/// use tome_render::space;
///
/// assert_eq!(space("在Rust中"), "在 Rust 中");
/// assert_eq!(space("在 Rust 中"), "在 Rust 中");
/// assert_eq!(space("打码ing"), "打码ing");
/// ```
#[must_use]
pub fn space(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if i + 3 < chars.len() && chars[i + 1..i + 4] == ['i', 'n', 'g'] && is_han(c) {
            out.push(c);
            out.push_str("ing");
            i += 4;
            continue;
        }
        push_at_boundary(&mut out, c);
        i += 1;
    }
    out
}

fn push_at_boundary(out: &mut String, next: char) {
    let Some(current) = out.chars().next_back() else {
        out.push(next);
        return;
    };
    let keycap = next == VARIATION_SELECTOR_16 && out.as_str() >= "1" && out.as_str() <= "9";
    if !keycap && allow_space(current, next) {
        out.push(' ');
    }
    out.push(next);
}

/// Text of a sibling node for boundary checks.
fn sibling_text(tree: &Tree, id: NodeId) -> String {
    if tree[id].kind == NodeType::Text {
        tree[id].tokens.clone()
    } else {
        tree.text(id)
    }
}

/// Kinds whose boundaries get spacing and whose own text is left as written.
#[must_use]
pub(crate) fn is_marked_span(kind: NodeType) -> bool {
    matches!(
        kind,
        NodeType::Emphasis
            | NodeType::Strong
            | NodeType::Strikethrough
            | NodeType::Mark
            | NodeType::Sup
            | NodeType::Sub
            | NodeType::Tag
            | NodeType::Link
    )
}

/// Whether a space belongs between a marked span and a plain-text neighbor.
///
/// `edge` is the span character touching the neighbor. A span holding any CJK
/// text counts as a CJK run against a Latin letter or digit, unless its edge
/// is whitespace or punctuation.
fn span_boundary_space(span: &str, edge: char, neighbor: char, span_first: bool) -> bool {
    let spaced = if span_first {
        allow_space(edge, neighbor)
    } else {
        allow_space(neighbor, edge)
    };
    spaced
        || (neighbor.is_alphanumeric()
            && !is_cjk(neighbor)
            && !edge.is_whitespace()
            && !is_spacing_punct(edge)
            && span.chars().any(is_cjk))
}

impl<D: Dialect> Renderer<'_, D> {
    /// Write a space before a marked span when it and the preceding text
    /// sibling straddle a CJK/Latin boundary.
    pub(crate) fn text_auto_space_previous(&mut self, id: NodeId) {
        if !self.options().auto_space {
            return;
        }
        let tree = self.tree();
        if tree.child_of_kind(id, NodeType::Text).is_none() {
            return;
        }
        let Some(previous) = tree[id].previous() else {
            return;
        };
        if tree[previous].kind != NodeType::Text {
            return;
        }
        let span = tree.text(id);
        if let (Some(last), Some(first)) = (tree[previous].tokens.chars().next_back(), span.chars().next())
            && span_boundary_space(&span, first, last, false)
        {
            self.write_char(' ');
        }
    }

    /// Write a space after a marked span when it and the following text
    /// sibling straddle a CJK/Latin boundary.
    pub(crate) fn text_auto_space_next(&mut self, id: NodeId) {
        if !self.options().auto_space {
            return;
        }
        let tree = self.tree();
        if tree.child_of_kind(id, NodeType::Text).is_none() {
            return;
        }
        let Some(next) = tree[id].next() else {
            return;
        };
        if tree[next].kind != NodeType::Text {
            return;
        }
        let span = tree.text(id);
        if let (Some(last), Some(first)) = (span.chars().next_back(), tree[next].tokens.chars().next())
            && span_boundary_space(&span, last, first, true)
        {
            self.write_char(' ');
        }
    }

    /// Space before a code span that follows a letter or digit.
    pub(crate) fn code_span_space_before(&mut self, id: NodeId) {
        if !self.options().auto_space {
            return;
        }
        let tree = self.tree();
        let Some(previous) = tree[id].previous() else {
            return;
        };
        if sibling_text(tree, previous)
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric)
        {
            self.write_char(' ');
        }
    }

    /// Space after a code span that precedes a letter or digit.
    pub(crate) fn code_span_space_after(&mut self, id: NodeId) {
        if !self.options().auto_space {
            return;
        }
        let tree = self.tree();
        let Some(next) = tree[id].next() else {
            return;
        };
        if sibling_text(tree, next)
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric)
        {
            self.write_char(' ');
        }
    }
}
