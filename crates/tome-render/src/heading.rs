//! Heading anchors and the table-of-contents forest.

use std::collections::{HashMap, HashSet};

use tome_ast::{NodeId, NodeType, Tree};
use tome_config::Options;

use crate::util::escape_html;

/// One heading in the table of contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadingEntry {
    /// Anchor id.
    pub id: String,
    pub level: u8,
    /// Heading content as inline HTML.
    pub content: String,
    /// Deeper headings up to the next heading of this level or higher.
    pub children: Vec<HeadingEntry>,
}

/// Turn heading text into an anchor id: leading `#` removed, letters and
/// digits kept, everything else replaced by `-`.
///
/// # Examples
///
/// ```
/// use tome_render::normalize_heading_id;
///
/// assert_eq!(normalize_heading_id("Hello, World"), "Hello--World");
/// assert_eq!(normalize_heading_id("#标题 1"), "标题-1");
/// ```
#[must_use]
pub fn normalize_heading_id(text: &str) -> String {
    text.trim_start_matches('#')
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}

/// Anchor ids of every heading in the document, unique in document order.
///
/// Later duplicates get `-` appended until unique. With
/// `kramdown_block_ial`, an `id` attribute on the heading wins.
pub(crate) fn heading_ids(tree: &Tree, options: &Options) -> HashMap<NodeId, String> {
    let mut used = HashSet::new();
    let mut ids = HashMap::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let node = &tree[id];
        if node.kind == NodeType::Heading {
            let anchor = match node.ial_id() {
                Some(ial) if options.kramdown_block_ial => ial.to_owned(),
                _ => {
                    let mut anchor = normalize_heading_id(&tree.text(id));
                    while used.contains(&anchor) {
                        anchor.push('-');
                    }
                    anchor
                }
            };
            used.insert(anchor.clone());
            ids.insert(id, anchor);
        }
        let children: Vec<NodeId> = tree.children(id).collect();
        stack.extend(children.into_iter().rev());
    }
    ids
}

/// Inline HTML for a heading's content in the table of contents.
pub(crate) fn heading_content(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    collect_content(tree, id, &mut out);
    out
}

fn collect_content(tree: &Tree, id: NodeId, out: &mut String) {
    for child in tree.children(id) {
        let node = &tree[child];
        match node.kind {
            NodeType::Text => {
                let text = escape_html(&node.tokens);
                match tree[id].kind {
                    NodeType::Strong => {
                        out.push_str("<strong>");
                        out.push_str(&text);
                        out.push_str("</strong>");
                    }
                    NodeType::Emphasis => {
                        out.push_str("<em>");
                        out.push_str(&text);
                        out.push_str("</em>");
                    }
                    _ => out.push_str(&text),
                }
            }
            NodeType::CodeSpan => {
                out.push_str("<code>");
                out.push_str(&escape_html(&node.tokens));
                out.push_str("</code>");
            }
            NodeType::InlineMath => {
                out.push_str("<span class=\"language-math\">");
                out.push_str(&escape_html(&node.tokens));
                out.push_str("</span>");
            }
            NodeType::HtmlEntity | NodeType::Backslash => out.push_str(&escape_html(&node.tokens)),
            _ => collect_content(tree, child, out),
        }
    }
}

/// Build the heading forest from the document's top-level headings.
///
/// Each heading becomes a child of the nearest preceding heading with a
/// smaller level, or a root when there is none.
pub(crate) fn heading_forest(tree: &Tree, ids: &HashMap<NodeId, String>) -> Vec<HeadingEntry> {
    let flat: Vec<HeadingEntry> = tree
        .children(tree.root())
        .filter(|&id| tree[id].kind == NodeType::Heading)
        .map(|id| HeadingEntry {
            id: ids.get(&id).cloned().unwrap_or_default(),
            level: tree[id].heading().map_or(1, |h| h.level),
            content: heading_content(tree, id),
            children: Vec::new(),
        })
        .collect();
    nest(&mut flat.into_iter().peekable(), 0)
}

fn nest<I>(entries: &mut std::iter::Peekable<I>, parent_level: u8) -> Vec<HeadingEntry>
where
    I: Iterator<Item = HeadingEntry>,
{
    let mut out = Vec::new();
    while let Some(mut entry) = entries.next_if(|e| e.level > parent_level) {
        entry.children = nest(entries, entry.level);
        out.push(entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tome_ast::{ParseOptions, parse};

    use super::*;

    fn levels(entries: &[HeadingEntry]) -> Vec<(u8, Vec<u8>)> {
        entries
            .iter()
            .map(|e| (e.level, e.children.iter().map(|c| c.level).collect()))
            .collect()
    }

    #[test]
    fn test_normalize_heading_id() {
        assert_eq!(normalize_heading_id("Getting Started"), "Getting-Started");
        assert_eq!(normalize_heading_id("##Deep"), "Deep");
        assert_eq!(normalize_heading_id("v1.2"), "v1-2");
    }

    #[test]
    fn test_heading_ids_are_unique() {
        let tree = parse("# A\n\n## A\n\n> # A\n", &ParseOptions::default());
        let ids = heading_ids(&tree, &Options::default());
        let mut values: Vec<&str> = ids.values().map(String::as_str).collect();
        values.sort_unstable();
        assert_eq!(values, vec!["A", "A-", "A--"]);
    }

    #[test]
    fn test_heading_ids_prefer_ial() {
        let options = Options {
            kramdown_block_ial: true,
            ..Options::default()
        };
        let parse_options = ParseOptions {
            kramdown_block_ial: true,
            ..ParseOptions::default()
        };
        let tree = parse("# Title\n{: id=\"custom\"}\n", &parse_options);
        let ids = heading_ids(&tree, &options);
        assert_eq!(ids.values().next().map(String::as_str), Some("custom"));
    }

    #[test]
    fn test_ial_id_is_reserved_for_later_headings() {
        let options = Options {
            kramdown_block_ial: true,
            ..Options::default()
        };
        let parse_options = ParseOptions {
            kramdown_block_ial: true,
            ..ParseOptions::default()
        };
        let tree = parse("# First\n{: id=\"Second\"}\n\n# Second\n", &parse_options);
        let ids = heading_ids(&tree, &options);
        let mut values: Vec<&str> = ids.values().map(String::as_str).collect();
        values.sort_unstable();
        assert_eq!(values, vec!["Second", "Second-"]);
    }

    #[test]
    fn test_heading_forest_nests_by_level() {
        let tree = parse("# A\n\n### B\n\n## C\n\n# D\n\n## E\n", &ParseOptions::default());
        let ids = heading_ids(&tree, &Options::default());
        let forest = heading_forest(&tree, &ids);
        assert_eq!(levels(&forest), vec![(1, vec![3, 2]), (1, vec![2])]);
        assert_eq!(forest[0].id, "A");
        assert_eq!(forest[1].children[0].content, "E");
    }

    #[test]
    fn test_heading_forest_skips_nested_headings() {
        let tree = parse("> # Quoted\n\n## Top\n", &ParseOptions::default());
        let ids = heading_ids(&tree, &Options::default());
        let forest = heading_forest(&tree, &ids);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].content, "Top");
    }

    #[test]
    fn test_heading_content_keeps_inline_markup() {
        let tree = parse("# **Bold** `code` <x>\n", &ParseOptions::default());
        let heading = tree[tree.root()].first_child().unwrap();
        assert_eq!(
            heading_content(&tree, heading),
            "<strong>Bold</strong> <code>code</code> "
        );
    }
}
