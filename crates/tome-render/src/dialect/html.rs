//! Semantic HTML.

use std::collections::HashMap;
use std::fmt::Write as _;

use tome_ast::{Align, LinkType, Node, NodeId, NodeType, Tree, WalkStatus};

use crate::heading::{HeadingEntry, heading_forest};
use crate::renderer::{Dialect, DispatchTable, Renderer};
use crate::util::escape_html;

/// HTML dialect.
#[derive(Clone, Copy, Debug, Default)]
pub struct Html;

type R<'t> = Renderer<'t, Html>;

impl Dialect for Html {
    const NAME: &'static str = "html";

    fn register(table: &mut DispatchTable<Self>) {
        table.register(NodeType::Document, document);
        table.register(NodeType::Paragraph, paragraph);
        table.register(NodeType::Text, text);
        table.register(NodeType::CodeSpan, code_span);
        table.register(NodeType::CodeBlock, code_block);
        table.register(NodeType::MathBlock, math_block);
        table.register(NodeType::InlineMath, inline_math);
        table.register(NodeType::Emphasis, inline_span);
        table.register(NodeType::Strong, inline_span);
        table.register(NodeType::Strikethrough, inline_span);
        table.register(NodeType::Mark, inline_span);
        table.register(NodeType::Sup, inline_span);
        table.register(NodeType::Sub, inline_span);
        table.register(NodeType::Kbd, inline_span);
        table.register(NodeType::Tag, inline_span);
        table.register(NodeType::Blockquote, blockquote);
        table.register(NodeType::Heading, heading);
        table.register(NodeType::List, list);
        table.register(NodeType::ListItem, list_item);
        table.register(NodeType::TaskListItemMarker, task_list_item_marker);
        table.register(NodeType::ThematicBreak, thematic_break);
        table.register(NodeType::HardBreak, hard_break);
        table.register(NodeType::SoftBreak, soft_break);
        table.register(NodeType::HtmlBlock, html_block);
        table.register(NodeType::InlineHtml, inline_html);
        table.register(NodeType::HtmlEntity, html_entity);
        table.register(NodeType::Backslash, backslash);
        table.register(NodeType::Link, link);
        table.register(NodeType::Image, image);
        table.register(NodeType::Table, table_node);
        table.register(NodeType::TableHead, table_head);
        table.register(NodeType::TableRow, table_row);
        table.register(NodeType::TableCell, table_cell);
        table.register(NodeType::Toc, toc);
        table.register(NodeType::FootnotesRef, footnotes_ref);
        table.register(NodeType::FootnotesDef, skip);
        table.register(NodeType::YamlFrontMatter, yaml_front_matter);
        table.register(NodeType::KramdownBlockIal, skip);
        table.register(NodeType::KramdownSpanIal, skip);
    }

    fn finish(r: &mut Renderer<'_, Self>) {
        let defs = footnote_defs(r.tree());
        if defs.is_empty() {
            return;
        }
        r.write_str("<div class=\"footnotes-defs-div\"><hr class=\"footnotes-defs-hr\" />\n<ol class=\"footnotes-defs-ol\">");
        for (i, &def) in defs.iter().enumerate() {
            let num = i + 1;
            r.write_str(&format!("<li id=\"footnotes-def-{num}\">"));
            r.push_buffer(def);
            r.render_children(def);
            let Some(body) = r.pop_buffer(def) else {
                return;
            };
            let refs = r
                .scratch()
                .footnote_refs
                .get(r.node(def).footnote_label())
                .copied()
                .unwrap_or(0);
            let mut back_links = String::new();
            for seen in 1..=refs {
                let _ = write!(
                    back_links,
                    " <a href=\"#footnotes-ref-{}\" class=\"vditor-footnotes__goto-ref\">↩</a>",
                    footnote_ref_id(num, seen)
                );
            }
            r.write_str(&with_back_links(body.trim(), &back_links));
            r.write_str("</li>\n");
        }
        r.write_str("</ol></div>");
        r.newline();
    }
}

/// Opening (or self-closing) tag with attributes.
fn tag(name: &str, attrs: &[(&str, &str)], self_closing: bool) -> String {
    let mut out = format!("<{name}");
    for (key, value) in attrs {
        let _ = write!(out, " {key}=\"{value}\"");
    }
    if self_closing {
        out.push_str(" /");
    }
    out.push('>');
    out
}

/// Attribute list entries of a block, when attribute lists are enabled.
fn ial_attrs<'n>(r: &R<'_>, node: &'n Node) -> Vec<(&'n str, String)> {
    if !r.options().kramdown_block_ial {
        return Vec::new();
    }
    node.ial
        .iter()
        .map(|(key, value)| (key.as_str(), escape_html(value)))
        .collect()
}

fn borrowed<'a>(attrs: &'a [(&'a str, String)]) -> Vec<(&'a str, &'a str)> {
    attrs.iter().map(|(key, value)| (*key, value.as_str())).collect()
}

/// Footnote definitions in document order.
fn footnote_defs(tree: &Tree) -> Vec<NodeId> {
    let mut defs = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        if tree[id].kind == NodeType::FootnotesDef {
            defs.push(id);
            continue;
        }
        let children: Vec<NodeId> = tree.children(id).collect();
        stack.extend(children.into_iter().rev());
    }
    defs
}

/// Id of the `seen`-th reference to footnote `num`.
fn footnote_ref_id(num: usize, seen: usize) -> String {
    if seen <= 1 {
        num.to_string()
    } else {
        format!("{num}:{seen}")
    }
}

/// Insert back links inside the definition's last paragraph.
fn with_back_links(body: &str, links: &str) -> String {
    match body.strip_suffix("</p>") {
        Some(head) => format!("{head}{links}</p>"),
        None => format!("{body}{links}"),
    }
}

fn footnote_number(r: &mut R<'_>, label: &str) -> Option<usize> {
    let tree = r.tree();
    r.scratch_mut()
        .footnotes
        .get_or_insert_with(|| {
            footnote_defs(tree)
                .into_iter()
                .enumerate()
                .map(|(i, def)| (tree[def].footnote_label().to_owned(), i + 1))
                .collect::<HashMap<_, _>>()
        })
        .get(label)
        .copied()
}

fn skip(_r: &mut R<'_>, _id: NodeId, _entering: bool) -> WalkStatus {
    WalkStatus::SkipChildren
}

fn document(_r: &mut R<'_>, _id: NodeId, _entering: bool) -> WalkStatus {
    WalkStatus::Continue
}

fn paragraph(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    if r.in_tight_list(id) {
        return WalkStatus::Continue;
    }
    if entering {
        let node = r.node(id);
        let attrs = ial_attrs(r, node);
        r.newline();
        r.write_str(&tag("p", &borrowed(&attrs), false));
        let top_level = node.parent().is_some_and(|p| r.node(p).kind == NodeType::Document);
        if r.options().chinese_paragraph_beginning_space && top_level {
            r.write_str("&emsp;&emsp;");
        }
    } else {
        r.write_str("</p>");
        r.newline();
    }
    WalkStatus::Continue
}

fn text(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let text = r.process_text(id);
    r.write_str(&escape_html(&text));
    WalkStatus::SkipChildren
}

fn code_span(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.code_span_space_before(id);
    r.write_str("<code>");
    r.write_str(&escape_html(&r.node(id).tokens));
    r.write_str("</code>");
    r.code_span_space_after(id);
    WalkStatus::SkipChildren
}

fn code_block(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let node = r.node(id);
    let attrs = ial_attrs(r, node);
    let language = node
        .code_block()
        .and_then(|code| code.info.split_whitespace().next())
        .map(|lang| format!("language-{}", escape_html(lang)));

    r.newline();
    r.write_str(&tag("pre", &borrowed(&attrs), false));
    match &language {
        Some(class) => r.write_str(&tag("code", &[("class", class)], false)),
        None => r.write_str("<code>"),
    }
    if !node.tokens.is_empty() {
        r.write_str(&escape_html(&node.tokens));
        r.write_char('\n');
    }
    r.write_str("</code></pre>");
    r.newline();
    WalkStatus::SkipChildren
}

fn math_block(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str("<div class=\"language-math\">");
    r.write_str(&escape_html(&r.node(id).tokens));
    r.write_str("</div>");
    r.newline();
    WalkStatus::SkipChildren
}

fn inline_math(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str("<span class=\"language-math\">");
    r.write_str(&escape_html(&r.node(id).tokens));
    r.write_str("</span>");
    WalkStatus::SkipChildren
}

fn inline_span(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    let (open, close) = match r.node(id).kind {
        NodeType::Emphasis => ("<em>", "</em>"),
        NodeType::Strong => ("<strong>", "</strong>"),
        NodeType::Strikethrough => ("<del>", "</del>"),
        NodeType::Mark => ("<mark>", "</mark>"),
        NodeType::Sup => ("<sup>", "</sup>"),
        NodeType::Sub => ("<sub>", "</sub>"),
        NodeType::Kbd => ("<kbd>", "</kbd>"),
        _ => ("<em>#", "#</em>"),
    };
    if entering {
        r.text_auto_space_previous(id);
        r.write_str(open);
    } else {
        r.write_str(close);
        r.text_auto_space_next(id);
    }
    WalkStatus::Continue
}

fn blockquote(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    r.newline();
    if entering {
        let attrs = ial_attrs(r, r.node(id));
        r.write_str(&tag("blockquote", &borrowed(&attrs), false));
    } else {
        r.write_str("</blockquote>");
    }
    r.newline();
    WalkStatus::Continue
}

fn heading(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    let level = r.node(id).heading().map_or(1, |h| h.level);
    if entering {
        r.newline();
        let options = r.options();
        if options.toc || options.heading_id {
            let anchor = r.heading_id(id);
            r.write_str(&format!("<h{level} id=\"{}\">", escape_html(&anchor)));
        } else {
            r.write_str(&format!("<h{level}>"));
        }
    } else {
        r.write_str(&format!("</h{level}>"));
        r.newline();
    }
    WalkStatus::Continue
}

fn list(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    let node = r.node(id);
    let ordered = node.list().is_some_and(|list| list.ordered);
    let name = if ordered { "ol" } else { "ul" };
    r.newline();
    if entering {
        let mut attrs = Vec::new();
        if let Some(data) = node.list()
            && data.ordered
            && data.start != 1
        {
            attrs.push(("start", data.start.to_string()));
        }
        attrs.extend(ial_attrs(r, node));
        r.write_str(&tag(name, &borrowed(&attrs), false));
    } else {
        r.write_str(&format!("</{name}>"));
    }
    r.newline();
    WalkStatus::Continue
}

fn list_item(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        r.write_str("</li>");
        r.newline();
        return WalkStatus::Continue;
    }
    let tree = r.tree();
    let node = r.node(id);
    let mut attrs = ial_attrs(r, node);
    let class = &r.options().gfm_task_list_item_class;
    let is_task = node
        .first_child()
        .and_then(|para| tree[para].first_child())
        .is_some_and(|first| tree[first].kind == NodeType::TaskListItemMarker);
    if is_task && !class.is_empty() {
        attrs.push(("class", escape_html(class)));
    }
    r.write_str(&tag("li", &borrowed(&attrs), false));
    WalkStatus::Continue
}

fn task_list_item_marker(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let mut attrs = Vec::with_capacity(3);
    if r.node(id).task_checked() {
        attrs.push(("checked", ""));
    }
    attrs.extend([("disabled", ""), ("type", "checkbox")]);
    r.write_str(&tag("input", &attrs, true));
    WalkStatus::SkipChildren
}

fn thematic_break(r: &mut R<'_>, _id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str("<hr />");
    r.newline();
    WalkStatus::SkipChildren
}

fn hard_break(r: &mut R<'_>, _id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str("<br />");
    r.newline();
    WalkStatus::SkipChildren
}

fn soft_break(r: &mut R<'_>, _id: NodeId, _entering: bool) -> WalkStatus {
    if r.options().soft_break_to_hard_break {
        r.write_str("<br />");
    }
    r.newline();
    WalkStatus::SkipChildren
}

fn html_block(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    let html = r.sanitize(&r.node(id).tokens);
    r.write_str(&html);
    r.newline();
    WalkStatus::SkipChildren
}

fn inline_html(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let html = r.sanitize(&r.node(id).tokens);
    r.write_str(&html);
    WalkStatus::SkipChildren
}

fn html_entity(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str(&r.node(id).tokens);
    WalkStatus::SkipChildren
}

fn backslash(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str(&escape_html(&r.node(id).tokens));
    WalkStatus::SkipChildren
}

fn link(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    let Some(data) = r.node(id).link() else {
        return WalkStatus::Continue;
    };
    if !entering {
        r.write_str("</a>");
        r.text_auto_space_next(id);
        return WalkStatus::Continue;
    }

    r.text_auto_space_previous(id);
    let dest = if data.link_type == LinkType::Email && !data.dest.starts_with("mailto:") {
        format!("mailto:{}", data.dest)
    } else {
        r.link_path(&data.dest)
    };
    let href = escape_html(&dest);
    let title = escape_html(&data.title);
    let mut attrs = vec![("href", href.as_str())];
    if !data.title.is_empty() {
        attrs.push(("title", title.as_str()));
    }
    r.write_str(&tag("a", &attrs, false));
    WalkStatus::Continue
}

fn image(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let Some(data) = r.node(id).link() else {
        return WalkStatus::SkipChildren;
    };
    let mut img = format!(
        "<img src=\"{}\" alt=\"{}\"",
        escape_html(&r.link_path(&data.dest)),
        escape_html(&r.tree().text(id))
    );
    if !data.title.is_empty() {
        let _ = write!(img, " title=\"{}\"", escape_html(&data.title));
    }
    img.push_str(" />");
    let img = r.sanitize(&img);
    r.write_str(&img);
    WalkStatus::SkipChildren
}

fn table_node(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write_str("<table>");
        r.newline();
        return WalkStatus::Continue;
    }
    let has_body = r
        .node(id)
        .first_child()
        .is_some_and(|head| r.node(head).next().is_some());
    if has_body {
        r.write_str("</tbody>");
    }
    r.newline();
    r.write_str("</table>");
    r.newline();
    WalkStatus::Continue
}

fn table_head(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write_str("<thead>");
        r.newline();
        return WalkStatus::Continue;
    }
    r.write_str("</thead>");
    r.newline();
    if r.node(id).next().is_some() {
        r.write_str("<tbody>");
        r.newline();
    }
    WalkStatus::Continue
}

fn table_row(r: &mut R<'_>, _id: NodeId, entering: bool) -> WalkStatus {
    r.write_str(if entering { "<tr>" } else { "</tr>" });
    r.newline();
    WalkStatus::Continue
}

fn table_cell(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    let tree = r.tree();
    let in_head = tree[id]
        .parent()
        .and_then(|row| tree[row].parent())
        .is_some_and(|parent| tree[parent].kind == NodeType::TableHead);
    let name = if in_head { "th" } else { "td" };
    if !entering {
        r.write_str(&format!("</{name}>"));
        r.newline();
        return WalkStatus::Continue;
    }
    let align = match tree[id].align() {
        Align::None => None,
        Align::Left => Some("left"),
        Align::Center => Some("center"),
        Align::Right => Some("right"),
    };
    let attrs: Vec<(&str, &str)> = align.map(|a| ("align", a)).into_iter().collect();
    r.write_str(&tag(name, &attrs, false));
    WalkStatus::Continue
}

fn toc(r: &mut R<'_>, _id: NodeId, _entering: bool) -> WalkStatus {
    let tree = r.tree();
    let forest = heading_forest(tree, r.heading_ids());
    if forest.is_empty() {
        return WalkStatus::SkipChildren;
    }
    let mut out = String::from("<div class=\"vditor-toc\">");
    write_toc_entries(&mut out, &forest);
    out.push_str("</div>");
    r.write_str(&out);
    WalkStatus::SkipChildren
}

fn write_toc_entries(out: &mut String, entries: &[HeadingEntry]) {
    for entry in entries {
        let indent = usize::from(entry.level.saturating_sub(1)) * 2;
        out.push_str(&"&emsp;".repeat(indent));
        let _ = write!(
            out,
            "<span class=\"toc-h{}\"><a class=\"toc-a\" href=\"#{}\">{}</a></span><br>",
            entry.level,
            escape_html(&entry.id),
            entry.content
        );
        write_toc_entries(out, &entry.children);
    }
}

fn footnotes_ref(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let label = r.node(id).footnote_label();
    let Some(num) = footnote_number(r, label) else {
        r.write_str(&escape_html(&format!("[^{label}]")));
        return WalkStatus::SkipChildren;
    };
    let seen = if r.is_measuring() {
        r.scratch().footnote_refs.get(label).copied().unwrap_or(0) + 1
    } else {
        let count = r.scratch_mut().footnote_refs.entry(label.to_owned()).or_insert(0);
        *count += 1;
        *count
    };
    r.write_str(&format!(
        "<sup class=\"footnotes-ref\" id=\"footnotes-ref-{}\"><a href=\"#footnotes-def-{num}\">{num}</a></sup>",
        footnote_ref_id(num, seen)
    ));
    WalkStatus::SkipChildren
}

fn yaml_front_matter(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str("<pre><code class=\"language-yaml\">");
    r.write_str(&escape_html(&r.node(id).tokens));
    r.write_str("</code></pre>");
    r.newline();
    WalkStatus::SkipChildren
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tome_ast::parse;
    use tome_config::Options;

    use super::*;

    fn render_with(source: &str, options: &Options) -> String {
        let tree = parse(source, &crate::parse_options(options));
        Renderer::new(&tree, options, Html).render().unwrap()
    }

    fn render(source: &str) -> String {
        render_with(source, &Options::default())
    }

    #[test]
    fn test_tag_helper() {
        assert_eq!(tag("p", &[], false), "<p>");
        assert_eq!(tag("input", &[("disabled", ""), ("type", "checkbox")], true), "<input disabled=\"\" type=\"checkbox\" />");
    }

    #[test]
    fn test_paragraph_and_inline_spans() {
        assert_eq!(
            render("a *b* **c** ~~d~~ `<e>`\n"),
            "<p>a <em>b</em> <strong>c</strong> <del>d</del> <code>&lt;e&gt;</code></p>\n"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(render("1 < 2\n"), "<p>1 &lt; 2</p>\n");
    }

    #[test]
    fn test_tight_list_has_no_paragraphs() {
        assert_eq!(render("- a\n- b\n"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_loose_ordered_list_with_start() {
        assert_eq!(
            render("3. a\n\n4. b\n"),
            "<ol start=\"3\">\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_task_list_item_class() {
        assert_eq!(
            render("- [x] done\n"),
            "<ul>\n<li class=\"vditor-task\"><input checked=\"\" disabled=\"\" type=\"checkbox\" />done</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_heading_ids_with_toc() {
        let options = Options {
            toc: true,
            ..Options::default()
        };
        assert_eq!(
            render_with("[toc]\n\n# A\n\n## B\n", &options),
            "<div class=\"vditor-toc\"><span class=\"toc-h1\"><a class=\"toc-a\" href=\"#A\">A</a></span><br>\
             &emsp;&emsp;<span class=\"toc-h2\"><a class=\"toc-a\" href=\"#B\">B</a></span><br></div>\n\
             <h1 id=\"A\">A</h1>\n<h2 id=\"B\">B</h2>\n"
        );
    }

    #[test]
    fn test_toc_without_headings_is_empty() {
        let options = Options {
            toc: true,
            ..Options::default()
        };
        assert_eq!(render_with("[toc]\n", &options), "");
    }

    #[test]
    fn test_headings_without_ids_by_default() {
        assert_eq!(render("# A\n"), "<h1>A</h1>\n");
    }

    #[test]
    fn test_code_blocks() {
        assert_eq!(
            render("```rust title\nlet x = 1 < 2;\n```\n"),
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;\n</code></pre>\n"
        );
        assert_eq!(render("    plain\n"), "<pre><code>plain\n</code></pre>\n");
    }

    #[test]
    fn test_table() {
        assert_eq!(
            render("| a | b |\n|:-|-:|\n| 1 | 2 |\n"),
            "<table>\n<thead>\n<tr>\n<th align=\"left\">a</th>\n<th align=\"right\">b</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td align=\"left\">1</td>\n<td align=\"right\">2</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_links_use_link_base() {
        let options = Options {
            link_base: "https://cdn.example.com/".to_owned(),
            ..Options::default()
        };
        assert_eq!(
            render_with("[a](img/x.png \"T\") ![alt *b*](y.png)\n", &options),
            "<p><a href=\"https://cdn.example.com/img/x.png\" title=\"T\">a</a> \
             <img src=\"https://cdn.example.com/y.png\" alt=\"alt b\" /></p>\n"
        );
    }

    #[test]
    fn test_footnotes_section() {
        assert_eq!(
            render("a[^n] b[^n]\n\n[^n]: note\n"),
            "<p>a<sup class=\"footnotes-ref\" id=\"footnotes-ref-1\"><a href=\"#footnotes-def-1\">1</a></sup> \
             b<sup class=\"footnotes-ref\" id=\"footnotes-ref-1:2\"><a href=\"#footnotes-def-1\">1</a></sup></p>\n\
             <div class=\"footnotes-defs-div\"><hr class=\"footnotes-defs-hr\" />\n<ol class=\"footnotes-defs-ol\">\
             <li id=\"footnotes-def-1\"><p>note \
             <a href=\"#footnotes-ref-1\" class=\"vditor-footnotes__goto-ref\">↩</a> \
             <a href=\"#footnotes-ref-1:2\" class=\"vditor-footnotes__goto-ref\">↩</a></p></li>\n</ol></div>\n"
        );
    }

    #[test]
    fn test_footnote_refs_reset_between_renders() {
        let options = Options::default();
        let tree = parse("a[^n]\n\n[^n]: note\n", &crate::parse_options(&options));
        let mut renderer = Renderer::new(&tree, &options, Html);
        let first = renderer.render().unwrap();
        let second = renderer.render().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sanitize_raw_html() {
        let options = Options {
            sanitize: true,
            ..Options::default()
        };
        assert_eq!(
            render_with("<div onclick=\"x()\">hi</div>\n", &options),
            "<div>hi</div>\n"
        );
    }

    #[test]
    fn test_sanitize_failure_keeps_partial_output() {
        let options = Options {
            sanitize: true,
            ..Options::default()
        };
        assert_eq!(render_with("<p>ok</p><script>\n", &options), "<p>ok</p>\n");
    }

    #[test]
    fn test_chinese_paragraph_beginning_space() {
        let options = Options {
            chinese_paragraph_beginning_space: true,
            ..Options::default()
        };
        assert_eq!(
            render_with("段落\n\n> 引用\n", &options),
            "<p>&emsp;&emsp;段落</p>\n<blockquote>\n<p>引用</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_soft_break() {
        assert_eq!(render("a\nb\n"), "<p>a<br />\nb</p>\n");
        let options = Options {
            soft_break_to_hard_break: false,
            ..Options::default()
        };
        assert_eq!(render_with("a\nb\n", &options), "<p>a\nb</p>\n");
    }

    #[test]
    fn test_math() {
        assert_eq!(
            render("$x<1$\n\n$$\ny\n$$\n"),
            "<p><span class=\"language-math\">x&lt;1</span></p>\n<div class=\"language-math\">y</div>\n"
        );
    }

    #[test]
    fn test_block_ial_attributes() {
        let options = Options {
            kramdown_block_ial: true,
            ..Options::default()
        };
        assert_eq!(
            render_with("foo\n{: id=\"p1\"}\n", &options),
            "<p id=\"p1\">foo</p>\n"
        );
    }
}
