//! Annotated DOM for split-view editors.
//!
//! Every Markdown marker is kept in the output wrapped in a classed `span`,
//! so an editor can show the source and style it at the same time. Line
//! breaks are written as `newline` span elements.

use std::fmt::Write as _;

use tome_ast::{LinkType, NodeId, NodeType, WalkStatus};

use super::markdown::{code_fence, default_marker};
use crate::renderer::{Dialect, DispatchTable, Renderer};
use crate::table::{cell_padding, separator_cell, text_width};
use crate::typo::fix_term_typo;
use crate::util::{escape_html, show_len};

/// Split-view DOM dialect.
#[derive(Clone, Copy, Debug, Default)]
pub struct SplitView;

/// Line break element.
const NEWLINE: &str = "<span data-type=\"newline\"><br /><span style=\"display: none\">\n</span></span>";

type R<'t> = Renderer<'t, SplitView>;

impl Dialect for SplitView {
    const NAME: &'static str = "sv";
    const NEWLINE: &'static str = NEWLINE;

    fn register(table: &mut DispatchTable<Self>) {
        table.register(NodeType::Document, document);
        table.register(NodeType::Paragraph, paragraph);
        table.register(NodeType::Text, text);
        table.register(NodeType::CodeSpan, code_span);
        table.register(NodeType::CodeBlock, code_block);
        table.register(NodeType::MathBlock, math_block);
        table.register(NodeType::InlineMath, inline_math);
        table.register(NodeType::Emphasis, delimited);
        table.register(NodeType::Strong, delimited);
        table.register(NodeType::Strikethrough, delimited);
        table.register(NodeType::Mark, delimited);
        table.register(NodeType::Sup, delimited);
        table.register(NodeType::Sub, delimited);
        table.register(NodeType::Blockquote, blockquote);
        table.register(NodeType::Heading, heading);
        table.register(NodeType::List, list);
        table.register(NodeType::ListItem, list_item);
        table.register(NodeType::TaskListItemMarker, task_list_item_marker);
        table.register(NodeType::ThematicBreak, thematic_break);
        table.register(NodeType::HardBreak, line_break);
        table.register(NodeType::SoftBreak, line_break);
        table.register(NodeType::HtmlBlock, html_block);
        table.register(NodeType::InlineHtml, inline_html);
        table.register(NodeType::HtmlEntity, html_entity);
        table.register(NodeType::Backslash, backslash);
        table.register(NodeType::Link, link);
        table.register(NodeType::Image, link);
        table.register(NodeType::Table, table_node);
        table.register(NodeType::Toc, toc);
        table.register(NodeType::FootnotesRef, footnotes_ref);
        table.register(NodeType::FootnotesDef, footnotes_def);
        table.register(NodeType::YamlFrontMatter, yaml_front_matter);
        table.register(NodeType::KramdownBlockIal, kramdown_block_ial);
    }

    fn finish(r: &mut Renderer<'_, Self>) {
        for def in &r.tree().link_refs {
            r.newline();
            r.write_str(NEWLINE);
            r.write_str(&marker("vditor-sv__marker--bracket", "["));
            r.write_str(&format!(
                "<span class=\"vditor-sv__marker--link\" data-type=\"link-ref-defs-block\">{}</span>",
                escape_html(&def.label)
            ));
            r.write_str(&marker("vditor-sv__marker--bracket", "]"));
            r.write_str("<span>: </span>");
            r.write_str(&marker("vditor-sv__marker--link", &escape_html(&def.dest)));
            if !def.title.is_empty() {
                r.write_char(' ');
                r.write_str(&marker(
                    "vditor-sv__marker--title",
                    &format!("&quot;{}&quot;", escape_html(&def.title)),
                ));
            }
            r.newline();
        }
    }
}

fn marker(class: &str, text: &str) -> String {
    format!("<span class=\"{class}\">{text}</span>")
}

/// Escaped multi-line content with every line break made visible.
fn text_lines(content: &str) -> String {
    let line_break = format!("<span data-type=\"padding\"></span>{NEWLINE}");
    escape_html(content.trim()).replace('\n', &line_break)
}

/// Add `class` to every top-level element of an HTML fragment.
///
/// The fragment must be well formed, with `<` and `>` escaped in text.
pub(crate) fn add_class(html: &str, class: &str) -> String {
    let mut out = String::with_capacity(html.len() + 16);
    let mut depth = 0_usize;
    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        rest = &rest[lt..];
        let Some(gt) = rest.find('>') else {
            break;
        };
        let tag = &rest[..=gt];
        if tag.starts_with("</") {
            depth = depth.saturating_sub(1);
            out.push_str(tag);
        } else {
            let self_closing = tag.ends_with("/>");
            if depth == 0 {
                out.push_str(&tag_with_class(tag, class, self_closing));
            } else {
                out.push_str(tag);
            }
            if !self_closing {
                depth += 1;
            }
        }
        rest = &rest[gt + 1..];
    }
    out.push_str(rest);
    out
}

fn tag_with_class(tag: &str, class: &str, self_closing: bool) -> String {
    const ATTR: &str = " class=\"";
    if let Some(start) = tag.find(ATTR) {
        let value = start + ATTR.len();
        if let Some(len) = tag[value..].find('"') {
            let end = value + len;
            return format!("{} {class}{}", &tag[..end], &tag[end..]);
        }
    }
    let (head, close) = if self_closing {
        (&tag[..tag.len() - 2], " />")
    } else {
        (&tag[..tag.len() - 1], ">")
    };
    format!("{} class=\"{class}\"{close}", head.trim_end())
}

/// Drop trailing line break elements.
fn trim_newlines(mut buf: &str) -> &str {
    while let Some(head) = buf.strip_suffix(NEWLINE) {
        buf = head;
    }
    buf
}

/// Block ending: a line break element after the content.
fn end_block(r: &mut R<'_>) {
    r.newline();
    r.write_str(NEWLINE);
}

fn document(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.push_buffer(id);
        return WalkStatus::Continue;
    }
    if let Some(buf) = r.pop_buffer(id) {
        r.write_str(buf.trim_matches([' ', '\t', '\n']));
    }
    WalkStatus::Continue
}

fn paragraph(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.push_buffer(id);
        return WalkStatus::Continue;
    }
    r.newline();
    if !r.in_tight_list(id) {
        r.write_str(NEWLINE);
    }
    if let Some(buf) = r.pop_buffer(id) {
        r.write_str(&buf);
    }
    WalkStatus::Continue
}

fn text(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let options = r.options();
    let tokens = r.node(id).tokens.trim_end_matches('\n');
    let content = if options.fix_term_typo {
        fix_term_typo(tokens, &options.terms)
    } else {
        tokens.to_owned()
    };
    r.write_str(&format!("<span data-type=\"text\">{}</span>", escape_html(&content)));
    WalkStatus::SkipChildren
}

fn code_span(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let node = r.node(id);
    let content = node.tokens.as_str();
    let ticks = "`".repeat(node.code_marker_len().max(1));
    let lead = if content.starts_with('`') { " " } else { "" };
    let trail = if content.ends_with('`') { " " } else { "" };
    r.write_str(&marker("vditor-sv__marker", &format!("{ticks}{lead}")));
    r.write_str(&format!("<span>{}</span>", escape_html(content)));
    r.write_str(&marker("vditor-sv__marker", &format!("{trail}{ticks}")));
    WalkStatus::SkipChildren
}

fn fenced(r: &mut R<'_>, kind: &str, fence: &str, info: Option<&str>, content: &str) {
    r.newline();
    r.write_str(&format!(
        "<span data-type=\"{kind}-open-marker\" class=\"vditor-sv__marker\">{fence}</span>"
    ));
    if let Some(info) = info {
        r.write_str(&format!(
            "<span class=\"vditor-sv__marker--info\" data-type=\"code-block-info\">{}</span>",
            escape_html(info)
        ));
    }
    r.newline();
    if !content.trim().is_empty() {
        r.write_str(&format!("<span data-type=\"text\">{}</span>", text_lines(content)));
        r.newline();
    }
    r.write_str(&format!(
        "<span data-type=\"{kind}-close-marker\" class=\"vditor-sv__marker\">{fence}</span>"
    ));
    r.newline();
    end_block(r);
}

fn code_block(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let node = r.node(id);
    match node.code_block().filter(|code| code.fenced) {
        Some(code) => fenced(r, "code-block", &code.fence, Some(code.info.as_str()), &node.tokens),
        None => fenced(r, "code-block", &code_fence(&node.tokens), Some(""), &node.tokens),
    }
    WalkStatus::SkipChildren
}

fn math_block(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let tokens = &r.node(id).tokens;
    fenced(r, "math-block", "$$", None, tokens);
    WalkStatus::SkipChildren
}

fn yaml_front_matter(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let tokens = &r.node(id).tokens;
    fenced(r, "yaml-front-matter", "---", None, tokens);
    WalkStatus::SkipChildren
}

fn inline_math(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let node = r.node(id);
    let dollars = if node.marker().is_empty() { "$" } else { node.marker() };
    r.write_str(&marker("vditor-sv__marker", dollars));
    r.write_str(&format!("<span>{}</span>", escape_html(&node.tokens)));
    r.write_str(&marker("vditor-sv__marker", dollars));
    WalkStatus::SkipChildren
}

fn delimited(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    let node = r.node(id);
    let text = if node.marker().is_empty() {
        default_marker(node.kind)
    } else {
        node.marker()
    };
    let (marker_class, class) = match node.kind {
        NodeType::Emphasis => ("vditor-sv__marker--bi", "em"),
        NodeType::Strong => ("vditor-sv__marker--bi", "strong"),
        NodeType::Strikethrough => ("vditor-sv__marker", "s"),
        NodeType::Mark => ("vditor-sv__marker", "mark"),
        NodeType::Sup => ("vditor-sv__marker", "sup"),
        _ => ("vditor-sv__marker", "sub"),
    };
    if entering {
        r.push_buffer(id);
        r.write_str(&marker(marker_class, text));
        return WalkStatus::Continue;
    }
    r.write_str(&marker(marker_class, text));
    if let Some(buf) = r.pop_buffer(id) {
        r.write_str(&add_class(&buf, class));
    }
    WalkStatus::Continue
}

fn blockquote(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.push_buffer(id);
        return WalkStatus::Continue;
    }
    let Some(buf) = r.pop_buffer(id) else {
        return WalkStatus::Continue;
    };
    let quote = "<span data-type=\"blockquote-marker\" class=\"vditor-sv__marker\">&gt; </span>";
    let body = trim_newlines(&buf).replace(NEWLINE, &format!("{NEWLINE}{quote}"));
    r.write_str(quote);
    r.write_str(&body);
    end_block(r);
    WalkStatus::Continue
}

fn heading(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    let Some(data) = r.node(id).heading() else {
        return WalkStatus::Continue;
    };
    if entering {
        r.push_buffer(id);
        if !data.setext {
            r.write_str(&format!(
                "<span class=\"vditor-sv__marker--heading\" data-type=\"heading-marker\">{} </span>",
                "#".repeat(usize::from(data.level))
            ));
        }
        return WalkStatus::Continue;
    }
    if data.setext {
        let content = r.tree().text(id);
        let width = content.rsplit('\n').next().map_or(0, show_len).max(1);
        let underline = if data.level == 1 { "=" } else { "-" };
        r.newline();
        r.write_str(&format!(
            "<span class=\"vditor-sv__marker--heading\" data-type=\"heading-marker\">{}</span>",
            underline.repeat(width)
        ));
    }
    if let Some(buf) = r.pop_buffer(id) {
        r.write_str(&add_class(&buf, &format!("h{}", data.level)));
    }
    end_block(r);
    WalkStatus::Continue
}

fn list(r: &mut R<'_>, _id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        r.write_str(NEWLINE);
    }
    WalkStatus::Continue
}

fn list_item(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.push_buffer(id);
        return WalkStatus::Continue;
    }
    let Some(buf) = r.pop_buffer(id) else {
        return WalkStatus::Continue;
    };
    let (bullet, padding) = r
        .node(id)
        .list()
        .map_or_else(|| ("-".to_owned(), 2), |data| (data.marker(), data.padding));
    let padding = format!("<span data-type=\"padding\">{}</span>", " ".repeat(padding));
    let body = trim_newlines(&buf).replace(NEWLINE, &format!("{NEWLINE}{padding}"));
    r.write_str(&format!(
        "<span data-type=\"li-marker\" class=\"vditor-sv__marker\">{bullet} </span>"
    ));
    r.write_str(&body);
    r.write_str(NEWLINE);
    WalkStatus::Continue
}

fn task_list_item_marker(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let span = |class: &str, text: &str| {
        format!("<span data-type=\"task-marker\" class=\"{class}\">{text}</span>")
    };
    r.write_str(&span("vditor-sv__marker--bi", "["));
    if r.node(id).task_checked() {
        r.write_str(&span("vditor-sv__marker--strong", "x"));
    } else {
        r.write_str(&span("vditor-sv__marker--bi", " "));
    }
    r.write_str(&span("vditor-sv__marker--bi", "] "));
    WalkStatus::SkipChildren
}

fn thematic_break(r: &mut R<'_>, _id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str(&marker("vditor-sv__marker", "---"));
    end_block(r);
    WalkStatus::SkipChildren
}

fn line_break(r: &mut R<'_>, _id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    WalkStatus::SkipChildren
}

fn html_block(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str(&marker("vditor-sv__marker", &text_lines(&r.node(id).tokens)));
    end_block(r);
    WalkStatus::SkipChildren
}

fn inline_html(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str(&marker("vditor-sv__marker", &escape_html(&r.node(id).tokens)));
    WalkStatus::SkipChildren
}

fn html_entity(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str(&format!(
        "<span class=\"vditor-sv__marker--pre\" data-type=\"html-entity\">{}</span>",
        escape_html(&r.node(id).tokens)
    ));
    WalkStatus::SkipChildren
}

fn backslash(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str("<span data-type=\"backslash\">");
    r.write_str(&marker("vditor-sv__marker", "\\"));
    r.write_str(&escape_html(&r.node(id).tokens));
    r.write_str("</span>");
    WalkStatus::SkipChildren
}

fn link(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    let node = r.node(id);
    let Some(data) = node.link() else {
        return WalkStatus::Continue;
    };
    let dest = if r.options().sanitize && data.dest.trim_start().to_ascii_lowercase().starts_with("javascript:") {
        String::new()
    } else {
        escape_html(&data.dest)
    };

    if matches!(data.link_type, LinkType::Autolink | LinkType::Email) {
        r.write_str(&marker("vditor-sv__marker--bracket", "&lt;"));
        r.write_str(&marker("vditor-sv__marker--link", &dest));
        r.write_str(&marker("vditor-sv__marker--bracket", "&gt;"));
        return WalkStatus::SkipChildren;
    }

    if entering {
        if node.kind == NodeType::Image {
            r.write_str(&marker("vditor-sv__marker", "!"));
        }
        r.write_str(&marker("vditor-sv__marker--bracket", "["));
        return WalkStatus::Continue;
    }
    r.write_str(&marker("vditor-sv__marker--bracket", "]"));
    match data.link_type {
        LinkType::Reference => {
            if r.tree().text(id) != data.label {
                r.write_str(&marker("vditor-sv__marker--link", &format!("[{}]", escape_html(&data.label))));
            }
        }
        LinkType::Collapsed => r.write_str(&marker("vditor-sv__marker--link", "[]")),
        LinkType::Shortcut => {}
        _ => {
            r.write_str(&marker("vditor-sv__marker--paren", "("));
            r.write_str(&marker("vditor-sv__marker--link", &dest));
            if !data.title.is_empty() {
                r.write_char(' ');
                r.write_str(&marker(
                    "vditor-sv__marker--title",
                    &format!("&quot;{}&quot;", escape_html(&data.title)),
                ));
            }
            r.write_str(&marker("vditor-sv__marker--paren", ")"));
        }
    }
    WalkStatus::Continue
}

/// One table line with each cell padded to its column width.
fn table_line(r: &R<'_>, row: NodeId) -> String {
    let tree = r.tree();
    let mut line = String::new();
    for cell in tree.children(row) {
        let Some(width) = r.cell_width(cell) else {
            continue;
        };
        let (before, after) = cell_padding(tree[cell].align(), width.max.saturating_sub(width.content));
        line.push_str("| ");
        line.push_str(&" ".repeat(before));
        line.push_str(&escape_html(&tree.text(cell)));
        line.push_str(&" ".repeat(after));
        line.push(' ');
    }
    for missing in r.missing_cells(row) {
        let _ = write!(line, "| {} ", " ".repeat(missing.max));
    }
    line.push('|');
    line
}

fn table_node(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    if !r.measure_table(id, text_width) {
        return WalkStatus::SkipChildren;
    }
    let tree = r.tree();
    let Some(header) = tree
        .child_of_kind(id, NodeType::TableHead)
        .and_then(|head| tree[head].first_child())
    else {
        return WalkStatus::SkipChildren;
    };

    let mut lines = vec![table_line(r, header)];
    let mut separator = String::new();
    for cell in tree.children(header) {
        if let Some(width) = r.cell_width(cell) {
            separator.push_str(&separator_cell(tree[cell].align(), width.max));
        }
    }
    separator.push('|');
    lines.push(separator);
    lines.extend(
        tree.children(id)
            .filter(|&row| tree[row].kind == NodeType::TableRow)
            .map(|row| table_line(r, row)),
    );

    r.newline();
    r.write_str("<span data-type=\"table\">");
    r.write_str(&lines.join(NEWLINE));
    end_block(r);
    r.write_str("</span>");
    WalkStatus::SkipChildren
}

fn toc(r: &mut R<'_>, _id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str("<span class=\"vditor-toc\" data-type=\"toc-block\" contenteditable=\"false\">[toc]</span>");
    end_block(r);
    WalkStatus::SkipChildren
}

fn footnote_label_spans(label: &str) -> String {
    format!(
        "{}{}{}",
        marker("vditor-sv__marker--bracket", "["),
        marker("vditor-sv__marker--link", &format!("^{}", escape_html(label))),
        marker("vditor-sv__marker--bracket", "]")
    )
}

fn footnotes_ref(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    let label = footnote_label_spans(r.node(id).footnote_label());
    r.write_str(&format!("<span class=\"sup\">{label}</span>"));
    WalkStatus::SkipChildren
}

fn footnotes_def(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str(&footnote_label_spans(r.node(id).footnote_label()));
    r.write_str("<span>: </span>");
    let tree = r.tree();
    for (i, child) in tree.children(id).enumerate() {
        if i > 0 {
            r.write_str("<span data-type=\"padding\">    </span>");
        }
        if r.render_node(child) == WalkStatus::Stop {
            return WalkStatus::Stop;
        }
    }
    WalkStatus::SkipChildren
}

fn kramdown_block_ial(r: &mut R<'_>, id: NodeId, _entering: bool) -> WalkStatus {
    if r.options().kramdown_block_ial {
        r.newline();
        r.write_str(&format!(
            "<span data-type=\"kramdown-ial\" class=\"vditor-sv__marker\">{}</span>",
            escape_html(&r.node(id).tokens)
        ));
        r.newline();
    }
    WalkStatus::SkipChildren
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tome_ast::{Node, NodeData, Tree, parse};
    use tome_config::Options;

    use super::*;

    fn render_with(source: &str, options: &Options) -> String {
        let tree = parse(source, &crate::parse_options(options));
        Renderer::new(&tree, options, SplitView).render().unwrap()
    }

    fn render(source: &str) -> String {
        render_with(source, &Options::default())
    }

    fn text_span(text: &str) -> String {
        format!("<span data-type=\"text\">{text}</span>")
    }

    #[test]
    fn test_add_class_targets_top_level_elements() {
        let html = "<span class=\"m\">*</span><span data-type=\"text\"><b>x</b></span>t<br />";
        assert_eq!(
            add_class(html, "em"),
            "<span class=\"m em\">*</span><span data-type=\"text\" class=\"em\"><b>x</b></span>t<br class=\"em\" />"
        );
    }

    #[test]
    fn test_trim_newlines() {
        let buf = format!("a{NEWLINE}b{NEWLINE}{NEWLINE}");
        assert_eq!(trim_newlines(&buf), format!("a{NEWLINE}b"));
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(render("a < b\n"), format!("{}{NEWLINE}{NEWLINE}", text_span("a &lt; b")));
    }

    #[test]
    fn test_strong_classes_markers_and_text() {
        let out = render("**b**\n");
        assert!(out.starts_with(
            "<span class=\"vditor-sv__marker--bi strong\">**</span>\
             <span data-type=\"text\" class=\"strong\">b</span>\
             <span class=\"vditor-sv__marker--bi strong\">**</span>"
        ));
    }

    #[test]
    fn test_atx_heading() {
        assert_eq!(
            render("## A\n"),
            format!(
                "<span class=\"vditor-sv__marker--heading h2\" data-type=\"heading-marker\">## </span>\
                 <span data-type=\"text\" class=\"h2\">A</span>{NEWLINE}{NEWLINE}"
            )
        );
    }

    #[test]
    fn test_blockquote_marks_every_line() {
        let quote = "<span data-type=\"blockquote-marker\" class=\"vditor-sv__marker\">&gt; </span>";
        assert_eq!(
            render("> a\n>\n> b\n"),
            format!(
                "{quote}{}{NEWLINE}{quote}{NEWLINE}{quote}{}{NEWLINE}{NEWLINE}",
                text_span("a"),
                text_span("b")
            )
        );
    }

    #[test]
    fn test_tight_list_items() {
        let item = |text: &str| {
            format!(
                "<span data-type=\"li-marker\" class=\"vditor-sv__marker\">- </span>{}{NEWLINE}",
                text_span(text)
            )
        };
        assert_eq!(render("- a\n- b\n"), format!("{}{}{NEWLINE}", item("a"), item("b")));
    }

    #[test]
    fn test_list_item_continuation_is_padded() {
        let out = render("- a\n\n  b\n");
        assert!(
            out.contains(&format!("{NEWLINE}<span data-type=\"padding\">  </span>{}", text_span("b"))),
            "{out}"
        );
    }

    #[test]
    fn test_task_marker() {
        let out = render("- [x] done\n");
        assert!(out.contains(
            "<span data-type=\"task-marker\" class=\"vditor-sv__marker--strong\">x</span>"
        ));
    }

    #[test]
    fn test_fenced_code_block() {
        assert_eq!(
            render("```rust\nfn a() {}\n```\n"),
            format!(
                "<span data-type=\"code-block-open-marker\" class=\"vditor-sv__marker\">```</span>\
                 <span class=\"vditor-sv__marker--info\" data-type=\"code-block-info\">rust</span>{NEWLINE}\
                 {}{NEWLINE}\
                 <span data-type=\"code-block-close-marker\" class=\"vditor-sv__marker\">```</span>{NEWLINE}{NEWLINE}",
                text_span("fn a() {}")
            )
        );
    }

    #[test]
    fn test_code_span_markers() {
        let out = render("`a`\n");
        assert!(out.starts_with(
            "<span class=\"vditor-sv__marker\">`</span><span>a</span><span class=\"vditor-sv__marker\">`</span>"
        ));
    }

    #[test]
    fn test_table_is_laid_out_as_text() {
        let out = render("| a | bb |\n| - | -- |\n| 1 | 2 |\n");
        assert_eq!(
            out,
            format!(
                "<span data-type=\"table\">| a | bb |{NEWLINE}| - | -- |{NEWLINE}| 1 | 2  |{NEWLINE}{NEWLINE}</span>"
            )
        );
    }

    #[test]
    fn test_link_markers() {
        let out = render("[a](/b \"t\")\n");
        assert!(out.contains(
            "<span class=\"vditor-sv__marker--paren\">(</span>\
             <span class=\"vditor-sv__marker--link\">/b</span> \
             <span class=\"vditor-sv__marker--title\">&quot;t&quot;</span>\
             <span class=\"vditor-sv__marker--paren\">)</span>"
        ));
    }

    #[test]
    fn test_sanitize_blanks_script_links() {
        let options = Options {
            sanitize: true,
            ..Options::default()
        };
        let out = render_with("[a](javascript:alert)\n", &options);
        assert!(out.contains("<span class=\"vditor-sv__marker--link\"></span>"), "{out}");
    }

    #[test]
    fn test_super_block_has_no_render_function() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(
            root,
            Node::new(NodeType::SuperBlock).with_data(NodeData::SuperBlock { layout: "row".to_owned() }),
        );
        let options = Options::default();
        let out = Renderer::new(&tree, &options, SplitView).render().unwrap();
        assert_eq!(out, "not found render function for node [type=SuperBlock, Tokens=]");
    }
}
