//! Round-trip Markdown.
//!
//! Re-serializes the tree using the markers recorded on its nodes, so that
//! rendering the parse of the output gives the output back unchanged.
//! Blockquotes, lists, list items and footnote definitions render into
//! their own buffer and reformat it on leave.

use tome_ast::{Align, LinkType, NodeData, NodeId, NodeType, WalkStatus};

use crate::renderer::{Dialect, DispatchTable, Renderer};
use crate::table::{cell_padding, rendered_width, separator_cell};
use crate::util::{is_blank, show_len};

/// Hooks that vary the Markdown dialect.
pub trait MarkdownFlavor {
    /// Dialect name used in log events.
    const NAME: &'static str;

    /// Destination to write for a link, image or link reference definition.
    ///
    /// `measuring` is set while table cells are being measured, when the
    /// result is discarded.
    fn link_dest(&mut self, dest: &str, measuring: bool) -> String {
        let _ = measuring;
        dest.to_owned()
    }

    /// Clear per-call state.
    fn reset(&mut self) {}
}

/// Destinations written as they are.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

impl MarkdownFlavor for Plain {
    const NAME: &'static str = "markdown";
}

/// Round-trip Markdown dialect.
#[derive(Clone, Debug, Default)]
pub struct Markdown<F: MarkdownFlavor = Plain> {
    flavor: F,
}

impl Markdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: MarkdownFlavor> Markdown<F> {
    /// Markdown with a custom flavor.
    pub fn with_flavor(flavor: F) -> Self {
        Self { flavor }
    }

    pub fn flavor(&self) -> &F {
        &self.flavor
    }

    pub fn into_flavor(self) -> F {
        self.flavor
    }
}

type R<'t, F> = Renderer<'t, Markdown<F>>;

impl<F: MarkdownFlavor> Dialect for Markdown<F> {
    const NAME: &'static str = F::NAME;

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
        table.register(NodeType::Tag, delimited);
        table.register(NodeType::Kbd, kbd);
        table.register(NodeType::Blockquote, blockquote);
        table.register(NodeType::Heading, heading);
        table.register(NodeType::List, list);
        table.register(NodeType::ListItem, list_item);
        table.register(NodeType::TaskListItemMarker, task_list_item_marker);
        table.register(NodeType::ThematicBreak, thematic_break);
        table.register(NodeType::HardBreak, hard_break);
        table.register(NodeType::SoftBreak, soft_break);
        table.register(NodeType::HtmlBlock, html_block);
        table.register(NodeType::InlineHtml, raw_tokens);
        table.register(NodeType::HtmlEntity, raw_tokens);
        table.register(NodeType::Backslash, backslash);
        table.register(NodeType::Link, link);
        table.register(NodeType::Image, image);
        table.register(NodeType::Table, table_node);
        table.register(NodeType::TableHead, table_head);
        table.register(NodeType::TableRow, table_row);
        table.register(NodeType::TableCell, table_cell);
        table.register(NodeType::Toc, toc);
        table.register(NodeType::FootnotesRef, footnotes_ref);
        table.register(NodeType::FootnotesDef, footnotes_def);
        table.register(NodeType::YamlFrontMatter, yaml_front_matter);
        table.register(NodeType::KramdownBlockIal, kramdown_block_ial);
        table.register(NodeType::KramdownSpanIal, kramdown_span_ial);
        table.register(NodeType::SuperBlock, super_block);
        table.register(NodeType::GitConflict, git_conflict);
    }

    fn reset(&mut self) {
        self.flavor.reset();
    }

    fn finish(r: &mut Renderer<'_, Self>) {
        let refs = &r.tree().link_refs;
        if refs.is_empty() {
            return;
        }
        let measuring = r.is_measuring();
        r.write_char('\n');
        for def in refs {
            let dest = r.dialect_mut().flavor.link_dest(&def.dest, measuring);
            r.write_str(&format!("[{}]: {}", def.label, format_dest(&dest)));
            if !def.title.is_empty() {
                r.write_str(&format_title(&def.title));
            }
            r.write_char('\n');
        }
    }
}

/// Destination in link syntax, angle-bracketed when it contains spaces.
fn format_dest(dest: &str) -> String {
    if dest.contains(' ') {
        format!("<{dest}>")
    } else {
        dest.to_owned()
    }
}

fn format_title(title: &str) -> String {
    format!(" \"{}\"", title.replace('"', "\\\""))
}

/// Prefix every line of a blockquote's content with `>`.
///
/// One trailing blank line is dropped when there are two, and another one
/// at the outermost level.
pub(crate) fn quote_lines(buf: &str, outermost: bool) -> String {
    let mut lines: Vec<&str> = buf.split('\n').collect();
    let len = lines.len();
    if len > 2 && is_blank(lines[len - 1]) && is_blank(lines[len - 2]) {
        lines.pop();
    }
    if outermost && lines.len() > 1 && lines.last().is_some_and(|l| is_blank(l)) {
        lines.pop();
    }

    let mut out = String::with_capacity(buf.len() + lines.len() * 2);
    for line in lines {
        if line.is_empty() {
            out.push_str(">\n");
            continue;
        }
        out.push_str(if line.starts_with('>') { ">" } else { "> " });
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Indent a list item's content under its marker.
pub(crate) fn indent_item(buf: &str, marker: &str) -> String {
    let indent = " ".repeat(marker.len() + 1);
    let mut lines = String::with_capacity(buf.len() * 2);
    for line in buf.split('\n') {
        if !line.is_empty() {
            lines.push_str(&indent);
            lines.push_str(line);
        }
        lines.push('\n');
    }
    let body = if indent.len() < lines.len() {
        &lines[indent.len()..]
    } else {
        lines.as_str()
    };
    format!("{marker} {body}")
}

/// Label the first line of a footnote definition and indent the rest.
pub(crate) fn footnote_lines(buf: &str, label: &str) -> String {
    let mut out = format!("[^{label}]: ");
    for (i, line) in buf.trim_end().split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !is_blank(line) {
                out.push_str("    ");
            }
        }
        if i == 0 || !is_blank(line) {
            out.push_str(line);
        }
    }
    out.push('\n');
    out
}

/// Shortest backtick fence longer than any fence line inside `code`, at least 3.
pub(crate) fn code_fence(code: &str) -> String {
    let longest = code
        .lines()
        .map(|line| line.trim_start().bytes().take_while(|&b| b == b'`').count())
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn document<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.push_buffer(id);
        return WalkStatus::Continue;
    }
    if let Some(buf) = r.pop_buffer(id) {
        r.write_str(buf.trim_matches([' ', '\t', '\n']));
        r.write_char('\n');
    }
    WalkStatus::Continue
}

fn paragraph<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        return WalkStatus::Continue;
    }
    let in_cell = r.in_table_cell(id);
    let without_ial = r.without_ial(id);
    if !in_cell && without_ial {
        r.newline();
    }

    let tree = r.tree();
    let tight = r.in_tight_list(id);
    let last_para_of_list = tree[id].parent().is_some_and(|item| {
        tree[item].kind == NodeType::ListItem && tree[item].next().is_none() && tree[id].next().is_none()
    });
    if (!tight || last_para_of_list) && !in_cell && without_ial {
        r.write_char('\n');
    }
    cell_break(r, id);
    WalkStatus::Continue
}

/// Blocks inside a table cell stay on the cell's line, joined by `<br/>`.
fn cell_break<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId) {
    if r.node(id).next().is_some() && r.in_table_cell(id) {
        r.write_str("<br/>");
    }
}

fn text<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    let text = r.process_text(id);
    r.write_str(&text);
    WalkStatus::SkipChildren
}

fn code_span<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    let node = r.node(id);
    let content = node.tokens.as_str();
    r.code_span_space_before(id);

    if r.in_table_cell(id) {
        let escaped = content
            .replace("\\|", "|")
            .replace('|', "\\|")
            .replace("<br/>", "");
        if content.contains('|') || content.contains('`') {
            r.write_str(&format!("<code>{escaped}</code>"));
        } else {
            r.write_str(&format!("`{escaped}`"));
        }
        r.code_span_space_after(id);
        return WalkStatus::SkipChildren;
    }

    let longest_run = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let marker = "`".repeat(node.code_marker_len().max(longest_run + 1));
    let pad = content.starts_with('`')
        || content.ends_with('`')
        || (content.len() > 1
            && content.starts_with(' ')
            && content.ends_with(' ')
            && !content.bytes().all(|b| b == b' '));
    let space = if pad { " " } else { "" };
    r.write_str(&format!("{marker}{space}{content}{space}{marker}"));
    r.code_span_space_after(id);
    WalkStatus::SkipChildren
}

fn code_block<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    let node = r.node(id);
    r.newline();
    match node.code_block().filter(|code| code.fenced) {
        Some(code) => {
            r.write_str(&code.fence);
            r.write_str(&code.info);
            r.write_char('\n');
            r.write_str(&node.tokens);
            r.newline();
            r.write_str(&code.fence);
        }
        None => {
            let fence = code_fence(&node.tokens);
            r.write_str(&fence);
            r.write_char('\n');
            r.write_str(&node.tokens);
            r.newline();
            r.write_str(&fence);
        }
    }
    r.newline();
    if !r.is_last_node(id) && r.without_ial(id) {
        r.write_char('\n');
    }
    WalkStatus::SkipChildren
}

fn math_block<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str("$$\n");
    r.write_str(&r.node(id).tokens);
    r.write_str("\n$$\n");
    if !r.is_last_node(id) && r.without_ial(id) {
        r.write_char('\n');
    }
    WalkStatus::SkipChildren
}

fn inline_math<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    let node = r.node(id);
    let marker = if node.marker().is_empty() { "$" } else { node.marker() };
    r.write_str(marker);
    r.write_str(&node.tokens);
    r.write_str(marker);
    WalkStatus::SkipChildren
}

pub(crate) fn default_marker(kind: NodeType) -> &'static str {
    match kind {
        NodeType::Emphasis => "*",
        NodeType::Strong => "**",
        NodeType::Strikethrough => "~~",
        NodeType::Mark => "==",
        NodeType::Sup => "^",
        NodeType::Sub => "~",
        _ => "#",
    }
}

fn delimited<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    let node = r.node(id);
    let marker = if node.marker().is_empty() {
        default_marker(node.kind)
    } else {
        node.marker()
    };
    if entering {
        r.text_auto_space_previous(id);
        r.write_str(marker);
    } else {
        r.write_str(marker);
        r.text_auto_space_next(id);
    }
    WalkStatus::Continue
}

fn kbd<F: MarkdownFlavor>(r: &mut R<'_, F>, _id: NodeId, entering: bool) -> WalkStatus {
    r.write_str(if entering { "<kbd>" } else { "</kbd>" });
    WalkStatus::Continue
}

fn blockquote<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.push_buffer(id);
        return WalkStatus::Continue;
    }
    let Some(buf) = r.pop_buffer(id) else {
        return WalkStatus::Continue;
    };
    let mut quoted = quote_lines(&buf, r.depth() == 1);
    let in_cell = r.in_table_cell(id);
    if in_cell {
        quoted.retain(|c| c != '\n');
    }
    r.write_str(&quoted);
    r.trim_active();
    if !in_cell && r.without_ial(id) {
        r.write_str("\n\n");
    }
    cell_break(r, id);
    WalkStatus::Continue
}

fn heading<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    let Some(data) = r.node(id).heading() else {
        return WalkStatus::Continue;
    };
    if entering {
        if !data.setext {
            r.write_str(&"#".repeat(usize::from(data.level)));
            r.write_char(' ');
        }
        return WalkStatus::Continue;
    }

    if data.setext {
        let content = r.tree().text(id);
        let width = content.rsplit('\n').next().map_or(0, show_len);
        let underline = if data.level == 1 { "=" } else { "-" };
        r.write_char('\n');
        r.write_str(&underline.repeat(if width == 0 { 3 } else { width }));
    }
    if !r.in_table_cell(id) && r.without_ial(id) {
        r.newline();
        r.write_char('\n');
    }
    cell_break(r, id);
    WalkStatus::Continue
}

fn list<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.push_buffer(id);
        return WalkStatus::Continue;
    }
    let Some(buf) = r.pop_buffer(id) else {
        return WalkStatus::Continue;
    };
    r.write_str(&buf);
    r.trim_active();
    if !r.in_table_cell(id) && r.without_ial(id) {
        r.write_str("\n\n");
    }
    cell_break(r, id);
    WalkStatus::Continue
}

fn list_item<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.push_buffer(id);
        return WalkStatus::Continue;
    }
    let Some(buf) = r.pop_buffer(id) else {
        return WalkStatus::Continue;
    };
    let marker = r.node(id).list().map_or_else(|| "-".to_owned(), |data| data.marker());
    let mut item = indent_item(&buf, &marker);
    let in_cell = r.in_table_cell(id);
    if in_cell {
        item.retain(|c| c != '\n');
    }
    r.write_str(&item);
    r.trim_active();
    if !in_cell {
        let tree = r.tree();
        let loose = tree[id]
            .parent()
            .and_then(|list| tree[list].list())
            .is_some_and(|list| !list.tight);
        r.write_str(if loose && tree[id].next().is_some() { "\n\n" } else { "\n" });
    }
    cell_break(r, id);
    WalkStatus::Continue
}

fn task_list_item_marker<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str(if r.node(id).task_checked() { "[X] " } else { "[ ] " });
    WalkStatus::SkipChildren
}

fn thematic_break<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    if r.in_table_cell(id) {
        r.write_str("<hr/>");
        return WalkStatus::SkipChildren;
    }
    r.newline();
    r.write_str("---");
    r.newline();
    if !r.is_last_node(id) && r.without_ial(id) {
        r.write_char('\n');
    }
    WalkStatus::SkipChildren
}

fn hard_break<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    if !r.options().soft_break_to_hard_break {
        r.write_str("\\\n");
    } else if r.in_table_cell(id) {
        r.write_str("<br/>");
    } else {
        r.write_char('\n');
    }
    WalkStatus::SkipChildren
}

fn soft_break<F: MarkdownFlavor>(r: &mut R<'_, F>, _id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    WalkStatus::SkipChildren
}

fn html_block<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str(&r.node(id).tokens);
    r.newline();
    if !r.is_last_node(id) && r.without_ial(id) {
        r.write_char('\n');
    }
    WalkStatus::SkipChildren
}

fn raw_tokens<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str(&r.node(id).tokens);
    WalkStatus::SkipChildren
}

fn backslash<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_char('\\');
    r.write_str(&r.node(id).tokens);
    WalkStatus::SkipChildren
}

fn link<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    let Some(data) = r.node(id).link() else {
        return WalkStatus::Continue;
    };
    if matches!(data.link_type, LinkType::Autolink | LinkType::Email) {
        r.text_auto_space_previous(id);
        let measuring = r.is_measuring();
        let dest = r.dialect_mut().flavor.link_dest(&data.dest, measuring);
        r.write_str(&format!("<{dest}>"));
        r.text_auto_space_next(id);
        return WalkStatus::SkipChildren;
    }

    if entering {
        r.text_auto_space_previous(id);
        r.write_char('[');
        return WalkStatus::Continue;
    }
    r.write_char(']');
    match data.link_type {
        LinkType::Reference => {
            if r.tree().text(id) != data.label {
                r.write_str(&format!("[{}]", data.label));
            }
        }
        LinkType::Collapsed => r.write_str("[]"),
        LinkType::Shortcut => {}
        _ => write_dest_title(r, &data.dest, &data.title),
    }
    r.text_auto_space_next(id);
    WalkStatus::Continue
}

fn write_dest_title<F: MarkdownFlavor>(r: &mut R<'_, F>, dest: &str, title: &str) {
    let measuring = r.is_measuring();
    let dest = r.dialect_mut().flavor.link_dest(dest, measuring);
    r.write_char('(');
    r.write_str(&format_dest(&dest));
    if !title.is_empty() {
        r.write_str(&format_title(title));
    }
    r.write_char(')');
}

fn image<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write_str("![");
        return WalkStatus::Continue;
    }
    r.write_char(']');
    if let Some(data) = r.node(id).link() {
        match data.link_type {
            LinkType::Reference => r.write_str(&format!("[{}]", data.label)),
            LinkType::Collapsed => r.write_str("[]"),
            LinkType::Shortcut => {}
            _ => write_dest_title(r, &data.dest, &data.title),
        }
    }
    WalkStatus::Continue
}

fn table_node<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        if !r.measure_table(id, rendered_width) {
            return WalkStatus::SkipChildren;
        }
        return WalkStatus::Continue;
    }
    r.newline();
    if !r.is_last_node(id) && r.without_ial(id) {
        r.write_char('\n');
    }
    WalkStatus::Continue
}

fn table_head<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        return WalkStatus::Continue;
    }
    let tree = r.tree();
    let Some(row) = tree[id].first_child() else {
        return WalkStatus::Continue;
    };
    let compact = r.options().protyle_wysiwyg;
    let mut separator = String::new();
    for cell in tree.children(row) {
        if let Some(width) = r.cell_width(cell) {
            let align = tree[cell].align();
            let mut column = separator_cell(align, width.max);
            if compact && align != Align::Center {
                column.pop();
            }
            separator.push_str(&column);
        }
    }
    separator.push_str("|\n");
    r.write_str(&separator);
    WalkStatus::Continue
}

fn table_row<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        return WalkStatus::Continue;
    }
    let compact = r.options().protyle_wysiwyg;
    for missing in r.missing_cells(id) {
        if compact {
            r.write_char('|');
        } else {
            r.write_str(&format!("| {} ", " ".repeat(missing.max)));
        }
    }
    r.write_str("|\n");
    WalkStatus::Continue
}

fn table_cell<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    let Some(width) = r.cell_width(id) else {
        return WalkStatus::SkipChildren;
    };
    // The block editor lays cells out itself.
    if r.options().protyle_wysiwyg {
        if entering {
            r.write_char('|');
        }
        return WalkStatus::Continue;
    }
    let (before, after) = cell_padding(r.node(id).align(), width.max.saturating_sub(width.content));
    if entering {
        r.write_str("| ");
        r.write_str(&" ".repeat(before));
    } else {
        r.write_str(&" ".repeat(after));
        r.write_char(' ');
    }
    WalkStatus::Continue
}

fn toc<F: MarkdownFlavor>(r: &mut R<'_, F>, _id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str("[toc]\n\n");
    WalkStatus::SkipChildren
}

fn footnotes_ref<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    r.write_str(&format!("[^{}]", r.node(id).footnote_label()));
    WalkStatus::SkipChildren
}

fn footnotes_def<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.push_buffer(id);
        return WalkStatus::Continue;
    }
    let Some(buf) = r.pop_buffer(id) else {
        return WalkStatus::Continue;
    };
    let def = footnote_lines(&buf, r.node(id).footnote_label());
    r.write_str(&def);
    r.trim_active();
    r.write_str("\n\n");
    WalkStatus::Continue
}

fn yaml_front_matter<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str("---\n");
    r.write_str(&r.node(id).tokens);
    r.write_str("\n---\n");
    if !r.is_last_node(id) {
        r.write_char('\n');
    }
    WalkStatus::SkipChildren
}

fn kramdown_block_ial<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if !r.options().kramdown_block_ial {
        return WalkStatus::SkipChildren;
    }
    if entering {
        r.newline();
        r.write_str(&r.node(id).tokens);
        return WalkStatus::Continue;
    }
    let tree = r.tree();
    let loose_parent = tree[id].parent().and_then(|parent| match tree[parent].kind {
        NodeType::List | NodeType::ListItem => tree[parent].list().map(|list| !list.tight),
        _ => None,
    });
    if loose_parent.unwrap_or(true) {
        r.newline();
    }
    r.write_char('\n');
    WalkStatus::Continue
}

fn kramdown_span_ial<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    if r.options().kramdown_span_ial {
        r.write_str(&r.node(id).tokens);
    }
    WalkStatus::SkipChildren
}

fn super_block<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let layout = match &r.node(id).data {
            NodeData::SuperBlock { layout } => layout.as_str(),
            _ => "row",
        };
        r.newline();
        r.write_str(&format!("{{{{{{{layout}\n"));
        return WalkStatus::Continue;
    }
    r.newline();
    r.write_str("}}}");
    r.newline();
    if !r.is_last_node(id) {
        r.write_char('\n');
    }
    WalkStatus::Continue
}

fn git_conflict<F: MarkdownFlavor>(r: &mut R<'_, F>, id: NodeId, _entering: bool) -> WalkStatus {
    r.newline();
    r.write_str(&r.node(id).tokens);
    r.newline();
    if !r.is_last_node(id) {
        r.write_char('\n');
    }
    WalkStatus::SkipChildren
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tome_ast::{ListData, Node, Tree, parse};
    use tome_config::Options;

    use super::*;

    fn render_with(source: &str, options: &Options) -> String {
        let tree = parse(source, &crate::parse_options(options));
        Renderer::new(&tree, options, Markdown::new()).render().unwrap()
    }

    fn render(source: &str) -> String {
        render_with(source, &Options::default())
    }

    fn assert_fixpoint(source: &str) {
        let once = render(source);
        let twice = render(&once);
        assert_eq!(twice, once, "not a fixpoint for {source:?}");
    }

    #[test]
    fn test_quote_lines() {
        assert_eq!(quote_lines("a\n\nb\n\n", true), "> a\n>\n> b\n");
        assert_eq!(quote_lines("> a\n", false), ">> a\n>\n");
    }

    #[test]
    fn test_indent_item() {
        assert_eq!(indent_item("a\n\nb\n", "1."), "1. a\n\n   b\n\n");
        assert_eq!(indent_item("a\n", "-"), "- a\n\n");
    }

    #[test]
    fn test_footnote_lines() {
        assert_eq!(footnote_lines("one\n\ntwo\n\n", "n"), "[^n]: one\n\n    two\n");
    }

    #[test]
    fn test_code_fence_outgrows_content() {
        assert_eq!(code_fence("plain"), "```");
        assert_eq!(code_fence("````\nx\n````"), "`````");
    }

    #[test]
    fn test_paragraphs_and_headings() {
        assert_eq!(render("# Title\n\nBody text.\n"), "# Title\n\nBody text.\n");
        assert_eq!(render("Title\n=====\n\nx\n"), "Title\n=====\n\nx\n");
    }

    #[test]
    fn test_setext_underline_matches_display_width() {
        assert_eq!(render("标题\n---\n"), "标题\n----\n");
    }

    #[test]
    fn test_blockquote_two_paragraphs() {
        assert_eq!(render("> a\n>\n> b\n"), "> a\n>\n> b\n");
    }

    #[test]
    fn test_nested_blockquote() {
        assert_eq!(render("> a\n>\n> > b\n"), "> a\n>\n>> b\n>>\n");
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(render("- a\n- b\n"), "- a\n- b\n");
    }

    #[test]
    fn test_loose_ordered_list() {
        assert_eq!(render("1. a\n\n2. b\n"), "1. a\n\n2. b\n");
    }

    #[test]
    fn test_nested_list_is_indented_by_marker_width() {
        assert_eq!(render("1. a\n   - b\n"), "1. a\n   - b\n");
    }

    #[test]
    fn test_task_list() {
        assert_eq!(render("- [x] done\n- [ ] todo\n"), "- [X] done\n- [ ] todo\n");
    }

    #[test]
    fn test_table_layout() {
        assert_eq!(
            render("|A|BB|\n|-|-|\n|1|2|\n"),
            "| A | BB |\n| - | -- |\n| 1 | 2  |\n"
        );
    }

    #[test]
    fn test_table_alignment_and_padding() {
        assert_eq!(
            render("| aaa | bbb | ccc |\n|:-:|--:|:--|\n| x | y | z |\n"),
            "| aaa | bbb | ccc |\n| :-: | --: | :-- |\n|  x  |   y | z   |\n"
        );
    }

    #[test]
    fn test_table_without_header_is_skipped() {
        let mut tree = Tree::new();
        let root = tree.root();
        let table = tree.append_child(root, Node::new(NodeType::Table));
        let row = tree.append_child(table, Node::new(NodeType::TableRow));
        let cell = tree.append_child(row, Node::new(NodeType::TableCell));
        tree.append_child(cell, Node::new(NodeType::Text).with_tokens("x"));
        let options = Options::default();
        let out = Renderer::new(&tree, &options, Markdown::new()).render().unwrap();
        assert_eq!(out, "\n");
    }

    #[test]
    fn test_table_row_missing_cells_is_padded() {
        let mut tree = Tree::new();
        let root = tree.root();
        let table = tree.append_child(root, Node::new(NodeType::Table));
        let head = tree.append_child(table, Node::new(NodeType::TableHead));
        let head_row = tree.append_child(head, Node::new(NodeType::TableRow));
        for text in ["a", "bb"] {
            let cell = tree.append_child(head_row, Node::new(NodeType::TableCell));
            tree.append_child(cell, Node::new(NodeType::Text).with_tokens(text));
        }
        let row = tree.append_child(table, Node::new(NodeType::TableRow));
        let cell = tree.append_child(row, Node::new(NodeType::TableCell));
        tree.append_child(cell, Node::new(NodeType::Text).with_tokens("1"));

        let options = Options::default();
        let out = Renderer::new(&tree, &options, Markdown::new()).render().unwrap();
        assert_eq!(out, "| a | bb |\n| - | -- |\n| 1 |    |\n");
    }

    /// Table with a header cell `h` and one body cell built by `fill`.
    fn table_with_cell(fill: impl FnOnce(&mut Tree, NodeId)) -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let table = tree.append_child(root, Node::new(NodeType::Table));
        let head = tree.append_child(table, Node::new(NodeType::TableHead));
        let head_row = tree.append_child(head, Node::new(NodeType::TableRow));
        let head_cell = tree.append_child(head_row, Node::new(NodeType::TableCell));
        tree.append_child(head_cell, Node::new(NodeType::Text).with_tokens("h"));
        let row = tree.append_child(table, Node::new(NodeType::TableRow));
        let cell = tree.append_child(row, Node::new(NodeType::TableCell));
        fill(&mut tree, cell);
        tree
    }

    fn paragraph_with(tree: &mut Tree, parent: NodeId, text: &str) {
        let para = tree.append_child(parent, Node::new(NodeType::Paragraph));
        tree.append_child(para, Node::new(NodeType::Text).with_tokens(text));
    }

    #[test]
    fn test_blocks_in_table_cell_stay_on_one_line() {
        let tree = table_with_cell(|tree, cell| {
            let quote = tree.append_child(cell, Node::new(NodeType::Blockquote));
            paragraph_with(tree, quote, "a");
            paragraph_with(tree, quote, "b");
        });
        let options = Options::default();
        let mut renderer = Renderer::new(&tree, &options, Markdown::new());
        let out = renderer.render().unwrap();
        assert_eq!(out, "| h         |\n| --------- |\n| > a<br/>b |\n");
        let stats = renderer.stats();
        assert_eq!(stats.pushes, stats.pops);
    }

    #[test]
    fn test_list_in_table_cell_joins_items() {
        let tree = table_with_cell(|tree, cell| {
            let data = ListData {
                tight: true,
                ..ListData::default()
            };
            let list = tree.append_child(cell, Node::new(NodeType::List).with_data(NodeData::List(data.clone())));
            for text in ["a", "b"] {
                let item =
                    tree.append_child(list, Node::new(NodeType::ListItem).with_data(NodeData::List(data.clone())));
                paragraph_with(tree, item, text);
            }
        });
        let options = Options::default();
        let out = Renderer::new(&tree, &options, Markdown::new()).render().unwrap();
        assert!(out.ends_with("| - a<br/>- b |\n"), "{out}");
        assert!(!out.trim_end().contains("\n\n"), "{out}");
    }

    #[test]
    fn test_code_blocks() {
        assert_eq!(render("```rust\nfn main() {}\n```\n"), "```rust\nfn main() {}\n```\n");
        assert_eq!(render("    indented\n"), "```\nindented\n```\n");
    }

    #[test]
    fn test_code_span_padding() {
        assert_eq!(render("`` `tick` ``\n"), "`` `tick` ``\n");
        assert_eq!(render("`a`\n"), "`a`\n");
    }

    #[test]
    fn test_links_and_images() {
        assert_eq!(render("[a](https://x.io \"T\")\n"), "[a](https://x.io \"T\")\n");
        assert_eq!(render("![alt](a.png)\n"), "![alt](a.png)\n");
        assert_eq!(render("<https://x.io>\n"), "<https://x.io>\n");
    }

    #[test]
    fn test_reference_links_keep_definitions() {
        assert_eq!(
            render("[a][r]\n\n[r]: https://r.io \"R\"\n"),
            "[a][r]\n\n[r]: https://r.io \"R\"\n"
        );
    }

    #[test]
    fn test_footnotes() {
        assert_eq!(render("x[^1]\n\n[^1]: note\n"), "x[^1]\n\n[^1]: note\n");
    }

    #[test]
    fn test_math_toc_yaml() {
        let options = Options {
            toc: true,
            ..Options::default()
        };
        assert_eq!(
            render_with("---\nk: v\n---\n\n[toc]\n\n$$\nx^2\n$$\n", &options),
            "---\nk: v\n---\n\n[toc]\n\n$$\nx^2\n$$\n"
        );
    }

    #[test]
    fn test_hard_break_without_soft_to_hard() {
        let options = Options {
            soft_break_to_hard_break: false,
            ..Options::default()
        };
        assert_eq!(render_with("a\\\nb\n", &options), "a\\\nb\n");
    }

    #[test]
    fn test_block_ial_is_kept() {
        let options = Options {
            kramdown_block_ial: true,
            ..Options::default()
        };
        assert_eq!(render_with("foo\n{: id=\"x\"}\n", &options), "foo\n{: id=\"x\"}\n");
    }

    #[test]
    fn test_auto_space_around_strong() {
        let options = Options {
            auto_space: true,
            ..Options::default()
        };
        assert_eq!(render_with("**A牛**ok\n", &options), "**A牛** ok\n");
        assert_eq!(render_with("**牛A**中\n", &options), "**牛A** 中\n");
        assert_eq!(render_with("在Rust中\n", &options), "在 Rust 中\n");
    }

    #[test]
    fn test_auto_space_keeps_span_content() {
        let options = Options {
            auto_space: true,
            ..Options::default()
        };
        assert_eq!(render_with("**牛A**ok\n", &options), "**牛A** ok\n");
        assert_eq!(render_with("ok*牛A*\n", &options), "ok *牛A*\n");
        assert_eq!(render_with("**牛A** ok\n", &options), "**牛A** ok\n");
        assert_eq!(render_with("**AB**ok\n", &options), "**AB**ok\n");
    }

    #[test]
    fn test_auto_space_outside_code_span() {
        let options = Options {
            auto_space: true,
            ..Options::default()
        };
        assert_eq!(render_with("use`x`now\n", &options), "use `x` now\n");
    }

    #[test]
    fn test_super_block_and_mark() {
        let mut tree = Tree::new();
        let root = tree.root();
        let block = tree.append_child(
            root,
            Node::new(NodeType::SuperBlock).with_data(NodeData::SuperBlock {
                layout: "row".to_owned(),
            }),
        );
        let para = tree.append_child(block, Node::new(NodeType::Paragraph));
        let mark = tree.append_child(para, Node::new(NodeType::Mark));
        tree.append_child(mark, Node::new(NodeType::Text).with_tokens("hi"));
        let options = Options::default();
        let out = Renderer::new(&tree, &options, Markdown::new()).render().unwrap();
        assert_eq!(out, "{{{row\n==hi==\n\n}}}\n");
    }

    #[test]
    fn test_super_block_round_trip() {
        let options = Options {
            super_block: true,
            ..Options::default()
        };
        let once = render_with("{{{row\nfoo\n\n{{{col\nbar\n}}}\n}}}\n\nafter\n", &options);
        assert_eq!(once, "{{{row\nfoo\n\n{{{col\nbar\n\n}}}\n\n}}}\n\nafter\n");
        assert_eq!(render_with(&once, &options), once);
    }

    #[test]
    fn test_compact_table_cells_for_block_editor() {
        let options = Options {
            protyle_wysiwyg: true,
            ..Options::default()
        };
        assert_eq!(
            render_with("| A | BB |\n|:-:|--|\n| 1 | 2 |\n", &options),
            "|A|BB|\n| :-: | --|\n|1|2|\n"
        );
    }

    #[test]
    fn test_round_trip_fixpoint() {
        for source in [
            "# T\n\n- a\n- b\n\ntext *em* **st** ~~del~~\n",
            "| 中文 | b |\n|:-:|-|\n| 1 | 2 |\n",
            "a\n\n---\n\n```\ncode\n```\n",
            "1. a\n   - b\n\n> q\n",
            "a[^n] [l][r]\n\n[^n]: foot\n\n[r]: /u\n",
        ] {
            assert_fixpoint(source);
        }
    }
}
