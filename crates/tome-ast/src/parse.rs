//! Markdown source to [`Tree`] via pulldown-cmark.
//!
//! pulldown-cmark reports events with byte ranges into the source; the
//! builder uses those ranges to recover the marker characters the event
//! stream drops (bullet chars, emphasis delimiters, fences, backtick counts)
//! so the tree carries enough detail to re-serialize the document.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{
    BrokenLink, CodeBlockKind, CowStr, Event, HeadingLevel, MetadataBlockKind, Options, Parser,
    Tag, TagEnd,
};
use regex::Regex;

use crate::node::{
    Align, CodeBlockData, HeadingData, LinkData, LinkType, ListData, Node, NodeData, NodeId,
    NodeType,
};
use crate::tree::{LinkRefDef, Tree};

static IAL_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\{:\s*([^}]*)\}").unwrap());
static IAL_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w[\w-]*)="([^"]*)""#).unwrap());
static SUPER_BLOCK_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\{\{\{(row|col)$").unwrap());

/// Syntax extensions enabled while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseOptions {
    /// GFM tables, task lists and strikethrough.
    pub gfm: bool,
    pub footnotes: bool,
    /// `$inline$` and `$$display$$` math.
    pub math: bool,
    /// Leading `---` YAML block.
    pub yaml_front_matter: bool,
    /// `[toc]` placeholder paragraphs.
    pub toc: bool,
    /// `^sup^` and `~sub~` spans.
    pub sup_sub: bool,
    /// `{: key="value"}` lines attached to blocks.
    pub kramdown_block_ial: bool,
    /// `{: key="value"}` directly after inline spans.
    pub kramdown_span_ial: bool,
    /// `{{{row` / `{{{col` ... `}}}` layout blocks.
    pub super_block: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            footnotes: true,
            math: true,
            yaml_front_matter: true,
            toc: true,
            sup_sub: false,
            kramdown_block_ial: false,
            kramdown_span_ial: false,
            super_block: false,
        }
    }
}

impl ParseOptions {
    fn cmark_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.math {
            options.insert(Options::ENABLE_MATH);
        }
        if self.yaml_front_matter {
            options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        }
        if self.sup_sub {
            options.insert(Options::ENABLE_SUPERSCRIPT);
            options.insert(Options::ENABLE_SUBSCRIPT);
        }
        options
    }
}

/// Parse attribute list pairs out of `{: k="v" ...}`.
pub fn parse_ial(text: &str) -> Option<Vec<(String, String)>> {
    let caps = IAL_LINE.captures(text.trim())?;
    let body = caps.get(1)?.as_str();
    let pairs: Vec<(String, String)> = IAL_PAIR
        .captures_iter(body)
        .map(|c| (c[1].to_owned(), c[2].to_owned()))
        .collect();
    if pairs.is_empty() { None } else { Some(pairs) }
}

/// Parse Markdown source into a document tree.
pub fn parse(source: &str, options: &ParseOptions) -> Tree {
    let parser = Parser::new_ext(source, options.cmark_options());

    let mut defs: Vec<(usize, LinkRefDef)> = parser
        .reference_definitions()
        .iter()
        .map(|(label, def)| {
            (
                def.span.start,
                LinkRefDef {
                    label: label.to_owned(),
                    dest: def.dest.to_string(),
                    title: def.title.as_ref().map(ToString::to_string).unwrap_or_default(),
                },
            )
        })
        .collect();
    defs.sort_by_key(|(start, _)| *start);
    let defs: Vec<LinkRefDef> = defs.into_iter().map(|(_, def)| def).collect();

    let pieces = if options.super_block {
        super_block_pieces(source)
    } else {
        vec![Piece::Markdown(0..source.len())]
    };

    let mut builder = Builder::new(source, options);
    if let [Piece::Markdown(_)] = pieces[..] {
        for (event, range) in parser.into_offset_iter() {
            builder.event(event, range);
        }
    } else {
        // Each run between layout lines is parsed on its own, so references
        // resolve against the definitions of the whole document.
        let refs: HashMap<String, (String, String)> = defs
            .iter()
            .map(|def| (normalize_label(&def.label), (def.dest.clone(), def.title.clone())))
            .collect();
        for piece in pieces {
            match piece {
                Piece::Markdown(range) => {
                    let segment = source.get(range).unwrap_or_default();
                    let resolve = |link: BrokenLink<'_>| {
                        refs.get(&normalize_label(&link.reference))
                            .map(|(dest, title)| (CowStr::from(dest.clone()), CowStr::from(title.clone())))
                    };
                    let parser =
                        Parser::new_with_broken_link_callback(segment, options.cmark_options(), Some(resolve));
                    builder.segment(segment);
                    for (event, range) in parser.into_offset_iter() {
                        builder.event(event, range);
                    }
                }
                Piece::Open(layout) => builder.open_super_block(layout),
                Piece::Close => builder.close_super_block(),
            }
        }
    }
    let mut tree = builder.finish();
    tree.link_refs = defs;
    tree
}

/// Reference label as matched: case-folded with inner whitespace collapsed.
fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// A run of Markdown or a layout block boundary line.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Markdown(Range<usize>),
    Open(String),
    Close,
}

/// Backtick or tilde run that opens or closes a fenced code block.
fn fence_run(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let ch = line.chars().next().filter(|&c| c == '`' || c == '~')?;
    let len = line.chars().take_while(|&c| c == ch).count();
    (len >= 3).then(|| &line[..len])
}

/// Split `source` at `{{{layout` and `}}}` lines outside fenced code.
///
/// An opening line without a matching `}}}` stays ordinary Markdown.
fn super_block_pieces(source: &str) -> Vec<Piece> {
    let mut pieces: Vec<Piece> = Vec::new();
    let mut open: Vec<(usize, Range<usize>)> = Vec::new();
    let mut fence: Option<&str> = None;
    let mut start = 0;
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        let end = offset + line.len();
        let trimmed = line.trim_end();
        let run = fence_run(trimmed);
        if let Some(current) = fence {
            if run.is_some_and(|run| run.starts_with(current) && trimmed.trim_start().len() == run.len()) {
                fence = None;
            }
        } else if run.is_some() {
            fence = run;
        } else if let Some(caps) = SUPER_BLOCK_OPEN.captures(trimmed) {
            if start < offset {
                pieces.push(Piece::Markdown(start..offset));
            }
            open.push((pieces.len(), offset..end));
            pieces.push(Piece::Open(caps[1].to_owned()));
            start = end;
        } else if trimmed == "}}}" && !open.is_empty() {
            if start < offset {
                pieces.push(Piece::Markdown(start..offset));
            }
            open.pop();
            pieces.push(Piece::Close);
            start = end;
        }
        offset = end;
    }
    if start < source.len() {
        pieces.push(Piece::Markdown(start..source.len()));
    }

    for (index, line) in open {
        pieces[index] = Piece::Markdown(line);
    }
    let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        if let (Some(Piece::Markdown(last)), Piece::Markdown(next)) = (merged.last_mut(), &piece)
            && last.end == next.start
        {
            last.end = next.end;
            continue;
        }
        merged.push(piece);
    }
    if merged.is_empty() {
        merged.push(Piece::Markdown(0..0));
    }
    merged
}

/// Per-list bookkeeping while its items are open.
struct OpenList {
    id: NodeId,
    loose: bool,
    items: u64,
}

struct Builder<'s> {
    source: &'s str,
    options: &'s ParseOptions,
    tree: Tree,
    stack: Vec<NodeId>,
    lists: Vec<OpenList>,
    synthetic: Vec<NodeId>,
    aligns: Vec<Align>,
    cell_index: usize,
    last_text: Option<NodeId>,
    after_task_marker: bool,
}

impl<'s> Builder<'s> {
    fn new(source: &'s str, options: &'s ParseOptions) -> Self {
        let tree = Tree::new();
        let root = tree.root();
        Self {
            source,
            options,
            tree,
            stack: vec![root],
            lists: Vec::new(),
            synthetic: Vec::new(),
            aligns: Vec::new(),
            cell_index: 0,
            last_text: None,
            after_task_marker: false,
        }
    }

    /// Continue building from another run of the source.
    fn segment(&mut self, segment: &'s str) {
        self.source = segment;
        self.last_text = None;
        self.after_task_marker = false;
    }

    fn open_super_block(&mut self, layout: String) {
        self.close_synthetic();
        self.open(Node::new(NodeType::SuperBlock).with_data(NodeData::SuperBlock { layout }));
    }

    fn close_super_block(&mut self) {
        self.close_synthetic();
        if self.top_kind() == NodeType::SuperBlock {
            self.close();
        }
    }

    fn finish(mut self) -> Tree {
        self.close_synthetic();
        self.tree
    }

    fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.tree.root())
    }

    fn top_kind(&self) -> NodeType {
        self.tree[self.top()].kind
    }

    fn span(&self, range: &Range<usize>) -> &'s str {
        self.source.get(range.clone()).unwrap_or_default()
    }

    fn open(&mut self, node: Node) -> NodeId {
        let id = self.tree.append_child(self.top(), node);
        self.stack.push(id);
        id
    }

    fn close(&mut self) -> Option<NodeId> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    fn leaf(&mut self, node: Node) -> NodeId {
        self.tree.append_child(self.top(), node)
    }

    /// Inline content directly inside a tight list item gets a paragraph.
    fn ensure_inline_parent(&mut self) {
        if self.top_kind() == NodeType::ListItem {
            let id = self.open(Node::new(NodeType::Paragraph));
            self.synthetic.push(id);
        }
    }

    fn close_synthetic(&mut self) {
        if let Some(&id) = self.synthetic.last()
            && self.top() == id
        {
            self.synthetic.pop();
            self.close();
            self.finish_paragraph(id);
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        let text_event = matches!(event, Event::Text(_));
        match event {
            Event::Start(tag) => self.start(tag, &range),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text, &range),
            Event::Code(code) => {
                self.ensure_inline_parent();
                let span = self.span(&range);
                let marker_len = span.bytes().take_while(|&b| b == b'`').count();
                self.leaf(
                    Node::new(NodeType::CodeSpan)
                        .with_tokens(code.as_ref())
                        .with_data(NodeData::CodeSpan { marker_len }),
                );
            }
            Event::InlineMath(math) => {
                self.ensure_inline_parent();
                self.leaf(Self::math(&math, "$"));
            }
            Event::DisplayMath(math) => {
                self.ensure_inline_parent();
                self.leaf(Self::math(&math, "$$"));
            }
            Event::Html(html) => self.html(&html),
            Event::InlineHtml(html) => {
                self.ensure_inline_parent();
                self.leaf(Node::new(NodeType::InlineHtml).with_tokens(html.as_ref()));
            }
            Event::FootnoteReference(label) => {
                self.ensure_inline_parent();
                self.leaf(Node::new(NodeType::FootnotesRef).with_data(NodeData::Footnote {
                    label: label.to_string(),
                }));
            }
            Event::SoftBreak => {
                self.ensure_inline_parent();
                self.leaf(Node::new(NodeType::SoftBreak));
            }
            Event::HardBreak => {
                self.ensure_inline_parent();
                self.leaf(Node::new(NodeType::HardBreak));
            }
            Event::Rule => {
                self.close_synthetic();
                self.leaf(Node::new(NodeType::ThematicBreak));
            }
            Event::TaskListMarker(checked) => {
                self.ensure_inline_parent();
                self.leaf(
                    Node::new(NodeType::TaskListItemMarker)
                        .with_data(NodeData::Task { checked }),
                );
                if let Some(list) = self.lists.last() {
                    if let NodeData::List(data) = &mut self.tree[list.id].data {
                        data.task = true;
                    }
                }
                self.after_task_marker = true;
            }
        }
        if !text_event {
            self.last_text = None;
        }
    }

    fn math(content: &str, marker: &str) -> Node {
        Node::new(NodeType::InlineMath)
            .with_tokens(content)
            .with_data(NodeData::Delimited {
                marker: marker.to_owned(),
            })
    }

    fn html(&mut self, html: &str) {
        if self.top_kind() == NodeType::HtmlBlock {
            let top = self.top();
            self.tree[top].tokens.push_str(html);
        } else {
            self.ensure_inline_parent();
            self.leaf(Node::new(NodeType::InlineHtml).with_tokens(html));
        }
    }

    fn text(&mut self, text: &CowStr<'_>, range: &Range<usize>) {
        match self.top_kind() {
            NodeType::CodeBlock | NodeType::HtmlBlock | NodeType::YamlFrontMatter => {
                let top = self.top();
                self.tree[top].tokens.push_str(text);
                return;
            }
            _ => {}
        }
        self.ensure_inline_parent();

        let mut text: &str = text;
        if self.after_task_marker {
            text = text.trim_start();
            self.after_task_marker = false;
        }

        let span = self.span(range);
        if self.is_escape(text, range) {
            let (ch, rest) = text.split_at(1);
            self.leaf(Node::new(NodeType::Backslash).with_tokens(ch));
            self.last_text = None;
            text = rest;
            if text.is_empty() {
                return;
            }
        } else if span != text && span.starts_with('&') && span.ends_with(';') {
            self.leaf(Node::new(NodeType::HtmlEntity).with_tokens(span));
            self.last_text = None;
            return;
        }

        if self.options.kramdown_span_ial && self.last_text.is_none() && self.span_ial(text) {
            return;
        }

        match self.last_text {
            Some(id) => self.tree[id].tokens.push_str(text),
            None => {
                let id = self.leaf(Node::new(NodeType::Text).with_tokens(text));
                self.last_text = Some(id);
            }
        }
    }

    /// Whether the text event starts right after an unescaped backslash.
    fn is_escape(&self, text: &str, range: &Range<usize>) -> bool {
        let Some(first) = text.chars().next() else {
            return false;
        };
        if !first.is_ascii_punctuation() {
            return false;
        }
        let span = self.span(range);
        if let Some(rest) = span.strip_prefix('\\') {
            return rest.starts_with(first);
        }
        if !span.starts_with(first) {
            return false;
        }
        let slashes = self.source.as_bytes()[..range.start]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        slashes % 2 == 1
    }

    /// Split a leading `{: ...}` off text that follows an inline span.
    fn span_ial(&mut self, text: &str) -> bool {
        let Some(previous) = self.tree[self.top()].last_child() else {
            return false;
        };
        if !matches!(
            self.tree[previous].kind,
            NodeType::Emphasis
                | NodeType::Strong
                | NodeType::Strikethrough
                | NodeType::Link
                | NodeType::Image
                | NodeType::CodeSpan
                | NodeType::Mark
                | NodeType::Sup
                | NodeType::Sub
        ) {
            return false;
        }
        let Some(m) = IAL_LINE.find(text) else {
            return false;
        };
        let Some(ial) = parse_ial(m.as_str()) else {
            return false;
        };
        self.tree[previous].ial = ial;
        self.leaf(Node::new(NodeType::KramdownSpanIal).with_tokens(m.as_str()));
        let rest = &text[m.end()..];
        if !rest.is_empty() {
            let id = self.leaf(Node::new(NodeType::Text).with_tokens(rest));
            self.last_text = Some(id);
        }
        true
    }

    fn start(&mut self, tag: Tag<'_>, range: &Range<usize>) {
        match tag {
            Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Superscript
            | Tag::Subscript
            | Tag::Link { .. }
            | Tag::Image { .. } => self.ensure_inline_parent(),
            _ => self.close_synthetic(),
        }

        let span = self.span(range);
        match tag {
            Tag::Paragraph => {
                if self.top_kind() == NodeType::ListItem
                    && let Some(list) = self.lists.last_mut()
                {
                    list.loose = true;
                }
                self.open(Node::new(NodeType::Paragraph));
            }
            Tag::Heading { level, .. } => {
                let setext = !span.trim_start().starts_with('#');
                self.open(
                    Node::new(NodeType::Heading).with_data(NodeData::Heading(HeadingData {
                        level: heading_level(level),
                        setext,
                    })),
                );
            }
            Tag::BlockQuote(_) => {
                self.open(Node::new(NodeType::Blockquote));
            }
            Tag::CodeBlock(kind) => {
                let data = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let trimmed = span.trim_start();
                        let fence_char = trimmed.chars().next().unwrap_or('`');
                        let fence_len = trimmed.chars().take_while(|&c| c == fence_char).count();
                        CodeBlockData {
                            fenced: true,
                            fence: fence_char.to_string().repeat(fence_len.max(3)),
                            info: info.to_string(),
                        }
                    }
                    CodeBlockKind::Indented => CodeBlockData::default(),
                };
                self.open(Node::new(NodeType::CodeBlock).with_data(NodeData::CodeBlock(data)));
            }
            Tag::HtmlBlock => {
                self.open(Node::new(NodeType::HtmlBlock));
            }
            Tag::List(start) => {
                let marker = span.trim_start();
                let data = match start {
                    Some(start) => ListData {
                        ordered: true,
                        start,
                        num: start,
                        delimiter: marker
                            .trim_start_matches(|c: char| c.is_ascii_digit())
                            .chars()
                            .next()
                            .filter(|&c| c == ')')
                            .unwrap_or('.'),
                        ..ListData::default()
                    },
                    None => ListData {
                        bullet: marker.chars().next().filter(|c| "-*+".contains(*c)).unwrap_or('-'),
                        ..ListData::default()
                    },
                };
                let id = self.open(Node::new(NodeType::List).with_data(NodeData::List(data)));
                self.lists.push(OpenList {
                    id,
                    loose: false,
                    items: 0,
                });
            }
            Tag::Item => {
                let mut data = ListData::default();
                if let Some(list) = self.lists.last_mut() {
                    if let NodeData::List(parent) = &self.tree[list.id].data {
                        data = parent.clone();
                    }
                    data.num = data.start + list.items;
                    list.items += 1;
                }
                data.padding = data.marker().len() + 1;
                self.open(Node::new(NodeType::ListItem).with_data(NodeData::List(data)));
            }
            Tag::FootnoteDefinition(label) => {
                self.open(Node::new(NodeType::FootnotesDef).with_data(NodeData::Footnote {
                    label: label.to_string(),
                }));
            }
            Tag::Table(aligns) => {
                self.aligns = aligns.into_iter().map(Align::from).collect();
                self.open(Node::new(NodeType::Table).with_data(NodeData::Table {
                    aligns: self.aligns.clone(),
                }));
            }
            Tag::TableHead => {
                self.open(Node::new(NodeType::TableHead));
                self.open(Node::new(NodeType::TableRow));
                self.cell_index = 0;
            }
            Tag::TableRow => {
                self.open(Node::new(NodeType::TableRow));
                self.cell_index = 0;
            }
            Tag::TableCell => {
                let align = self.aligns.get(self.cell_index).copied().unwrap_or_default();
                self.cell_index += 1;
                self.open(Node::new(NodeType::TableCell).with_data(NodeData::TableCell { align }));
            }
            Tag::Emphasis => {
                self.open(Self::delimited(NodeType::Emphasis, span, 1));
            }
            Tag::Strong => {
                self.open(Self::delimited(NodeType::Strong, span, 2));
            }
            Tag::Strikethrough => {
                self.open(Self::delimited(NodeType::Strikethrough, span, 2));
            }
            Tag::Superscript => {
                self.open(Self::delimited(NodeType::Sup, span, 1));
            }
            Tag::Subscript => {
                self.open(Self::delimited(NodeType::Sub, span, 1));
            }
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } => {
                self.open(Node::new(NodeType::Link).with_data(NodeData::Link(link_data(
                    link_type, &dest_url, &title, &id,
                ))));
            }
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } => {
                self.open(Node::new(NodeType::Image).with_data(NodeData::Link(link_data(
                    link_type, &dest_url, &title, &id,
                ))));
            }
            Tag::MetadataBlock(MetadataBlockKind::YamlStyle) => {
                self.open(Node::new(NodeType::YamlFrontMatter));
            }
            // Definition lists and non-YAML metadata degrade to paragraphs.
            _ => {
                self.open(Node::new(NodeType::Paragraph));
            }
        }
    }

    fn delimited(kind: NodeType, span: &str, max: usize) -> Node {
        let first = span.chars().next().unwrap_or('*');
        let len = span.chars().take_while(|&c| c == first).count().clamp(1, max);
        Node::new(kind).with_data(NodeData::Delimited {
            marker: first.to_string().repeat(len),
        })
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::Link
            | TagEnd::Image => {
                self.close();
            }
            TagEnd::Item => {
                self.close_synthetic();
                self.close();
            }
            TagEnd::List(_) => {
                self.close_synthetic();
                if let Some(list) = self.lists.pop() {
                    self.set_tight(list.id, !list.loose);
                }
                self.close();
            }
            TagEnd::Paragraph => {
                if let Some(id) = self.close() {
                    self.finish_paragraph(id);
                }
            }
            TagEnd::CodeBlock => {
                if let Some(id) = self.close() {
                    let tokens = &mut self.tree[id].tokens;
                    if tokens.ends_with('\n') {
                        tokens.pop();
                    }
                }
            }
            TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {
                if let Some(id) = self.close() {
                    let trimmed = self.tree[id].tokens.trim_end_matches('\n').len();
                    self.tree[id].tokens.truncate(trimmed);
                }
            }
            TagEnd::TableHead => {
                self.close();
                self.close();
            }
            _ => {
                self.close_synthetic();
                self.close();
            }
        }
    }

    fn set_tight(&mut self, list: NodeId, tight: bool) {
        let items: Vec<NodeId> = self.tree.children(list).collect();
        for id in std::iter::once(list).chain(items) {
            if let NodeData::List(data) = &mut self.tree[id].data {
                data.tight = tight;
            }
        }
    }

    /// Recognize paragraphs that stand for other block kinds.
    fn finish_paragraph(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.tree.children(id).collect();
        if let [only] = children[..] {
            let child = &self.tree[only];
            if self.options.toc
                && child.kind == NodeType::Text
                && child.tokens.trim().eq_ignore_ascii_case("[toc]")
            {
                self.tree.detach(only);
                self.tree[id].kind = NodeType::Toc;
                return;
            }
            if child.kind == NodeType::InlineMath && child.marker() == "$$" {
                let math = child.tokens.trim_matches('\n').to_owned();
                self.tree.detach(only);
                let node = &mut self.tree[id];
                node.kind = NodeType::MathBlock;
                node.tokens = math;
                return;
            }
        }

        if !self.options.kramdown_block_ial {
            return;
        }
        let Some(&last) = children.last() else {
            return;
        };
        if self.tree[last].kind != NodeType::Text {
            return;
        }
        let tokens = self.tree[last].tokens.trim().to_owned();
        if !IAL_LINE.is_match(&tokens) || !tokens.ends_with('}') {
            return;
        }
        let Some(ial) = parse_ial(&tokens) else {
            return;
        };

        if children.len() == 1 {
            // A paragraph holding only an attribute list belongs to the block before it.
            self.tree.detach(last);
            let node = &mut self.tree[id];
            node.kind = NodeType::KramdownBlockIal;
            node.tokens = tokens;
            if let Some(previous) = self.tree[id].previous() {
                self.tree[previous].ial = ial;
            }
            return;
        }

        let before = children[children.len() - 2];
        if self.tree[before].kind != NodeType::SoftBreak {
            return;
        }
        self.tree.detach(before);
        self.tree.detach(last);
        self.tree[id].ial = ial;
        self.tree
            .insert_after(id, Node::new(NodeType::KramdownBlockIal).with_tokens(tokens));
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn link_data(
    link_type: pulldown_cmark::LinkType,
    dest: &str,
    title: &str,
    id: &str,
) -> LinkData {
    use pulldown_cmark::LinkType as L;
    let link_type = match link_type {
        L::Reference | L::ReferenceUnknown => LinkType::Reference,
        L::Collapsed | L::CollapsedUnknown => LinkType::Collapsed,
        L::Shortcut | L::ShortcutUnknown => LinkType::Shortcut,
        L::Autolink => LinkType::Autolink,
        L::Email => LinkType::Email,
        _ => LinkType::Inline,
    };
    LinkData {
        link_type,
        dest: dest.to_owned(),
        title: title.to_owned(),
        label: id.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(tree: &Tree, id: NodeId) -> Vec<NodeType> {
        tree.children(id).map(|c| tree[c].kind).collect()
    }

    fn first(tree: &Tree) -> NodeId {
        tree[tree.root()].first_child().unwrap()
    }

    #[test]
    fn test_parse_emphasis_markers() {
        let tree = parse("_a_ and **b**", &ParseOptions::default());
        let para = first(&tree);
        let children: Vec<NodeId> = tree.children(para).collect();
        assert_eq!(tree[children[0]].marker(), "_");
        assert_eq!(tree[children[2]].marker(), "**");
        assert_eq!(tree.text(para), "a and b");
    }

    #[test]
    fn test_parse_tight_list_gets_paragraphs() {
        let tree = parse("* a\n* b\n", &ParseOptions::default());
        let list = first(&tree);
        let data = tree[list].list().unwrap();
        assert!(data.tight);
        assert_eq!(data.bullet, '*');
        for item in tree.children(list) {
            assert_eq!(kinds(&tree, item), vec![NodeType::Paragraph]);
        }
    }

    #[test]
    fn test_parse_loose_ordered_list() {
        let tree = parse("3) a\n\n4) b\n", &ParseOptions::default());
        let list = first(&tree);
        let data = tree[list].list().unwrap();
        assert!(!data.tight);
        assert!(data.ordered);
        assert_eq!(data.delimiter, ')');
        let items: Vec<NodeId> = tree.children(list).collect();
        assert_eq!(tree[items[1]].list().unwrap().marker(), "4)");
        assert_eq!(tree[items[1]].list().unwrap().padding, 3);
    }

    #[test]
    fn test_parse_task_marker() {
        let tree = parse("- [x] done\n", &ParseOptions::default());
        let list = first(&tree);
        assert!(tree[list].list().unwrap().task);
        let item = tree[list].first_child().unwrap();
        let para = tree[item].first_child().unwrap();
        let children: Vec<NodeId> = tree.children(para).collect();
        assert!(tree[children[0]].task_checked());
        assert_eq!(tree[children[1]].tokens, "done");
    }

    #[test]
    fn test_parse_table_shape() {
        let tree = parse("| A | B |\n|:-|-:|\n| 1 | 2 |\n", &ParseOptions::default());
        let table = first(&tree);
        assert_eq!(kinds(&tree, table), vec![NodeType::TableHead, NodeType::TableRow]);
        let head = tree[table].first_child().unwrap();
        assert_eq!(kinds(&tree, head), vec![NodeType::TableRow]);
        let row = tree[head].first_child().unwrap();
        let cells: Vec<NodeId> = tree.children(row).collect();
        assert_eq!(tree[cells[0]].align(), Align::Left);
        assert_eq!(tree[cells[1]].align(), Align::Right);
    }

    #[test]
    fn test_parse_fenced_code_block() {
        let tree = parse("~~~~rust\nfn main() {}\n~~~~\n", &ParseOptions::default());
        let code = first(&tree);
        let data = tree[code].code_block().unwrap();
        assert!(data.fenced);
        assert_eq!(data.fence, "~~~~");
        assert_eq!(data.info, "rust");
        assert_eq!(tree[code].tokens, "fn main() {}");
    }

    #[test]
    fn test_parse_code_span_marker_len() {
        let tree = parse("``a`b``", &ParseOptions::default());
        let span = tree[first(&tree)].first_child().unwrap();
        assert_eq!(tree[span].kind, NodeType::CodeSpan);
        assert_eq!(tree[span].code_marker_len(), 2);
        assert_eq!(tree[span].tokens, "a`b");
    }

    #[test]
    fn test_parse_backslash_escape() {
        let tree = parse(r"a\*b", &ParseOptions::default());
        assert_eq!(
            kinds(&tree, first(&tree)),
            vec![NodeType::Text, NodeType::Backslash, NodeType::Text]
        );
    }

    #[test]
    fn test_parse_toc_and_math_block() {
        let tree = parse("[toc]\n\n$$\nx^2\n$$\n", &ParseOptions::default());
        assert_eq!(
            kinds(&tree, tree.root()),
            vec![NodeType::Toc, NodeType::MathBlock]
        );
        let math = tree[tree.root()].last_child().unwrap();
        assert_eq!(tree[math].tokens, "x^2");
    }

    #[test]
    fn test_parse_setext_heading() {
        let tree = parse("Title\n===\n", &ParseOptions::default());
        let heading = tree[first(&tree)].heading().unwrap();
        assert_eq!(heading.level, 1);
        assert!(heading.setext);
    }

    #[test]
    fn test_parse_block_ial() {
        let options = ParseOptions {
            kramdown_block_ial: true,
            ..ParseOptions::default()
        };
        let tree = parse("foo\n{: id=\"20210101\"}\n", &options);
        assert_eq!(
            kinds(&tree, tree.root()),
            vec![NodeType::Paragraph, NodeType::KramdownBlockIal]
        );
        assert_eq!(tree[first(&tree)].ial_id(), Some("20210101"));
    }

    #[test]
    fn test_parse_link_ref_defs_in_source_order() {
        let tree = parse(
            "[a][z] [b][y]\n\n[z]: https://z.example\n[y]: https://y.example \"Y\"\n",
            &ParseOptions::default(),
        );
        let labels: Vec<&str> = tree.link_refs.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["z", "y"]);
        assert_eq!(tree.link_refs[1].title, "Y");
        let link = tree[first(&tree)].first_child().unwrap();
        assert_eq!(tree[link].link().unwrap().link_type, LinkType::Reference);
    }

    fn super_block_options() -> ParseOptions {
        ParseOptions {
            super_block: true,
            ..ParseOptions::default()
        }
    }

    #[test]
    fn test_parse_super_block() {
        let tree = parse("{{{row\nfoo\n\n- a\n}}}\n\nbar\n", &super_block_options());
        assert_eq!(
            kinds(&tree, tree.root()),
            vec![NodeType::SuperBlock, NodeType::Paragraph]
        );
        let block = first(&tree);
        assert_eq!(
            tree[block].data,
            NodeData::SuperBlock {
                layout: "row".to_owned()
            }
        );
        assert_eq!(kinds(&tree, block), vec![NodeType::Paragraph, NodeType::List]);
    }

    #[test]
    fn test_parse_nested_super_blocks() {
        let tree = parse("{{{col\n{{{row\na\n}}}\nb\n}}}\n", &super_block_options());
        let outer = first(&tree);
        assert_eq!(kinds(&tree, outer), vec![NodeType::SuperBlock, NodeType::Paragraph]);
        let inner = tree[outer].first_child().unwrap();
        assert_eq!(tree.text(inner), "a");
    }

    #[test]
    fn test_parse_super_block_needs_option_and_close() {
        let source = "{{{row\nfoo\n}}}\n";
        let tree = parse(source, &ParseOptions::default());
        assert_eq!(kinds(&tree, tree.root()), vec![NodeType::Paragraph]);

        let tree = parse("{{{row\nfoo\n", &super_block_options());
        assert_eq!(kinds(&tree, tree.root()), vec![NodeType::Paragraph]);
        assert_eq!(tree.text(first(&tree)), "{{{row\nfoo");
    }

    #[test]
    fn test_parse_super_block_skips_fenced_code() {
        let tree = parse("```\n{{{row\n}}}\n```\n", &super_block_options());
        assert_eq!(kinds(&tree, tree.root()), vec![NodeType::CodeBlock]);
        assert_eq!(tree[first(&tree)].tokens, "{{{row\n}}}");
    }

    #[test]
    fn test_parse_super_block_resolves_outer_references() {
        let tree = parse("{{{row\n[a][r]\n}}}\n\n[r]: /u\n", &super_block_options());
        let block = first(&tree);
        let para = tree[block].first_child().unwrap();
        let link = tree[para].first_child().unwrap();
        let data = tree[link].link().unwrap();
        assert_eq!(data.link_type, LinkType::Reference);
        assert_eq!(data.dest, "/u");
        assert_eq!(tree.link_refs.len(), 1);
    }

    #[test]
    fn test_parse_ial_pairs() {
        assert_eq!(
            parse_ial(r#"{: id="a" style="color: red"}"#),
            Some(vec![
                ("id".to_owned(), "a".to_owned()),
                ("style".to_owned(), "color: red".to_owned()),
            ])
        );
        assert_eq!(parse_ial("{: }"), None);
        assert_eq!(parse_ial("plain"), None);
    }
}
