//! Tree JSON for diagram tools.
//!
//! Output is an array holding the document object. Every node becomes
//! `{"name": "<Kind>\n<label>", "children": [...]}`; inline leaves and table
//! internals carry no children.

use tome_ast::{NodeId, NodeType, WalkStatus};

use crate::renderer::{Dialect, DispatchTable, Renderer};

/// Number of characters kept from a text node.
const TEXT_SUMMARY_CHARS: usize = 5;

/// Diagram JSON dialect.
#[derive(Clone, Debug, Default)]
pub struct EchartsJson {
    /// One entry per open `children` array: whether it already holds an object.
    arrays: Vec<bool>,
}

type R<'t> = Renderer<'t, EchartsJson>;

impl Dialect for EchartsJson {
    const NAME: &'static str = "echarts-json";

    fn register(table: &mut DispatchTable<Self>) {
        table.register(NodeType::Document, document);
        for &kind in NodeType::ALL {
            if kind != NodeType::Document {
                table.register(kind, node);
            }
        }
    }

    fn reset(&mut self) {
        self.arrays.clear();
    }
}

/// How a node appears in the diagram.
enum Shape {
    Leaf(String),
    Branch(String),
    Hidden,
}

fn summary(text: &str) -> String {
    let mut out: String = text.chars().take(TEXT_SUMMARY_CHARS).collect();
    if text.chars().nth(TEXT_SUMMARY_CHARS).is_some() {
        out.push_str("...");
    }
    out
}

fn shape(r: &R<'_>, id: NodeId) -> Shape {
    let tree = r.tree();
    let node = &tree[id];
    let options = r.options();
    let leaf = |label: &str| Shape::Leaf(label.to_owned());
    let branch = |label: &str| Shape::Branch(label.to_owned());
    match node.kind {
        NodeType::Document => branch("Document"),
        NodeType::Paragraph => branch("Paragraph\np"),
        NodeType::Heading => {
            let level = node.heading().map_or(1, |h| h.level);
            Shape::Branch(format!("Heading\nh{level}"))
        }
        NodeType::Blockquote => branch("Blockquote\nblockquote"),
        NodeType::List => {
            let ordered = node.list().is_some_and(|list| list.ordered);
            branch(if ordered { "List\nol" } else { "List\nul" })
        }
        NodeType::ListItem => {
            let marker = node.list().map_or_else(|| "-".to_owned(), |list| list.marker());
            Shape::Branch(format!("List Item\nli {marker}"))
        }
        NodeType::TaskListItemMarker => {
            let check = if node.task_checked() { "X" } else { " " };
            Shape::Leaf(format!("Task List Item Marker\n[{check}]"))
        }
        NodeType::Text => Shape::Leaf(format!("Text\n{}", summary(&node.tokens))),
        NodeType::Emphasis => branch("Emphasis\nem"),
        NodeType::Strong => branch("Strong\nstrong"),
        NodeType::Strikethrough => leaf("Strikethrough\ndel"),
        NodeType::Mark => leaf("Mark\nmark"),
        NodeType::Sup => leaf("Sup\nsup"),
        NodeType::Sub => leaf("Sub\nsub"),
        NodeType::Kbd => leaf("Kbd\nkbd"),
        NodeType::Tag => leaf("Tag\nem"),
        NodeType::CodeSpan => leaf("Code Span\ncode"),
        NodeType::CodeBlock => leaf("Code Block\npre.code"),
        NodeType::MathBlock => leaf("Math Block\ndiv"),
        NodeType::InlineMath => leaf("Inline Math\nspan"),
        NodeType::ThematicBreak => leaf("Thematic Break\nhr"),
        NodeType::HardBreak => leaf("Hard Break\nbr"),
        NodeType::SoftBreak => leaf("Soft Break\n"),
        NodeType::HtmlBlock => leaf("HTML Block\n"),
        NodeType::InlineHtml => leaf("Inline HTML\n"),
        NodeType::HtmlEntity => leaf("HTML Entity\nspan"),
        NodeType::Backslash => leaf("Backslash\ndiv"),
        NodeType::Link => branch("Link\na"),
        NodeType::Image => branch("Image\nimg"),
        NodeType::Table => branch("Table\ntable"),
        NodeType::TableHead => leaf("Table Head\nthead"),
        NodeType::TableRow => leaf("Table Row\ntr"),
        NodeType::TableCell => leaf("Table Cell\ntd"),
        NodeType::Toc => leaf("ToC\ndiv"),
        NodeType::FootnotesDef => branch("Footnotes Def\np"),
        NodeType::FootnotesRef => leaf("Footnotes Ref\ndiv"),
        NodeType::YamlFrontMatter => leaf("Front Matter\nYAML"),
        NodeType::SuperBlock => branch("Super Block\ndiv"),
        NodeType::GitConflict => leaf("Git Conflict\ndiv"),
        NodeType::KramdownBlockIal | NodeType::KramdownSpanIal => {
            let enabled = if node.kind == NodeType::KramdownBlockIal {
                options.kramdown_block_ial
            } else {
                options.kramdown_span_ial
            };
            let target = node.previous().and_then(|prev| tree[prev].ial_id());
            match target {
                Some(target) if enabled => {
                    let kind = if node.kind == NodeType::KramdownBlockIal { "Block" } else { "Span" };
                    Shape::Leaf(format!("{kind} IAL\n{{: {target}}}"))
                }
                _ => Shape::Hidden,
            }
        }
    }
}

fn open_object(r: &mut R<'_>, label: &str) {
    let follows_sibling = r
        .dialect_mut()
        .arrays
        .last_mut()
        .is_some_and(|seen| std::mem::replace(seen, true));
    if follows_sibling {
        r.write_char(',');
    }
    r.write_str("{\"name\":");
    r.write_str(&serde_json::Value::String(label.to_owned()).to_string());
}

fn open_children(r: &mut R<'_>, id: NodeId) {
    if r.node(id).first_child().is_some() {
        r.write_str(",\"children\":[");
        r.dialect_mut().arrays.push(false);
    }
}

fn close_children(r: &mut R<'_>, id: NodeId) {
    if r.node(id).first_child().is_some() {
        r.write_char(']');
        r.dialect_mut().arrays.pop();
    }
}

fn document(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write_char('[');
        r.dialect_mut().arrays.push(false);
    }
    let status = node(r, id, entering);
    if !entering {
        r.dialect_mut().arrays.pop();
        r.write_char(']');
    }
    status
}

fn node(r: &mut R<'_>, id: NodeId, entering: bool) -> WalkStatus {
    match shape(r, id) {
        Shape::Hidden => WalkStatus::SkipChildren,
        Shape::Leaf(label) => {
            open_object(r, &label);
            r.write_char('}');
            WalkStatus::SkipChildren
        }
        Shape::Branch(label) => {
            if entering {
                open_object(r, &label);
                open_children(r, id);
            } else {
                close_children(r, id);
                r.write_char('}');
            }
            WalkStatus::Continue
        }
    }
}
