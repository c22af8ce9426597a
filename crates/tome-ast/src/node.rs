//! Typed document nodes and their kind-specific data.

use std::fmt;

/// Identity of a node inside its [`Tree`](crate::Tree) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

macro_rules! node_types {
    ($($(#[$meta:meta])* $variant:ident => $name:literal,)+) => {
        /// Discriminant of a document node.
        ///
        /// The set is closed: dispatch tables are dense arrays indexed by
        /// [`NodeType::index`].
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum NodeType {
            $($(#[$meta])* $variant,)+
        }

        impl NodeType {
            /// Every node kind, in discriminant order.
            pub const ALL: &'static [NodeType] = &[$(NodeType::$variant,)+];

            /// Number of node kinds.
            pub const COUNT: usize = Self::ALL.len();

            /// Human-readable kind name used in diagnostics and JSON labels.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(NodeType::$variant => $name,)+
                }
            }
        }
    };
}

node_types! {
    /// Tree root.
    Document => "Document",
    Paragraph => "Paragraph",
    /// ATX or setext heading.
    Heading => "Heading",
    ThematicBreak => "ThematicBreak",
    Blockquote => "Blockquote",
    List => "List",
    ListItem => "ListItem",
    HtmlBlock => "HTMLBlock",
    InlineHtml => "InlineHTML",
    /// Fenced or indented code block; the code is in `tokens`.
    CodeBlock => "CodeBlock",
    Text => "Text",
    Emphasis => "Emphasis",
    Strong => "Strong",
    /// Inline code; the content is in `tokens`.
    CodeSpan => "CodeSpan",
    HardBreak => "HardBreak",
    SoftBreak => "SoftBreak",
    Link => "Link",
    Image => "Image",
    HtmlEntity => "HTMLEntity",
    TaskListItemMarker => "TaskListItemMarker",
    Strikethrough => "Strikethrough",
    Table => "Table",
    /// Holds exactly one header row.
    TableHead => "TableHead",
    TableRow => "TableRow",
    TableCell => "TableCell",
    MathBlock => "MathBlock",
    InlineMath => "InlineMath",
    /// Backslash escape; the escaped character is in `tokens`.
    Backslash => "Backslash",
    FootnotesDef => "FootnotesDef",
    FootnotesRef => "FootnotesRef",
    /// `[toc]` placeholder.
    Toc => "ToC",
    YamlFrontMatter => "YamlFrontMatter",
    Mark => "Mark",
    Tag => "Tag",
    Sup => "Sup",
    Sub => "Sub",
    Kbd => "Kbd",
    /// `{: key="value"}` line following a block.
    KramdownBlockIal => "KramdownBlockIAL",
    /// `{: key="value"}` directly after an inline span.
    KramdownSpanIal => "KramdownSpanIAL",
    /// `{{{row ... }}}` layout container.
    SuperBlock => "SuperBlock",
    GitConflict => "GitConflict",
}

impl NodeType {
    /// Dense index used by dispatch tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether the kind is one of the block containers reformatted through a buffer.
    #[must_use]
    pub const fn is_container_block(self) -> bool {
        matches!(
            self,
            Self::Document | Self::Blockquote | Self::ListItem | Self::FootnotesDef
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Table column alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Align {
    /// Numeric alignment code: 0 none, 1 left, 2 center, 3 right.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Left => 1,
            Self::Center => 2,
            Self::Right => 3,
        }
    }
}

impl From<pulldown_cmark::Alignment> for Align {
    fn from(value: pulldown_cmark::Alignment) -> Self {
        match value {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// List and list item metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListData {
    /// Numbered list.
    pub ordered: bool,
    /// At least one item carries a task marker.
    pub task: bool,
    /// Items are not separated by blank lines.
    pub tight: bool,
    /// Bullet character for unordered lists.
    pub bullet: char,
    /// First number of an ordered list.
    pub start: u64,
    /// `.` or `)` for ordered lists.
    pub delimiter: char,
    /// Item number (list items only).
    pub num: u64,
    /// Content column offset of a list item.
    pub padding: usize,
}

impl Default for ListData {
    fn default() -> Self {
        Self {
            ordered: false,
            task: false,
            tight: true,
            bullet: '-',
            start: 1,
            delimiter: '.',
            num: 1,
            padding: 2,
        }
    }
}

impl ListData {
    /// Item marker text without the trailing space, such as `-` or `3.`.
    #[must_use]
    pub fn marker(&self) -> String {
        if self.ordered {
            format!("{}{}", self.num, self.delimiter)
        } else {
            self.bullet.to_string()
        }
    }
}

/// Heading metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeadingData {
    /// Level 1 to 6.
    pub level: u8,
    /// Underlined with `=` or `-` instead of `#` markers.
    pub setext: bool,
}

/// Code block metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeBlockData {
    /// Fenced (as opposed to indented).
    pub fenced: bool,
    /// Fence string, such as ```` ``` ```` or `~~~~`.
    pub fence: String,
    /// Info string after the opening fence.
    pub info: String,
}

/// How a link was written in the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkType {
    /// `[text](dest "title")`
    #[default]
    Inline,
    /// `[text][label]`
    Reference,
    /// `[text][]`
    Collapsed,
    /// `[text]`
    Shortcut,
    /// `<https://example.com>`
    Autolink,
    /// `<user@example.com>`
    Email,
}

/// Link and image metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkData {
    pub link_type: LinkType,
    pub dest: String,
    pub title: String,
    /// Reference label for reference-style links.
    pub label: String,
}

/// Kind-specific node fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeData {
    #[default]
    None,
    Heading(HeadingData),
    List(ListData),
    CodeBlock(CodeBlockData),
    /// Number of backticks around a code span.
    CodeSpan { marker_len: usize },
    /// Delimiter run of an inline span (`*`, `__`, `~~`, `==`, `^`, `$`, `#`).
    Delimited { marker: String },
    Link(LinkData),
    Table { aligns: Vec<Align> },
    TableCell { align: Align },
    Task { checked: bool },
    Footnote { label: String },
    SuperBlock { layout: String },
}

/// A document tree node.
///
/// Links are arena ids owned by the [`Tree`](crate::Tree); use the tree's
/// builder methods to change structure.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub kind: NodeType,
    /// Raw token text.
    pub tokens: String,
    pub data: NodeData,
    /// Attribute list pairs (kramdown IAL).
    pub ial: Vec<(String, String)>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) previous: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
}

impl Node {
    /// Create a detached node of the given kind.
    #[must_use]
    pub fn new(kind: NodeType) -> Self {
        Self {
            kind,
            tokens: String::new(),
            data: NodeData::None,
            ial: Vec::new(),
            parent: None,
            previous: None,
            next: None,
            first_child: None,
            last_child: None,
        }
    }

    /// Set the raw token text.
    #[must_use]
    pub fn with_tokens(mut self, tokens: impl Into<String>) -> Self {
        self.tokens = tokens.into();
        self
    }

    /// Set kind-specific data.
    #[must_use]
    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    /// Set the attribute list.
    #[must_use]
    pub fn with_ial(mut self, ial: Vec<(String, String)>) -> Self {
        self.ial = ial;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn heading(&self) -> Option<HeadingData> {
        match self.data {
            NodeData::Heading(h) => Some(h),
            _ => None,
        }
    }

    pub fn list(&self) -> Option<&ListData> {
        match &self.data {
            NodeData::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn code_block(&self) -> Option<&CodeBlockData> {
        match &self.data {
            NodeData::CodeBlock(code) => Some(code),
            _ => None,
        }
    }

    pub fn link(&self) -> Option<&LinkData> {
        match &self.data {
            NodeData::Link(link) => Some(link),
            _ => None,
        }
    }

    /// Delimiter run of an inline span, or an empty string.
    pub fn marker(&self) -> &str {
        match &self.data {
            NodeData::Delimited { marker } => marker,
            _ => "",
        }
    }

    /// Backtick count of a code span (at least 1).
    pub fn code_marker_len(&self) -> usize {
        match self.data {
            NodeData::CodeSpan { marker_len } => marker_len.max(1),
            _ => 1,
        }
    }

    /// Cell alignment; [`Align::None`] for non-cells.
    pub fn align(&self) -> Align {
        match self.data {
            NodeData::TableCell { align } => align,
            _ => Align::None,
        }
    }

    pub fn task_checked(&self) -> bool {
        matches!(self.data, NodeData::Task { checked: true })
    }

    /// Footnote label, or an empty string.
    pub fn footnote_label(&self) -> &str {
        match &self.data {
            NodeData::Footnote { label } => label,
            _ => "",
        }
    }

    /// Value of the `id` attribute list entry, if any.
    pub fn ial_id(&self) -> Option<&str> {
        self.ial
            .iter()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_indices_are_dense() {
        for (i, kind) in NodeType::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(NodeType::COUNT, NodeType::ALL.len());
    }

    #[test]
    fn test_node_type_display_uses_name() {
        assert_eq!(NodeType::Toc.to_string(), "ToC");
        assert_eq!(NodeType::KramdownBlockIal.to_string(), "KramdownBlockIAL");
    }

    #[test]
    fn test_align_codes() {
        assert_eq!(Align::None.code(), 0);
        assert_eq!(Align::Left.code(), 1);
        assert_eq!(Align::Center.code(), 2);
        assert_eq!(Align::Right.code(), 3);
    }

    #[test]
    fn test_list_marker() {
        let bullet = ListData {
            bullet: '*',
            ..ListData::default()
        };
        assert_eq!(bullet.marker(), "*");

        let ordered = ListData {
            ordered: true,
            num: 12,
            delimiter: ')',
            ..ListData::default()
        };
        assert_eq!(ordered.marker(), "12)");
    }

    #[test]
    fn test_ial_id() {
        let node = Node::new(NodeType::Paragraph).with_ial(vec![
            ("style".to_owned(), "color: red".to_owned()),
            ("id".to_owned(), "20210101".to_owned()),
        ]);
        assert_eq!(node.ial_id(), Some("20210101"));
        assert_eq!(Node::new(NodeType::Paragraph).ial_id(), None);
    }
}
