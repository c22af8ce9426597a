//! Output dialects.
//!
//! Each dialect is a [`Dialect`](crate::Dialect) strategy that only decides
//! what text a node kind emits; buffering, table layout and spacing come from
//! the shared renderer.

mod assets;
mod echarts;
mod html;
mod markdown;
mod sv;

use tome_ast::{NodeId, NodeType};

pub use assets::AssetRelocation;
pub use echarts::EchartsJson;
pub use html::Html;
pub use markdown::{Markdown, MarkdownFlavor, Plain};
pub use sv::SplitView;

use crate::renderer::{Dialect, Renderer};

impl<D: Dialect> Renderer<'_, D> {
    /// Whether `id` sits inside a table cell, where output must stay on one line.
    pub(crate) fn in_table_cell(&self, id: NodeId) -> bool {
        self.tree().has_ancestor(id, NodeType::TableCell)
    }

    /// Whether the block carries no attribute list that will be emitted after it.
    pub(crate) fn without_ial(&self, id: NodeId) -> bool {
        !self.options().kramdown_block_ial || self.node(id).ial.is_empty()
    }

    pub(crate) fn is_last_node(&self, id: NodeId) -> bool {
        self.tree().is_last_node(id)
    }

    /// Whether a paragraph is the direct content of an item in a tight list.
    pub(crate) fn in_tight_list(&self, id: NodeId) -> bool {
        let tree = self.tree();
        let Some(item) = tree[id].parent() else {
            return false;
        };
        if tree[item].kind != NodeType::ListItem {
            return false;
        }
        tree[item]
            .parent()
            .and_then(|list| tree[list].list())
            .is_none_or(|list| list.tight)
    }
}
