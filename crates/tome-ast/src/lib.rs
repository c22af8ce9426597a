//! Markdown document tree for the tome renderers.
//!
//! # Architecture
//!
//! - [`Node`] and [`NodeType`]: typed nodes with kind-specific [`NodeData`]
//! - [`Tree`]: arena of nodes linked by [`NodeId`], plus link reference definitions
//! - [`walk`]: depth-first enter/leave traversal driven by [`WalkStatus`]
//! - [`parse`]: builds a [`Tree`] from Markdown source with pulldown-cmark
//!
//! # Example
//!
//! ```
//! use tome_ast::{NodeType, ParseOptions, WalkStatus, parse, walk};
//!
//! let tree = parse("# Title\n\nSome *text*.", &ParseOptions::default());
//! let mut headings = 0;
//! walk(&tree, tree.root(), &mut |id, entering| {
//!     if entering && tree[id].kind == NodeType::Heading {
//!         headings += 1;
//!     }
//!     WalkStatus::Continue
//! });
//! assert_eq!(headings, 1);
//! ```

mod node;
mod parse;
mod tree;
mod walk;

pub use node::{
    Align, CodeBlockData, HeadingData, LinkData, LinkType, ListData, Node, NodeData, NodeId,
    NodeType,
};
pub use parse::{ParseOptions, parse, parse_ial};
pub use tree::{Ancestors, Children, LinkRefDef, Tree};
pub use walk::{WalkStatus, walk};
