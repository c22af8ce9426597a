//! Stack of pending output buffers.
//!
//! Containers whose lines need a prefix that is only known once the whole
//! subtree has been rendered (blockquotes, list items, footnote definitions)
//! push a buffer on enter and pop it on leave. Pops are checked against the
//! node that pushed, so a mismatched pair surfaces as a [`RenderError`]
//! instead of output landing in the wrong buffer.

use tome_ast::{NodeId, NodeType};

use crate::error::RenderError;

/// Push/pop counters for a render call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferStats {
    pub pushes: usize,
    pub pops: usize,
    /// Deepest stack seen.
    pub max_depth: usize,
    /// Current depth.
    pub depth: usize,
}

#[derive(Debug)]
struct Frame {
    owner: NodeId,
    kind: NodeType,
    buf: String,
}

#[derive(Debug, Default)]
pub(crate) struct BufferStack {
    root: String,
    frames: Vec<Frame>,
    pushes: usize,
    pops: usize,
    max_depth: usize,
}

impl BufferStack {
    pub(crate) fn push(&mut self, owner: NodeId, kind: NodeType) {
        self.frames.push(Frame {
            owner,
            kind,
            buf: String::new(),
        });
        self.pushes += 1;
        self.max_depth = self.max_depth.max(self.frames.len());
    }

    /// Pop the top buffer, which must have been pushed by `owner`.
    pub(crate) fn pop(&mut self, owner: NodeId, kind: NodeType) -> Result<String, RenderError> {
        let Some(top) = self.frames.last() else {
            return Err(RenderError::BufferUnderflow { kind });
        };
        if top.owner != owner {
            return Err(RenderError::BufferMismatch {
                kind,
                owner: top.kind,
            });
        }
        self.pops += 1;
        Ok(self.frames.pop().map(|frame| frame.buf).unwrap_or_default())
    }

    /// The buffer writes currently land in.
    pub(crate) fn active(&self) -> &str {
        self.frames.last().map_or(&self.root, |frame| &frame.buf)
    }

    pub(crate) fn active_mut(&mut self) -> &mut String {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.buf,
            None => &mut self.root,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Collapse every pending buffer into the root, bottom first.
    pub(crate) fn flush(&mut self) {
        for frame in self.frames.drain(..) {
            self.root.push_str(&frame.buf);
        }
    }

    pub(crate) fn take_root(&mut self) -> String {
        std::mem::take(&mut self.root)
    }

    pub(crate) fn stats(&self) -> BufferStats {
        BufferStats {
            pushes: self.pushes,
            pops: self.pops,
            max_depth: self.max_depth,
            depth: self.frames.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use tome_ast::{Node, Tree};

    use super::*;

    fn ids(count: usize) -> Vec<NodeId> {
        let mut tree = Tree::new();
        let root = tree.root();
        (0..count)
            .map(|_| tree.append_child(root, Node::new(NodeType::Blockquote)))
            .collect()
    }

    #[test]
    fn test_push_pop_routes_writes() {
        let ids = ids(2);
        let mut stack = BufferStack::default();
        stack.active_mut().push_str("root ");
        stack.push(ids[0], NodeType::Blockquote);
        stack.active_mut().push_str("outer ");
        stack.push(ids[1], NodeType::ListItem);
        stack.active_mut().push_str("inner");
        assert_eq!(stack.pop(ids[1], NodeType::ListItem).unwrap(), "inner");
        assert_eq!(stack.active(), "outer ");
        assert_eq!(stack.pop(ids[0], NodeType::Blockquote).unwrap(), "outer ");
        assert_eq!(stack.active(), "root ");
        assert_eq!(
            stack.stats(),
            BufferStats {
                pushes: 2,
                pops: 2,
                max_depth: 2,
                depth: 0,
            }
        );
    }

    #[test]
    fn test_pop_empty_is_underflow() {
        let ids = ids(1);
        let mut stack = BufferStack::default();
        assert_eq!(
            stack.pop(ids[0], NodeType::Blockquote),
            Err(RenderError::BufferUnderflow {
                kind: NodeType::Blockquote
            })
        );
    }

    #[test]
    fn test_pop_by_other_owner_is_mismatch_and_keeps_frame() {
        let ids = ids(2);
        let mut stack = BufferStack::default();
        stack.push(ids[0], NodeType::Blockquote);
        assert_eq!(
            stack.pop(ids[1], NodeType::ListItem),
            Err(RenderError::BufferMismatch {
                kind: NodeType::ListItem,
                owner: NodeType::Blockquote,
            })
        );
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_flush_appends_bottom_first() {
        let ids = ids(2);
        let mut stack = BufferStack::default();
        stack.active_mut().push_str("a");
        stack.push(ids[0], NodeType::Document);
        stack.active_mut().push_str("b");
        stack.push(ids[1], NodeType::Blockquote);
        stack.active_mut().push_str("c");
        stack.flush();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.take_root(), "abc");
    }

    proptest! {
        #[test]
        fn prop_nested_push_pop_balances(depths in prop::collection::vec(1usize..6, 1..8)) {
            let ids = ids(8);
            let mut stack = BufferStack::default();
            for depth in &depths {
                for id in &ids[..*depth] {
                    stack.push(*id, NodeType::ListItem);
                }
                for id in ids[..*depth].iter().rev() {
                    prop_assert!(stack.pop(*id, NodeType::ListItem).is_ok());
                }
            }
            let stats = stack.stats();
            prop_assert_eq!(stats.pushes, stats.pops);
            prop_assert_eq!(stats.depth, 0);
            prop_assert_eq!(stats.max_depth, depths.iter().copied().max().unwrap_or(0));
        }
    }
}
