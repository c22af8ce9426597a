//! Depth-first traversal with enter/leave callbacks.

use crate::node::NodeId;
use crate::tree::Tree;

/// Outcome of visiting a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WalkStatus {
    /// Keep going.
    #[default]
    Continue,
    /// Do not descend into the node's children and do not call leave for it.
    /// Only meaningful on enter; on leave it behaves like `Continue`.
    SkipChildren,
    /// Abort the whole traversal.
    Stop,
}

/// Walk the subtree rooted at `id`, calling `visitor(node, entering)` on
/// enter and leave.
///
/// Returns [`WalkStatus::Stop`] if the visitor aborted, otherwise
/// [`WalkStatus::Continue`].
pub fn walk<F>(tree: &Tree, id: NodeId, visitor: &mut F) -> WalkStatus
where
    F: FnMut(NodeId, bool) -> WalkStatus,
{
    match visitor(id, true) {
        WalkStatus::Stop => return WalkStatus::Stop,
        WalkStatus::SkipChildren => return WalkStatus::Continue,
        WalkStatus::Continue => {}
    }

    let mut child = tree[id].first_child();
    while let Some(current) = child {
        // Read the sibling link before descending so visitors can't reorder
        // what has yet to be visited.
        let next = tree[current].next();
        if walk(tree, current, visitor) == WalkStatus::Stop {
            return WalkStatus::Stop;
        }
        child = next;
    }

    match visitor(id, false) {
        WalkStatus::Stop => WalkStatus::Stop,
        _ => WalkStatus::Continue,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::node::{Node, NodeType};

    fn tree() -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let para = tree.append_child(root, Node::new(NodeType::Paragraph));
        tree.append_child(para, Node::new(NodeType::Text).with_tokens("a"));
        let strong = tree.append_child(para, Node::new(NodeType::Strong));
        tree.append_child(strong, Node::new(NodeType::Text).with_tokens("b"));
        tree.append_child(root, Node::new(NodeType::ThematicBreak));
        tree
    }

    fn trace(tree: &Tree, skip: Option<NodeType>, stop: Option<NodeType>) -> (Vec<String>, WalkStatus) {
        let mut events = Vec::new();
        let status = walk(tree, tree.root(), &mut |id, entering| {
            let kind = tree[id].kind;
            events.push(format!("{}{kind}", if entering { "+" } else { "-" }));
            if entering && Some(kind) == skip {
                WalkStatus::SkipChildren
            } else if entering && Some(kind) == stop {
                WalkStatus::Stop
            } else {
                WalkStatus::Continue
            }
        });
        (events, status)
    }

    #[test]
    fn test_walk_visits_enter_and_leave_in_order() {
        let (events, status) = trace(&tree(), None, None);
        assert_eq!(
            events,
            vec![
                "+Document",
                "+Paragraph",
                "+Text",
                "-Text",
                "+Strong",
                "+Text",
                "-Text",
                "-Strong",
                "-Paragraph",
                "+ThematicBreak",
                "-ThematicBreak",
                "-Document",
            ]
        );
        assert_eq!(status, WalkStatus::Continue);
    }

    #[test]
    fn test_walk_skip_children_suppresses_descent_and_leave() {
        let (events, _) = trace(&tree(), Some(NodeType::Strong), None);
        assert!(events.contains(&"+Strong".to_owned()));
        assert!(!events.contains(&"-Strong".to_owned()));
        assert_eq!(events.iter().filter(|e| e.ends_with("Text")).count(), 2);
    }

    #[test]
    fn test_walk_stop_aborts() {
        let (events, status) = trace(&tree(), None, Some(NodeType::Strong));
        assert_eq!(status, WalkStatus::Stop);
        assert_eq!(events.last().map(String::as_str), Some("+Strong"));
        assert!(!events.contains(&"-Document".to_owned()));
    }
}
