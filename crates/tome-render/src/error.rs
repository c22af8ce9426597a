//! Render and sanitizer errors.

use tome_ast::NodeType;

/// Rendering error.
///
/// Every variant is a bug in a node render function rather than a property
/// of the input tree: well-formed trees always render.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A node popped an output buffer while the stack was empty.
    #[error("buffer stack underflow while leaving {kind}")]
    BufferUnderflow {
        /// Kind of the node that tried to pop.
        kind: NodeType,
    },
    /// A node popped a buffer pushed by a different node.
    #[error("{kind} popped a buffer owned by {owner}")]
    BufferMismatch {
        /// Kind of the node that tried to pop.
        kind: NodeType,
        /// Kind of the node that pushed the buffer on top of the stack.
        owner: NodeType,
    },
    /// Buffers were still pushed when the walk finished.
    #[error("{depth} output buffer(s) left open after rendering")]
    UnclosedBuffers {
        /// Stack depth at the end of the walk.
        depth: usize,
    },
}

/// Sanitizer failure.
///
/// The renderer logs these and keeps going with whatever the sanitizer
/// managed to produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    /// An element that must be stripped was never closed.
    #[error("unterminated <{tag}> element")]
    Unterminated {
        /// Element name.
        tag: String,
        /// Output sanitized up to the unterminated element.
        partial: String,
    },
}

impl SanitizeError {
    /// Best-effort output produced before the failure.
    pub fn partial(&self) -> &str {
        match self {
            Self::Unterminated { partial, .. } => partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_messages_name_node_kinds() {
        let err = RenderError::BufferMismatch {
            kind: NodeType::ListItem,
            owner: NodeType::Blockquote,
        };
        assert_eq!(err.to_string(), "ListItem popped a buffer owned by Blockquote");
        let err = RenderError::UnclosedBuffers { depth: 2 };
        assert_eq!(err.to_string(), "2 output buffer(s) left open after rendering");
    }

    #[test]
    fn test_sanitize_error_partial() {
        let err = SanitizeError::Unterminated {
            tag: "script".to_owned(),
            partial: "<p>ok</p>".to_owned(),
        };
        assert_eq!(err.partial(), "<p>ok</p>");
        assert_eq!(err.to_string(), "unterminated <script> element");
    }
}
