//! Core renderer: dispatch, output sinks and the newline tracker.
//!
//! A [`Renderer`] walks a [`Tree`] once and, for every enter and leave event,
//! looks up what to emit in this order:
//!
//! 1. a consumer override registered with [`Renderer::with_override`],
//! 2. the dialect's built-in function from its [`DispatchTable`],
//! 3. the fallback ([`Renderer::with_fallback`]), or a visible diagnostic.
//!
//! All per-call state lives in a private context that [`Renderer::render`]
//! rebuilds from scratch, so a renderer can be reused for several calls but
//! never shares anything between them. The tree is only ever borrowed shared;
//! render-local annotations (cell widths, heading ids, footnote numbers) are
//! kept in side maps keyed by [`NodeId`].

use std::collections::HashMap;

use tome_ast::{Node, NodeId, NodeType, Tree, WalkStatus, walk};
use tome_config::Options;

use crate::buffer::{BufferStack, BufferStats};
use crate::error::RenderError;
use crate::heading;
use crate::sanitize::{DefaultSanitizer, Sanitizer};
use crate::spacing::{is_marked_span, space};
use crate::typo::fix_term_typo;
use crate::util;

/// Built-in node render function.
///
/// Returns how the walk should continue; [`WalkStatus::SkipChildren`] marks a
/// node that rendered its whole subtree itself.
pub type RenderFn<D> = fn(&mut Renderer<'_, D>, NodeId, bool) -> WalkStatus;

/// Consumer-supplied render function.
///
/// Receives the tree, the node and whether the node is being entered, and
/// returns the text to write plus the walk status.
pub type NodeFn<'t> = Box<dyn FnMut(&Tree, NodeId, bool) -> (String, WalkStatus) + 't>;

/// Per-kind table of built-in render functions, indexed by discriminant.
pub struct DispatchTable<D: Dialect> {
    entries: [Option<RenderFn<D>>; NodeType::COUNT],
}

impl<D: Dialect> DispatchTable<D> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: [None; NodeType::COUNT],
        }
    }

    /// Register `f` for `kind`, replacing any previous entry.
    pub fn register(&mut self, kind: NodeType, f: RenderFn<D>) {
        self.entries[kind.index()] = Some(f);
    }

    /// Function registered for `kind`.
    #[must_use]
    pub fn get(&self, kind: NodeType) -> Option<RenderFn<D>> {
        self.entries[kind.index()]
    }

    /// Whether `kind` has a built-in function.
    #[must_use]
    pub fn contains(&self, kind: NodeType) -> bool {
        self.entries[kind.index()].is_some()
    }
}

impl<D: Dialect> Default for DispatchTable<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// An output format.
///
/// A dialect is a strategy object: it fills a [`DispatchTable`] with one
/// function per node kind and may keep its own per-call state (reset by
/// [`Dialect::reset`] at the start of every render).
pub trait Dialect: Sized {
    /// Short name used in log events.
    const NAME: &'static str;

    /// Line terminator sequence checked by [`Renderer::newline`].
    const NEWLINE: &'static str = "\n";

    /// Fill the dispatch table.
    fn register(table: &mut DispatchTable<Self>);

    /// Clear per-call dialect state.
    fn reset(&mut self) {}

    /// Append trailing sections to the root sink once the walk has finished.
    fn finish(_renderer: &mut Renderer<'_, Self>) {}
}

/// Column widths of a table cell, in display columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CellWidth {
    /// Width of this cell's rendered content.
    pub(crate) content: usize,
    /// Widest content in the cell's column.
    pub(crate) max: usize,
}

/// Render-local annotations keyed by node.
#[derive(Debug, Default)]
pub(crate) struct Scratch {
    pub(crate) cells: HashMap<NodeId, CellWidth>,
    /// Header column widths per table, for rows that are missing cells.
    pub(crate) columns: HashMap<NodeId, Vec<CellWidth>>,
    pub(crate) heading_ids: Option<HashMap<NodeId, String>>,
    /// Footnote label to its 1-based number in definition order.
    pub(crate) footnotes: Option<HashMap<String, usize>>,
    /// References seen so far per footnote label.
    pub(crate) footnote_refs: HashMap<String, usize>,
}

#[derive(Debug, Default)]
struct Context {
    buffers: BufferStack,
    /// Last bytes emitted, at most `NEWLINE.len()` of them.
    tail: String,
    error: Option<RenderError>,
    measuring: usize,
    scratch: Scratch,
}

/// Renderer for one tree in one dialect.
pub struct Renderer<'t, D: Dialect> {
    tree: &'t Tree,
    options: &'t Options,
    dialect: D,
    table: DispatchTable<D>,
    overrides: HashMap<NodeType, NodeFn<'t>>,
    fallback: Option<NodeFn<'t>>,
    sanitizer: Box<dyn Sanitizer + 't>,
    ctx: Context,
}

impl<'t, D: Dialect> Renderer<'t, D> {
    /// Create a renderer and build the dialect's dispatch table.
    pub fn new(tree: &'t Tree, options: &'t Options, dialect: D) -> Self {
        let mut table = DispatchTable::new();
        D::register(&mut table);
        Self {
            tree,
            options,
            dialect,
            table,
            overrides: HashMap::new(),
            fallback: None,
            sanitizer: Box::new(DefaultSanitizer),
            ctx: Context::default(),
        }
    }

    /// Render `kind` with `f` instead of the built-in function.
    #[must_use]
    pub fn with_override<F>(mut self, kind: NodeType, f: F) -> Self
    where
        F: FnMut(&Tree, NodeId, bool) -> (String, WalkStatus) + 't,
    {
        self.overrides.insert(kind, Box::new(f));
        self
    }

    /// Render kinds the dialect does not handle with `f` instead of the
    /// diagnostic placeholder.
    #[must_use]
    pub fn with_fallback<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Tree, NodeId, bool) -> (String, WalkStatus) + 't,
    {
        self.fallback = Some(Box::new(f));
        self
    }

    /// Replace the HTML sanitizer used when `sanitize` is on.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: impl Sanitizer + 't) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    /// Render the whole tree.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when a node render function breaks the
    /// buffer-stack discipline.
    pub fn render(&mut self) -> Result<String, RenderError> {
        self.ctx = Context {
            tail: D::NEWLINE.to_owned(),
            ..Context::default()
        };
        self.dialect.reset();
        tracing::debug!(dialect = D::NAME, nodes = self.tree.len(), "Rendering tree");

        let tree = self.tree;
        let status = walk(tree, tree.root(), &mut |id, entering| self.visit(id, entering));
        if let Some(err) = self.ctx.error.take() {
            tracing::debug!(dialect = D::NAME, error = %err, "Render failed");
            return Err(err);
        }

        if status == WalkStatus::Stop {
            tracing::debug!(
                dialect = D::NAME,
                depth = self.ctx.buffers.depth(),
                "Render aborted, flushing pending buffers"
            );
            self.ctx.buffers.flush();
        } else {
            D::finish(self);
            if let Some(err) = self.ctx.error.take() {
                return Err(err);
            }
            let depth = self.ctx.buffers.depth();
            if depth != 0 {
                return Err(RenderError::UnclosedBuffers { depth });
            }
        }

        let output = self.ctx.buffers.take_root();
        tracing::debug!(dialect = D::NAME, bytes = output.len(), "Rendered tree");
        Ok(output)
    }

    /// Dispatch one walk event.
    pub(crate) fn visit(&mut self, id: NodeId, entering: bool) -> WalkStatus {
        let tree = self.tree;
        let kind = tree[id].kind;

        let status = if let Some(f) = self.overrides.get_mut(&kind) {
            let (out, status) = f(tree, id, entering);
            self.write_str(&out);
            status
        } else if let Some(f) = self.table.get(kind) {
            f(self, id, entering)
        } else {
            self.render_default(id, entering)
        };

        if self.ctx.error.is_some() {
            WalkStatus::Stop
        } else {
            status
        }
    }

    fn render_default(&mut self, id: NodeId, entering: bool) -> WalkStatus {
        let tree = self.tree;
        if let Some(f) = self.fallback.as_mut() {
            let (out, status) = f(tree, id, entering);
            self.write_str(&out);
            return status;
        }
        if entering {
            let node = &tree[id];
            tracing::debug!(dialect = D::NAME, kind = %node.kind, "No render function for node");
            self.write_str(&format!(
                "not found render function for node [type={}, Tokens={}]",
                node.kind, node.tokens
            ));
        }
        WalkStatus::Continue
    }

    /// Walk the subtree at `id` with the regular dispatch.
    pub(crate) fn render_node(&mut self, id: NodeId) -> WalkStatus {
        let tree = self.tree;
        walk(tree, id, &mut |c, e| self.visit(c, e))
    }

    /// Walk `id`'s children with the regular dispatch.
    pub(crate) fn render_children(&mut self, id: NodeId) -> WalkStatus {
        for child in self.tree.children(id) {
            if self.render_node(child) == WalkStatus::Stop {
                return WalkStatus::Stop;
            }
        }
        WalkStatus::Continue
    }

    /// Render `id`'s children into a scratch buffer and return the text
    /// without touching the output or the newline tracker.
    pub(crate) fn measure_children(&mut self, id: NodeId) -> String {
        let tail = std::mem::take(&mut self.ctx.tail);
        self.ctx.measuring += 1;
        self.push_buffer(id);
        self.render_children(id);
        let out = self.pop_buffer(id).unwrap_or_default();
        self.ctx.measuring -= 1;
        self.ctx.tail = tail;
        out
    }

    /// Whether output is currently being measured rather than emitted.
    pub(crate) fn is_measuring(&self) -> bool {
        self.ctx.measuring > 0
    }

    /// Append text to the active sink.
    pub fn write_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.ctx.buffers.active_mut().push_str(s);
        self.track(s);
    }

    /// Append one character to the active sink.
    pub fn write_char(&mut self, c: char) {
        self.write_str(c.encode_utf8(&mut [0; 4]));
    }

    /// Emit the dialect's line terminator unless it was the last thing written.
    pub fn newline(&mut self) {
        if !self.ctx.tail.ends_with(D::NEWLINE) {
            self.write_str(D::NEWLINE);
        }
    }

    fn track(&mut self, s: &str) {
        let tail = &mut self.ctx.tail;
        tail.push_str(s);
        let cap = D::NEWLINE.len();
        if tail.len() > cap {
            let mut cut = tail.len() - cap;
            while !tail.is_char_boundary(cut) {
                cut -= 1;
            }
            tail.drain(..cut);
        }
    }

    /// Re-read the tracker from the end of the active sink.
    fn sync_tail(&mut self) {
        let active = self.ctx.buffers.active();
        if active.is_empty() {
            return;
        }
        let mut start = active.len().saturating_sub(D::NEWLINE.len());
        while !active.is_char_boundary(start) {
            start -= 1;
        }
        self.ctx.tail = active[start..].to_owned();
    }

    /// Push a fresh sink owned by `id`.
    pub(crate) fn push_buffer(&mut self, id: NodeId) {
        let kind = self.tree[id].kind;
        self.ctx.buffers.push(id, kind);
    }

    /// Pop the sink pushed by `id`.
    ///
    /// A violation is recorded as the render error and aborts the walk.
    pub(crate) fn pop_buffer(&mut self, id: NodeId) -> Option<String> {
        let kind = self.tree[id].kind;
        match self.ctx.buffers.pop(id, kind) {
            Ok(buf) => Some(buf),
            Err(err) => {
                if self.ctx.error.is_none() {
                    self.ctx.error = Some(err);
                }
                None
            }
        }
    }

    /// Trim surrounding whitespace from the active sink.
    pub(crate) fn trim_active(&mut self) {
        let buf = self.ctx.buffers.active_mut();
        let trimmed = buf.trim();
        if trimmed.len() != buf.len() {
            *buf = trimmed.to_owned();
        }
        self.sync_tail();
    }

    /// Depth of the buffer stack.
    pub(crate) fn depth(&self) -> usize {
        self.ctx.buffers.depth()
    }

    /// Push/pop counters of the last render call.
    #[must_use]
    pub fn stats(&self) -> BufferStats {
        self.ctx.buffers.stats()
    }

    /// The tree being rendered.
    #[must_use]
    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    /// Shorthand for `&self.tree()[id]`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &'t Node {
        let tree = self.tree;
        &tree[id]
    }

    #[must_use]
    pub fn options(&self) -> &'t Options {
        self.options
    }

    #[must_use]
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    pub fn dialect_mut(&mut self) -> &mut D {
        &mut self.dialect
    }

    /// Consume the renderer, keeping dialect state gathered by the last render.
    pub fn into_dialect(self) -> D {
        self.dialect
    }

    pub(crate) fn scratch(&self) -> &Scratch {
        &self.ctx.scratch
    }

    pub(crate) fn scratch_mut(&mut self) -> &mut Scratch {
        &mut self.ctx.scratch
    }

    /// Run raw HTML through the sanitizer when `sanitize` is on.
    pub(crate) fn sanitize(&self, html: &str) -> String {
        if !self.options.sanitize {
            return html.to_owned();
        }
        match self.sanitizer.sanitize(html) {
            Ok(clean) => clean,
            Err(err) => {
                tracing::warn!(error = %err, "Sanitizer failed, keeping partial output");
                err.partial().to_owned()
            }
        }
    }

    /// Apply CJK spacing and term fixes to a text node as configured.
    ///
    /// Text inside a marked span keeps its spacing as written; the span
    /// boundaries are spaced instead.
    pub(crate) fn process_text(&self, id: NodeId) -> String {
        let node = &self.tree[id];
        let marked = node.parent().is_some_and(|parent| is_marked_span(self.tree[parent].kind));
        let mut text = if self.options.auto_space && !marked {
            space(&node.tokens)
        } else {
            node.tokens.clone()
        };
        if self.options.fix_term_typo {
            text = fix_term_typo(&text, &self.options.terms);
        }
        text
    }

    /// Destination rewritten with `link_base` and `link_prefix`.
    pub(crate) fn link_path(&self, dest: &str) -> String {
        util::link_path(dest, &self.options.link_base, &self.options.link_prefix)
    }

    /// Anchor ids of every heading, computed for the whole document on first use.
    pub(crate) fn heading_ids(&mut self) -> &HashMap<NodeId, String> {
        let tree = self.tree;
        let options = self.options;
        self.ctx
            .scratch
            .heading_ids
            .get_or_insert_with(|| heading::heading_ids(tree, options))
    }

    pub(crate) fn heading_id(&mut self, id: NodeId) -> String {
        self.heading_ids().get(&id).cloned().unwrap_or_default()
    }
}
