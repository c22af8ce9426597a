//! Dispatch-table renderer for tome document trees.
//!
//! One depth-first walk over a [`tome_ast::Tree`] produces text in a chosen
//! dialect. The walk, the output buffer stack, table layout and CJK spacing
//! are shared; dialects only decide what each node kind emits.
//!
//! # Architecture
//!
//! - [`Renderer`]: walk driver with consumer overrides, a fallback and the
//!   output buffer stack
//! - [`Dialect`]: per-format strategy that fills a [`DispatchTable`]
//! - [`Markdown`]: round-trip Markdown, parameterized by a [`MarkdownFlavor`]
//!   such as [`AssetRelocation`]
//! - [`Html`], [`SplitView`] and [`EchartsJson`]: HTML, split-view editor DOM
//!   and diagram JSON
//! - [`space`]: inter-script spacing between CJK and Latin text
//!
//! # Example
//!
//! ```
//! use tome_ast::parse;
//! use tome_config::Options;
//! use tome_render::{parse_options, render_html, render_markdown};
//!
//! let options = Options::default();
//! let tree = parse("# Title\n\n* one\n* two\n", &parse_options(&options));
//!
//! assert_eq!(render_markdown(&tree, &options).unwrap(), "# Title\n\n* one\n* two\n");
//! assert_eq!(
//!     render_html(&tree, &options).unwrap(),
//!     "<h1>Title</h1>\n<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"
//! );
//! ```

mod buffer;
mod dialect;
mod error;
mod heading;
mod renderer;
mod sanitize;
mod spacing;
mod table;
mod typo;
mod util;

use tome_ast::{ParseOptions, Tree};
use tome_config::Options;

pub use buffer::BufferStats;
pub use dialect::{AssetRelocation, EchartsJson, Html, Markdown, MarkdownFlavor, Plain, SplitView};
pub use error::{RenderError, SanitizeError};
pub use heading::{HeadingEntry, normalize_heading_id};
pub use renderer::{Dialect, DispatchTable, NodeFn, RenderFn, Renderer};
pub use sanitize::{DefaultSanitizer, Sanitizer};
pub use spacing::{allow_space, is_cjk, space};
pub use typo::fix_term_typo;
pub use util::{escape_html, link_path, show_len};

/// Parser options matching the syntax the render options expect.
#[must_use]
pub fn parse_options(options: &Options) -> ParseOptions {
    ParseOptions {
        gfm: true,
        footnotes: options.footnotes,
        math: options.math,
        yaml_front_matter: options.yaml_front_matter,
        toc: options.toc,
        sup_sub: false,
        kramdown_block_ial: options.kramdown_block_ial,
        kramdown_span_ial: options.kramdown_span_ial,
        super_block: options.super_block,
    }
}

/// Render `tree` back to Markdown.
pub fn render_markdown(tree: &Tree, options: &Options) -> Result<String, RenderError> {
    Renderer::new(tree, options, Markdown::new()).render()
}

/// Render `tree` as HTML.
pub fn render_html(tree: &Tree, options: &Options) -> Result<String, RenderError> {
    Renderer::new(tree, options, Html).render()
}

/// Render `tree` as split-view editor DOM.
pub fn render_sv(tree: &Tree, options: &Options) -> Result<String, RenderError> {
    Renderer::new(tree, options, SplitView).render()
}

/// Render `tree` as diagram JSON.
pub fn render_echarts_json(tree: &Tree, options: &Options) -> Result<String, RenderError> {
    Renderer::new(tree, options, EchartsJson::default()).render()
}

/// Render `tree` to Markdown with destinations under `prefixes` moved to
/// `assets`, returning the output and the original URLs in document order.
pub fn relocate_assets<I, S>(
    tree: &Tree,
    options: &Options,
    prefixes: I,
) -> Result<(String, Vec<String>), RenderError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut renderer = Renderer::new(tree, options, Markdown::with_flavor(AssetRelocation::new(prefixes)));
    let output = renderer.render()?;
    Ok((output, renderer.into_dialect().into_flavor().into_originals()))
}
