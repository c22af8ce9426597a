//! Markdown with remote asset URLs rewritten to a local `assets` directory.

use super::markdown::MarkdownFlavor;

/// Rewrites destinations starting with one of the configured prefixes to
/// `assets/` followed by the rest of the URL.
///
/// Every rewritten URL is recorded in document order.
#[derive(Clone, Debug, Default)]
pub struct AssetRelocation {
    prefixes: Vec<String>,
    originals: Vec<String>,
}

impl AssetRelocation {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            originals: Vec::new(),
        }
    }

    /// URLs rewritten by the last render.
    #[must_use]
    pub fn originals(&self) -> &[String] {
        &self.originals
    }

    #[must_use]
    pub fn into_originals(self) -> Vec<String> {
        self.originals
    }

    fn relocate(&self, dest: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| dest.strip_prefix(prefix.as_str()))
            .map(|rest| format!("assets/{}", rest.trim_start_matches('/')))
    }
}

impl MarkdownFlavor for AssetRelocation {
    const NAME: &'static str = "markdown-assets";

    fn link_dest(&mut self, dest: &str, measuring: bool) -> String {
        let Some(relocated) = self.relocate(dest) else {
            return dest.to_owned();
        };
        if !measuring {
            tracing::debug!(from = dest, to = %relocated, "Relocated asset");
            self.originals.push(dest.to_owned());
        }
        relocated
    }

    fn reset(&mut self) {
        self.originals.clear();
    }
}
