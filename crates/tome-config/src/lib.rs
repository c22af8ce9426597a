//! Render options for tome.
//!
//! [`Options`] is the read-only configuration record handed to every
//! renderer. It can be built in code (all fields are public and have
//! defaults) or loaded from a `tome.toml` file:
//!
//! ```toml
//! auto_space = true
//! fix_term_typo = true
//! link_base = "${CDN_URL:-https://cdn.example.com}/"
//!
//! [terms]
//! rustlang = "RustLang"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `link_base` and `link_prefix` support `${VAR}` and `${VAR:-default}`.
//!
//! ## Term Dictionary
//!
//! `[terms]` entries extend the built-in dictionary instead of replacing it.

mod expand;
mod terms;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

pub use terms::default_terms;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tome.toml";

/// Rendering options.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Insert spaces between CJK and Latin runs.
    pub auto_space: bool,
    /// Render single newlines as hard breaks.
    pub soft_break_to_hard_break: bool,
    /// Emit and consume `{: ...}` attribute lists after blocks.
    pub kramdown_block_ial: bool,
    /// Emit and consume `{: ...}` attribute lists after inline spans.
    pub kramdown_span_ial: bool,
    /// Strip unsafe raw HTML.
    pub sanitize: bool,
    /// Base URL prepended to relative link and image destinations.
    pub link_base: String,
    /// Prefix prepended to every destination after `link_base` is applied.
    pub link_prefix: String,
    /// Correct the case of known technical terms.
    pub fix_term_typo: bool,
    /// Term dictionary: lowercase term to corrected spelling.
    #[serde(deserialize_with = "extend_default_terms")]
    pub terms: HashMap<String, String>,
    /// Indent top-level paragraphs with two em spaces.
    pub chinese_paragraph_beginning_space: bool,
    /// Recognize `{{{row` / `{{{col` ... `}}}` layout blocks.
    pub super_block: bool,
    /// Write table cells without padding, as the block editor expects.
    pub protyle_wysiwyg: bool,
    /// Class attribute for task list items; empty for none.
    pub gfm_task_list_item_class: String,
    /// Expand `[toc]` placeholders.
    pub toc: bool,
    /// Give headings `id` attributes.
    pub heading_id: bool,
    pub footnotes: bool,
    pub math: bool,
    pub yaml_front_matter: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            auto_space: false,
            soft_break_to_hard_break: true,
            kramdown_block_ial: false,
            kramdown_span_ial: false,
            sanitize: false,
            link_base: String::new(),
            link_prefix: String::new(),
            fix_term_typo: false,
            terms: default_terms(),
            chinese_paragraph_beginning_space: false,
            super_block: false,
            protyle_wysiwyg: false,
            gfm_task_list_item_class: "vditor-task".to_owned(),
            toc: false,
            heading_id: false,
            footnotes: true,
            math: true,
            yaml_front_matter: true,
        }
    }
}

fn extend_default_terms<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let extra = HashMap::<String, String>::deserialize(deserializer)?;
    let mut terms = default_terms();
    terms.extend(extra);
    Ok(terms)
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Option name (e.g., "`link_base`").
        field: String,
        /// Error message (e.g., "${`CDN_URL`} not set").
        message: String,
    },
}

impl Options {
    /// Load options from a file.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `tome.toml` in the current directory and its parents,
    /// and falls back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if reading,
    /// parsing, expansion or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }
        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd));
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse options from TOML text, expanding and validating them.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut options: Self = toml::from_str(content)?;
        options.expand_env_vars()?;
        options.validate()?;
        Ok(options)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), terms = options.terms.len(), "Loaded render options");
        Ok(options)
    }

    /// Validate option values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_terms()?;
        self.validate_links()?;
        Ok(())
    }

    /// Term corrections are applied in place, byte for byte.
    fn validate_terms(&self) -> Result<(), ConfigError> {
        let mut keys: Vec<&String> = self.terms.keys().collect();
        keys.sort();
        for key in keys {
            let to = &self.terms[key];
            if key.is_empty() {
                return Err(ConfigError::Validation("terms cannot contain an empty key".to_owned()));
            }
            if *key != key.to_lowercase() {
                return Err(ConfigError::Validation(format!(
                    "terms.{key} must be lowercase"
                )));
            }
            if key.len() != to.len() {
                return Err(ConfigError::Validation(format!(
                    "terms.{key} correction \"{to}\" must have the same length as the term"
                )));
            }
        }
        Ok(())
    }

    fn validate_links(&self) -> Result<(), ConfigError> {
        if !self.link_prefix.is_empty() && !self.link_base.is_empty() && !self.link_base.ends_with('/')
        {
            return Err(ConfigError::Validation(
                "link_base must end with / when link_prefix is set".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.link_base = expand::expand_env(&self.link_base, "link_base")?;
        self.link_prefix = expand::expand_env(&self.link_prefix, "link_prefix")?;
        Ok(())
    }
}

/// Search for the config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
