//! `${VAR}` and `${VAR:-default}` expansion for URL options.

use crate::ConfigError;

/// Variable that could not be resolved.
struct Unset {
    name: String,
}

/// Expand `${VAR}` references in `value`.
///
/// Bare `$VAR` is left alone, so URLs containing `$` pass through unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| -> Result<Option<String>, Unset> {
        std::env::var(name).map(Some).map_err(|_| Unset {
            name: name.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_base_url_from_env() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("TOME_TEST_CDN", "https://cdn.example.com");
        }
        let result = expand_env("${TOME_TEST_CDN}/assets/", "link_base").unwrap();
        assert_eq!(result, "https://cdn.example.com/assets/");
        unsafe {
            std::env::remove_var("TOME_TEST_CDN");
        }
    }

    #[test]
    fn test_expand_falls_back_to_default() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("TOME_TEST_UNSET_PREFIX");
        }
        let result = expand_env("${TOME_TEST_UNSET_PREFIX:-/static}", "link_prefix").unwrap();
        assert_eq!(result, "/static");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("TOME_TEST_MISSING");
        }
        let err = expand_env("${TOME_TEST_MISSING}", "link_base").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("TOME_TEST_MISSING"));
        assert!(msg.contains("link_base"));
    }

    #[test]
    fn test_dollar_without_braces_unchanged() {
        let result = expand_env("https://example.com/$path", "link_base").unwrap();
        assert_eq!(result, "https://example.com/$path");
    }
}
