//! Configuration loading and resolution.

use crate::types::Locale;
use std::path::PathBuf;

/// Environment variable naming the store file
pub const STORE_ENV: &str = "NURSERY_INSIGHT_STORE";

/// Environment variable naming the output locale
pub const LOCALE_ENV: &str = "NURSERY_INSIGHT_LOCALE";

/// Store location used when nothing else is configured
pub const DEFAULT_STORE_PATH: &str = ".nursery/insight.json";

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightConfig {
    pub store_path: PathBuf,
    pub locale: Locale,
}

impl InsightConfig {
    /// Resolve from explicit values, then the environment, then defaults
    pub fn resolve(store: Option<&str>, locale: Option<&str>) -> Result<Self, String> {
        Ok(Self {
            store_path: resolve_store_path(store, std::env::var(STORE_ENV).ok().as_deref()),
            locale: resolve_locale(locale, std::env::var(LOCALE_ENV).ok().as_deref())?,
        })
    }
}

/// Resolve the store file path.
pub fn resolve_store_path(explicit: Option<&str>, from_env: Option<&str>) -> PathBuf {
    if let Some(path) = explicit.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }

    if let Some(path) = from_env.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Resolve the output locale; an unknown explicit value is an error
pub fn resolve_locale(explicit: Option<&str>, from_env: Option<&str>) -> Result<Locale, String> {
    match explicit.or(from_env) {
        Some(value) => value.parse(),
        None => Ok(Locale::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_path_precedence() {
        assert_eq!(
            resolve_store_path(Some("a.json"), Some("b.json")),
            PathBuf::from("a.json")
        );
        assert_eq!(resolve_store_path(None, Some("b.json")), PathBuf::from("b.json"));
        assert_eq!(resolve_store_path(Some(""), None), PathBuf::from(DEFAULT_STORE_PATH));
    }

    #[test]
    fn test_locale_precedence() {
        assert_eq!(resolve_locale(None, None), Ok(Locale::Fr));
        assert_eq!(resolve_locale(None, Some("en")), Ok(Locale::En));
        assert_eq!(resolve_locale(Some("fr"), Some("en")), Ok(Locale::Fr));
        assert!(resolve_locale(Some("klingon"), None).is_err());
    }
}
