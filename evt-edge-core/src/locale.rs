//! Locale prefix handling
//!
//! Every page URL lives under `/{locale}/...`. Paths without a supported
//! locale segment are redirected to the same path under the default locale.

use crate::config::LocaleConfig;

/// Outcome of locale resolution for a page path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleResolution {
    /// The path already carries a supported locale
    Localized {
        locale: String,
        /// Remainder after the locale segment, always starting with `/`
        rest: String,
    },
    /// Redirect target (path plus original query) under the default locale
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct LocaleResolver {
    supported: Vec<String>,
    default: String,
}

impl LocaleResolver {
    pub fn new(config: &LocaleConfig) -> Self {
        Self { supported: config.supported.clone(), default: config.default.clone() }
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    pub fn is_supported(&self, locale: &str) -> bool {
        self.supported.iter().any(|l| l == locale)
    }

    /// Split `/ro/events/1` into `("ro", "/events/1")`.
    ///
    /// Returns `None` when the first segment is not a supported locale.
    pub fn split_locale<'a>(&self, path: &'a str) -> Option<(&'a str, &'a str)> {
        let trimmed = path.strip_prefix('/')?;
        let (first, rest) = match trimmed.find('/') {
            Some(idx) => (&trimmed[..idx], &trimmed[idx..]),
            None => (trimmed, "/"),
        };
        if self.is_supported(first) {
            Some((first, rest))
        } else {
            None
        }
    }

    pub fn resolve(&self, path: &str, query: Option<&str>) -> LocaleResolution {
        if let Some((locale, rest)) = self.split_locale(path) {
            return LocaleResolution::Localized { locale: locale.to_string(), rest: rest.to_string() };
        }

        let mut target = if path.is_empty() || path == "/" {
            format!("/{}", self.default)
        } else if path.starts_with('/') {
            format!("/{}{}", self.default, path)
        } else {
            format!("/{}/{}", self.default, path)
        };

        if let Some(q) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(q);
        }

        LocaleResolution::Redirect(target)
    }
}
