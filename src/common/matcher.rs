use std::fmt;

use regex::Regex;
use thiserror::Error;

/// How a configured placement recognizes an application's windows.
///
/// Written as a plain string in config: `"Terminal"` matches the app name
/// exactly; `"/^Firefox/"` (slash-delimited) compiles to a regex. The
/// pattern is parsed once at config load and evaluated per discovery pass.
#[derive(Clone, Debug)]
pub enum AppPattern {
    Exact(String),
    Regex(Regex),
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("empty application pattern")]
    Empty,
    #[error("invalid regex pattern {pattern:?}: {source}")]
    BadRegex {
        pattern: String,
        source: regex::Error,
    },
}

impl AppPattern {
    pub fn parse(raw: &str) -> Result<AppPattern, PatternError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') {
            let inner = &raw[1..raw.len() - 1];
            if inner.is_empty() {
                return Err(PatternError::Empty);
            }
            let re = Regex::new(inner).map_err(|source| PatternError::BadRegex {
                pattern: inner.to_string(),
                source,
            })?;
            return Ok(AppPattern::Regex(re));
        }
        Ok(AppPattern::Exact(raw.to_string()))
    }

    pub fn matches(&self, app: &str) -> bool {
        match self {
            AppPattern::Exact(name) => app == name,
            AppPattern::Regex(re) => re.is_match(app),
        }
    }

    /// The pattern as the daemon's rule table expects it: an anchored regex.
    pub fn daemon_pattern(&self) -> String {
        match self {
            AppPattern::Exact(name) => format!("^{}$", regex::escape(name)),
            AppPattern::Regex(re) => re.as_str().to_string(),
        }
    }

    /// Stable lowercase slug used for rule labels. Distinct patterns that
    /// slug identically would collide, so config validation rejects that.
    pub fn slug(&self) -> String {
        let raw = match self {
            AppPattern::Exact(name) => name.as_str(),
            AppPattern::Regex(re) => re.as_str(),
        };
        let mut slug = String::with_capacity(raw.len());
        let mut last_dash = true;
        for ch in raw.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
                last_dash = false;
            } else if !last_dash {
                slug.push('-');
                last_dash = true;
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        slug
    }

    /// The concrete name to hand the launcher, when the pattern names one.
    /// Regex patterns have no canonical name; those placements only launch
    /// via an explicit config override.
    pub fn launch_name(&self) -> Option<&str> {
        match self {
            AppPattern::Exact(name) => Some(name),
            AppPattern::Regex(_) => None,
        }
    }
}

impl fmt::Display for AppPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppPattern::Exact(name) => write!(f, "{name}"),
            AppPattern::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn exact_pattern_matches_only_exact_name() {
        let p = AppPattern::parse("Terminal").unwrap();
        assert!(p.matches("Terminal"));
        assert!(!p.matches("Terminal 2"));
        assert!(!p.matches("terminal"));
    }

    #[test]
    fn slash_delimited_pattern_compiles_to_regex() {
        let p = AppPattern::parse("/^Firefox( Nightly)?$/").unwrap();
        assert!(p.matches("Firefox"));
        assert!(p.matches("Firefox Nightly"));
        assert!(!p.matches("Firefox Developer Edition"));
    }

    #[test]
    fn daemon_pattern_anchors_and_escapes_exact_names() {
        let p = AppPattern::parse("Visual Studio Code (Insiders)").unwrap();
        assert_eq!(
            p.daemon_pattern(),
            r"^Visual Studio Code \(Insiders\)$"
        );
    }

    #[test]
    fn slug_is_stable_and_lowercase() {
        let p = AppPattern::parse("Visual Studio Code").unwrap();
        assert_eq!(p.slug(), "visual-studio-code");
        let r = AppPattern::parse("/^Fire.*$/").unwrap();
        assert_eq!(r.slug(), "fire");
    }

    #[test]
    fn empty_and_bad_patterns_are_rejected() {
        assert!(AppPattern::parse("  ").is_err());
        assert!(AppPattern::parse("//").is_err());
        assert!(AppPattern::parse("/([unclosed/").is_err());
    }

    #[test]
    fn launch_name_only_for_exact_patterns() {
        assert_eq!(
            AppPattern::parse("Mail").unwrap().launch_name(),
            Some("Mail")
        );
        assert_eq!(AppPattern::parse("/^Mail$/").unwrap().launch_name(), None);
    }
}
