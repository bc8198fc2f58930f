use regex::Regex;
use serde::{Deserialize, Serialize};

/// Configuration for deciding which listing-page hrefs are detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Document suffix a detail-page link must end with
    #[serde(default = "default_detail_suffix")]
    pub detail_suffix: String,

    /// Path prefixes for project-aggregation pages rather than single
    /// listings; links starting with one of these are dropped
    #[serde(default = "default_exclude_prefixes")]
    pub exclude_prefixes: Vec<String>,

    /// Extra regex patterns for links to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_detail_suffix() -> String {
    ".html".to_string()
}

fn default_exclude_prefixes() -> Vec<String> {
    vec!["/du-an-".to_string()]
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            detail_suffix: default_detail_suffix(),
            exclude_prefixes: default_exclude_prefixes(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Filter applied to raw hrefs found on listing pages.
#[derive(Debug)]
pub struct LinkFilter {
    config: LinkFilterConfig,
    exclude_regexes: Vec<Regex>,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(LinkFilterConfig::default()).expect("Default patterns should be valid")
    }
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: LinkFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            config,
            exclude_regexes,
        })
    }

    /// Whether a raw href qualifies as a detail-page link.
    ///
    /// The prefix check runs against the href as found in the markup;
    /// the site emits root-relative paths for its own listings.
    pub fn keeps(&self, href: &str) -> bool {
        if !href.ends_with(&self.config.detail_suffix) {
            return false;
        }

        if self
            .config
            .exclude_prefixes
            .iter()
            .any(|prefix| href.starts_with(prefix))
        {
            return false;
        }

        for regex in &self.exclude_regexes {
            if regex.is_match(href) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_keeps_detail_links() {
        let filter = LinkFilter::default();

        assert!(filter.keeps("/ban-nha-quan-1-12345.html"));
        assert!(filter.keeps("https://alonhadat.com.vn/ban-dat-67890.html"));
    }

    #[test]
    fn test_suffix_restriction() {
        let filter = LinkFilter::default();

        // Pages without the document suffix are not detail pages
        assert!(!filter.keeps("/tin-tuc"));
        assert!(!filter.keeps("/ban-nha-12345.htm"));
    }

    #[test]
    fn test_project_prefix_is_excluded() {
        let filter = LinkFilter::default();

        assert!(!filter.keeps("/du-an-khu-do-thi-moi.html"));
    }

    #[test]
    fn test_regex_patterns_take_precedence() {
        let config = LinkFilterConfig {
            exclude_patterns: vec![r"-cho-thue-".to_string()],
            ..LinkFilterConfig::default()
        };
        let filter = LinkFilter::new(config).unwrap();

        assert!(filter.keeps("/ban-nha-12345.html"));
        assert!(!filter.keeps("/nha-cho-thue-12345.html"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected_at_construction() {
        let config = LinkFilterConfig {
            exclude_patterns: vec!["(".to_string()],
            ..LinkFilterConfig::default()
        };
        assert!(LinkFilter::new(config).is_err());
    }
}
