//! Relative URLs and current-page matching.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// How a node URL is compared as a prefix of the current request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveMatch {
    /// `/about` matches `/about/team` but not `/about-us`
    #[default]
    Segment,
    /// Raw string prefix: `/about` also matches `/about-us`
    Literal,
}

impl fmt::Display for ActiveMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveMatch::Segment => write!(f, "segment"),
            ActiveMatch::Literal => write!(f, "literal"),
        }
    }
}

impl FromStr for ActiveMatch {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "segment" => Ok(ActiveMatch::Segment),
            "literal" => Ok(ActiveMatch::Literal),
            other => Err(DomainError::InvalidActiveMatch(other.to_string())),
        }
    }
}

/// Request path as slash-joined segments, without query, fragment or
/// surrounding slashes: `/blog/post/?page=2` becomes `blog/post`.
pub fn normalize_request_path(path: &str) -> String {
    let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a request path into its segments.
pub fn segments(path: &str) -> Vec<String> {
    let normalized = normalize_request_path(path);
    if normalized.is_empty() {
        Vec::new()
    } else {
        normalized.split('/').map(str::to_string).collect()
    }
}

/// Join a site base URL and a relative path.
pub fn join_site_url(base_url: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        format!("{}/", base_url.trim_end_matches('/'))
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), path)
    }
}

/// Strip the site base URL from `url`. Manual links also lose a leading `/`.
pub fn relative_url(url: &str, base_url: &str, manual: bool) -> String {
    let base = base_url.trim_end_matches('/');
    let relative = if !base.is_empty() && url.trim_end_matches('/') == base {
        ""
    } else if base.is_empty() {
        url
    } else {
        url.strip_prefix(base)
            .filter(|rest| rest.starts_with('/'))
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(url)
    };
    let relative = relative.trim_end_matches('/');
    if manual {
        relative.trim_start_matches('/').to_string()
    } else {
        relative.to_string()
    }
}

/// The link pointing at the site root.
pub fn is_homepage(url: &str, base_url: &str, manual: bool) -> bool {
    let base = base_url.trim_end_matches('/');
    (!base.is_empty() && url.trim_end_matches('/') == base)
        || (manual && url.trim_matches('/').is_empty())
}

/// Direct (non-recursive) active check for one link against one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMatcher {
    base_url: String,
    mode: ActiveMatch,
}

impl ActiveMatcher {
    pub fn new(base_url: impl Into<String>, mode: ActiveMatch) -> Self {
        Self {
            base_url: base_url.into(),
            mode,
        }
    }

    /// Exact match or prefix match, evaluated independently.
    ///
    /// The homepage link never matches by prefix. A link without a URL never
    /// matches.
    pub fn matches(&self, url: Option<&str>, manual: bool, current_path: &str) -> bool {
        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            return false;
        };
        let current = normalize_request_path(current_path);
        let relative = relative_url(url, &self.base_url, manual);

        let exact = current == relative;
        let prefix = !is_homepage(url, &self.base_url, manual) && self.has_prefix(&current, &relative);

        exact || prefix
    }

    fn has_prefix(&self, current: &str, relative: &str) -> bool {
        match self.mode {
            ActiveMatch::Literal => current.starts_with(relative),
            ActiveMatch::Segment => {
                !relative.is_empty()
                    && (current == relative
                        || current
                            .strip_prefix(relative)
                            .is_some_and(|rest| rest.starts_with('/')))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BASE: &str = "https://example.com/";

    #[rstest]
    #[case("/blog/post/", "blog/post")]
    #[case("blog//post?page=2", "blog/post")]
    #[case("/", "")]
    #[case("/about#team", "about")]
    fn given_request_path_when_normalizing_then_segments_joined(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(normalize_request_path(input), expected);
    }

    #[rstest]
    #[case("https://example.com/about", false, "about")]
    #[case("https://example.com/", false, "")]
    #[case("https://example.com", false, "")]
    #[case("/about", true, "about")]
    #[case("/about", false, "/about")]
    #[case("https://other.org/about", false, "https://other.org/about")]
    #[case("https://example.com.evil/about", false, "https://example.com.evil/about")]
    fn given_url_when_relativizing_then_base_stripped(
        #[case] url: &str,
        #[case] manual: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(relative_url(url, BASE, manual), expected);
    }

    #[test]
    fn given_homepage_links_when_checking_then_detected() {
        assert!(is_homepage("https://example.com/", BASE, false));
        assert!(is_homepage("/", BASE, true));
        assert!(!is_homepage("/about", BASE, true));
    }

    #[rstest]
    #[case(ActiveMatch::Segment, "/about", "/about", true)]
    #[case(ActiveMatch::Segment, "/section", "/section/child", true)]
    #[case(ActiveMatch::Segment, "/about", "/about-us", false)]
    #[case(ActiveMatch::Literal, "/about", "/about-us", true)]
    #[case(ActiveMatch::Segment, "/", "/about", false)]
    #[case(ActiveMatch::Literal, "/", "/about", false)]
    #[case(ActiveMatch::Segment, "/", "/", true)]
    #[case(ActiveMatch::Segment, "/blog", "/news", false)]
    fn given_manual_link_when_matching_then_expected(
        #[case] mode: ActiveMatch,
        #[case] url: &str,
        #[case] current: &str,
        #[case] expected: bool,
    ) {
        let matcher = ActiveMatcher::new(BASE, mode);
        assert_eq!(matcher.matches(Some(url), true, current), expected);
    }

    #[test]
    fn given_element_url_when_matching_then_base_is_ignored() {
        let matcher = ActiveMatcher::new(BASE, ActiveMatch::Segment);
        assert!(matcher.matches(Some("https://example.com/about"), false, "/about"));
        assert!(matcher.matches(Some("https://example.com/about"), false, "about/team"));
        assert!(!matcher.matches(Some("https://example.com/"), false, "about"));
        assert!(!matcher.matches(None, false, "about"));
    }

    #[test]
    fn given_mode_strings_when_parsing_then_roundtrip() {
        assert_eq!("Literal".parse::<ActiveMatch>().unwrap(), ActiveMatch::Literal);
        assert_eq!(ActiveMatch::Segment.to_string(), "segment");
        assert!("fuzzy".parse::<ActiveMatch>().is_err());
    }

    #[test]
    fn given_base_and_path_when_joining_then_single_slash() {
        assert_eq!(join_site_url(BASE, "/blog"), "https://example.com/blog");
        assert_eq!(join_site_url("https://example.com", ""), "https://example.com/");
    }
}
