//! Breadcrumb trail for a request path

use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::url::{join_site_url, segments};
use crate::domain::{Breadcrumb, SiteId};
use crate::infrastructure::traits::ElementResolver;

const HOME_TITLE: &str = "Home";

pub struct BreadcrumbService {
    settings: Arc<Settings>,
    elements: Arc<dyn ElementResolver>,
}

impl BreadcrumbService {
    pub fn new(settings: Arc<Settings>, elements: Arc<dyn ElementResolver>) -> Self {
        Self { settings, elements }
    }

    /// Home, then one crumb per accumulated path segment.
    ///
    /// `/blog/my-first-post` yields crumbs for `/`, `/blog` and
    /// `/blog/my-first-post`. Segments whose URI belongs to an element take
    /// the element's title and URL.
    pub fn breadcrumbs(&self, site: SiteId, path: &str) -> ApplicationResult<Vec<Breadcrumb>> {
        let site = self
            .settings
            .site(site)
            .ok_or(ApplicationError::UnknownSite(site))?;
        debug!("breadcrumbs: site={} path={:?}", site.handle, path);

        let mut crumbs = vec![Breadcrumb {
            title: HOME_TITLE.to_string(),
            url: join_site_url(&site.base_url, ""),
            segment: None,
            is_element: false,
        }];

        let mut uri = String::new();
        for segment in segments(path) {
            if !uri.is_empty() {
                uri.push('/');
            }
            uri.push_str(&segment);

            let crumb = match self.elements.element_by_uri(&uri, site.id) {
                Some(element) => Breadcrumb {
                    url: element
                        .url
                        .unwrap_or_else(|| join_site_url(&site.base_url, &uri)),
                    title: element.title,
                    segment: Some(segment),
                    is_element: true,
                },
                None => Breadcrumb {
                    title: titleize(&segment),
                    url: join_site_url(&site.base_url, &uri),
                    segment: Some(segment),
                    is_element: false,
                },
            };
            crumbs.push(crumb);
        }
        Ok(crumbs)
    }
}

/// `my-first_post` becomes `My First Post`.
fn titleize(segment: &str) -> String {
    segment
        .split(|c: char| c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_slug_when_titleizing_then_words_capitalized() {
        assert_eq!(titleize("my-first_post"), "My First Post");
        assert_eq!(titleize("about"), "About");
        assert_eq!(titleize("--"), "");
    }
}
