use scraper::{Html, Selector};
use url::Url;

use crate::config::{SetupError, SiteConfig};
use crate::filter::{LinkFilter, LinkFilterConfig};

pub(crate) fn parse_selector(raw: &str) -> Result<Selector, SetupError> {
    Selector::parse(raw).map_err(|e| SetupError::Selector(raw.to_string(), e.to_string()))
}

/// Extracts qualifying detail-page links from rendered listing markup.
pub struct LinkCollector {
    item_selector: Selector,
    anchor_selector: Selector,
    origin: Url,
    filter: LinkFilter,
}

impl LinkCollector {
    pub fn from_site(site: &SiteConfig) -> Result<Self, SetupError> {
        Self::new(
            &site.listing_item_selector,
            &site.listing_anchor_selector,
            &site.origin,
            site.link_filter.clone(),
        )
    }

    pub fn new(
        item_selector: &str,
        anchor_selector: &str,
        origin: &str,
        filter_config: LinkFilterConfig,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            item_selector: parse_selector(item_selector)?,
            anchor_selector: parse_selector(anchor_selector)?,
            origin: Url::parse(origin)?,
            filter: LinkFilter::new(filter_config)?,
        })
    }

    /// Walk the listing items, pull each title anchor's href and keep the
    /// ones the filter accepts, resolved to absolute URLs. Zero items on
    /// a rendered page is an empty result, not an error.
    pub fn collect(&self, html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        let mut links = Vec::new();

        for item in doc.select(&self.item_selector) {
            let Some(anchor) = item.select(&self.anchor_selector).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !self.filter.keeps(href) {
                ::log::trace!("link filter rejected: {}", href);
                continue;
            }
            match self.origin.join(href) {
                Ok(absolute) => links.push(absolute.to_string()),
                Err(e) => ::log::debug!("discarding unresolvable href {}: {}", href, e),
            }
        }

        ::log::debug!("collected {} candidate links", links.len());
        links
    }
}
