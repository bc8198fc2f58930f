use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::LinkFilterConfig;
use crate::readiness::Timeouts;

/// Failures while assembling a run: bad config file, bad selector or
/// pattern. These abort the run before any page is visited.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid selector `{0}`: {1}")]
    Selector(String, String),

    #[error("invalid regex pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid origin url: {0}")]
    Origin(#[from] url::ParseError),

    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Site-specific page shape and timing, shared by both stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Origin that relative detail links are resolved against
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Listing page url template; `{page}` is replaced by the 1-based
    /// page number
    #[serde(default = "default_listing_url_template")]
    pub listing_url_template: String,

    /// Selector matching one listing summary on a listing page
    #[serde(default = "default_listing_item_selector")]
    pub listing_item_selector: String,

    /// Title anchor inside a listing item, carrying the detail link
    #[serde(default = "default_listing_anchor_selector")]
    pub listing_anchor_selector: String,

    /// Disjunction of selectors marking a loaded detail page; the markup
    /// varies between listings
    #[serde(default = "default_detail_ready_selector")]
    pub detail_ready_selector: String,

    #[serde(default)]
    pub link_filter: LinkFilterConfig,

    /// Fast wait for the common, unchallenged case (ms)
    #[serde(default = "default_fast_timeout_ms")]
    pub fast_timeout_ms: u64,

    /// Escalated wait when a challenge is suspected (ms)
    #[serde(default = "default_slow_timeout_ms")]
    pub slow_timeout_ms: u64,

    /// Upper bound on a single navigation (ms)
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Pause right after navigation so the page can start rendering (ms)
    #[serde(default = "default_render_wait_ms")]
    pub render_wait_ms: u64,

    /// Politeness pause after a successful item (ms)
    #[serde(default = "default_polite_pause_ms")]
    pub polite_pause_ms: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Directory for diagnostic snapshots
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: String,
}

/// Crawl-stage settings: how many listing pages to walk and where the
/// collected links go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_links_file")]
    pub links_file: String,
}

/// Scrape-stage settings: where the links come from and where the
/// tabular output goes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_links_file")]
    pub links_file: String,

    #[serde(default = "default_output_file")]
    pub output_file: String,
}

/// Top-level config file shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub scrape: ScrapeConfig,
}

impl RunConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SetupError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

impl SiteConfig {
    /// Listing page url for the given 1-based page number.
    pub fn listing_url(&self, page: u32) -> String {
        self.listing_url_template
            .replace("{page}", &page.to_string())
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            fast: Duration::from_millis(self.fast_timeout_ms),
            slow: Duration::from_millis(self.slow_timeout_ms),
        }
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn render_wait(&self) -> Duration {
        Duration::from_millis(self.render_wait_ms)
    }

    pub fn polite_pause(&self) -> Duration {
        Duration::from_millis(self.polite_pause_ms)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            listing_url_template: default_listing_url_template(),
            listing_item_selector: default_listing_item_selector(),
            listing_anchor_selector: default_listing_anchor_selector(),
            detail_ready_selector: default_detail_ready_selector(),
            link_filter: LinkFilterConfig::default(),
            fast_timeout_ms: default_fast_timeout_ms(),
            slow_timeout_ms: default_slow_timeout_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            render_wait_ms: default_render_wait_ms(),
            polite_pause_ms: default_polite_pause_ms(),
            webdriver_url: default_webdriver_url(),
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            links_file: default_links_file(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            links_file: default_links_file(),
            output_file: default_output_file(),
        }
    }
}

fn default_origin() -> String {
    "https://alonhadat.com.vn".to_string()
}

fn default_listing_url_template() -> String {
    "https://alonhadat.com.vn/nha-dat/can-ban/trang--{page}.html".to_string()
}

fn default_listing_item_selector() -> String {
    "div.content-item.item".to_string()
}

fn default_listing_anchor_selector() -> String {
    ".ct_title a".to_string()
}

fn default_detail_ready_selector() -> String {
    "div.moreinfor, .detail.text-content, div.ct_title_box".to_string()
}

fn default_fast_timeout_ms() -> u64 {
    3000
}

fn default_slow_timeout_ms() -> u64 {
    30000
}

fn default_navigation_timeout_ms() -> u64 {
    60000
}

fn default_render_wait_ms() -> u64 {
    500
}

fn default_polite_pause_ms() -> u64 {
    800
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_screenshot_dir() -> String {
    "debug_screenshots".to_string()
}

fn default_max_pages() -> u32 {
    200
}

fn default_links_file() -> String {
    "alonhadat_links.txt".to_string()
}

fn default_output_file() -> String {
    "alonhadat_data.csv".to_string()
}
