pub mod crawl;
pub mod scrape;

/// Per-run totals reported when a stage finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    /// Items attempted (listing pages or detail urls)
    pub visited: usize,
    /// Items that produced no content (dead pages)
    pub skipped: usize,
    /// Items that failed at the engine level
    pub errors: usize,
}
