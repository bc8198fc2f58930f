use crate::browser::{DriverError, PageDriver};
use crate::collect::LinkCollector;
use crate::config::{CrawlConfig, SetupError, SiteConfig};
use crate::diagnostics::Capturer;
use crate::readiness::{self, DeadReason};
use crate::records::LinkSet;
use crate::stages::StageReport;

enum PageOutcome {
    /// Number of links not seen on earlier pages
    Collected(usize),
    Skipped(DeadReason),
}

/// Walk the numbered listing pages and accumulate detail links.
///
/// Pages are visited strictly in order on the single page handle. A
/// failure on one page is caught here, captured, and the walk moves on;
/// only setup problems abort the stage.
pub async fn run<D: PageDriver>(
    page: &mut D,
    site: &SiteConfig,
    crawl: &CrawlConfig,
    capturer: &Capturer,
) -> Result<(LinkSet, StageReport), SetupError> {
    let collector = LinkCollector::from_site(site)?;
    let mut links = LinkSet::new();
    let mut report = StageReport::default();

    for page_no in 1..=crawl.max_pages {
        let url = site.listing_url(page_no);
        ::log::info!("crawling listing page {}/{}: {}", page_no, crawl.max_pages, url);
        report.visited += 1;

        match crawl_one(page, site, &collector, capturer, page_no, &url, &mut links).await {
            Ok(PageOutcome::Collected(added)) => {
                ::log::info!("page {}: {} new links ({} total)", page_no, added, links.len());
            }
            Ok(PageOutcome::Skipped(reason)) => {
                report.skipped += 1;
                ::log::warn!("page {}: skipped ({})", page_no, reason);
            }
            Err(e) => {
                report.errors += 1;
                ::log::error!("page {} failed: {}", url, e);
                capturer.capture(page, &format!("error_page_{page_no}")).await;
            }
        }
    }

    Ok((links, report))
}

async fn crawl_one<D: PageDriver>(
    page: &mut D,
    site: &SiteConfig,
    collector: &LinkCollector,
    capturer: &Capturer,
    page_no: u32,
    url: &str,
    links: &mut LinkSet,
) -> Result<PageOutcome, DriverError> {
    page.goto(url, site.navigation_timeout()).await?;
    tokio::time::sleep(site.render_wait()).await;

    let label = format!("page_{page_no}");
    let outcome = readiness::await_ready(
        page,
        &site.listing_item_selector,
        site.timeouts(),
        capturer,
        &label,
    )
    .await?;
    if let Some(reason) = outcome.dead_reason() {
        return Ok(PageOutcome::Skipped(reason));
    }

    let html = page.source().await?;
    let found = collector.collect(&html);
    let found_count = found.len();
    let added = links.extend(found);
    if found_count > added {
        ::log::debug!(
            "page {}: {} of {} links already seen",
            page_no,
            found_count - added,
            found_count
        );
    }

    tokio::time::sleep(site.polite_pause()).await;
    Ok(PageOutcome::Collected(added))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakePage, PageScript};
    use std::collections::HashMap;

    fn fast_site() -> SiteConfig {
        SiteConfig {
            render_wait_ms: 0,
            polite_pause_ms: 0,
            ..SiteConfig::default()
        }
    }

    fn listing_html(hrefs: &[&str]) -> String {
        let items: String = hrefs
            .iter()
            .map(|h| {
                format!(
                    r#"<div class="content-item item">
                         <div class="ct_title"><a href="{h}">Bán nhà</a></div>
                       </div>"#
                )
            })
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    #[tokio::test]
    async fn test_links_are_accumulated_and_deduplicated_across_pages() {
        let site = fast_site();
        let crawl = CrawlConfig {
            max_pages: 2,
            ..CrawlConfig::default()
        };
        let tmp = tempfile::tempdir().unwrap();

        let mut scripts = HashMap::new();
        scripts.insert(
            site.listing_url(1),
            PageScript::ready(&listing_html(&["/ban-nha-1.html", "/ban-nha-2.html"])),
        );
        // page 2 repeats one link from page 1
        scripts.insert(
            site.listing_url(2),
            PageScript::ready(&listing_html(&["/ban-nha-2.html", "/ban-nha-3.html"])),
        );
        let mut page = FakePage::with_scripts(scripts);

        let (links, report) = run(&mut page, &site, &crawl, &Capturer::new(tmp.path()))
            .await
            .unwrap();

        let collected: Vec<&str> = links.iter().collect();
        assert_eq!(
            collected,
            vec![
                "https://alonhadat.com.vn/ban-nha-1.html",
                "https://alonhadat.com.vn/ban-nha-2.html",
                "https://alonhadat.com.vn/ban-nha-3.html",
            ]
        );
        assert_eq!(report.visited, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.errors, 0);
        // pages were visited strictly in order
        assert_eq!(page.goto_calls, vec![site.listing_url(1), site.listing_url(2)]);
    }

    #[tokio::test]
    async fn test_dead_page_is_skipped_and_the_walk_continues() {
        let site = fast_site();
        let crawl = CrawlConfig {
            max_pages: 2,
            ..CrawlConfig::default()
        };
        let tmp = tempfile::tempdir().unwrap();

        let mut scripts = HashMap::new();
        // page 1 stalls with no challenge markers
        scripts.insert(
            site.listing_url(1),
            PageScript::stalled("<html><body></body></html>", &[false]),
        );
        scripts.insert(
            site.listing_url(2),
            PageScript::ready(&listing_html(&["/ban-nha-9.html"])),
        );
        let mut page = FakePage::with_scripts(scripts);

        let (links, report) = run(&mut page, &site, &crawl, &Capturer::new(tmp.path()))
            .await
            .unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors, 0);
    }

    #[tokio::test]
    async fn test_navigation_failure_is_isolated_with_a_snapshot() {
        let site = fast_site();
        let crawl = CrawlConfig {
            max_pages: 2,
            ..CrawlConfig::default()
        };
        let tmp = tempfile::tempdir().unwrap();

        let mut scripts = HashMap::new();
        scripts.insert(site.listing_url(1), PageScript::unreachable());
        scripts.insert(
            site.listing_url(2),
            PageScript::ready(&listing_html(&["/ban-nha-5.html"])),
        );
        let mut page = FakePage::with_scripts(scripts);

        let (links, report) = run(&mut page, &site, &crawl, &Capturer::new(tmp.path()))
            .await
            .unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(report.errors, 1);
        assert_eq!(page.screenshots.len(), 1);
        let name = page.screenshots[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("error_page_1_"));
    }
}
