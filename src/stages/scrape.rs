use crate::browser::{DriverError, PageDriver};
use crate::config::SiteConfig;
use crate::diagnostics::Capturer;
use crate::extract;
use crate::readiness;
use crate::records::{DetailRecord, ERROR_NAVIGATION, ERROR_NO_CONTENT};
use crate::stages::StageReport;

/// Visit every URL in input order and extract one record per URL.
///
/// Every URL produces a record: extracted fields when the page came up,
/// an error-flagged record when it did not. A failure on one URL is
/// caught here, captured, and the run moves on.
pub async fn run<D: PageDriver>(
    page: &mut D,
    site: &SiteConfig,
    urls: &[String],
    capturer: &Capturer,
) -> (Vec<DetailRecord>, StageReport) {
    let total = urls.len();
    let mut records = Vec::with_capacity(total);
    let mut report = StageReport::default();

    for (idx, url) in urls.iter().enumerate() {
        let item = idx + 1;
        ::log::info!("[{}/{}] scraping {}", item, total, url);
        report.visited += 1;

        match scrape_one(page, site, capturer, item, url).await {
            Ok(record) => {
                if record.is_error() {
                    report.skipped += 1;
                } else {
                    ::log::debug!("{}: {} fields extracted", url, record.field_count());
                }
                records.push(record);
            }
            Err(e) => {
                report.errors += 1;
                ::log::error!("scraping {} failed: {}", url, e);
                capturer.capture(page, &format!("error_{item}")).await;
                records.push(DetailRecord::failed(url, ERROR_NAVIGATION));
            }
        }
    }

    (records, report)
}

async fn scrape_one<D: PageDriver>(
    page: &mut D,
    site: &SiteConfig,
    capturer: &Capturer,
    item: usize,
    url: &str,
) -> Result<DetailRecord, DriverError> {
    page.goto(url, site.navigation_timeout()).await?;
    tokio::time::sleep(site.render_wait()).await;

    let label = format!("detail_{item}");
    let outcome = readiness::await_ready(
        page,
        &site.detail_ready_selector,
        site.timeouts(),
        capturer,
        &label,
    )
    .await?;
    if let Some(reason) = outcome.dead_reason() {
        ::log::warn!("{}: {}", url, reason);
        return Ok(DetailRecord::failed(url, ERROR_NO_CONTENT));
    }

    let html = page.source().await?;
    let record = extract::extract_fields(&html, url);

    tokio::time::sleep(site.polite_pause()).await;
    Ok(record)
}
