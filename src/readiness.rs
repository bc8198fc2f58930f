use std::fmt;
use std::time::Duration;

use crate::browser::{DriverError, PageDriver};
use crate::challenge;
use crate::diagnostics::Capturer;

/// Outcome of probing a freshly navigated page for its target content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageReadiness {
    /// The target selector matched; extraction can proceed.
    Ready,
    /// The fast wait expired and the page shows an anti-bot challenge.
    BlockedByChallenge,
    /// The page will not produce the expected content this visit.
    Dead(DeadReason),
}

impl PageReadiness {
    /// The skip reason, if this outcome means the page is unusable.
    ///
    /// `BlockedByChallenge` counts as a challenge timeout here: once the
    /// escalation in [`await_ready`] has run its course, a still-blocked
    /// page is as dead as one that timed out.
    pub fn dead_reason(&self) -> Option<DeadReason> {
        match self {
            PageReadiness::Ready => None,
            PageReadiness::BlockedByChallenge => Some(DeadReason::ChallengeTimeout),
            PageReadiness::Dead(reason) => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadReason {
    /// A challenge was present and the content never appeared within the
    /// slow timeout.
    ChallengeTimeout,
    /// No challenge, no content: there is nothing to wait out.
    NoContentNoChallenge,
}

impl DeadReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadReason::ChallengeTimeout => "challenge_timeout",
            DeadReason::NoContentNoChallenge => "no_content_no_challenge",
        }
    }
}

impl fmt::Display for DeadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-tier wait durations: `fast` covers the common unchallenged case,
/// `slow` (an order of magnitude larger) is only paid when a challenge is
/// suspected.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub fast: Duration,
    pub slow: Duration,
}

/// Wait for `selector` on the current page, escalating through the
/// challenge protocol when the fast wait misses.
///
/// Fast wait hit: `Ready`, no further cost. Fast wait miss: classify the
/// current markup. A suspected challenge captures one diagnostic snapshot
/// and retries the wait with the slow timeout, resolving to `Ready` or
/// `Dead(ChallengeTimeout)`. No challenge resolves straight to
/// `Dead(NoContentNoChallenge)` without the long wait.
///
/// Wait timeouts are outcomes; every other driver failure propagates to
/// the caller's item boundary.
pub async fn await_ready<D: PageDriver>(
    page: &mut D,
    selector: &str,
    timeouts: Timeouts,
    capturer: &Capturer,
    label: &str,
) -> Result<PageReadiness, DriverError> {
    match page.wait_for_selector(selector, timeouts.fast).await {
        Ok(()) => {
            ::log::debug!("{}: content appeared on the fast path", label);
            return Ok(PageReadiness::Ready);
        }
        Err(e) if e.is_wait_timeout() => {}
        Err(e) => return Err(e),
    }

    match classify_stall(page).await? {
        PageReadiness::BlockedByChallenge => {}
        dead => {
            ::log::info!("{}: no content and no challenge markers, skipping", label);
            return Ok(dead);
        }
    }

    ::log::warn!("{}: suspected challenge, escalating to the slow wait", label);
    capturer.capture(page, &format!("{label}_captcha")).await;

    match page.wait_for_selector(selector, timeouts.slow).await {
        Ok(()) => {
            ::log::info!("{}: content appeared after the challenge wait", label);
            Ok(PageReadiness::Ready)
        }
        Err(e) if e.is_wait_timeout() => {
            ::log::warn!("{}: challenge wait exhausted, skipping", label);
            Ok(PageReadiness::Dead(DeadReason::ChallengeTimeout))
        }
        Err(e) => Err(e),
    }
}

/// First-tier classification of a page that missed the fast wait.
async fn classify_stall<D: PageDriver>(page: &mut D) -> Result<PageReadiness, DriverError> {
    let html = page.source().await?;
    if challenge::looks_challenged(&html) {
        Ok(PageReadiness::BlockedByChallenge)
    } else {
        Ok(PageReadiness::Dead(DeadReason::NoContentNoChallenge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakePage, PageScript};

    const SELECTOR: &str = "div.content-item.item";
    const CHALLENGED: &str = r#"<html><body>
        <iframe src="https://www.google.com/recaptcha/api2/anchor"></iframe>
    </body></html>"#;
    const BLANK: &str = "<html><body><p>nothing here</p></body></html>";

    fn timeouts() -> Timeouts {
        Timeouts {
            fast: Duration::from_millis(3000),
            slow: Duration::from_millis(30000),
        }
    }

    fn capturer(tmp: &tempfile::TempDir) -> Capturer {
        Capturer::new(tmp.path())
    }

    #[tokio::test]
    async fn test_fast_path_returns_ready_without_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let mut page = FakePage::on_page(PageScript::ready(BLANK));

        let outcome = await_ready(&mut page, SELECTOR, timeouts(), &capturer(&tmp), "page_1")
            .await
            .unwrap();

        assert_eq!(outcome, PageReadiness::Ready);
        assert_eq!(page.wait_calls.len(), 1);
        assert_eq!(page.wait_calls[0].1, Duration::from_millis(3000));
        assert!(page.screenshots.is_empty());
    }

    #[tokio::test]
    async fn test_challenge_then_content_returns_ready_with_one_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let mut page = FakePage::on_page(PageScript::stalled(CHALLENGED, &[false, true]));

        let outcome = await_ready(&mut page, SELECTOR, timeouts(), &capturer(&tmp), "page_2")
            .await
            .unwrap();

        assert_eq!(outcome, PageReadiness::Ready);
        // fast wait missed, slow wait was issued with the larger duration
        assert_eq!(page.wait_calls.len(), 2);
        assert_eq!(page.wait_calls[1].1, Duration::from_millis(30000));
        assert_eq!(page.screenshots.len(), 1);
    }

    #[tokio::test]
    async fn test_challenge_that_never_resolves_is_dead() {
        let tmp = tempfile::tempdir().unwrap();
        let mut page = FakePage::on_page(PageScript::stalled(CHALLENGED, &[false, false]));

        let outcome = await_ready(&mut page, SELECTOR, timeouts(), &capturer(&tmp), "page_3")
            .await
            .unwrap();

        assert_eq!(outcome, PageReadiness::Dead(DeadReason::ChallengeTimeout));
        assert_eq!(page.wait_calls.len(), 2);
        assert_eq!(page.screenshots.len(), 1);
    }

    #[tokio::test]
    async fn test_stall_without_challenge_skips_the_slow_wait() {
        let tmp = tempfile::tempdir().unwrap();
        let mut page = FakePage::on_page(PageScript::stalled(BLANK, &[false]));

        let outcome = await_ready(&mut page, SELECTOR, timeouts(), &capturer(&tmp), "page_4")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PageReadiness::Dead(DeadReason::NoContentNoChallenge)
        );
        // only the fast wait ran; the slow wait is never paid here
        assert_eq!(page.wait_calls.len(), 1);
        assert!(page.screenshots.is_empty());
    }

    #[test]
    fn test_dead_reason_labels() {
        assert_eq!(DeadReason::ChallengeTimeout.as_str(), "challenge_timeout");
        assert_eq!(
            DeadReason::NoContentNoChallenge.as_str(),
            "no_content_no_challenge"
        );
        assert_eq!(PageReadiness::Ready.dead_reason(), None);
        assert_eq!(
            PageReadiness::BlockedByChallenge.dead_reason(),
            Some(DeadReason::ChallengeTimeout)
        );
    }
}
