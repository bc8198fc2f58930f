use std::path::Path;
use std::time::Duration;

use fantoccini::{Client, ClientBuilder, Locator};
use thiserror::Error;

/// Errors surfaced by the browser capability.
///
/// A wait that elapses without the selector appearing is its own variant
/// so callers can treat it as an outcome rather than a failure.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("timed out waiting for `{0}`")]
    WaitTimeout(String),

    #[error("navigation to {0} timed out")]
    NavigationTimeout(String),

    #[error("webdriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    #[error("could not reach a webdriver server: {0}")]
    Connect(#[from] fantoccini::error::NewSessionError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// True for the wait-timeout outcome of `wait_for_selector`.
    pub fn is_wait_timeout(&self) -> bool {
        matches!(self, DriverError::WaitTimeout(_))
    }
}

/// The rendering-engine surface consumed by the probing and scraping code.
///
/// Every operation is fallible and may suspend until the engine completes
/// it or the given timeout elapses; nothing here assumes instantaneous
/// completion.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Navigate the page handle to `url`, bounded by `timeout`.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Wait until at least one element matches `selector`.
    ///
    /// Returns `Err(DriverError::WaitTimeout)` when the timeout elapses
    /// with no match.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), DriverError>;

    /// Current rendered page source.
    async fn source(&mut self) -> Result<String, DriverError>;

    /// Write a PNG snapshot of the current page to `path`.
    async fn screenshot(&mut self, path: &Path) -> Result<(), DriverError>;
}

/// Production driver backed by a WebDriver session.
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    /// Connect to the WebDriver server at `webdriver_url`.
    ///
    /// If that fails, a short list of common alternative ports is tried
    /// before giving up. Failure here is fatal for the run.
    pub async fn connect(webdriver_url: &str) -> Result<Self, DriverError> {
        let mut last_err = match ClientBuilder::native().connect(webdriver_url).await {
            Ok(client) => {
                ::log::debug!("connected to WebDriver at {}", webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => {
                ::log::warn!("failed to connect to WebDriver at {}: {}", webdriver_url, e);
                e
            }
        };

        let fallback_urls = [
            "http://localhost:4444",
            "http://localhost:9515", // ChromeDriver default
            "http://127.0.0.1:4444", // Try with IP instead of localhost
        ];

        for url in fallback_urls.iter() {
            if *url == webdriver_url {
                continue;
            }
            ::log::info!("trying fallback WebDriver URL: {}", url);
            match ClientBuilder::native().connect(url).await {
                Ok(client) => {
                    ::log::debug!("connected to fallback WebDriver at {}", url);
                    return Ok(Self { client });
                }
                Err(e) => last_err = e,
            }
        }

        ::log::error!("failed to connect to any WebDriver server");
        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(DriverError::Connect(last_err))
    }

    /// Close the WebDriver session.
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("failed to close WebDriver session: {}", e);
        }
    }
}

impl PageDriver for WebDriverPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), DriverError> {
        match tokio::time::timeout(timeout, self.client.goto(url)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(DriverError::NavigationTimeout(url.to_string())),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(()),
            Err(fantoccini::error::CmdError::WaitTimeout) => {
                Err(DriverError::WaitTimeout(selector.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn source(&mut self) -> Result<String, DriverError> {
        Ok(self.client.source().await?)
    }

    async fn screenshot(&mut self, path: &Path) -> Result<(), DriverError> {
        let png = self.client.screenshot().await?;
        std::fs::write(path, png)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::{DriverError, PageDriver};
    use std::collections::{HashMap, VecDeque};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    /// Scripted behavior for one URL.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct PageScript {
        /// When set, `goto` fails for this URL.
        pub goto_fails: bool,
        /// Outcome of successive `wait_for_selector` calls;
        /// `true` means the selector appeared before the timeout.
        pub waits: VecDeque<bool>,
        /// Page source served after navigation.
        pub html: String,
    }

    impl PageScript {
        pub fn ready(html: &str) -> Self {
            Self {
                goto_fails: false,
                waits: VecDeque::from([true]),
                html: html.to_string(),
            }
        }

        pub fn stalled(html: &str, waits: &[bool]) -> Self {
            Self {
                goto_fails: false,
                waits: waits.iter().copied().collect(),
                html: html.to_string(),
            }
        }

        pub fn unreachable() -> Self {
            Self {
                goto_fails: true,
                ..Default::default()
            }
        }
    }

    /// In-memory `PageDriver` that replays scripts and records every call.
    #[derive(Debug, Default)]
    pub(crate) struct FakePage {
        scripts: HashMap<String, PageScript>,
        current: Option<PageScript>,
        pub goto_calls: Vec<String>,
        pub wait_calls: Vec<(String, Duration)>,
        pub screenshots: Vec<PathBuf>,
    }

    impl FakePage {
        /// Driver already sitting on a page, for probe-level tests.
        pub fn on_page(script: PageScript) -> Self {
            Self {
                current: Some(script),
                ..Default::default()
            }
        }

        /// Driver that serves one script per URL, for orchestrator tests.
        pub fn with_scripts(scripts: HashMap<String, PageScript>) -> Self {
            Self {
                scripts,
                ..Default::default()
            }
        }
    }

    impl PageDriver for FakePage {
        async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), DriverError> {
            self.goto_calls.push(url.to_string());
            let script = self.scripts.get(url).cloned().unwrap_or_default();
            if script.goto_fails {
                self.current = None;
                return Err(DriverError::NavigationTimeout(url.to_string()));
            }
            self.current = Some(script);
            Ok(())
        }

        async fn wait_for_selector(
            &mut self,
            selector: &str,
            timeout: Duration,
        ) -> Result<(), DriverError> {
            self.wait_calls.push((selector.to_string(), timeout));
            let found = self
                .current
                .as_mut()
                .and_then(|s| s.waits.pop_front())
                .unwrap_or(false);
            if found {
                Ok(())
            } else {
                Err(DriverError::WaitTimeout(selector.to_string()))
            }
        }

        async fn source(&mut self) -> Result<String, DriverError> {
            Ok(self
                .current
                .as_ref()
                .map(|s| s.html.clone())
                .unwrap_or_default())
        }

        async fn screenshot(&mut self, path: &Path) -> Result<(), DriverError> {
            self.screenshots.push(path.to_path_buf());
            Ok(())
        }
    }
}
