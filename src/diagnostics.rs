use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::browser::PageDriver;

/// Writes best-effort page snapshots for later inspection.
///
/// Every failure in here is logged and swallowed: a diagnostic must never
/// abort the run it is diagnosing.
pub struct Capturer {
    dir: PathBuf,
}

impl Capturer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Snapshot the current page as `{label}_{unix_ts}.png` in the
    /// diagnostics directory. The timestamp suffix keeps repeated
    /// captures for the same label from overwriting each other.
    pub async fn capture<D: PageDriver>(&self, page: &mut D, label: &str) -> Option<PathBuf> {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            ::log::warn!(
                "could not create snapshot directory {}: {}",
                self.dir.display(),
                e
            );
            return None;
        }

        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = self.dir.join(format!("{label}_{ts}.png"));

        match page.screenshot(&path).await {
            Ok(()) => {
                ::log::info!("snapshot saved: {}", path.display());
                Some(path)
            }
            Err(e) => {
                ::log::warn!("snapshot for `{}` failed: {}", label, e);
                None
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
