//! Browser attach-or-launch and tab discovery.
//!
//! shipclip works against the user's own browser so host-site logins
//! carry over. When nothing is listening on the debugging port and
//! launching is allowed, a browser is started with a persistent profile
//! directory.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use shipclip_cdp::{CdpClient, PageInfo, TabSession, fetch_version};

use crate::config::BrowserConfig;
use crate::error::CopyError;

/// Connects to the browser and attaches sessions to host-site tabs.
pub struct Browser {
    client: CdpClient,
}

impl Browser {
    /// Connect to the configured endpoint, launching a browser first if
    /// none is listening and launching is enabled.
    pub async fn connect(config: BrowserConfig) -> Result<Self, CopyError> {
        let endpoint = config.endpoint();

        if fetch_version(&endpoint).await.is_err() {
            if !config.launch {
                return Err(CopyError::ActionUnavailable(format!(
                    "no browser at {} and launching is disabled",
                    endpoint
                )));
            }
            Self::launch(&config).await?;
            Self::await_endpoint(&endpoint).await?;
        }

        let client = CdpClient::connect(&endpoint).await?;
        Ok(Self { client })
    }

    /// The underlying CDP client.
    pub fn client(&self) -> &CdpClient {
        &self.client
    }

    /// List debuggable pages.
    pub async fn pages(&self) -> Result<Vec<PageInfo>, CopyError> {
        Ok(self.client.list_pages().await?)
    }

    /// Attach to the first open page whose URL contains `fragment`.
    pub async fn attach_matching(&self, fragment: &str) -> Result<TabSession, CopyError> {
        let pages = self.client.list_pages().await?;
        let page = find_page(&pages, fragment).ok_or_else(|| {
            CopyError::ActionUnavailable(format!("no open tab with URL containing {:?}", fragment))
        })?;

        info!("attaching to {:?} ({})", page.title, page.url);
        Ok(self.client.attach(&page.id).await?)
    }

    /// Find a Chromium-family executable.
    fn find_browser() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            let paths = [
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
            ];
            for path in &paths {
                let p = PathBuf::from(path);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        #[cfg(target_os = "linux")]
        {
            let paths = [
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/snap/bin/chromium",
            ];
            for path in &paths {
                let p = PathBuf::from(path);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        #[cfg(target_os = "windows")]
        {
            let paths = [
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            ];
            for path in &paths {
                let p = PathBuf::from(path);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        None
    }

    /// Launch a browser with remote debugging enabled.
    async fn launch(config: &BrowserConfig) -> Result<(), CopyError> {
        let browser_path = Self::find_browser().ok_or_else(|| {
            CopyError::ActionUnavailable("no Chrome/Chromium executable found".to_string())
        })?;
        let profile_dir = config.get_profile_dir();

        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("failed to create profile directory: {}", e);
        }

        info!(
            "launching {} with profile at {}",
            browser_path.display(),
            profile_dir.display()
        );

        let child = Command::new(&browser_path)
            .arg(format!("--remote-debugging-port={}", config.debug_port))
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CopyError::ActionUnavailable(format!("failed to launch browser: {}", e)))?;

        debug!("browser launched with PID {:?}", child.id());
        Ok(())
    }

    /// Poll the endpoint until the freshly launched browser answers.
    async fn await_endpoint(endpoint: &str) -> Result<(), CopyError> {
        for _ in 0..40 {
            if fetch_version(endpoint).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        }

        Err(CopyError::ActionUnavailable(format!(
            "browser did not come up on {}",
            endpoint
        )))
    }
}

/// Pick the first real page whose URL contains `fragment`.
fn find_page<'a>(pages: &'a [PageInfo], fragment: &str) -> Option<&'a PageInfo> {
    pages
        .iter()
        .find(|p| p.page_type == "page" && p.url.contains(fragment))
}
