use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::browser::session::{BrowserLauncher, BrowserSession};
use crate::browser::stealth::UserAgentGenerator;
use crate::config::RenderConfig;
use crate::error::{Result, ScrapingError};

pub type BrowserSessionId = Uuid;

const PROCESS_EXIT_TIMEOUT: Duration = Duration::from_secs(5);

const CHROME_ARGS: &[&str] = &[
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--mute-audio",
    "--no-first-run",
    "--disable-default-apps",
    "--disable-sync",
    "--disable-background-networking",
    "--disable-blink-features=AutomationControlled", // hide automation
];

/// Launches a dedicated headless Chromium process per session.
pub struct ChromiumLauncher {
    chrome_executable: Option<PathBuf>,
    user_agents: Option<UserAgentGenerator>,
}

impl ChromiumLauncher {
    pub fn new(settings: &RenderConfig) -> Self {
        Self {
            chrome_executable: settings.chrome_executable.clone(),
            user_agents: settings.randomize_user_agent.then(UserAgentGenerator::new),
        }
    }

    fn browser_config(&self, user_data_dir: &Path) -> Result<BrowserConfig> {
        // unique profile dir so concurrent sessions don't fight over the singleton lock
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(user_data_dir)
            .args(CHROME_ARGS.iter().copied());

        if let Some(ref path) = self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to create browser config: {}", e)))
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let session_id = Uuid::new_v4();
        let user_data_dir = profile_dir(session_id)?;
        let config = self.browser_config(user_data_dir.path())?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
            debug!("Browser handler task ended");
        });

        let mut session = ChromiumSession {
            id: session_id,
            browser,
            page: None,
            handler_task,
            user_data_dir,
        };

        let user_agent = self
            .user_agents
            .as_ref()
            .map(|generator| (generator.random_user_agent(), generator.accept_language()));

        if let Err(e) = session.open_page(user_agent).await {
            if let Err(close_err) = Box::new(session).close().await {
                warn!("Failed to close browser session after page setup error: {}", close_err);
            }
            return Err(e);
        }

        info!("Launched browser session {}", session_id);
        Ok(Box::new(session))
    }
}

pub struct ChromiumSession {
    id: BrowserSessionId,
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    // removed when the session drops, including on cancellation
    user_data_dir: TempDir,
}

/// Fresh profile directory for one session, deleted when dropped.
fn profile_dir(session_id: BrowserSessionId) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(&format!("product-scraper-{}-", session_id))
        .tempdir()
        .map_err(|e| ScrapingError::BrowserError(format!("Failed to create profile dir: {}", e)))
}

impl ChromiumSession {
    async fn open_page(&mut self, user_agent: Option<(&str, &str)>) -> Result<()> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to create new page: {}", e)))?;

        if let Some((user_agent, accept_language)) = user_agent {
            let params = SetUserAgentOverrideParams::builder()
                .user_agent(user_agent)
                .accept_language(accept_language)
                .build()
                .map_err(|e| ScrapingError::BrowserError(format!("Failed to build user agent params: {}", e)))?;

            page.execute(params)
                .await
                .map_err(|e| ScrapingError::BrowserError(format!("Failed to set user agent: {}", e)))?;
        }

        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapingError::BrowserError(format!("Browser session {} has no open page", self.id)))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let page = self.page()?;

        // subscribe before navigating so the event can't be missed
        let mut dom_ready = page.event_listener::<EventDomContentEventFired>().await?;

        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| ScrapingError::BrowserError(format!("Invalid navigation request: {}", e)))?;

        let response = page
            .execute(params)
            .await
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to navigate to {}: {}", url, e)))?;

        if let Some(error_text) = response.result.error_text.as_deref() {
            return Err(ScrapingError::BrowserError(format!("Failed to navigate to {}: {}", url, error_text)));
        }

        dom_ready
            .next()
            .await
            .ok_or_else(|| ScrapingError::BrowserError(format!("Browser closed before {} finished loading", url)))?;

        debug!("Session {} reached DOMContentLoaded for {}", self.id, url);
        Ok(())
    }

    async fn content(&mut self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to get page content: {}", e)))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut session = *self;

        if let Some(page) = session.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page of session {}: {}", session.id, e);
            }
        }

        let closed = session.browser.close().await;

        match tokio::time::timeout(PROCESS_EXIT_TIMEOUT, session.browser.wait()).await {
            Ok(Ok(_)) => debug!("Browser process of session {} exited", session.id),
            Ok(Err(e)) => warn!("Failed to wait for browser process of session {}: {}", session.id, e),
            Err(_) => warn!("Browser process of session {} still running, killing on drop", session.id),
        }

        session.handler_task.abort();

        info!("Closed browser session {}", session.id);
        closed
            .map(|_| ())
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to close browser: {}", e)))
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // chromiumoxide kills a still-running child when `Browser` drops
        self.handler_task.abort();
    }
}
