use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::browser::session::{BrowserLauncher, BrowserSession};
use crate::config::RenderConfig;
use crate::error::{Result, ScrapingError};

/// Anything that can hand back the rendered HTML of a url.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// Renders one page per call in a freshly launched browser.
///
/// The browser is closed before `fetch_html` returns, whether navigation
/// succeeded, failed or timed out.
pub struct PageRenderer {
    launcher: Arc<dyn BrowserLauncher>,
    navigation_timeout: Duration,
    settle_delay: Duration,
    permits: Option<Arc<Semaphore>>,
}

impl PageRenderer {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, settings: &RenderConfig) -> Self {
        Self {
            launcher,
            navigation_timeout: settings.navigation_timeout,
            settle_delay: settings.settle_delay,
            permits: settings.max_concurrent.map(|max| Arc::new(Semaphore::new(max))),
        }
    }

    async fn load(&self, session: &mut dyn BrowserSession, url: &str) -> Result<String> {
        match tokio::time::timeout(self.navigation_timeout, session.navigate(url)).await {
            Ok(navigation) => navigation?,
            Err(_) => {
                return Err(ScrapingError::NavigationTimeout {
                    url: url.to_string(),
                    timeout: self.navigation_timeout,
                })
            }
        }

        debug!("DOM content loaded for {}, settling for {:?}", url, self.settle_delay);
        tokio::time::sleep(self.settle_delay).await;

        session.content().await
    }
}

#[async_trait]
impl PageSource for PageRenderer {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let _permit = match &self.permits {
            Some(permits) => Some(
                permits
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| ScrapingError::BrowserError(format!("Browser limiter closed: {}", e)))?,
            ),
            None => None,
        };

        let mut session = self.launcher.launch().await?;
        let outcome = self.load(session.as_mut(), url).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser cleanly after rendering {}: {}", url, e);
        }

        match &outcome {
            Ok(html) => info!("Rendered {} ({} bytes)", url, html.len()),
            Err(e) => warn!("Rendering {} failed: {}", url, e),
        }
        outcome
    }
}
