use async_trait::async_trait;

use crate::error::Result;

/// One running browser process with a single page.
#[async_trait]
pub trait BrowserSession: Send {
    /// Resolves once the page has reached DOMContentLoaded.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn content(&mut self) -> Result<String>;

    /// Tears the browser process down. Must be called on every exit path.
    async fn close(self: Box<Self>) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}
