//! Headed Chrome session driven over the DevTools protocol.
//! One session per run: the theater page and the rating tab both live in it.

use crate::{BrowserPage, Error, Result};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A launched browser plus the task pumping its protocol events.
///
/// Call [`BrowserSession::close`] when done. If the session is dropped
/// instead (an early `?` return), the event task is aborted and the browser
/// process is killed with it.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a maximized, non-headless browser. `executable` overrides the
    /// auto-detected Chrome/Chromium binary.
    pub async fn launch(executable: Option<&Path>) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .with_head()
            .viewport(None)
            .arg("--start-maximized");
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(Error::BrowserConfig)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler error: {e}");
                }
            }
        });

        info!(executable = ?executable, "browser launched");
        Ok(Self { browser, handler })
    }

    /// Open `url` in a new tab.
    pub async fn open_tab(&self, url: &str) -> Result<ChromeTab> {
        let page = self.browser.new_page(url).await?;
        Ok(ChromeTab { page })
    }

    /// Close the browser and wait for its process to exit.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            warn!("browser did not exit cleanly: {e}");
        }
        info!("browser closed");
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Map a failed element query: a node that is not there becomes
/// `ElementNotFound`, anything else (timeouts, a dead connection) stays a
/// browser error.
pub(crate) fn lookup_error(selector: &str, err: CdpError) -> Error {
    debug!("query for '{selector}' failed: {err}");
    match err {
        CdpError::NotFound => Error::not_found(selector),
        CdpError::Chrome(ref e) if e.message.contains("Could not find node") => {
            Error::not_found(selector)
        }
        other => Error::Browser(other),
    }
}

/// A single tab of a [`BrowserSession`].
pub struct ChromeTab {
    page: Page,
}

impl ChromeTab {
    async fn element(&self, selector: &str) -> Result<chromiumoxide::Element> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| lookup_error(selector, e))
    }
}

#[async_trait::async_trait]
impl BrowserPage for ChromeTab {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let input = self.element(selector).await?;
        input.click().await?;
        input.type_str(text).await?;
        Ok(())
    }

    async fn submit(&self, selector: &str) -> Result<()> {
        self.element(selector).await?.click().await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| lookup_error(selector, e))?;

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element.inner_text().await?.unwrap_or_default();
            texts.push(text.trim().to_string());
        }
        Ok(texts)
    }

    async fn activate(&self, selector: &str, index: usize) -> Result<()> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| lookup_error(selector, e))?;
        let target = elements
            .into_iter()
            .nth(index)
            .ok_or_else(|| Error::not_found(selector))?;

        // A plain click can land on an overlay; click from script instead.
        target
            .call_js_fn("function() { this.click(); }", false)
            .await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }
}
