use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Upper bound on a single navigation, load waiting included
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Returns '' rather than failing on pages without a body
const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

/// A4 paper size in inches for CDP Page.printToPDF
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.7;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch browser: {reason}")]
    Launch { reason: String },
    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("text extraction failed: {reason}")]
    Extraction { reason: String },
    #[error("pdf rendering failed: {reason}")]
    Pdf { reason: String },
}

/// Visible state of a rendered page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub text: String,
    pub title: Option<String>,
}

/// Trait for headless page rendering (to allow mocking)
///
/// Implementations hold one page context: `fetch` replaces whatever the page
/// currently shows, and `pdf_snapshot` captures that state, so it must be
/// called before the next `fetch`.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RenderedPage, RenderError>;
    async fn pdf_snapshot(&self) -> Result<Vec<u8>, RenderError>;
}

/// Chromium-backed renderer: one browser process and one page, reused for
/// every document in the run.
pub struct ChromeRenderer {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromeRenderer {
    pub async fn launch() -> Result<Self, RenderError> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(|reason| RenderError::Launch { reason })?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch {
                reason: e.to_string(),
            })?;

        // Drive the CDP event loop for the lifetime of the browser
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Launch {
                reason: e.to_string(),
            })?;

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Close the page and browser, releasing the child process.
    ///
    /// Failures here are logged rather than propagated: the run is over and
    /// the process is about to exit either way.
    pub async fn close(mut self) {
        if let Err(e) = self.page.close().await {
            tracing::warn!(error = %e, "Failed to close page");
        }
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "Failed to close browser");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

#[async_trait]
impl DocumentRenderer for ChromeRenderer {
    async fn fetch(&self, url: &str) -> Result<RenderedPage, RenderError> {
        let navigation = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(NAVIGATION_TIMEOUT, navigation).await {
            Err(_) => {
                return Err(RenderError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_secs: NAVIGATION_TIMEOUT.as_secs(),
                })
            }
            Ok(Err(e)) => {
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Ok(Ok(())) => {}
        }

        let text: String = self
            .page
            .evaluate(BODY_TEXT_JS)
            .await
            .map_err(|e| RenderError::Extraction {
                reason: e.to_string(),
            })?
            .into_value()
            .map_err(|e| RenderError::Extraction {
                reason: e.to_string(),
            })?;

        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| RenderError::Extraction {
                reason: e.to_string(),
            })?;

        Ok(RenderedPage { text, title })
    }

    async fn pdf_snapshot(&self) -> Result<Vec<u8>, RenderError> {
        let params = PrintToPdfParams {
            print_background: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            ..Default::default()
        };

        self.page
            .pdf(params)
            .await
            .map_err(|e| RenderError::Pdf {
                reason: e.to_string(),
            })
    }
}
