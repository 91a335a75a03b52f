use anyhow::{anyhow, Context};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::{ScraperConfig, SiteConfig};
use crate::extractor::ProductExtractor;
use crate::models::Product;
use crate::utils::error::{AppError, Result};

/// Source of the rendered product container markup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Inner HTML of the content container once the page is ready.
    async fn fetch(&self, cancel: &CancellationToken) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub ready_selector: String,
    pub content_selector: String,
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(site: &SiteConfig, config: &ScraperConfig) -> Self {
        Self {
            url: site.url.clone(),
            ready_selector: site.ready_selector.clone(),
            content_selector: site.content_selector.clone(),
            timeout: Duration::from_secs(config.request_timeout),
        }
    }
}

/// Renders the page in headless Chrome. A fresh browser is launched per fetch
/// and torn down when the fetch ends, so a wedged session never outlives a
/// cycle.
pub struct BrowserFetcher {
    request: FetchRequest,
    config: ScraperConfig,
}

impl BrowserFetcher {
    pub fn new(site: &SiteConfig, config: ScraperConfig) -> Self {
        Self {
            request: FetchRequest::new(site, &config),
            config,
        }
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    fn launch_options(config: &ScraperConfig, timeout: Duration) -> anyhow::Result<LaunchOptions<'static>> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .idle_browser_timeout(timeout)
            .args(vec![
                std::ffi::OsStr::new("--no-sandbox"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--disable-gpu"),
                std::ffi::OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| anyhow!("Failed to create launch options: {}", e))?;

        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        Ok(launch_options)
    }

    /// Script returning the joined inner HTML of every content match, or null
    /// when nothing matches.
    fn content_script(selector: &str) -> String {
        let quoted = serde_json::Value::String(selector.to_string()).to_string();
        format!(
            r#"(() => {{
                const nodes = Array.from(document.querySelectorAll({quoted}));
                if (nodes.length === 0) {{ return null; }}
                return nodes.map((node) => node.innerHTML).join("\n");
            }})()"#
        )
    }

    /// Blocking render. `abort` is checked between steps so an abandoned
    /// render tears the browser down after at most one more step.
    fn render(request: &FetchRequest, config: &ScraperConfig, abort: &AtomicBool) -> anyhow::Result<String> {
        let checkpoint = |step: &str| -> anyhow::Result<()> {
            if abort.load(Ordering::Relaxed) {
                return Err(anyhow!("Render aborted before {}", step));
            }
            Ok(())
        };

        checkpoint("launch")?;
        let browser = Browser::new(Self::launch_options(config, request.timeout)?)
            .map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

        checkpoint("navigation")?;
        let tab = browser
            .new_tab()
            .map_err(|e| anyhow!("Failed to create tab: {}", e))?;
        tab.set_default_timeout(request.timeout);

        if let Some(user_agent) = &config.user_agent {
            tab.set_user_agent(user_agent, None, None)
                .map_err(|e| anyhow!("Failed to set user agent: {}", e))?;
        }

        tab.navigate_to(&request.url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| anyhow!("Navigation to {} failed: {}", request.url, e))?;

        checkpoint("ready wait")?;
        tab.wait_for_element_with_custom_timeout(&request.ready_selector, request.timeout)
            .map_err(|e| anyhow!("Wait for selector '{}' failed: {}", request.ready_selector, e))?;

        checkpoint("content read")?;
        let result = tab
            .evaluate(&Self::content_script(&request.content_selector), false)
            .map_err(|e| anyhow!("Reading '{}' failed: {}", request.content_selector, e))?;

        let html = result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .with_context(|| format!("Content selector '{}' matched no elements", request.content_selector))?;

        if let Err(e) = tab.close(true) {
            tracing::debug!("Closing tab failed, browser drop will clean up: {}", e);
        }
        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, cancel: &CancellationToken) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(AppError::Fetch("cancelled before navigation".to_string()));
        }

        let request = self.request.clone();
        let config = self.config.clone();
        let timeout = request.timeout;
        let start_time = std::time::Instant::now();

        tracing::debug!("Rendering {} (timeout {}s)", request.url, timeout.as_secs());
        let abort = Arc::new(AtomicBool::new(false));
        let render_abort = Arc::clone(&abort);
        let task = tokio::task::spawn_blocking(move || Self::render(&request, &config, &render_abort));

        let html = tokio::select! {
            joined = tokio::time::timeout(timeout, task) => match joined {
                Err(_) => {
                    abort.store(true, Ordering::Relaxed);
                    return Err(AppError::Fetch(format!(
                        "page did not render within {}s", timeout.as_secs()
                    )));
                }
                Ok(Err(join_err)) => return Err(AppError::Fetch(format!("browser task failed: {}", join_err))),
                Ok(Ok(Err(e))) => return Err(AppError::Fetch(format!("{:#}", e))),
                Ok(Ok(Ok(html))) => html,
            },
            _ = cancel.cancelled() => {
                abort.store(true, Ordering::Relaxed);
                tracing::warn!("Fetch of {} cancelled", self.request.url);
                return Err(AppError::Fetch("fetch cancelled".to_string()));
            }
        };

        tracing::debug!(
            "Rendered {} in {}ms ({} bytes)",
            self.request.url,
            start_time.elapsed().as_millis(),
            html.len()
        );
        Ok(html)
    }
}

/// Fetch and extract in one step; either failure aborts the caller's cycle.
pub async fn fetch_products(
    fetcher: &dyn PageFetcher,
    extractor: &ProductExtractor,
    cancel: &CancellationToken,
) -> Result<Vec<Product>> {
    let html = fetcher.fetch(cancel).await?;
    extractor.extract(&html)
}
