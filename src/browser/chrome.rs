use crate::browser::cdp::CdpClient;
use crate::browser::page::CdpPage;
use crate::browser::Browser;
use crate::config::schema::{RunConfig, Viewport};
use crate::error::{Result, SignupError};
use crate::process::{allocate_cdp_port, build_command};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::time::Duration;

const MAX_RETRIES: u32 = 30;
const RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Entry of Chrome's `/json/list` and `/json/new` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub ws_url: Option<String>,
}

/// A Chrome process launched for one run, with a throwaway profile.
pub struct ChromeSession {
    child: Option<Child>,
    cdp_port: u16,
    user_data_dir: PathBuf,
    http: reqwest::Client,
    viewport: Viewport,
    action_timeout: Duration,
    command_timeout: Duration,
}

impl ChromeSession {
    /// Spawn Chrome with remote debugging enabled.
    pub async fn launch(chrome_path: &Path, config: &RunConfig) -> Result<Self> {
        let user_data_dir =
            std::env::temp_dir().join(format!("signup-flow-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&user_data_dir)?;

        let cdp_port = allocate_cdp_port()?;
        let child = build_command(chrome_path, &config.browser, cdp_port, &user_data_dir)
            .spawn()
            .map_err(|e| SignupError::Launch(format!("Failed to launch Chrome: {}", e)))?;

        tracing::info!(
            "Launched Chrome pid={} cdp_port={} headless={}",
            child.id(),
            cdp_port,
            config.browser.headless
        );

        Ok(Self {
            child: Some(child),
            cdp_port,
            user_data_dir,
            http: reqwest::Client::new(),
            viewport: config.browser.viewport,
            action_timeout: config.timing.action_timeout(),
            command_timeout: config.timing.command_timeout(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.cdp_port, path)
    }

    /// Attach to the tab Chrome opened at startup, waiting for the
    /// debugging endpoint to come up.
    pub async fn primary_page(&self) -> Result<CdpPage> {
        let mut last_error = String::new();

        for retry in 1..=MAX_RETRIES {
            tokio::time::sleep(RETRY_INTERVAL).await;

            match self.list_targets().await {
                Ok(targets) => {
                    if let Some(target) = targets.iter().find(|t| t.target_type == "page") {
                        return self.attach(target).await;
                    }
                    last_error = "No page target found".to_string();
                }
                Err(e) => last_error = e.to_string(),
            }

            tracing::debug!("Retry {}/{}: {}", retry, MAX_RETRIES, last_error);
        }

        Err(SignupError::Launch(format!(
            "Failed to connect to Chrome after {} retries: {}",
            MAX_RETRIES, last_error
        )))
    }

    async fn list_targets(&self) -> Result<Vec<TargetInfo>> {
        let targets = self
            .http
            .get(self.endpoint("/json/list"))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<TargetInfo>>()
            .await?;
        Ok(targets)
    }

    async fn attach(&self, target: &TargetInfo) -> Result<CdpPage> {
        let ws_url = target.ws_url.as_deref().ok_or_else(|| {
            SignupError::Cdp(format!("No webSocketDebuggerUrl for target {}", target.id))
        })?;

        tracing::info!("Connecting to page target {} ({})", target.id, target.url);
        let client = CdpClient::connect(ws_url, self.command_timeout).await?;
        CdpPage::attach(
            client,
            target.id.clone(),
            self.endpoint(&format!("/json/close/{}", target.id)),
            self.http.clone(),
            self.viewport,
            self.action_timeout,
        )
        .await
    }

    /// Kill Chrome and remove its profile directory.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::info!("Chrome on cdp_port={} stopped", self.cdp_port);
        }
        let _ = std::fs::remove_dir_all(&self.user_data_dir);
    }
}

impl Browser for ChromeSession {
    type Page = CdpPage;

    async fn new_page(&self) -> Result<CdpPage> {
        // Chrome only accepts PUT on /json/new
        let target = self
            .http
            .put(self.endpoint("/json/new?about:blank"))
            .send()
            .await?
            .error_for_status()?
            .json::<TargetInfo>()
            .await?;
        self.attach(&target).await
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
