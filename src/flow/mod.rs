//! The signup run: four wizard steps, the OTP detour and the final submit,
//! executed strictly in order against one primary tab.

pub mod fixtures;
mod steps;

use crate::artifacts::{Checkpoint, ScreenshotStore};
use crate::assets::AssetFetcher;
use crate::browser::Browser;
use crate::config::schema::RunConfig;
use crate::error::Result;
use crate::identity::Identity;
use crate::otp::Otp;
use crate::outcome::Verdict;

/// What a finished run observed.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub identity: Identity,
    pub otp: Otp,
    /// Service checkbox that could be toggled, if any
    pub service: Option<String>,
    /// Institution type that could be picked, if any
    pub institution: Option<String>,
    /// File names attached on the verification step
    pub uploads: Vec<String>,
    pub final_url: String,
    pub verdict: Verdict,
}

pub struct SignupFlow<'a, B: Browser> {
    browser: &'a B,
    page: &'a B::Page,
    config: &'a RunConfig,
    screenshots: ScreenshotStore,
    assets: AssetFetcher,
}

impl<'a, B: Browser> SignupFlow<'a, B> {
    pub fn new(browser: &'a B, page: &'a B::Page, config: &'a RunConfig) -> Self {
        Self {
            browser,
            page,
            config,
            screenshots: ScreenshotStore::new(config.screenshot_dir.clone()),
            assets: AssetFetcher::new(),
        }
    }

    /// Run with a freshly generated identity.
    pub async fn run(&self) -> Result<RunReport> {
        let identity = Identity::generate(&self.config.email_domain, &self.config.password);
        self.run_with(identity).await
    }

    /// Run the whole procedure. Any unhandled failure captures
    /// `error-state.png` (best-effort) and is returned unchanged.
    pub async fn run_with(&self, identity: Identity) -> Result<RunReport> {
        tracing::info!("Email: {}", identity.email);
        tracing::info!("Phone: {}", identity.phone);
        tracing::info!("Business Reg: {}", identity.business_reg_number);

        match self.run_steps(identity).await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!("Test failed: {}", e);
                if let Err(shot) = self
                    .screenshots
                    .capture(self.page, Checkpoint::ErrorState)
                    .await
                {
                    tracing::warn!("Could not capture error screenshot: {}", shot);
                }
                Err(e)
            }
        }
    }

    async fn run_steps(&self, identity: Identity) -> Result<RunReport> {
        self.fill_setup(&identity).await?;
        let otp = self.verify_email(&identity).await?;
        self.fill_details(&identity).await?;
        let service = self.fill_experience().await?;
        let (institution, uploads) = self.fill_verification(&identity).await?;
        let (final_url, verdict) = self.submit().await?;

        tracing::info!("SIGNUP FLOW COMPLETED");
        tracing::info!("Email: {}", identity.email);
        tracing::info!("Password: {}", identity.password);

        Ok(RunReport {
            identity,
            otp,
            service: service.map(str::to_string),
            institution: institution.map(str::to_string),
            uploads,
            final_url,
            verdict,
        })
    }
}
