use super::fixtures::*;
use super::SignupFlow;
use crate::artifacts::Checkpoint;
use crate::browser::{Browser, Page, SelectBy};
use crate::error::{Result, SignupError};
use crate::identity::{AssetKind, Identity};
use crate::otp::{Otp, OtpRetriever};
use crate::outcome::{check_outcome, Verdict};
use tokio::time::sleep;

impl<B: Browser> SignupFlow<'_, B> {
    async fn open_step(&self, step: &str) -> Result<()> {
        self.page.goto(&self.config.step_url(step)).await?;
        self.page.wait_for_load().await
    }

    async fn next(&self) -> Result<()> {
        self.page
            .click_button(&[NEXT_LABEL], self.config.timing.action_timeout())
            .await?;
        sleep(self.config.timing.step_settle()).await;
        Ok(())
    }

    /// Country picker: label, then value, then a fixed position. Only the
    /// last attempt's failure is reported.
    async fn choose_country(&self) -> Result<()> {
        let attempts = [
            SelectBy::Label(COUNTRY_LABEL),
            SelectBy::Value(COUNTRY_VALUE),
            SelectBy::Index(COUNTRY_FALLBACK_INDEX),
        ];

        let mut last_error = None;
        for by in attempts {
            match self.page.select_nth(SELECT, 0, by).await {
                Ok(()) => {
                    tracing::info!("Selected country by {}", by);
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!("Country by {} not available: {}", by, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| SignupError::ElementNotFound("country option".to_string())))
    }

    /// Click the first candidate whose text can be found. None of them
    /// being present is not an error.
    async fn choose_by_text(
        &self,
        candidates: &[&'static str],
        what: &str,
    ) -> Option<&'static str> {
        let timeout = self.config.timing.choice_timeout();
        for &candidate in candidates {
            if self.page.click_text(candidate, timeout).await.is_ok() {
                tracing::info!("Selected {}: {}", what, candidate);
                return Some(candidate);
            }
        }
        tracing::warn!("No {} selected", what);
        None
    }

    pub(super) async fn fill_setup(&self, identity: &Identity) -> Result<()> {
        tracing::info!("STEP 1: Setup Account");
        self.open_step(SETUP_STEP).await?;

        let values = [
            FIRST_NAME,
            LAST_NAME,
            identity.email.as_str(),
            identity.phone.as_str(),
            identity.password.as_str(),
            identity.password.as_str(),
        ];
        for (index, value) in values.iter().enumerate() {
            self.page.fill_nth(INPUT, index, value).await?;
        }

        self.screenshots
            .capture(self.page, Checkpoint::SetupFilled)
            .await?;
        self.page
            .click_button(&[NEXT_LABEL], self.config.timing.action_timeout())
            .await
    }

    pub(super) async fn verify_email(&self, identity: &Identity) -> Result<Otp> {
        tracing::info!("Handling OTP...");
        sleep(self.config.timing.step_settle()).await;

        let retriever = OtpRetriever::new(self.config);
        let otp = retriever.retrieve(self.browser, identity.local_part()).await;
        retriever.submit(self.page, &otp).await?;

        sleep(self.config.timing.step_settle()).await;
        Ok(otp)
    }

    pub(super) async fn fill_details(&self, identity: &Identity) -> Result<()> {
        tracing::info!("STEP 2: Agency Details");
        self.open_step(DETAILS_STEP).await?;
        sleep(self.config.timing.step_settle()).await;

        let selects = self.page.count(SELECT).await?;

        let handle = identity.agency_handle();
        let values = [AGENCY_NAME, ROLE, handle.as_str(), WEBSITE, ADDRESS];
        for (index, value) in values.iter().enumerate() {
            self.page.fill_nth(INPUT, index, value).await?;
        }

        if selects > 0 {
            self.choose_country().await?;
        }

        self.screenshots
            .capture(self.page, Checkpoint::DetailsFilled)
            .await?;
        self.next().await
    }

    pub(super) async fn fill_experience(&self) -> Result<Option<&'static str>> {
        tracing::info!("STEP 3: Professional Experience");
        self.open_step(EXPERIENCE_STEP).await?;
        sleep(self.config.timing.step_settle()).await;

        let inputs = self.page.count(INPUT).await?;
        let selects = self.page.count(SELECT).await?;

        if selects > 0 {
            self.page
                .select_nth(SELECT, 0, SelectBy::Index(EXPERIENCE_OPTION_INDEX))
                .await?;
        }

        // Only as many fields as the page actually has
        let values = [SUCCESS_RATE, FOCUS, VISA_APPROVAL_RATE];
        for (index, value) in values.iter().enumerate().take(inputs) {
            self.page.fill_nth(INPUT, index, value).await?;
        }

        let service = self.choose_by_text(&SERVICES, "service").await;

        self.screenshots
            .capture(self.page, Checkpoint::ExperienceFilled)
            .await?;
        self.next().await?;
        Ok(service)
    }

    pub(super) async fn fill_verification(
        &self,
        identity: &Identity,
    ) -> Result<(Option<&'static str>, Vec<String>)> {
        tracing::info!("STEP 4: Verification & Preferences");
        self.open_step(VERIFICATION_STEP).await?;
        sleep(self.config.timing.step_settle()).await;

        let selects = self.page.count(SELECT).await?;

        self.page
            .fill_nth(INPUT, 0, &identity.business_reg_number)
            .await?;

        if selects > 0 {
            self.choose_country().await?;
        }

        let institution = self.choose_by_text(&INSTITUTIONS, "institution").await;

        let mut uploads = Vec::new();
        if self.page.count(FILE_INPUT).await? >= 2 {
            let (registration_url, education_url) = match self.config.asset_urls.as_slice() {
                [first, second, ..] => (first, second),
                _ => {
                    return Err(SignupError::Config(
                        "Two asset URLs are required for uploads".to_string(),
                    ))
                }
            };

            let registration = self
                .assets
                .attachment(AssetKind::Registration, registration_url)
                .await;
            let education = self
                .assets
                .attachment(AssetKind::Education, education_url)
                .await;

            self.page
                .set_input_files_nth(FILE_INPUT, 0, &registration)
                .await?;
            self.page
                .set_input_files_nth(FILE_INPUT, 1, &education)
                .await?;

            tracing::info!("Uploaded: {} & {}", registration.name, education.name);
            uploads.push(registration.name);
            uploads.push(education.name);
        }

        let text_inputs = self.page.count(TEXT_INPUT).await?;
        if text_inputs > 1 {
            self.page
                .fill_nth(TEXT_INPUT, text_inputs - 1, CERTIFICATION)
                .await?;
        }

        self.screenshots
            .capture(self.page, Checkpoint::VerificationFilled)
            .await?;
        Ok((institution, uploads))
    }

    pub(super) async fn submit(&self) -> Result<(String, Verdict)> {
        tracing::info!("Submitting form...");
        self.page
            .click_button(&[SUBMIT_LABEL], self.config.timing.action_timeout())
            .await?;
        sleep(self.config.timing.submit_settle()).await;

        let final_url = self.page.url().await?;
        tracing::info!("Final URL: {}", final_url);
        let verdict = check_outcome(&final_url);

        self.screenshots
            .capture(self.page, Checkpoint::FinalResult)
            .await?;
        Ok((final_url, verdict))
    }
}
