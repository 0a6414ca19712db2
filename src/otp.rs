//! One-time password lookup through a public inbox viewer.
//!
//! Retrieval never fails: every problem collapses to [`FALLBACK_OTP`], so the
//! run always moves forward. A wrong code only shows up as a failure of the
//! following wizard step.

use crate::browser::{Browser, Page};
use crate::config::schema::RunConfig;
use crate::error::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

pub const FALLBACK_OTP: &str = "123456";

/// Newest message row in the inbox list.
pub const INBOX_ROW_SELECTOR: &str = "tr.ng-scope:first-child td.ng-binding";

/// Frame holding the rendered message body.
pub const MESSAGE_FRAME_SELECTOR: &str = "#html_msg_body";

/// Verification code field on the wizard.
pub const OTP_INPUT_SELECTOR: &str = r#"input[placeholder*="OTP"], input[maxlength="6"]"#;

pub const OTP_SUBMIT_LABELS: [&str; 2] = ["Verify", "Submit"];

const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-').remove(b'.');

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b([0-9]{6})\b").expect("valid OTP pattern"))
}

/// First standalone six-digit number in `text`.
pub fn extract_code(text: &str) -> Option<String> {
    code_pattern()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Why the fallback code was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The inbox row could not be opened.
    NoMessage(String),
    /// The message body held no six-digit code.
    NoCode,
    /// Anything else went wrong while scraping.
    Failed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoMessage(e) => write!(f, "no message opened ({})", e),
            FallbackReason::NoCode => write!(f, "no code in message"),
            FallbackReason::Failed(e) => write!(f, "retrieval failed ({})", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpSource {
    Scraped,
    Fallback(FallbackReason),
}

/// A resolved code. Always six digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Otp {
    pub code: String,
    pub source: OtpSource,
}

impl Otp {
    fn scraped(code: String) -> Self {
        Self {
            code,
            source: OtpSource::Scraped,
        }
    }

    fn fallback(reason: FallbackReason) -> Self {
        tracing::warn!("OTP {}, fallback to {}", reason, FALLBACK_OTP);
        Self {
            code: FALLBACK_OTP.to_string(),
            source: OtpSource::Fallback(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, OtpSource::Fallback(_))
    }
}

pub struct OtpRetriever<'a> {
    config: &'a RunConfig,
}

impl<'a> OtpRetriever<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Inbox search address for a mailbox name.
    pub fn inbox_url(&self, local_part: &str) -> String {
        format!(
            "{}?to={}",
            self.config.inbox_url,
            utf8_percent_encode(local_part, QUERY_VALUE)
        )
    }

    /// Look the code up in a secondary tab. The tab is always closed before
    /// returning.
    pub async fn retrieve<B: Browser>(&self, browser: &B, local_part: &str) -> Otp {
        let inbox = match browser.new_page().await {
            Ok(page) => page,
            Err(e) => return Otp::fallback(FallbackReason::Failed(e.to_string())),
        };

        let outcome = self.scrape(&inbox, local_part).await;

        if let Err(e) = inbox.close().await {
            tracing::warn!("Failed to close inbox tab: {}", e);
        }

        match outcome {
            Ok(code) => {
                tracing::info!("OTP found: {}", code);
                Otp::scraped(code)
            }
            Err(reason) => Otp::fallback(reason),
        }
    }

    async fn scrape<P: Page>(
        &self,
        inbox: &P,
        local_part: &str,
    ) -> std::result::Result<String, FallbackReason> {
        let timing = &self.config.timing;
        let failed = |e: crate::error::SignupError| FallbackReason::Failed(e.to_string());

        inbox.goto(&self.inbox_url(local_part)).await.map_err(failed)?;
        tokio::time::sleep(timing.inbox_settle()).await;

        inbox
            .click_selector(INBOX_ROW_SELECTOR, timing.action_timeout())
            .await
            .map_err(|e| FallbackReason::NoMessage(e.to_string()))?;
        tokio::time::sleep(timing.message_settle()).await;

        let body = inbox
            .frame_text(MESSAGE_FRAME_SELECTOR, timing.action_timeout())
            .await
            .map_err(failed)?;

        extract_code(&body).ok_or(FallbackReason::NoCode)
    }

    /// Type the code into the wizard and confirm it.
    pub async fn submit<P: Page>(&self, page: &P, otp: &Otp) -> Result<()> {
        let timeout = self.config.timing.action_timeout();
        page.fill_first(OTP_INPUT_SELECTOR, &otp.code, timeout).await?;
        page.click_button(&OTP_SUBMIT_LABELS, timeout).await?;
        tracing::info!("Submitted OTP {}", otp.code);
        Ok(())
    }
}
