use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Signup wizard origin; steps are reached at `<base_url>/register?step=<name>`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Public inbox search page, queried with `?to=<local part>`
    #[serde(default = "default_inbox_url")]
    pub inbox_url: String,

    /// Domain of generated test mailboxes
    #[serde(default = "default_email_domain")]
    pub email_domain: String,

    /// Password typed into both password fields
    #[serde(default = "default_password")]
    pub password: String,

    /// Directory that receives checkpoint screenshots
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,

    /// Placeholder image sources for the two verification attachments
    #[serde(default = "default_asset_urls")]
    pub asset_urls: Vec<String>,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub timing: TimingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            inbox_url: default_inbox_url(),
            email_domain: default_email_domain(),
            password: default_password(),
            screenshot_dir: default_screenshot_dir(),
            asset_urls: default_asset_urls(),
            browser: BrowserConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl RunConfig {
    /// Address of one wizard step.
    pub fn step_url(&self, step: &str) -> String {
        format!("{}/register?step={}", self.base_url.trim_end_matches('/'), step)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome executable; discovered automatically when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    #[serde(default)]
    pub headless: bool,

    #[serde(default)]
    pub viewport: Viewport,

    #[serde(default = "default_true")]
    pub ignore_https_errors: bool,

    /// Extra launch arguments
    #[serde(default)]
    pub custom_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: false,
            viewport: Viewport::default(),
            ignore_https_errors: true,
            custom_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Every duration is in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Upper bound for the whole run
    #[serde(default = "default_test_timeout")]
    pub test_timeout: u64,

    /// Auto-wait for clicks, fills and frame reads
    #[serde(default = "default_action_timeout")]
    pub action_timeout: u64,

    /// Per-candidate wait when picking a service or institution by text
    #[serde(default = "default_choice_timeout")]
    pub choice_timeout: u64,

    #[serde(default = "default_step_settle")]
    pub step_settle: u64,

    #[serde(default = "default_inbox_settle")]
    pub inbox_settle: u64,

    #[serde(default = "default_message_settle")]
    pub message_settle: u64,

    #[serde(default = "default_submit_settle")]
    pub submit_settle: u64,

    /// Single CDP command round trip
    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            test_timeout: default_test_timeout(),
            action_timeout: default_action_timeout(),
            choice_timeout: default_choice_timeout(),
            step_settle: default_step_settle(),
            inbox_settle: default_inbox_settle(),
            message_settle: default_message_settle(),
            submit_settle: default_submit_settle(),
            command_timeout: default_command_timeout(),
        }
    }
}

impl TimingConfig {
    pub fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout)
    }

    pub fn choice_timeout(&self) -> Duration {
        Duration::from_millis(self.choice_timeout)
    }

    pub fn step_settle(&self) -> Duration {
        Duration::from_millis(self.step_settle)
    }

    pub fn inbox_settle(&self) -> Duration {
        Duration::from_millis(self.inbox_settle)
    }

    pub fn message_settle(&self) -> Duration {
        Duration::from_millis(self.message_settle)
    }

    pub fn submit_settle(&self) -> Duration {
        Duration::from_millis(self.submit_settle)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout)
    }
}

fn default_base_url() -> String {
    "https://authorized-partner.netlify.app".to_string()
}

fn default_inbox_url() -> String {
    "https://www.mailinator.com/v4/public/inboxes.jsp".to_string()
}

fn default_email_domain() -> String {
    "mailinator.com".to_string()
}

fn default_password() -> String {
    "Test@12345".to_string()
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_asset_urls() -> Vec<String> {
    vec![
        "https://picsum.photos/800/600?random=1".to_string(),
        "https://picsum.photos/800/600?random=2".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

fn default_test_timeout() -> u64 {
    300_000
}

fn default_action_timeout() -> u64 {
    30_000
}

fn default_choice_timeout() -> u64 {
    2_000
}

fn default_step_settle() -> u64 {
    3_000
}

fn default_inbox_settle() -> u64 {
    5_000
}

fn default_message_settle() -> u64 {
    2_000
}

fn default_submit_settle() -> u64 {
    5_000
}

fn default_command_timeout() -> u64 {
    30_000
}
