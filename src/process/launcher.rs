use crate::config::schema::BrowserConfig;
use std::path::Path;
use std::process::{Command, Stdio};

/// Build the Chrome command line for one run.
pub fn build_command(
    chrome_path: &Path,
    browser: &BrowserConfig,
    cdp_port: u16,
    user_data_dir: &Path,
) -> Command {
    let mut cmd = Command::new(chrome_path);

    // Throwaway profile so runs never share cookies or storage
    cmd.arg(format!("--user-data-dir={}", user_data_dir.display()));
    cmd.arg(format!("--remote-debugging-port={}", cdp_port));
    cmd.arg(format!(
        "--window-size={},{}",
        browser.viewport.width, browser.viewport.height
    ));

    if browser.headless {
        cmd.arg("--headless=new");
        cmd.arg("--disable-gpu");
    }

    if browser.ignore_https_errors {
        cmd.arg("--ignore-certificate-errors");
    }

    cmd.arg("--no-first-run");
    cmd.arg("--no-default-browser-check");
    cmd.arg("--disable-background-networking");
    cmd.arg("--disable-sync");
    cmd.arg("--disable-dev-shm-usage");

    for arg in &browser.custom_args {
        cmd.arg(arg);
    }

    cmd.arg("about:blank");

    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Viewport;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|s| s.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_build_command_defaults() {
        let cmd = build_command(
            Path::new("/usr/bin/google-chrome"),
            &BrowserConfig::default(),
            9333,
            Path::new("/tmp/signup-profile"),
        );
        let args = args_of(&cmd);

        assert!(args.contains(&"--user-data-dir=/tmp/signup-profile".to_string()));
        assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
        assert!(args.contains(&"--window-size=1280,720".to_string()));
        assert!(args.contains(&"--ignore-certificate-errors".to_string()));
        assert!(!args.contains(&"--headless=new".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("about:blank"));
    }

    #[test]
    fn test_build_command_headless_with_custom_args() {
        let browser = BrowserConfig {
            chrome_path: None,
            headless: true,
            viewport: Viewport {
                width: 800,
                height: 600,
            },
            ignore_https_errors: false,
            custom_args: vec!["--lang=en-US".to_string()],
        };

        let cmd = build_command(
            Path::new("/usr/bin/chromium"),
            &browser,
            9444,
            Path::new("/tmp/p"),
        );
        let args = args_of(&cmd);

        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
        assert!(args.contains(&"--window-size=800,600".to_string()));
        assert!(args.contains(&"--lang=en-US".to_string()));
        assert!(!args.contains(&"--ignore-certificate-errors".to_string()));
    }
}
