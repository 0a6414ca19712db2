use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(target_os = "linux")]
const CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium-browser",
    "/usr/bin/chromium",
    "/usr/local/bin/google-chrome",
    "/snap/bin/chromium",
];

#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(target_os = "windows")]
const CANDIDATES: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const CANDIDATES: &[&str] = &[];

const PATH_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Locate a Chrome binary.
///
/// Lookup order: the configured path, `CHROME_PATH`, common install
/// locations, then `which` on the usual executable names.
pub fn find_chrome(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        tracing::warn!("Configured Chrome path {:?} does not exist", path);
    }

    if let Ok(p) = std::env::var("CHROME_PATH") {
        let pb = PathBuf::from(&p);
        if pb.exists() {
            return Some(pb);
        }
    }

    if let Some(pb) = CANDIDATES.iter().map(PathBuf::from).find(|pb| pb.exists()) {
        return Some(pb);
    }

    for name in PATH_NAMES {
        if let Ok(out) = Command::new("which").arg(name).output() {
            if out.status.success() {
                let pb = PathBuf::from(String::from_utf8_lossy(&out.stdout).trim());
                if pb.exists() {
                    return Some(pb);
                }
            }
        }
    }

    None
}
