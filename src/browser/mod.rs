//! Browser control over the Chrome DevTools Protocol.
//!
//! [`Page`] and [`Browser`] describe exactly the operations the signup run
//! performs; [`CdpPage`] and [`ChromeSession`] implement them against a real
//! Chrome. Controls are addressed by CSS selector plus DOM position, or by
//! visible text, never by semantic field identity.

pub mod cdp;
pub mod chrome;
pub mod page;

pub use cdp::CdpClient;
pub use chrome::ChromeSession;
pub use page::CdpPage;

use crate::error::Result;
use std::fmt;
use std::time::Duration;

/// How an `<option>` is picked inside a `<select>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectBy<'a> {
    Label(&'a str),
    Value(&'a str),
    Index(usize),
}

impl fmt::Display for SelectBy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectBy::Label(label) => write!(f, "label {:?}", label),
            SelectBy::Value(value) => write!(f, "value {:?}", value),
            SelectBy::Index(index) => write!(f, "index {}", index),
        }
    }
}

/// An in-memory file handed to an `<input type="file">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// One browser tab.
#[allow(async_fn_in_trait)]
pub trait Page {
    /// Navigate and wait for the new document to finish loading.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until the document is complete and resource loading has gone quiet.
    async fn wait_for_load(&self) -> Result<()>;

    /// Number of elements matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Fill the `index`-th match of `selector`. Fails immediately when absent.
    async fn fill_nth(&self, selector: &str, index: usize, value: &str) -> Result<()>;

    /// Fill the first match of `selector`, waiting up to `timeout` for it.
    async fn fill_first(&self, selector: &str, value: &str, timeout: Duration) -> Result<()>;

    /// Pick an option in the `index`-th match of `selector`.
    async fn select_nth(&self, selector: &str, index: usize, by: SelectBy<'_>) -> Result<()>;

    /// Click the first match of `selector`, waiting up to `timeout` for it.
    async fn click_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Click the first enabled `<button>` whose text contains any of
    /// `labels`, case-insensitively.
    async fn click_button(&self, labels: &[&str], timeout: Duration) -> Result<()>;

    /// Force-click the innermost element whose whitespace-normalized text
    /// is exactly `text`.
    async fn click_text(&self, text: &str, timeout: Duration) -> Result<()>;

    /// Attach `file` to the `index`-th match of `selector`.
    async fn set_input_files_nth(
        &self,
        selector: &str,
        index: usize,
        file: &FilePayload,
    ) -> Result<()>;

    /// Body text of the embedded frame matching `frame_selector`.
    async fn frame_text(&self, frame_selector: &str, timeout: Duration) -> Result<String>;

    /// PNG screenshot of the viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Current document address.
    async fn url(&self) -> Result<String>;

    async fn close(&self) -> Result<()>;
}

/// A running browser able to open further tabs.
#[allow(async_fn_in_trait)]
pub trait Browser {
    type Page: Page;

    async fn new_page(&self) -> Result<Self::Page>;
}
