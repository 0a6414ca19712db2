use crate::browser::cdp::CdpClient;
use crate::browser::{FilePayload, Page, SelectBy};
use crate::config::schema::Viewport;
use crate::error::{Result, SignupError};
use base64::Engine as _;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Quiet window used as the "network idle" approximation.
const IDLE_WINDOW: Duration = Duration::from_millis(500);

// Page-side helpers. Each is a JS function expression invoked through `call`.

const STALE_MARK: &str = "window.__signupFlowStale = true";

const DOCUMENT_READY: &str = r#"() => (document.readyState === "complete" && !window.__signupFlowStale)
    ? performance.getEntriesByType("resource").length
    : null"#;

const COUNT: &str = r#"(sel) => document.querySelectorAll(sel).length"#;

const FILL_NTH: &str = r#"(sel, idx, value) => {
    const el = document.querySelectorAll(sel)[idx];
    if (!el) return null;
    const unfillable = ["checkbox", "radio", "file", "button", "submit", "reset", "image"];
    const typed = el.tagName === "INPUT" && !unfillable.includes((el.type || "").toLowerCase());
    if (!typed && el.tagName !== "TEXTAREA" && !el.isContentEditable) return "not-fillable";
    el.focus();
    const desc = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), "value");
    if (desc && desc.set) { desc.set.call(el, value); } else { el.value = value; }
    el.dispatchEvent(new Event("input", { bubbles: true }));
    el.dispatchEvent(new Event("change", { bubbles: true }));
    return "ok";
}"#;

const SELECT_NTH: &str = r#"(sel, idx, mode, key) => {
    const el = document.querySelectorAll(sel)[idx];
    if (!el || !el.options) return "missing";
    const opts = Array.from(el.options);
    let opt;
    if (mode === "label") {
        opt = opts.find(o => o.label.trim() === key || o.text.trim() === key);
    } else if (mode === "value") {
        opt = opts.find(o => o.value === key);
    } else {
        opt = opts[key];
    }
    if (!opt) return "no-option";
    el.value = opt.value;
    opt.selected = true;
    el.dispatchEvent(new Event("input", { bubbles: true }));
    el.dispatchEvent(new Event("change", { bubbles: true }));
    return "ok";
}"#;

const CLICK_SELECTOR: &str = r#"(sel) => {
    const el = document.querySelector(sel);
    if (!el) return false;
    el.scrollIntoView({ block: "center" });
    el.click();
    return true;
}"#;

const CLICK_BUTTON: &str = r#"(labels) => {
    const wanted = labels.map(l => l.toLowerCase());
    const el = Array.from(document.querySelectorAll("button")).find(b => {
        const text = (b.innerText || b.textContent || "").toLowerCase();
        return !b.disabled && wanted.some(w => text.includes(w));
    });
    if (!el) return false;
    el.scrollIntoView({ block: "center" });
    el.click();
    return true;
}"#;

const CLICK_TEXT: &str = r#"(text) => {
    const norm = s => (s || "").replace(/\s+/g, " ").trim();
    const hits = Array.from(document.body.querySelectorAll("*"))
        .filter(el => norm(el.textContent) === text);
    const el = hits.find(h => !hits.some(o => o !== h && h.contains(o)));
    if (!el) return false;
    el.click();
    return true;
}"#;

const SET_FILES: &str = r#"(sel, idx, name, mime, data) => {
    const el = document.querySelectorAll(sel)[idx];
    if (!el) return false;
    const raw = atob(data);
    const bytes = new Uint8Array(raw.length);
    for (let i = 0; i < raw.length; i++) bytes[i] = raw.charCodeAt(i);
    const transfer = new DataTransfer();
    transfer.items.add(new File([bytes], name, { type: mime }));
    el.files = transfer.files;
    el.dispatchEvent(new Event("input", { bubbles: true }));
    el.dispatchEvent(new Event("change", { bubbles: true }));
    return true;
}"#;

// A frame whose document is out of reach reports itself instead of staying pending
const FRAME_TEXT: &str = r#"(sel) => {
    const frame = document.querySelector(sel);
    if (!frame) return null;
    const doc = frame.contentDocument;
    if (!doc) return frame.tagName === "IFRAME" || frame.tagName === "FRAME" ? { crossOrigin: true } : null;
    const text = doc.body ? doc.body.textContent : "";
    return text.trim() ? { text } : null;
}"#;

/// Build `(<function>)(<json args>)`.
fn call(function: &str, args: &[Value]) -> String {
    let args: Vec<String> = args.iter().map(Value::to_string).collect();
    format!("({})({})", function, args.join(", "))
}

fn is_pending(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(false))
}

/// Map a `FILL_NTH` status to the operation's result.
fn fill_status(status: &Value, selector: &str, index: usize) -> Result<()> {
    match status.as_str() {
        Some("ok") => Ok(()),
        Some("not-fillable") => Err(SignupError::Script(format!(
            "{}[{}] is not a fillable text field",
            selector, index
        ))),
        _ => Err(SignupError::ElementNotFound(format!("{}[{}]", selector, index))),
    }
}

fn frame_body(value: &Value, frame_selector: &str) -> Result<String> {
    match value.get("text").and_then(Value::as_str) {
        Some(text) => Ok(text.to_string()),
        None => Err(SignupError::Script(format!(
            "{} is a cross-origin frame, its document is not readable",
            frame_selector
        ))),
    }
}

/// A tab driven through its own CDP connection.
pub struct CdpPage {
    client: CdpClient,
    target_id: String,
    close_url: String,
    http: reqwest::Client,
    action_timeout: Duration,
}

impl CdpPage {
    pub(crate) async fn attach(
        client: CdpClient,
        target_id: String,
        close_url: String,
        http: reqwest::Client,
        viewport: Viewport,
        action_timeout: Duration,
    ) -> Result<Self> {
        client.send_command("Page.enable", json!({})).await?;
        client.send_command("Runtime.enable", json!({})).await?;
        client
            .send_command(
                "Emulation.setDeviceMetricsOverride",
                json!({
                    "width": viewport.width,
                    "height": viewport.height,
                    "deviceScaleFactor": 1,
                    "mobile": false
                }),
            )
            .await?;

        Ok(Self {
            client,
            target_id,
            close_url,
            http,
            action_timeout,
        })
    }

    /// Evaluate a page-side helper.
    pub async fn evaluate(&self, expression: &str) -> Result<Value> {
        self.client.evaluate(expression).await
    }

    /// Re-evaluate `expression` until it yields something other than
    /// `null`/`false`. Evaluation errors count as "not yet" until the
    /// deadline, since a navigating page briefly has no execution context.
    async fn poll(&self, expression: &str, timeout: Duration, what: &str) -> Result<Value> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.client.evaluate(expression).await {
                Ok(value) if !is_pending(&value) => return Ok(value),
                Ok(_) => {
                    if Instant::now() >= deadline {
                        return Err(SignupError::Timeout(what.to_string()));
                    }
                }
                Err(e) => {
                    if Instant::now() >= deadline {
                        return Err(e);
                    }
                    tracing::trace!("Polling {}: {}", what, e);
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn document_ready(&self, timeout: Duration) -> Result<u64> {
        let value = self
            .poll(&call(DOCUMENT_READY, &[]), timeout, "document load")
            .await?;
        Ok(value.as_u64().unwrap_or(0))
    }
}

impl Page for CdpPage {
    async fn goto(&self, url: &str) -> Result<()> {
        // Marks the outgoing document so readiness is only read from the new one
        let _ = self.client.evaluate(STALE_MARK).await;

        let result = self
            .client
            .send_command("Page.navigate", json!({ "url": url }))
            .await?;
        if let Some(error) = result.get("errorText").and_then(|e| e.as_str()) {
            if !error.is_empty() {
                return Err(SignupError::Cdp(format!(
                    "Navigation to {} failed: {}",
                    url, error
                )));
            }
        }

        self.document_ready(self.action_timeout).await?;
        tracing::info!("Navigated to: {}", url);
        Ok(())
    }

    async fn wait_for_load(&self) -> Result<()> {
        let deadline = Instant::now() + self.action_timeout;
        let mut last = self.document_ready(self.action_timeout).await?;
        loop {
            tokio::time::sleep(IDLE_WINDOW).await;
            let remaining = deadline.saturating_duration_since(Instant::now());
            let current = self.document_ready(remaining).await?;
            if current == last {
                return Ok(());
            }
            if remaining.is_zero() {
                return Err(SignupError::Timeout("network idle".to_string()));
            }
            last = current;
        }
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let value = self.client.evaluate(&call(COUNT, &[json!(selector)])).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn fill_nth(&self, selector: &str, index: usize, value: &str) -> Result<()> {
        let filled = self
            .client
            .evaluate(&call(FILL_NTH, &[json!(selector), json!(index), json!(value)]))
            .await?;
        fill_status(&filled, selector, index)?;
        tracing::debug!("Filled {}[{}]", selector, index);
        Ok(())
    }

    async fn fill_first(&self, selector: &str, value: &str, timeout: Duration) -> Result<()> {
        let filled = self
            .poll(
                &call(FILL_NTH, &[json!(selector), json!(0), json!(value)]),
                timeout,
                selector,
            )
            .await?;
        fill_status(&filled, selector, 0)?;
        tracing::debug!("Filled {}", selector);
        Ok(())
    }

    async fn select_nth(&self, selector: &str, index: usize, by: SelectBy<'_>) -> Result<()> {
        let (mode, key) = match by {
            SelectBy::Label(label) => ("label", json!(label)),
            SelectBy::Value(value) => ("value", json!(value)),
            SelectBy::Index(i) => ("index", json!(i)),
        };
        let status = self
            .client
            .evaluate(&call(
                SELECT_NTH,
                &[json!(selector), json!(index), json!(mode), key],
            ))
            .await?;

        match status.as_str() {
            Some("ok") => {
                tracing::debug!("Selected {} in {}[{}]", by, selector, index);
                Ok(())
            }
            Some("no-option") => Err(SignupError::ElementNotFound(format!(
                "option with {} in {}[{}]",
                by, selector, index
            ))),
            _ => Err(SignupError::ElementNotFound(format!("{}[{}]", selector, index))),
        }
    }

    async fn click_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.poll(&call(CLICK_SELECTOR, &[json!(selector)]), timeout, selector)
            .await?;
        tracing::debug!("Clicked element: {}", selector);
        Ok(())
    }

    async fn click_button(&self, labels: &[&str], timeout: Duration) -> Result<()> {
        let what = format!("button with text {:?}", labels);
        self.poll(&call(CLICK_BUTTON, &[json!(labels)]), timeout, &what)
            .await?;
        tracing::debug!("Clicked {}", what);
        Ok(())
    }

    async fn click_text(&self, text: &str, timeout: Duration) -> Result<()> {
        let what = format!("text {:?}", text);
        self.poll(&call(CLICK_TEXT, &[json!(text)]), timeout, &what)
            .await?;
        tracing::debug!("Clicked {}", what);
        Ok(())
    }

    async fn set_input_files_nth(
        &self,
        selector: &str,
        index: usize,
        file: &FilePayload,
    ) -> Result<()> {
        let data = base64::engine::general_purpose::STANDARD.encode(&file.bytes);
        let attached = self
            .client
            .evaluate(&call(
                SET_FILES,
                &[
                    json!(selector),
                    json!(index),
                    json!(file.name),
                    json!(file.mime_type),
                    json!(data),
                ],
            ))
            .await?;
        if attached.as_bool() == Some(true) {
            tracing::debug!(
                "Attached {} ({} bytes) to {}[{}]",
                file.name,
                file.bytes.len(),
                selector,
                index
            );
            Ok(())
        } else {
            Err(SignupError::ElementNotFound(format!("{}[{}]", selector, index)))
        }
    }

    async fn frame_text(&self, frame_selector: &str, timeout: Duration) -> Result<String> {
        let value = self
            .poll(&call(FRAME_TEXT, &[json!(frame_selector)]), timeout, frame_selector)
            .await?;
        frame_body(&value, frame_selector)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let result = self
            .client
            .send_command("Page.captureScreenshot", json!({ "format": "png" }))
            .await?;
        let data = result
            .get("data")
            .and_then(|d| d.as_str())
            .ok_or_else(|| SignupError::Screenshot("No image data returned".to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| SignupError::Screenshot(format!("Invalid image data: {}", e)))
    }

    async fn url(&self) -> Result<String> {
        let value = self.client.evaluate("window.location.href").await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SignupError::Script("window.location.href is not a string".to_string()))
    }

    async fn close(&self) -> Result<()> {
        self.client.close().await;
        self.http
            .get(&self.close_url)
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!("Closed tab {}", self.target_id);
        Ok(())
    }
}
