//! Real end-to-end browser tests.
//!
//! These tests launch an actual headless Chrome, attach over CDP and drive
//! a small wizard-like page served in-process: positional fills, select
//! fallbacks, button and text clicks, in-memory file uploads, frame text,
//! screenshots and secondary tabs.
//!
//! Chrome discovery follows `find_chrome` (`CHROME_PATH`, common install
//! paths, PATH). Tests are **skipped** (not failed) when Chrome is not found.
//!
//! ```
//! cargo test --test e2e_browser_test -- --nocapture
//! ```

use axum::{response::Html, routing::get, Router};
use signup_flow_lib::browser::{Browser, CdpPage, ChromeSession, FilePayload, Page, SelectBy};
use signup_flow_lib::config::RunConfig;
use signup_flow_lib::flow::fixtures::{FILE_INPUT, TEXT_INPUT};
use signup_flow_lib::otp::{extract_code, MESSAGE_FRAME_SELECTOR, OTP_INPUT_SELECTOR};
use signup_flow_lib::process::find_chrome;
use signup_flow_lib::SignupError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::oneshot;

// ── helpers ──────────────────────────────────────────────────────────────────

fn browser_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.browser.headless = true;
    config.browser.custom_args = vec!["--no-sandbox".to_string()];
    config.timing.action_timeout = 10_000;
    config.timing.command_timeout = 10_000;
    config
}

/// Launch headless Chrome, or `None` when it is not installed.
async fn launch() -> Option<(ChromeSession, CdpPage)> {
    let Some(chrome) = find_chrome(None) else {
        eprintln!("Chrome not found, skipping");
        return None;
    };
    let session = ChromeSession::launch(&chrome, &browser_config())
        .await
        .expect("failed to launch Chrome");
    let page = session
        .primary_page()
        .await
        .expect("failed to attach to Chrome");
    Some((session, page))
}

async fn spawn_test_server() -> (String, oneshot::Sender<()>) {
    let app = Router::new()
        .route("/", get(|| async { Html(HTML_BASIC) }))
        .route("/form", get(|| async { Html(HTML_FORM) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base = format!("http://127.0.0.1:{}", addr.port());

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await
            .ok();
    });

    (base, tx)
}

async fn eval_str(page: &CdpPage, expression: &str) -> String {
    page.evaluate(expression)
        .await
        .unwrap()
        .as_str()
        .unwrap_or_default()
        .to_string()
}

// ── test HTML fixtures ───────────────────────────────────────────────────────

const HTML_BASIC: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Inbox</title></head>
<body><h1>Inbox</h1></body>
</html>"#;

const HTML_FORM: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Signup Form</title></head>
<body>
  <input id="first" type="text" />
  <input id="last" type="text" />
  <input id="terms" type="checkbox" />
  <input id="doc1" type="file" />
  <input id="doc2" type="file" />
  <input id="otp" type="text" placeholder="Enter OTP" />
  <select id="country">
    <option value="">Select country</option>
    <option value="NP">Nepal</option>
    <option value="CA">Canada</option>
  </select>
  <label><input id="visa" type="checkbox" /> Visa Processing</label>
  <button id="disabled-next" disabled>Next</button>
  <button id="next" onclick="document.getElementById('result').textContent = 'next:' + document.getElementById('first').value">
    Next step
  </button>
  <div id="result"></div>
  <iframe id="html_msg_body" srcdoc="<p>Hello! Your code is 482913.</p>"></iframe>
  <iframe id="opaque_msg_body" sandbox srcdoc="<p>Your code is 111111.</p>"></iframe>
</body>
</html>"#;

// ── tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_positional_fill_and_select() {
    let Some((session, page)) = launch().await else {
        return;
    };
    let (base, shutdown) = spawn_test_server().await;

    page.goto(&format!("{}/form", base)).await.unwrap();
    page.wait_for_load().await.unwrap();

    assert_eq!(page.count("input").await.unwrap(), 7);
    assert_eq!(page.count(TEXT_INPUT).await.unwrap(), 3);
    assert_eq!(page.count(FILE_INPUT).await.unwrap(), 2);

    page.fill_nth("input", 0, "John").await.unwrap();
    page.fill_nth("input", 1, "Doe").await.unwrap();
    assert_eq!(eval_str(&page, "document.getElementById('last').value").await, "Doe");

    let err = page.fill_nth("input", 42, "x").await.unwrap_err();
    assert!(matches!(err, SignupError::ElementNotFound(_)));

    // Index 2 is the terms checkbox, which cannot take text
    let err = page.fill_nth("input", 2, "x").await.unwrap_err();
    assert!(matches!(err, SignupError::Script(_)));
    let err = page.fill_nth(FILE_INPUT, 0, "x").await.unwrap_err();
    assert!(matches!(err, SignupError::Script(_)));

    page.select_nth("select", 0, SelectBy::Label("Canada"))
        .await
        .unwrap();
    assert_eq!(eval_str(&page, "document.getElementById('country').value").await, "CA");

    page.select_nth("select", 0, SelectBy::Value("NP")).await.unwrap();
    assert_eq!(eval_str(&page, "document.getElementById('country').value").await, "NP");

    page.select_nth("select", 0, SelectBy::Index(0)).await.unwrap();
    assert_eq!(eval_str(&page, "document.getElementById('country').value").await, "");

    let err = page
        .select_nth("select", 0, SelectBy::Label("Atlantis"))
        .await
        .unwrap_err();
    assert!(matches!(err, SignupError::ElementNotFound(_)));

    page.fill_first(OTP_INPUT_SELECTOR, "482913", Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(eval_str(&page, "document.getElementById('otp').value").await, "482913");

    let _ = shutdown.send(());
    session.close();
}

#[tokio::test]
async fn test_clicks_and_uploads() {
    let Some((session, page)) = launch().await else {
        return;
    };
    let (base, shutdown) = spawn_test_server().await;

    page.goto(&format!("{}/form", base)).await.unwrap();
    page.wait_for_load().await.unwrap();

    page.fill_nth("input", 0, "John").await.unwrap();
    // Case-insensitive, and the disabled "Next" is passed over
    page.click_button(&["next"], Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(
        eval_str(&page, "document.getElementById('result').textContent").await,
        "next:John"
    );

    page.click_text("Visa Processing", Duration::from_secs(2))
        .await
        .unwrap();
    let checked = page
        .evaluate("document.getElementById('visa').checked")
        .await
        .unwrap();
    assert_eq!(checked.as_bool(), Some(true));

    let err = page
        .click_text("Career Counseling", Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, SignupError::Timeout(_)));

    let file = FilePayload {
        name: "business-license-1-abcdef.jpg".to_string(),
        mime_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
    };
    page.set_input_files_nth(FILE_INPUT, 1, &file).await.unwrap();

    let uploaded = page
        .evaluate(
            "(() => { const f = document.getElementById('doc2').files[0]; \
             return f ? [f.name, f.type, f.size] : null; })()",
        )
        .await
        .unwrap();
    assert_eq!(
        uploaded,
        serde_json::json!(["business-license-1-abcdef.jpg", "image/jpeg", 4])
    );

    let _ = shutdown.send(());
    session.close();
}

#[tokio::test]
async fn test_frame_text_screenshot_and_tabs() {
    let Some((session, page)) = launch().await else {
        return;
    };
    let (base, shutdown) = spawn_test_server().await;

    page.goto(&format!("{}/form", base)).await.unwrap();
    page.wait_for_load().await.unwrap();

    let body = page
        .frame_text(MESSAGE_FRAME_SELECTOR, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(extract_code(&body), Some("482913".to_string()));

    // A sandboxed frame has an opaque origin, like a message served from elsewhere
    let err = page
        .frame_text("#opaque_msg_body", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, SignupError::Script(_)));

    assert_eq!(page.url().await.unwrap(), format!("{}/form", base));

    let png = page.screenshot().await.unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let inbox = session.new_page().await.unwrap();
    inbox.goto(&format!("{}/", base)).await.unwrap();
    assert_eq!(inbox.url().await.unwrap(), format!("{}/", base));
    inbox.close().await.unwrap();

    // The primary tab is unaffected by the secondary one
    assert_eq!(page.url().await.unwrap(), format!("{}/form", base));

    let _ = shutdown.send(());
    session.close();
}
