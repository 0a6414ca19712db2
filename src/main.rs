use anyhow::{anyhow, Context};
use signup_flow_lib::browser::ChromeSession;
use signup_flow_lib::config::{load_config, validate_config};
use signup_flow_lib::process::find_chrome;
use signup_flow_lib::SignupFlow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = load_config()?;
    validate_config(&config)?;

    let chrome = find_chrome(config.browser.chrome_path.as_deref())
        .ok_or_else(|| anyhow!("Chrome not found; set CHROME_PATH or browser.chrome_path"))?;

    let session = ChromeSession::launch(&chrome, &config).await?;
    let page = session
        .primary_page()
        .await
        .context("attaching to the initial tab")?;

    let flow = SignupFlow::new(&session, &page, &config);
    let result = tokio::time::timeout(config.timing.test_timeout(), flow.run()).await;

    drop(flow);
    drop(page);
    session.close();

    let report = match result {
        Ok(report) => report?,
        Err(_) => {
            return Err(anyhow!(
                "Signup run exceeded {}ms",
                config.timing.test_timeout
            ))
        }
    };

    tracing::info!(
        "Run finished: verdict={:?} otp={} fallback={} final_url={}",
        report.verdict,
        report.otp.code,
        report.otp.is_fallback(),
        report.final_url
    );
    Ok(())
}
