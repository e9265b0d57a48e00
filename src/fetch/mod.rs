use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};

use crate::config::KoboConfig;

/// Fetch the CSV export with HTTP Basic auth. One attempt, no retries: a
/// non-200 response aborts the run before anything is written downstream.
pub async fn fetch_csv(client: &Client, url: &str, auth: &KoboConfig) -> Result<String> {
    let resp = client
        .get(url)
        .basic_auth(&auth.username, Some(&auth.password))
        .send()
        .await
        .context("export request failed")?;

    let status = resp.status();
    if status != StatusCode::OK {
        bail!("failed to fetch export: HTTP status {}", status.as_u16());
    }

    resp.text().await.context("reading export body")
}
