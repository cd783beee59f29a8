use crate::error::{PipelineError, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Builds the shared HTTP client with the per-request timeout ceiling.
pub fn build_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?;
    Ok(client)
}

/// Performs one GET and parses the body as JSON.
///
/// No retries and no caching: a connection or timeout failure surfaces as
/// `Network`, a non-2xx status as `Http`, and a body that is not valid
/// JSON as `Decode`. Cross-run retry policy belongs to the orchestrator.
pub async fn fetch_json(client: &reqwest::Client, url: &str) -> Result<Value> {
    debug!("GET {}", url);
    let resp = client.get(url).send().await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(PipelineError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let payload = resp.bytes().await?;
    let value: Value = serde_json::from_slice(&payload)?;
    Ok(value)
}
