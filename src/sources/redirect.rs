//! Turning GamerPower tracking links into the store page they point at.

use std::time::Duration;

use reqwest::header::LOCATION;

use crate::error::Result;
use crate::global::Global;

/// Read the `Location` of a redirecting link, or follow it if it does not
/// redirect directly. Falls back to `url` on any failure.
#[tracing::instrument(skip(global))]
pub async fn resolve_open_url(global: &Global, url: &str) -> String {
    match location_first(global, url).await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!(error = %e, "could not resolve redirect, keeping original link");
            url.to_string()
        }
    }
}

/// Follow every redirect and return the final URL. Falls back to `url`.
#[tracing::instrument(skip(global))]
pub async fn follow(global: &Global, url: &str) -> String {
    match final_url(global, url).await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!(error = %e, "could not follow redirect, keeping original link");
            url.to_string()
        }
    }
}

async fn location_first(global: &Global, url: &str) -> Result<String> {
    let resp = global.no_redirect_client.get(url).send().await?;

    if matches!(resp.status().as_u16(), 301 | 302 | 303 | 307 | 308) {
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| url.to_string());

        return Ok(location);
    }

    final_url(global, url).await
}

async fn final_url(global: &Global, url: &str) -> Result<String> {
    let resp = global
        .http_client
        .get(url)
        .timeout(Duration::from_secs(global.config.http.redirect_timeout_secs))
        .send()
        .await?;

    Ok(resp.url().to_string())
}
