use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::redirect::Policy;

use crate::config::Config;

pub struct Global {
    pub config: Config,
    pub http_client: reqwest::Client,
    /// Same as `http_client` but never follows redirects, for reading `Location`.
    pub no_redirect_client: reqwest::Client,
}

impl Global {
    pub fn init(config: Config) -> anyhow::Result<Arc<Self>> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.http.user_agent.as_str())
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .context("http client")?;

        let no_redirect_client = reqwest::Client::builder()
            .user_agent(config.http.user_agent.as_str())
            .timeout(Duration::from_secs(config.http.redirect_timeout_secs))
            .redirect(Policy::none())
            .build()
            .context("no-redirect http client")?;

        tracing::info!("http clients ready");

        Ok(Arc::new(Self {
            config,
            http_client,
            no_redirect_client,
        }))
    }
}
