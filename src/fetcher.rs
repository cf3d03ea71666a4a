use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;
use crate::settings::HarvestConfig;

/// A fetched page: final URL (after redirects) and its body.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

/// Sequential HTTP client with a mandatory gap between requests.
///
/// Every call to [`Fetcher::fetch`] waits until `delay` has elapsed since the
/// previous request finished, so no caller can issue two requests to the
/// origin closer than the configured interval. `&mut self` keeps at most one
/// request in flight.
pub struct Fetcher {
    client: reqwest::Client,
    delay: Duration,
    last_request: Option<Instant>,
    requests: usize,
}

impl Fetcher {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Fetcher {
            client,
            delay: config.politeness_delay(),
            last_request: None,
            requests: 0,
        })
    }

    /// GET `url`. Transport errors, timeouts and non-2xx statuses are logged
    /// and come back as `None`.
    pub async fn fetch(&mut self, url: &str) -> Option<Page> {
        self.wait_turn().await;
        let result = self.get(url).await;
        self.last_request = Some(Instant::now());
        self.requests += 1;
        result
    }

    /// Number of requests issued so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    async fn wait_turn(&self) {
        if let Some(last) = self.last_request {
            let ready_at = last + self.delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
    }

    async fn get(&self, url: &str) -> Option<Page> {
        debug!("GET {}", url);
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Request failed for {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP {} for {}", status.as_u16(), url);
            return None;
        }

        let final_url = response.url().clone();
        match response.text().await {
            Ok(body) => Some(Page { url: final_url, body }),
            Err(e) => {
                warn!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str) -> HarvestConfig {
    HarvestConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        politeness_delay_ms: 0,
        ..HarvestConfig::default()
    }
}
