use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::settings::Settings;

static TRACKLIST_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(?:www\.)?1001tracklists\.com/\S+$").unwrap());

/// Cheap shape check; does not confirm the page exists.
pub fn validate_url(url: &str) -> Result<()> {
    if TRACKLIST_URL_RE.is_match(url.trim()) {
        Ok(())
    } else {
        Err(Error::InvalidUrl(url.to_string()))
    }
}

/// HTTP client for tracklist pages with retry on rate limiting and server errors.
pub struct Fetcher {
    client: reqwest::Client,
    max_retries: u32,
    base_backoff: Duration,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Fetcher {
            client,
            max_retries: settings.max_retries,
            base_backoff: Duration::from_millis(settings.base_backoff_ms),
        })
    }

    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        validate_url(url)?;
        let url = url.trim();
        let mut attempt = 0;

        loop {
            debug!(url, attempt, "GET");
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status.is_success() {
                let body = response.text().await?;
                info!("Fetched {} ({} bytes)", url, body.len());
                return Ok(body);
            }

            if !should_retry(status) || attempt >= self.max_retries {
                return Err(Error::Fetch(format!("{} returned {}", url, status)));
            }

            let wait = backoff(self.base_backoff, attempt);
            warn!(
                "{} on {} (attempt {}/{}), backing off {:.1}s",
                status,
                url,
                attempt + 1,
                self.max_retries,
                wait.as_secs_f64()
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
