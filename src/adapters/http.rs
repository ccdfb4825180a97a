use crate::utils::error::{QuotaComparerError, Result};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// When and how long to wait before re-sending a failed request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_statuses: Vec<u16>,
    pub jitter_base: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            retry_statuses: vec![503],
            jitter_base: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, status: StatusCode, attempt: u32) -> bool {
        attempt < self.max_retries && self.retry_statuses.contains(&status.as_u16())
    }

    /// Exponential backoff with full jitter: a random delay in
    /// `[0, min(max_backoff, jitter_base * 2^attempt)]`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let ceiling = self
            .jitter_base
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_backoff);

        let millis = ceiling.as_millis() as u64;
        if millis == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
    }
}

/// JSON-over-HTTPS client shared by the Google API adapters.
#[derive(Debug, Clone)]
pub struct GcpHttpClient {
    client: Client,
    access_token: Option<String>,
    retry: RetryPolicy,
}

impl GcpHttpClient {
    pub fn new(timeout: Duration, access_token: Option<String>, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quota-comparer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            access_token,
            retry,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut attempt = 0;
        loop {
            let mut request = self.client.get(url).query(query);
            if let Some(token) = &self.access_token {
                request = request.bearer_auth(token);
            }

            tracing::debug!("GET {} (attempt {})", url, attempt + 1);
            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.json().await?);
            }

            if self.retry.should_retry(status, attempt) {
                let delay = self.retry.delay(attempt);
                tracing::warn!(
                    "{} returned {}, retrying in {:?} ({}/{})",
                    url,
                    status,
                    delay,
                    attempt + 1,
                    self.retry.max_retries
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(QuotaComparerError::ApiStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
    }
}
