use reqwest::header::LOCATION;
use reqwest::{redirect, Client, Response};
use url::Url;

use crate::app::error::{EnrichError, Result};
use crate::fetcher::FetchLimits;
use crate::security::SsrfValidator;

/// HTTP fetcher with a size cap, timeout, and per-hop SSRF validation.
///
/// Never holds more than `max_bytes` plus one in-flight chunk in memory.
pub struct BoundedFetcher {
    client: Client,
    validator: SsrfValidator,
}

impl BoundedFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_validator(user_agent, SsrfValidator::new())
    }

    /// Build with a custom validator, e.g. one that exempts a test host.
    pub fn with_validator(user_agent: &str, validator: SsrfValidator) -> Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, validator })
    }

    /// Fetch the body at `url`, following redirects manually.
    ///
    /// Fails with `BlockedUrl` if the original URL or any redirect target is
    /// rejected by the SSRF validator, `TooLarge` the moment the body
    /// exceeds `limits.max_bytes`, `TooManyRedirects` past the hop limit,
    /// and `Timeout` when the whole call outlives `limits.timeout`.
    pub async fn fetch(&self, url: &str, limits: &FetchLimits) -> Result<Vec<u8>> {
        match tokio::time::timeout(limits.timeout, self.follow_and_read(url, limits)).await {
            Ok(result) => result,
            Err(_) => Err(EnrichError::Timeout),
        }
    }

    async fn follow_and_read(&self, url: &str, limits: &FetchLimits) -> Result<Vec<u8>> {
        let mut current = Url::parse(url)?;

        for hop in 0..=limits.max_redirects {
            // Re-validate at every hop; a verdict is only good for one URL.
            let verdict = self.validator.validate(current.as_str()).await;
            if !verdict.is_allowed {
                let reason = verdict
                    .error_message
                    .unwrap_or_else(|| "not allowed".to_string());
                tracing::warn!(url = %current, hop, %reason, "blocked outbound fetch");
                return Err(EnrichError::BlockedUrl(reason));
            }

            let response = self.client.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| {
                        EnrichError::Other("redirect response without Location header".to_string())
                    })?;
                // Location may be relative; resolve against the current URL.
                current = current.join(location)?;
                continue;
            }

            if !status.is_success() {
                return Err(EnrichError::UpstreamStatus(status.as_u16()));
            }

            if let Some(length) = response.content_length() {
                if length as usize > limits.max_bytes {
                    return Err(EnrichError::TooLarge {
                        limit: limits.max_bytes,
                    });
                }
            }

            return Self::read_body(response, limits.max_bytes).await;
        }

        Err(EnrichError::TooManyRedirects(limits.max_redirects))
    }

    async fn read_body(mut response: Response, max_bytes: usize) -> Result<Vec<u8>> {
        let mut body = Vec::new();

        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > max_bytes {
                return Err(EnrichError::TooLarge { limit: max_bytes });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}
