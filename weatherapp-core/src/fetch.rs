use std::time::Duration;

use reqwest::Client;

use crate::{
    cache::CacheStore,
    error::{Result, WeatherError},
};

/// Weather sites serve stripped-down pages to unknown clients.
pub const FAKE_MOZILLA_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_6)";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page retrieval through the on-disk cache.
#[derive(Debug, Clone)]
pub struct Fetcher {
    cache: CacheStore,
    http: Client,
}

impl Fetcher {
    pub fn new(cache: CacheStore) -> Result<Self> {
        let http = Client::builder()
            .user_agent(FAKE_MOZILLA_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { cache, http })
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Page text for `url`, served from cache unless `refresh` is set or the
    /// entry is missing or stale.
    pub async fn fetch(&self, url: &str, refresh: bool) -> Result<String> {
        if !refresh {
            if let Some(bytes) = self.cache.read(url)? {
                return Ok(decode(bytes));
            }
        }

        let bytes = self.download(url).await?;
        self.cache.write(url, &bytes)?;
        Ok(decode(bytes))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "requesting page");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| WeatherError::Network { url: url.to_string(), source })?;

        let status = res.status();
        if !status.is_success() {
            return Err(WeatherError::HttpStatus { url: url.to_string(), status: status.as_u16() });
        }

        let body = res
            .bytes()
            .await
            .map_err(|source| WeatherError::Network { url: url.to_string(), source })?;

        tracing::debug!(url, bytes = body.len(), "downloaded page");
        Ok(body.to_vec())
    }
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
