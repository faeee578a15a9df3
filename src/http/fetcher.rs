//! Transport Fetcher
//!
//! Performs a single HTTP GET with a fixed timeout and returns the raw body.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Stateless GET transport shared by every clone of the client.
///
/// Exactly one network attempt is made per [`Fetcher::fetch`] call.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher whose requests fail after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(ClientError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches `url` and returns the response body.
    ///
    /// # Errors
    /// * `ClientError::Remote` - the upstream answered with a non-2xx status
    /// * `ClientError::Transport` - connection, timeout or body read failure
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| transport_error(url, source))?;

        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned {}", url, status);
            return Err(ClientError::Remote {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| transport_error(url, source))?;

        Ok(body.to_vec())
    }
}

fn transport_error(url: &str, source: reqwest::Error) -> ClientError {
    warn!("GET {} failed: {}", url, source);
    ClientError::Transport {
        url: url.to_string(),
        source,
    }
}
