//! Cache key and URL derivation
//!
//! Case variants of the same identifier must map to the same key, since
//! identifiers come straight from user input.

use reqwest::Url;

use crate::error::{ClientError, Result};

/// Trims surrounding whitespace and lowercases.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Key for an item lookup: `"{endpoint}:{normalized identifier}"`.
pub fn item_key(endpoint: &str, identifier: &str) -> String {
    format!("{}:{}", endpoint, normalize_identifier(identifier))
}

/// URL of a single item under `base_url`.
///
/// The identifier is pushed as one percent-encoded path segment, so `/`, `?`
/// and `#` inside it can never address a different resource.
pub fn item_url(base_url: &str, endpoint: &str, identifier: &str) -> Result<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ClientError::Config(format!("invalid base URL {:?}: {}", base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| ClientError::Config(format!("base URL cannot have a path: {}", base_url)))?
        .pop_if_empty()
        .push(endpoint)
        .push(&normalize_identifier(identifier));

    Ok(url.into())
}

/// URL of the first page of a list endpoint.
pub fn first_page_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}", base_url, endpoint)
}
