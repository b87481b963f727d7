// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::models::ScraperConfig;

/// Create a configured asynchronous HTTP client.
///
/// The client is shared by every worker; `reqwest::Client` is an `Arc`
/// around a connection pool, so clones are cheap.
pub fn create_client(config: &ScraperConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Append path segments to a base URL, percent-encoding each one.
///
/// Any path already present on the base is kept, so a base of
/// `https://host/prefix` yields `https://host/prefix/api/question/1`.
pub fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
