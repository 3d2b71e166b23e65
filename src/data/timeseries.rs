//! HTTP client for the public COVID-19 timeseries feed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, LAST_MODIFIED};
use tracing::{debug, info};

use crate::error::AppError;

pub const DEFAULT_DATA_URL: &str = "https://pomber.github.io/covid19/timeseries.json";

/// A downloaded snapshot document.
#[derive(Debug, Clone)]
pub struct Download {
    pub body: String,
    /// Server-reported modification time, when the server sent one.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Remote side of the snapshot cache.
pub trait RemoteSource {
    /// Fetch the full document.
    fn download(&self) -> Result<Download, AppError>;

    /// Ask for the document's modification time without downloading it.
    ///
    /// `Ok(None)` means the server did not say.
    fn last_modified(&self) -> Result<Option<DateTime<Utc>>, AppError>;
}

pub struct TimeseriesClient {
    client: Client,
    url: String,
}

impl TimeseriesClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RemoteSource for TimeseriesClient {
    fn download(&self) -> Result<Download, AppError> {
        info!(url = %self.url, "downloading snapshot");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::new(4, format!("Snapshot request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Snapshot request failed with status {}.", resp.status()),
            ));
        }

        let last_modified = parse_last_modified(resp.headers());
        let body = resp
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read snapshot response: {e}")))?;
        debug!(bytes = body.len(), ?last_modified, "snapshot downloaded");

        Ok(Download { body, last_modified })
    }

    fn last_modified(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let resp = self
            .client
            .head(&self.url)
            .send()
            .map_err(|e| AppError::new(4, format!("Snapshot HEAD request failed: {e}")))?;

        if !resp.status().is_success() {
            debug!(status = %resp.status(), "HEAD request not successful");
            return Ok(None);
        }
        Ok(parse_last_modified(resp.headers()))
    }
}

fn parse_last_modified(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let raw = headers.get(LAST_MODIFIED)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    #[test]
    fn parses_http_dates() {
        let mut headers = HeaderMap::new();
        headers.insert(LAST_MODIFIED, HeaderValue::from_static("Wed, 21 Oct 2020 07:28:00 GMT"));
        assert_eq!(
            parse_last_modified(&headers),
            Some(Utc.with_ymd_and_hms(2020, 10, 21, 7, 28, 0).unwrap())
        );
    }

    #[test]
    fn missing_or_garbled_header_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_last_modified(&headers), None);
        headers.insert(LAST_MODIFIED, HeaderValue::from_static("last tuesday"));
        assert_eq!(parse_last_modified(&headers), None);
    }
}
