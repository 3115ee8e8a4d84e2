//! HTTP transport driver for the board's web API.

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

use super::config::WebConfig;
use super::error::ChannelError;

/// Client for posting commands to the board's web server.
pub struct WebTransport {
    client: Client,
    config: WebConfig,
    debug: bool,
}

impl WebTransport {
    /// Create a new WebTransport with the given configuration.
    ///
    /// No request is made until the first command is sent.
    pub fn new(config: WebConfig, debug: bool) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(config.request_timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| ChannelError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config, debug })
    }

    /// Full request target for an endpoint.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// POST `data` as JSON to `endpoint` and return the decoded JSON body.
    ///
    /// # Returns
    /// * The response body as-is for any 2xx status
    /// * `{"error": "<message>"}` for network failures, non-success statuses
    ///   or bodies that are not JSON
    pub fn send_command<T: Serialize + ?Sized>(&self, endpoint: &str, data: &T) -> serde_json::Value {
        let url = self.url(endpoint);
        match self.post(&url, data) {
            Ok(body) => body,
            Err(e) => {
                if self.debug {
                    log::warn!("Error sending request to {}: {}", url, e);
                }
                json!({ "error": e.to_string() })
            }
        }
    }

    fn post<T: Serialize + ?Sized>(&self, url: &str, data: &T) -> Result<serde_json::Value, ChannelError> {
        if self.debug {
            let pretty = serde_json::to_string_pretty(data).unwrap_or_default();
            log::debug!("Sending POST request to {} with data: {}", url, pretty);
        }

        let response = self
            .client
            .post(url)
            .json(data)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        response.json().map_err(|e| ChannelError::Http(e.to_string()))
    }
}
