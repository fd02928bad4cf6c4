//! HTTP utilities for host REST API calls

use reqwest::Client;
use serde_json::Value;

use crate::error::{ImportError, Result};

/// Maximum length of response body to keep in errors and logs
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Sanitize a response body before logging or embedding in an error.
/// Truncates long bodies and strips non-printable characters.
fn sanitize_body(body: &str) -> String {
    let truncated = if body.len() > MAX_ERROR_BODY_LENGTH {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < MAX_ERROR_BODY_LENGTH)
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect()
}

/// HTTP client wrapper for host API calls
#[derive(Clone)]
pub struct HostHttpClient {
    client: Client,
}

impl HostHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("packload/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request to the host API
    pub async fn get(&self, url: &str, token: Option<&str>) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        parse_response(response).await
    }

    /// Make a POST request to the host API
    pub async fn post(&self, url: &str, token: Option<&str>, body: Option<&Value>) -> Result<Value> {
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        parse_response(response).await
    }

    /// Make a DELETE request to the host API
    pub async fn delete(&self, url: &str, token: Option<&str>) -> Result<Value> {
        tracing::debug!("DELETE {}", url);

        let mut request = self.client.delete(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        parse_response(response).await
    }
}

/// Turn a response into JSON, mapping non-success statuses to
/// [`ImportError::HostApi`] with a sanitized body as the message.
async fn parse_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = sanitize_body(&body);
        tracing::error!("host API error: {} - {}", status, message);
        return Err(ImportError::HostApi {
            status: status.as_u16(),
            message,
        });
    }

    // Hosts answer some writes with an empty body
    if body.is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&body)?)
}
