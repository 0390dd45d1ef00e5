//! [`HttpClient`] backed by `reqwest`.

use crate::transport::HttpClient;
use async_trait::async_trait;
use riakc_protocol::{Headers, HttpRequest, HttpResponse, Method};
use std::time::Duration;

/// HTTP client over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    scheme: String,
}

impl ReqwestClient {
    /// Creates a client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self::with_client(client))
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            scheme: "http".into(),
        }
    }

    /// Uses `https` instead of `http`.
    pub fn with_tls(mut self) -> Self {
        self.scheme = "https".into();
        self
    }

    /// Returns the inner client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, node: &str, request: &HttpRequest) -> Result<HttpResponse, String> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = format!("{}://{}{}", self.scheme, node, request.path);

        let mut builder = self.client.request(method, url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| e.to_string())?;

        Ok(HttpResponse::new(status, headers, body))
    }
}
