//! Blocking execution of one HTTP exchange.
//!
//! # Design
//! A `Transport` turns an `HttpRequest` into an `HttpResponse` or a
//! `Connectivity` error. It never looks at status codes: 4xx and 5xx come
//! back as data for `status::classify`. It never retries.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Deadline applied to each call when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// `ureq`-backed transport.
///
/// Status codes are returned as data (`http_status_as_error(false)`). The
/// deadline covers the whole exchange, from resolving the host to reading
/// the last byte of the body.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout: None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Some(DEFAULT_TIMEOUT))
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&path);
                for (key, value) in &headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&path);
                for (key, value) in &headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::Connectivity(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Connectivity(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_host_is_connectivity_error() {
        // Port 9 on loopback is expected to refuse connections.
        let transport = UreqTransport::new(Some(Duration::from_secs(2)));
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: "http://127.0.0.1:9/strava/retos".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.execute(request).unwrap_err();
        assert!(matches!(err, ApiError::Connectivity(_)));
    }

    #[test]
    fn elapsed_deadline_is_connectivity_error() {
        // Accepts the connection and never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (_stream, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_secs(10));
        });

        let transport = UreqTransport::new(Some(Duration::from_millis(300)));
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: format!("http://{addr}/strava/retos"),
            headers: Vec::new(),
            body: None,
        };

        let started = std::time::Instant::now();
        let err = transport.execute(request).unwrap_err();

        assert!(matches!(err, ApiError::Connectivity(_)), "{err}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
