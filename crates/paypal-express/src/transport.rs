//! HTTP transport seam.
//!
//! [`ExpressClient`](crate::ExpressClient) never talks to the network
//! directly; it hands the fully assembled form to a [`Transport`]. The
//! default [`HttpTransport`] wraps `reqwest::Client`; tests substitute
//! their own implementation to capture outgoing parameters.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::params::Params;

/// Failures below the NVP layer. Surfaced to callers unmodified.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else {
            Self::Request(e)
        }
    }
}

/// Sends a form-encoded POST and returns the raw reply body.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        endpoint: &str,
        form: &Params,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with a 30 second request timeout and no redirects.
    pub fn new() -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http })
    }

    /// Create a transport with a custom reqwest::Client.
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, form: &Params) -> Result<String, TransportError> {
        let resp = self.http.post(endpoint).form(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let transport = HttpTransport::new().unwrap();
        let mut form = Params::new();
        form.insert("METHOD", "GetExpressCheckoutDetails");

        // port 1 on loopback refuses connections
        let err = transport
            .post("http://127.0.0.1:1/nvp", &form)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::Connection(_) | TransportError::Request(_)
        ));
    }
}
