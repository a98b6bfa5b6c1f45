//! HTTP seam between the synchronizer and the remote API.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use tracing::debug;

use super::error::TransportError;

const ACCEPT_HAL: &str = "application/hal+json, application/json";

/// One-shot JSON requests against absolute URLs.
///
/// Each call issues exactly one request; implementations never retry.
/// Non-2xx answers are reported as [`TransportError::Status`].
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Value, TransportError>> + Send;

    fn post(
        &self,
        url: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;

    fn put(
        &self,
        url: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;

    fn delete(&self, url: &str) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// POST without a payload, ignoring whatever the server answers with.
    fn trigger(&self, url: &str) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// [`Transport`] over a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, TransportError> {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url).header(ACCEPT, ACCEPT_HAL);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("{} {} returned {}", method, url, status);
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response)
    }
}

/// Reads a JSON body; an empty body reads as `null`.
async fn read_json(response: Response) -> Result<Value, TransportError> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Value, TransportError> {
        let response = self.send(Method::GET, url, None).await?;
        read_json(response).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self.send(Method::POST, url, Some(body)).await?;
        read_json(response).await
    }

    async fn put(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self.send(Method::PUT, url, Some(body)).await?;
        read_json(response).await
    }

    async fn delete(&self, url: &str) -> Result<(), TransportError> {
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn trigger(&self, url: &str) -> Result<(), TransportError> {
        self.send(Method::POST, url, None).await?;
        Ok(())
    }
}

impl<T: Transport> Transport for Arc<T> {
    fn get(&self, url: &str) -> impl Future<Output = Result<Value, TransportError>> + Send {
        (**self).get(url)
    }

    fn post(
        &self,
        url: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send {
        (**self).post(url, body)
    }

    fn put(
        &self,
        url: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send {
        (**self).put(url, body)
    }

    fn delete(&self, url: &str) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).delete(url)
    }

    fn trigger(&self, url: &str) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).trigger(url)
    }
}
