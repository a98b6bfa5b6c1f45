//! Scripted in-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde_json::Value;

use super::error::TransportError;
use super::transport::Transport;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
}

type Reply = Result<Value, u16>;

/// Answers requests from per-(method, url) queues and records every call.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<(&'static str, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, method: &'static str, url: &str, body: Value) -> &Self {
        self.push(method, url, Ok(body))
    }

    pub fn fail(&self, method: &'static str, url: &str, status: u16) -> &Self {
        self.push(method, url, Err(status))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, method: &'static str, url: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    fn answer(
        &self,
        method: &'static str,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&(method, url.to_string()))
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Ok(value)) => Ok(value),
            Some(Err(status)) => Err(TransportError::Status(status)),
            None => Err(TransportError::Http(format!(
                "no reply scripted for {} {}",
                method, url
            ))),
        }
    }
}

impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<Value, TransportError> {
        self.answer("GET", url, None)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.answer("POST", url, Some(body))
    }

    async fn put(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.answer("PUT", url, Some(body))
    }

    async fn delete(&self, url: &str) -> Result<(), TransportError> {
        self.answer("DELETE", url, None).map(|_| ())
    }

    async fn trigger(&self, url: &str) -> Result<(), TransportError> {
        self.answer("POST", url, None).map(|_| ())
    }
}
