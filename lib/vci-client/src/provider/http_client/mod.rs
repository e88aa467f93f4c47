pub mod reqwest_client;


use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use itertools::Itertools;
use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::Display;
use thiserror::Error;

const CONTENT_TYPE: &str = "Content-Type";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Transport used for every outgoing call of the client
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Performs a single request. A `timeout` bounds the whole call; exceeding it
    /// must surface as [`Error::Timeout`].
    async fn send(
        &self,
        url: &str,
        body: Option<Vec<u8>>,
        headers: Option<Headers>,
        method: Method,
        timeout: Option<Duration>,
    ) -> Result<Response, Error>;
}

impl<'a> dyn HttpClient + 'a {
    pub fn get(&self, url: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::Get, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::Post, url)
    }
}

pub type Headers = HashMap<String, String>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Display)]
pub enum Method {
    #[strum(serialize = "GET")]
    Get,
    #[strum(serialize = "POST")]
    Post,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.0)
    }

    /// Reason phrase of a registered status, e.g. `Not Found`
    pub fn canonical_reason(&self) -> Option<&'static str> {
        reqwest::StatusCode::from_u16(self.0)
            .ok()
            .and_then(|status| status.canonical_reason())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    pub body: Option<Vec<u8>>,
    pub headers: Headers,
    pub method: Method,
    pub url: String,
}

#[derive(Debug)]
pub struct Response {
    pub body: Vec<u8>,
    pub headers: Headers,
    pub status: StatusCode,

    pub request: Request,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("HTTP request timed out")]
    Timeout,
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Unexpected HTTP status {0}")]
    ErrorStatus(StatusCode),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Form encoding error: {0}")]
    FormEncoding(#[from] serde_urlencoded::ser::Error),
}

impl Response {
    /// Turns 4xx/5xx responses into [`Error::ErrorStatus`]
    pub fn error_for_status(self) -> Result<Self, Error> {
        match self.status.is_error() {
            true => Err(Error::ErrorStatus(self.status)),
            false => Ok(self),
        }
    }

    /// Body as text, `None` when it is empty or only whitespace
    pub fn text(&self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.body);
        match text.trim().is_empty() {
            true => None,
            false => Some(text.into_owned()),
        }
    }

    pub fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|error| {
            tracing::debug!(
                url = %self.request.url,
                %error,
                "Response body is not the expected JSON"
            );
            Error::Json(error)
        })
    }
}

pub struct RequestBuilder<'a> {
    client: &'a dyn HttpClient,
    request: Request,
    timeout: Option<Duration>,
}

impl<'a> RequestBuilder<'a> {
    fn new(client: &'a dyn HttpClient, method: Method, url: &str) -> Self {
        Self {
            client,
            request: Request {
                body: None,
                headers: Headers::default(),
                method,
                url: url.to_string(),
            },
            timeout: None,
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.request
            .headers
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {token}"))
    }

    pub fn form<T: Serialize>(self, value: T) -> Result<Self, Error> {
        let body = serde_urlencoded::to_string(value)?;
        Ok(self.with_body(FORM_CONTENT_TYPE, body.into_bytes()))
    }

    pub fn json<T: Serialize>(self, value: T) -> Result<Self, Error> {
        let body = serde_json::to_vec(&value)?;
        Ok(self.with_body(JSON_CONTENT_TYPE, body))
    }

    fn with_body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.request.body = Some(body);
        self.header(CONTENT_TYPE, content_type)
    }

    /// Sends the request. The builder timeout is enforced here as well, so
    /// transports that ignore it still fail with [`Error::Timeout`].
    pub async fn send(self) -> Result<Response, Error> {
        let Self {
            client,
            request,
            timeout,
        } = self;
        tracing::trace!(request = %RedactedRequest(&request), "Sending HTTP request");

        let headers = Some(request.headers.clone()).filter(|headers| !headers.is_empty());
        let call = client.send(
            &request.url,
            request.body.clone(),
            headers,
            request.method,
            timeout,
        );
        let result = match timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .unwrap_or(Err(Error::Timeout)),
            None => call.await,
        };

        match &result {
            Ok(response) => {
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    status = %response.status,
                    "HTTP request completed"
                );
                tracing::trace!(
                    body = %String::from_utf8_lossy(&response.body),
                    "HTTP response"
                );
            }
            Err(error) => tracing::warn!(
                method = %request.method,
                url = %request.url,
                %error,
                "HTTP request failed"
            ),
        }

        result
    }
}

/// Trace rendering of a request without credentials or grant codes
struct RedactedRequest<'a>(&'a Request);

impl fmt::Display for RedactedRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Request {
            body,
            headers,
            method,
            url,
        } = self.0;

        let headers = headers
            .iter()
            .map(|(key, value)| match key.eq_ignore_ascii_case("authorization") {
                true => format!("{key}: <redacted>"),
                false => format!("{key}: {value}"),
            })
            .join(", ");

        let is_form = self.0.headers.iter().any(|(key, value)| {
            key.eq_ignore_ascii_case(CONTENT_TYPE) && value.starts_with(FORM_CONTENT_TYPE)
        });
        let body = match (body, is_form) {
            (None, _) => "<none>".into(),
            (Some(_), true) => "<redacted>".into(),
            (Some(body), false) => String::from_utf8_lossy(body),
        };

        write!(f, "{method} {url} [{headers}] {body}")
    }
}
