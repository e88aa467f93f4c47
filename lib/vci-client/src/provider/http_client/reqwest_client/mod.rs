use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::{Error, Headers, HttpClient, Method, Request, Response, StatusCode};

/// [`HttpClient`] over a shared `reqwest::Client`
#[derive(Clone, Default)]
pub struct ReqwestClient {
    pub client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn send(
        &self,
        url: &str,
        body: Option<Vec<u8>>,
        headers: Option<Headers>,
        method: Method,
        timeout: Option<Duration>,
    ) -> Result<Response, Error> {
        let headers = headers.unwrap_or_default();

        let mut builder = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        }
        .headers(header_map(&headers)?);

        if let Some(body) = body.clone() {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(transport_error)?;

        let status = StatusCode(response.status().as_u16());
        let response_headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = value
                    .to_str()
                    .map_err(|error| Error::InvalidHeader(format!("{name}: {error}")))?;
                Ok((name.to_string(), value.to_string()))
            })
            .collect::<Result<Headers, Error>>()?;
        let response_body = response.bytes().await.map_err(transport_error)?;

        Ok(Response {
            body: response_body.to_vec(),
            headers: response_headers,
            status,
            request: Request {
                body,
                headers,
                method,
                url: url.to_string(),
            },
        })
    }
}

fn transport_error(error: reqwest::Error) -> Error {
    match error.is_timeout() {
        true => Error::Timeout,
        false => Error::Transport(error.to_string()),
    }
}

fn header_map(headers: &Headers) -> Result<HeaderMap, Error> {
    headers
        .iter()
        .map(|(name, value)| {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|error| Error::InvalidHeader(format!("{name}: {error}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|error| Error::InvalidHeader(format!("{name}: {error}")))?;
            Ok((header_name, header_value))
        })
        .collect()
}
