use crate::error::SendError;
use async_trait::async_trait;
use tracing::debug;

#[cfg(test)]
pub mod mock;

pub const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json");

/// One outbound call to a sensor device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl DeviceRequest {
    /// Stored verb, address and body, always sent as json
    pub fn json(method: &str, url: &str, body: &str) -> Self {
        DeviceRequest {
            method: method.to_owned(),
            url: url.to_owned(),
            headers: vec![(CONTENT_TYPE_JSON.0.to_owned(), CONTENT_TYPE_JSON.1.to_owned())],
            body: body.to_owned(),
        }
    }
}

/// Something that can perform an http exchange with a device.
///
/// Resolves once the response arrived; its status and body are ignored.
#[async_trait]
pub trait HttpExchange: Send + Sync {
    async fn exchange(&self, request: DeviceRequest) -> Result<(), SendError>;
}

pub struct ReqwestExchange {
    client: reqwest::Client,
}

impl ReqwestExchange {
    pub fn new() -> Self {
        ReqwestExchange {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestExchange {
    fn default() -> Self {
        ReqwestExchange::new()
    }
}

fn parse_method(method: &str) -> Result<reqwest::Method, SendError> {
    if method.is_empty() {
        return Ok(reqwest::Method::GET);
    }
    reqwest::Method::from_bytes(method.as_bytes())
        .map_err(|_| SendError::InvalidMethod(method.to_owned()))
}

#[async_trait]
impl HttpExchange for ReqwestExchange {
    async fn exchange(&self, request: DeviceRequest) -> Result<(), SendError> {
        let method = parse_method(&request.method)?;
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| SendError::InvalidUrl(request.url.clone(), e.to_string()))?;

        let mut builder = self.client.request(method, url);
        for (key, value) in request.headers.iter() {
            builder = builder.header(key.as_str(), value.as_str());
        }
        let response = builder.body(request.body).send().await?;
        debug!("{} {} answered {}", request.method, request.url, response.status());
        Ok(())
    }
}
