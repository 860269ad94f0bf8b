//! Sending envelopes to renderers over HTTP

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy};
use tracing::{debug, warn};

use crate::{config::ClientConfig, errors::TransportError, utils::RendererEndpoint, xml::SoapEnvelope};

const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// A fully prepared control request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    /// Control URL of the renderer's AVTransport service
    pub url: String,
    /// `SOAPAction` header value, quotes included
    pub soap_action: String,
    /// The serialized envelope
    pub body: String,
}

impl ControlRequest {
    /// Pairs an envelope with the endpoint it is sent to
    pub fn new(endpoint: &RendererEndpoint, envelope: &SoapEnvelope) -> Self {
        Self {
            url: endpoint.as_str().to_owned(),
            soap_action: envelope.soap_action(),
            body: envelope.body().to_owned(),
        }
    }
}

/// What came back over HTTP, whatever the status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers whose values are valid strings
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: String,
}

impl RawResponse {
    async fn read(response: reqwest::Response) -> Result<Self, TransportError> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = response.text().await?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Looks up a header, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The HTTP exchange underneath the control point.
///
/// Implementations must return non-2xx responses as [`RawResponse`]s rather
/// than errors, so that SOAP faults carried by HTTP 500 can be read.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs a control request
    async fn post(&self, request: &ControlRequest) -> Result<RawResponse, TransportError>;

    /// GETs a document such as a device description
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a client with finite timeouts, no automatic redirects, and TLS
    /// verification unless the config explicitly disables it
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for renderer requests");
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| TransportError::Request(format!("unable to build HTTP client: {err}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: &ControlRequest) -> Result<RawResponse, TransportError> {
        debug!(url = %request.url, soap_action = %request.soap_action, "sending control request");

        let response = self
            .client
            .post(request.url.as_str())
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", request.soap_action.as_str())
            .body(request.body.clone())
            .send()
            .await?;

        let response = RawResponse::read(response).await?;
        debug!(url = %request.url, status = response.status, "renderer responded");

        Ok(response)
    }

    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        debug!(url, "fetching document");

        let response = self.client.get(url).send().await?;

        RawResponse::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_default_config() {
        assert!(HttpTransport::new(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let response = RawResponse {
            status: 200,
            headers: vec![("content-type".into(), "text/xml".into())],
            body: String::new(),
        };

        assert_eq!(response.header("Content-Type"), Some("text/xml"));
        assert_eq!(response.header("SOAPAction"), None);
    }

    #[test]
    fn test_request_carries_matching_soap_action() {
        let endpoint = RendererEndpoint::parse("http://192.168.1.10:8080/AVTransport/Control").unwrap();
        let envelope = crate::xml::build_envelope(crate::AVTransportAction::Play, &[]).unwrap();
        let request = ControlRequest::new(&endpoint, &envelope);

        assert_eq!(request.url, "http://192.168.1.10:8080/AVTransport/Control");
        assert_eq!(
            request.soap_action,
            "\"urn:schemas-upnp-org:service:AVTransport:1#Play\""
        );
        assert_eq!(request.body, envelope.body());
    }
}
