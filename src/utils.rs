use std::fmt;

use reqwest::Url;

use crate::errors::ControlError;

/// A validated control URL of a renderer's AVTransport service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RendererEndpoint {
    url: Url,
}

impl RendererEndpoint {
    /// Validates an absolute `http` or `https` URL.
    ///
    /// Empty strings are rejected instead of being sent anywhere. The URL is
    /// stored in WHATWG normal form, which is also what the HTTP client puts
    /// on the request line: the host is lowercased, a default port is
    /// dropped and an empty path becomes `/`. Path and query are kept as given.
    pub fn parse(endpoint: &str) -> Result<Self, ControlError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(ControlError::InvalidEndpoint(
                "renderer URL is empty".to_owned(),
            ));
        }

        let url = Url::parse(endpoint)
            .map_err(|err| ControlError::InvalidEndpoint(format!("{endpoint}: {err}")))?;

        Self::from_url(url)
    }

    /// Resolves a possibly relative control URL against a description's base URL
    pub(crate) fn resolve(base: &Url, control_url: &str) -> Result<Self, ControlError> {
        let url = base
            .join(control_url)
            .map_err(|err| ControlError::InvalidEndpoint(format!("{control_url}: {err}")))?;

        Self::from_url(url)
    }

    fn from_url(url: Url) -> Result<Self, ControlError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ControlError::InvalidEndpoint(format!(
                "{url}: unsupported scheme {}",
                url.scheme()
            )));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(ControlError::InvalidEndpoint(format!("{url}: missing host")));
        }

        Ok(Self { url })
    }

    /// The normalized URL requests are sent to
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The parsed URL
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl AsRef<str> for RendererEndpoint {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RendererEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_path_and_port() {
        let endpoint = RendererEndpoint::parse("http://192.168.1.10:8080/AVTransport/Control?x=1").unwrap();

        assert_eq!(endpoint.as_str(), "http://192.168.1.10:8080/AVTransport/Control?x=1");
        assert_eq!(endpoint.url().port(), Some(8080));
    }

    #[test]
    fn test_parse_normalizes_url() {
        let cases = [
            ("http://host:80/ctl", "http://host/ctl"),
            ("https://host:443/ctl", "https://host/ctl"),
            ("http://HOST/ctl", "http://host/ctl"),
            ("http://host", "http://host/"),
            ("  http://host:8080/ctl  ", "http://host:8080/ctl"),
        ];

        for (given, normalized) in cases {
            assert_eq!(RendererEndpoint::parse(given).unwrap().as_str(), normalized);
        }
    }

    #[test]
    fn test_parse_rejects_bad_endpoints() {
        for bad in ["", "   ", "not a url", "/AVTransport/Control", "ftp://10.0.0.1/control", "file:///tmp/x"] {
            assert!(
                matches!(RendererEndpoint::parse(bad), Err(ControlError::InvalidEndpoint(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_relative_control_url() {
        let base = Url::parse("http://10.0.0.2:1400/xml/device_description.xml").unwrap();

        let absolute_path = RendererEndpoint::resolve(&base, "/MediaRenderer/AVTransport/Control").unwrap();
        assert_eq!(absolute_path.as_str(), "http://10.0.0.2:1400/MediaRenderer/AVTransport/Control");

        let relative = RendererEndpoint::resolve(&base, "avt/control").unwrap();
        assert_eq!(relative.as_str(), "http://10.0.0.2:1400/xml/avt/control");

        let absolute = RendererEndpoint::resolve(&base, "https://10.0.0.3/ctl").unwrap();
        assert_eq!(absolute.as_str(), "https://10.0.0.3/ctl");
    }
}
