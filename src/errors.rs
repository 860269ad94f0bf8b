//! Crate errors

use thiserror::Error;

use crate::{actions::AVTransportAction, responses::SoapFault};

/// An XML-related error
#[derive(Debug, Error)]
pub enum XMLError {
    /// Parsing error
    #[error("error parsing XML: {0}")]
    ParseError(#[from] roxmltree::Error),
    /// Element not found in XML
    #[error("element not found: {0}")]
    ElementNotFound(String),
    /// An error occurred while building XML
    #[error("error building XML: {0}")]
    BuilderError(String),
}

impl From<xml_builder::XMLError> for XMLError {
    fn from(error: xml_builder::XMLError) -> Self {
        XMLError::BuilderError(error.to_string())
    }
}

/// Failures below the SOAP layer: the renderer could not be reached, did not
/// answer in time, or answered with a non-2xx status and no SOAP fault
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established (refused, DNS failure, TLS handshake)
    #[error("connection failed: {0}")]
    Connect(String),
    /// The connect or request timeout elapsed
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Any other failure while sending the request or reading the response
    #[error("request failed: {0}")]
    Request(String),
    /// The renderer answered with a non-2xx status that carried no SOAP fault
    #[error("renderer responded with HTTP {status}")]
    Status {
        /// The HTTP status code
        status: u16,
        /// The raw response body, possibly empty
        body: String,
    },
}

impl TransportError {
    /// The HTTP status attached to this error, if the renderer answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the request could reasonably succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Connect(_) | TransportError::Timeout(_) | TransportError::Request(_) => {
                true
            }
            TransportError::Status { status, .. } => *status >= 500,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

/// Errors that may be returned from control-point operations
#[derive(Debug, Error)]
pub enum ControlError {
    /// The requested action is not part of the supported AVTransport action set
    #[error("unsupported AVTransport action: {0}")]
    InvalidAction(String),
    /// A required argument was absent (or empty) for the given action
    #[error("missing parameter {parameter} for {action}")]
    MissingParameter {
        /// The action being built
        action: AVTransportAction,
        /// The name of the absent argument
        parameter: &'static str,
    },
    /// The renderer endpoint was empty, unparseable, or not http/https
    #[error("invalid renderer endpoint: {0}")]
    InvalidEndpoint(String),
    /// The request never produced a usable HTTP exchange, or the status was non-2xx
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// The renderer returned a well-formed SOAP fault
    #[error("SOAP fault: {0}")]
    SoapFault(SoapFault),
    /// A composite operation stopped because one of its steps failed
    #[error("sequence aborted at {step}: {source}")]
    SequenceAborted {
        /// The step that failed
        step: AVTransportAction,
        /// Why it failed
        source: Box<ControlError>,
    },
    /// An XML-related error
    #[error("XML error: {0}")]
    Xml(#[from] XMLError),
    /// The device description did not list the requested service
    #[error("service not found in device description: {0}")]
    ServiceNotFound(String),
}

impl ControlError {
    /// Whether the caller may retry the failed operation, possibly with backoff.
    ///
    /// Only transport-level failures qualify; SOAP faults and caller errors
    /// will fail again in the same way.
    pub fn is_retryable(&self) -> bool {
        match self {
            ControlError::Transport(error) => error.is_retryable(),
            ControlError::SequenceAborted { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// The SOAP fault behind this error, looking through aborted sequences
    pub fn soap_fault(&self) -> Option<&SoapFault> {
        match self {
            ControlError::SoapFault(fault) => Some(fault),
            ControlError::SequenceAborted { source, .. } => source.soap_fault(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_retryability() {
        let server_error = TransportError::Status {
            status: 503,
            body: String::new(),
        };
        let client_error = TransportError::Status {
            status: 404,
            body: String::new(),
        };

        assert!(server_error.is_retryable());
        assert!(!client_error.is_retryable());
        assert_eq!(client_error.status(), Some(404));
        assert_eq!(TransportError::Timeout("slow".into()).status(), None);
    }

    #[test]
    fn test_sequence_aborted_exposes_inner_fault() {
        let fault = SoapFault {
            status: 500,
            fault_code: "s:Client".into(),
            fault_string: "UPnPError".into(),
            error_code: Some(701),
            error_description: Some("Transition not available".into()),
        };
        let error = ControlError::SequenceAborted {
            step: AVTransportAction::SetNextAVTransportURI,
            source: Box::new(ControlError::SoapFault(fault)),
        };

        assert!(!error.is_retryable());
        assert_eq!(error.soap_fault().and_then(|f| f.error_code), Some(701));
        assert!(error.to_string().starts_with("sequence aborted at SetNextAVTransportURI"));
    }

    #[test]
    fn test_aborted_timeout_is_retryable() {
        let error = ControlError::SequenceAborted {
            step: AVTransportAction::Play,
            source: Box::new(ControlError::Transport(TransportError::Timeout(
                "deadline elapsed".into(),
            ))),
        };

        assert!(error.is_retryable());
        assert!(error.soap_fault().is_none());
    }
}
