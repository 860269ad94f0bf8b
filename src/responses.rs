//! Structs used to report the outcome of a control call

use std::fmt;

use roxmltree::Document;
use tracing::warn;

use crate::{
    actions::AVTransportAction,
    errors::{ControlError, TransportError},
    transport::RawResponse,
    xml::{parse_fault, parse_output_arguments},
};

/// A successful control call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    /// The action that was invoked
    pub action: AVTransportAction,
    /// The HTTP status the renderer answered with (always 2xx)
    pub status: u16,
    /// The raw response body, if the renderer sent one
    pub body: Option<String>,
    /// Output arguments found in `<u:{Action}Response>`, in document order
    pub arguments: Vec<(String, String)>,
}

impl ControlResponse {
    /// Looks up an output argument by name
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A SOAP fault returned by a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// The HTTP status the fault arrived with (usually 500)
    pub status: u16,
    /// `faultcode`, e.g. `s:Client`
    pub fault_code: String,
    /// `faultstring`, usually `UPnPError`
    pub fault_string: String,
    /// The UPnP `errorCode` from the fault detail, e.g. 701 for "transition not available"
    pub error_code: Option<u32>,
    /// The UPnP `errorDescription` from the fault detail
    pub error_description: Option<String>,
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.fault_string, self.fault_code)?;

        if let Some(code) = self.error_code {
            write!(f, ", UPnP error {}", code)?;
        }

        if let Some(description) = &self.error_description {
            write!(f, ": {}", description)?;
        }

        Ok(())
    }
}

/// Classifies a raw HTTP exchange for `action`.
///
/// A fault body wins over the status code, since renderers report UPnP
/// errors as HTTP 500 with a fault. Other non-2xx statuses become
/// [`TransportError::Status`].
pub fn interpret(
    action: AVTransportAction,
    response: RawResponse,
) -> Result<ControlResponse, ControlError> {
    let RawResponse { status, body, .. } = response;
    let success = (200..300).contains(&status);

    let (fault, arguments) = {
        let parsed = if body.trim().is_empty() {
            None
        } else {
            match Document::parse(&body) {
                Ok(document) => Some(document),
                Err(err) => {
                    if success {
                        warn!(action = action.name(), status, "renderer answered with a non-XML body: {}", err);
                    }
                    None
                }
            }
        };

        let fault = parsed.as_ref().and_then(|document| parse_fault(document, status));
        let arguments = parsed
            .as_ref()
            .filter(|_| success && fault.is_none())
            .map(|document| parse_output_arguments(document, action))
            .unwrap_or_default();

        (fault, arguments)
    };

    if let Some(fault) = fault {
        warn!(action = action.name(), status, "renderer returned a SOAP fault: {}", fault);
        return Err(ControlError::SoapFault(fault));
    }

    if !success {
        return Err(TransportError::Status { status, body }.into());
    }

    Ok(ControlResponse {
        action,
        status,
        body: (!body.trim().is_empty()).then_some(body),
        arguments,
    })
}
