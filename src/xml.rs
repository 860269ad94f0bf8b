//! Building SOAP envelopes and reading renderer XML

use reqwest::Url;
use quick_xml::escape::escape;
use roxmltree::{Document, Node};
use tracing::debug;
use xml_builder::{XMLBuilder, XMLElement, XMLVersion};

use crate::{
    actions::{AVTransportAction, AV_TRANSPORT_SERVICE, INSTANCE_ID},
    description::RendererInfo,
    errors::{ControlError, XMLError},
    responses::SoapFault,
    utils::RendererEndpoint,
};

const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_ENCODING_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";
const AV_TRANSPORT_SERVICE_PREFIX: &str = "urn:schemas-upnp-org:service:AVTransport:";

/// A serialized SOAP request for one AVTransport action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapEnvelope {
    action: AVTransportAction,
    body: String,
}

impl SoapEnvelope {
    /// The action this envelope invokes
    pub fn action(&self) -> AVTransportAction {
        self.action
    }

    /// The XML document, declaration included
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The `SOAPAction` header that must accompany this envelope
    pub fn soap_action(&self) -> String {
        self.action.soap_action()
    }
}

/// Builds the envelope for an action given by its UPnP name.
///
/// Fails with [`ControlError::InvalidAction`] for names outside the supported set.
pub fn build_envelope_for(
    action_name: &str,
    arguments: &[(&str, &str)],
) -> Result<SoapEnvelope, ControlError> {
    let action = action_name.parse::<AVTransportAction>()?;
    build_envelope(action, arguments)
}

/// Builds the envelope for `action`.
///
/// Arguments are written in the order the action declares them, falling back
/// to each argument's default when the caller does not supply it. `InstanceID`
/// is always `0`. Values are XML-escaped before they are written, so
/// `&`, `<`, `>`, `"` and `'` never appear raw inside an argument.
pub fn build_envelope(
    action: AVTransportAction,
    arguments: &[(&str, &str)],
) -> Result<SoapEnvelope, ControlError> {
    let mut values = Vec::with_capacity(action.arguments().len() + 1);
    values.push(("InstanceID", INSTANCE_ID));

    for argument in action.arguments() {
        let supplied = arguments
            .iter()
            .find(|(name, _)| *name == argument.name)
            .map(|(_, value)| *value);

        let value = match supplied.filter(|v| !v.is_empty()).or(argument.default) {
            Some(value) => value,
            None => {
                return Err(ControlError::MissingParameter {
                    action,
                    parameter: argument.name,
                })
            }
        };

        values.push((argument.name, value));
    }

    for (name, _) in arguments {
        let declared = *name == "InstanceID" || action.arguments().iter().any(|a| a.name == *name);
        if !declared {
            debug!(action = action.name(), argument = *name, "ignoring undeclared argument");
        }
    }

    let body = generate_xml(action, &values)?;

    Ok(SoapEnvelope { action, body })
}

fn generate_xml(action: AVTransportAction, values: &[(&str, &str)]) -> Result<String, XMLError> {
    let mut xml = XMLBuilder::new()
        .version(XMLVersion::XML1_0)
        .encoding("utf-8".into())
        .build();

    let mut envelope = XMLElement::new("s:Envelope");
    envelope.add_attribute("xmlns:s", SOAP_ENVELOPE_NS);
    envelope.add_attribute("s:encodingStyle", SOAP_ENCODING_NS);

    let mut body = XMLElement::new("s:Body");

    let mut action_element = XMLElement::new(&format!("u:{}", action.name()));
    action_element.add_attribute("xmlns:u", AV_TRANSPORT_SERVICE);

    for (name, value) in values {
        let mut argument = XMLElement::new(name);
        // xml-builder writes text content verbatim
        argument.add_text(escape(*value).into_owned())?;
        action_element.add_child(argument)?;
    }

    body.add_child(action_element)?;

    envelope.add_child(body)?;

    xml.set_root_element(envelope);

    let mut writer = Vec::new();
    xml.generate(&mut writer)?;

    String::from_utf8(writer).map_err(|err| XMLError::BuilderError(err.to_string()))
}

pub(crate) fn get_tag_by_name<'a>(
    parsed_xml: &'a Document,
    tag_name: &str,
) -> Result<Node<'a, 'a>, XMLError> {
    let tag = parsed_xml
        .descendants()
        .find(|n| n.has_tag_name(tag_name))
        .ok_or(XMLError::ElementNotFound(tag_name.to_string()))?;

    Ok(tag)
}

pub(crate) fn get_tag_by_name_node<'a>(
    parsed_xml: &Node<'a, 'a>,
    tag_name: &str,
) -> Result<Node<'a, 'a>, XMLError> {
    let tag = parsed_xml
        .descendants()
        .find(|n| n.has_tag_name(tag_name))
        .ok_or(XMLError::ElementNotFound(tag_name.to_string()))?;

    Ok(tag)
}

pub(crate) fn get_text(node: Node<'_, '_>) -> Result<String, XMLError> {
    node.text()
        .map(|text| text.trim().to_owned())
        .ok_or(XMLError::ElementNotFound(
            node.tag_name().name().to_string(),
        ))
}

fn optional_text(parent: &Node, tag_name: &str) -> Option<String> {
    get_tag_by_name_node(parent, tag_name)
        .ok()
        .and_then(|node| node.text())
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Extracts the SOAP fault from a response body, if it carries one.
///
/// Only `s:Envelope/s:Body/s:Fault` counts; elements named `Fault` elsewhere
/// (output arguments, embedded metadata) are ignored.
pub(crate) fn parse_fault(parsed_xml: &Document, status: u16) -> Option<SoapFault> {
    let envelope = parsed_xml.root_element();
    if !envelope.has_tag_name((SOAP_ENVELOPE_NS, "Envelope")) {
        return None;
    }

    let body = envelope
        .children()
        .find(|n| n.has_tag_name((SOAP_ENVELOPE_NS, "Body")))?;
    let fault = body
        .children()
        .find(|n| n.has_tag_name((SOAP_ENVELOPE_NS, "Fault")))?;

    Some(SoapFault {
        status,
        fault_code: optional_text(&fault, "faultcode").unwrap_or_default(),
        fault_string: optional_text(&fault, "faultstring").unwrap_or_default(),
        error_code: optional_text(&fault, "errorCode").and_then(|code| code.parse::<u32>().ok()),
        error_description: optional_text(&fault, "errorDescription"),
    })
}

/// Collects the output arguments of `<u:{Action}Response>`, in document order
pub(crate) fn parse_output_arguments(
    parsed_xml: &Document,
    action: AVTransportAction,
) -> Vec<(String, String)> {
    let response_element = action.response_element();

    parsed_xml
        .descendants()
        .find(|n| n.has_tag_name(response_element.as_str()))
        .map(|response| {
            response
                .children()
                .filter(|n| n.is_element())
                .map(|argument| {
                    (
                        argument.tag_name().name().to_owned(),
                        argument.text().unwrap_or_default().to_owned(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn parse_description_xml(
    xml: &str,
    description_url: &Url,
) -> Result<RendererInfo, ControlError> {
    let parsed_xml = Document::parse(xml).map_err(XMLError::from)?;

    let friendly_name = get_text(get_tag_by_name(&parsed_xml, "friendlyName")?)?;

    let root = parsed_xml.root_element();
    let manufacturer = optional_text(&root, "manufacturer");
    let model_name = optional_text(&root, "modelName");

    let base = match optional_text(&root, "URLBase") {
        Some(url_base) => Url::parse(&url_base).map_err(|err| {
            ControlError::InvalidEndpoint(format!("invalid URLBase {}: {}", url_base, err))
        })?,
        None => description_url.clone(),
    };

    let service = parsed_xml
        .descendants()
        .filter(|n| n.has_tag_name("service"))
        .find(|service| {
            optional_text(service, "serviceType")
                .map(|service_type| service_type.starts_with(AV_TRANSPORT_SERVICE_PREFIX))
                .unwrap_or(false)
        })
        .ok_or_else(|| ControlError::ServiceNotFound(AV_TRANSPORT_SERVICE_PREFIX.to_owned()))?;

    let control_url = get_text(get_tag_by_name_node(&service, "controlURL")?)?;

    Ok(RendererInfo {
        friendly_name,
        manufacturer,
        model_name,
        av_transport: RendererEndpoint::resolve(&base, &control_url)?,
    })
}
