//! Resources for locating a renderer's AVTransport control URL from its device description

use tracing::debug;

use crate::{
    errors::{ControlError, TransportError},
    transport::Transport,
    utils::RendererEndpoint,
    xml::parse_description_xml,
};

/// Basic renderer data read from a UPnP device description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererInfo {
    /// Human-readable device name
    pub friendly_name: String,
    /// Device manufacturer, if listed
    pub manufacturer: Option<String>,
    /// Device model name, if listed
    pub model_name: Option<String>,
    /// Absolute control URL of the device's AVTransport service
    pub av_transport: RendererEndpoint,
}

/// Fetches the device description at `description_url` and returns the renderer's
/// AVTransport control URL along with its names
///
/// * `description_url` - the absolute URL of the device description XML, as
///   advertised in the `LOCATION` header of an SSDP response
pub async fn get_renderer_info<T: Transport + ?Sized>(
    transport: &T,
    description_url: &str,
) -> Result<RendererInfo, ControlError> {
    let description_url = RendererEndpoint::parse(description_url)?;

    let response = transport.get(description_url.as_str()).await?;

    if !(200..300).contains(&response.status) {
        return Err(TransportError::Status {
            status: response.status,
            body: response.body,
        }
        .into());
    }

    let info = parse_description_xml(&response.body, description_url.url())?;
    debug!(
        friendly_name = %info.friendly_name,
        control_url = %info.av_transport,
        "resolved AVTransport control URL"
    );

    Ok(info)
}
