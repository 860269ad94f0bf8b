//! The primary struct used for controlling renderers

use tracing::debug;

use crate::{
    actions::AVTransportAction,
    config::ClientConfig,
    description::{get_renderer_info, RendererInfo},
    errors::ControlError,
    responses::{interpret, ControlResponse},
    transport::{ControlRequest, HttpTransport, Transport},
    utils::RendererEndpoint,
    xml::build_envelope,
};

/// An AVTransport control point.
///
/// Holds no per-renderer state: every method takes the renderer's control
/// URL, sends one request per action, and can be called concurrently.
#[derive(Debug, Clone)]
pub struct ControlPoint<T = HttpTransport> {
    transport: T,
}

impl ControlPoint<HttpTransport> {
    /// Creates a control point with the default client configuration
    pub fn new() -> Result<Self, ControlError> {
        Self::with_config(&ClientConfig::default())
    }

    /// Creates a control point whose HTTP client follows `config`
    pub fn with_config(config: &ClientConfig) -> Result<Self, ControlError> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: Transport> ControlPoint<T> {
    /// Creates a control point on top of a custom transport
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn invoke(
        &self,
        endpoint: &RendererEndpoint,
        action: AVTransportAction,
        arguments: &[(&str, &str)],
    ) -> Result<ControlResponse, ControlError> {
        let envelope = build_envelope(action, arguments)?;
        let request = ControlRequest::new(endpoint, &envelope);

        debug!(action = action.name(), endpoint = %endpoint, "invoking action");

        let response = self.transport.post(&request).await?;

        interpret(action, response)
    }

    // Runs the steps in order, stopping at the first failure.
    async fn run_sequence(
        &self,
        endpoint: &RendererEndpoint,
        steps: &[(AVTransportAction, &[(&str, &str)])],
    ) -> Result<Vec<ControlResponse>, ControlError> {
        let mut responses = Vec::with_capacity(steps.len());

        for (action, arguments) in steps {
            match self.invoke(endpoint, *action, arguments).await {
                Ok(response) => responses.push(response),
                Err(err) => {
                    debug!(step = action.name(), "sequence aborted: {}", err);
                    return Err(ControlError::SequenceAborted {
                        step: *action,
                        source: Box::new(err),
                    });
                }
            }
        }

        Ok(responses)
    }

    /// Invokes an action given by its UPnP name, e.g. `"Play"`
    ///
    /// * `endpoint` - the renderer's AVTransport control URL
    /// * `action_name` - one of the supported AVTransport action names
    /// * `arguments` - the action's arguments; `InstanceID` is always sent as `0`
    pub async fn call(
        &self,
        endpoint: impl AsRef<str>,
        action_name: &str,
        arguments: &[(&str, &str)],
    ) -> Result<ControlResponse, ControlError> {
        let action = action_name.parse::<AVTransportAction>()?;
        let endpoint = RendererEndpoint::parse(endpoint.as_ref())?;

        self.invoke(&endpoint, action, arguments).await
    }

    /// Sets the renderer's current transport source
    ///
    /// * `media_uri` - the URI of the media resource to play
    pub async fn set_transport_uri(
        &self,
        endpoint: impl AsRef<str>,
        media_uri: &str,
    ) -> Result<ControlResponse, ControlError> {
        let endpoint = RendererEndpoint::parse(endpoint.as_ref())?;

        self.invoke(
            &endpoint,
            AVTransportAction::SetAVTransportURI,
            &[("CurrentURI", media_uri)],
        )
        .await
    }

    /// Sets the source the renderer plays once the current one ends
    ///
    /// * `media_uri` - the URI of the media resource to queue
    pub async fn set_next_transport_uri(
        &self,
        endpoint: impl AsRef<str>,
        media_uri: &str,
    ) -> Result<ControlResponse, ControlError> {
        let endpoint = RendererEndpoint::parse(endpoint.as_ref())?;

        self.invoke(
            &endpoint,
            AVTransportAction::SetNextAVTransportURI,
            &[("NextURI", media_uri)],
        )
        .await
    }

    /// Starts playback at normal speed
    pub async fn play(&self, endpoint: impl AsRef<str>) -> Result<ControlResponse, ControlError> {
        let endpoint = RendererEndpoint::parse(endpoint.as_ref())?;

        self.invoke(&endpoint, AVTransportAction::Play, &[("Speed", "1")])
            .await
    }

    /// Pauses playback
    pub async fn pause(&self, endpoint: impl AsRef<str>) -> Result<ControlResponse, ControlError> {
        let endpoint = RendererEndpoint::parse(endpoint.as_ref())?;

        self.invoke(&endpoint, AVTransportAction::Pause, &[]).await
    }

    /// Stops playback
    pub async fn stop(&self, endpoint: impl AsRef<str>) -> Result<ControlResponse, ControlError> {
        let endpoint = RendererEndpoint::parse(endpoint.as_ref())?;

        self.invoke(&endpoint, AVTransportAction::Stop, &[]).await
    }

    /// Queues `media_uri` as the next source, then starts playback.
    ///
    /// Play is only sent once SetNextAVTransportURI has succeeded. A failing
    /// step is reported as [`ControlError::SequenceAborted`] naming that step.
    /// Returns the responses of both steps, in order.
    pub async fn queue_and_play(
        &self,
        endpoint: impl AsRef<str>,
        media_uri: &str,
    ) -> Result<Vec<ControlResponse>, ControlError> {
        let endpoint = RendererEndpoint::parse(endpoint.as_ref())?;

        let steps: [(AVTransportAction, &[(&str, &str)]); 2] = [
            (AVTransportAction::SetNextAVTransportURI, &[("NextURI", media_uri)]),
            (AVTransportAction::Play, &[("Speed", "1")]),
        ];

        self.run_sequence(&endpoint, &steps).await
    }

    /// Replaces the current source with `media_uri`, then starts playback.
    ///
    /// Same abort behavior as [`ControlPoint::queue_and_play`].
    pub async fn set_and_play(
        &self,
        endpoint: impl AsRef<str>,
        media_uri: &str,
    ) -> Result<Vec<ControlResponse>, ControlError> {
        let endpoint = RendererEndpoint::parse(endpoint.as_ref())?;

        let steps: [(AVTransportAction, &[(&str, &str)]); 2] = [
            (AVTransportAction::SetAVTransportURI, &[("CurrentURI", media_uri)]),
            (AVTransportAction::Play, &[("Speed", "1")]),
        ];

        self.run_sequence(&endpoint, &steps).await
    }

    /// Reads a renderer's device description and returns its AVTransport control URL
    ///
    /// * `description_url` - the absolute URL of the device description XML
    pub async fn resolve_endpoint(&self, description_url: &str) -> Result<RendererInfo, ControlError> {
        get_renderer_info(&self.transport, description_url).await
    }
}
