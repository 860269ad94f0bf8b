//! The AVTransport actions this client knows how to invoke

use std::{fmt, str::FromStr};

use crate::errors::ControlError;

/// Service type of the AVTransport service, also the namespace of its action elements
pub const AV_TRANSPORT_SERVICE: &str = "urn:schemas-upnp-org:service:AVTransport:1";

/// The only instance ID this client addresses
pub const INSTANCE_ID: &str = "0";

/// One argument slot of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argument {
    /// Element name inside the action element
    pub name: &'static str,
    /// Value written when the caller supplies none; `None` means the caller must supply it
    pub default: Option<&'static str>,
}

const fn required(name: &'static str) -> Argument {
    Argument {
        name,
        default: None,
    }
}

const fn optional(name: &'static str, default: &'static str) -> Argument {
    Argument {
        name,
        default: Some(default),
    }
}

/// A supported AVTransport SOAP action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AVTransportAction {
    /// Set the current transport source
    SetAVTransportURI,
    /// Set the source that plays after the current one
    SetNextAVTransportURI,
    /// Start playback at normal speed
    Play,
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
}

impl AVTransportAction {
    /// Every supported action
    pub const ALL: [AVTransportAction; 5] = [
        AVTransportAction::SetAVTransportURI,
        AVTransportAction::SetNextAVTransportURI,
        AVTransportAction::Play,
        AVTransportAction::Pause,
        AVTransportAction::Stop,
    ];

    /// The UPnP action name
    pub fn name(&self) -> &'static str {
        match self {
            AVTransportAction::SetAVTransportURI => "SetAVTransportURI",
            AVTransportAction::SetNextAVTransportURI => "SetNextAVTransportURI",
            AVTransportAction::Play => "Play",
            AVTransportAction::Pause => "Pause",
            AVTransportAction::Stop => "Stop",
        }
    }

    /// Arguments following `InstanceID`, in the order they must appear in the envelope
    pub fn arguments(&self) -> &'static [Argument] {
        static SET_URI: [Argument; 2] = [required("CurrentURI"), optional("CurrentURIMetaData", "")];
        static SET_NEXT_URI: [Argument; 2] = [required("NextURI"), optional("NextURIMetaData", "")];
        static PLAY: [Argument; 1] = [optional("Speed", "1")];

        match self {
            AVTransportAction::SetAVTransportURI => &SET_URI,
            AVTransportAction::SetNextAVTransportURI => &SET_NEXT_URI,
            AVTransportAction::Play => &PLAY,
            AVTransportAction::Pause | AVTransportAction::Stop => &[],
        }
    }

    /// The `SOAPAction` header value, quotes included
    pub fn soap_action(&self) -> String {
        format!("\"{}#{}\"", AV_TRANSPORT_SERVICE, self.name())
    }

    /// Name of the element a renderer answers with
    pub fn response_element(&self) -> String {
        format!("{}Response", self.name())
    }
}

impl fmt::Display for AVTransportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AVTransportAction {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AVTransportAction::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| ControlError::InvalidAction(s.to_owned()))
    }
}
