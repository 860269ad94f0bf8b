#![warn(missing_docs)]

//! # avtransport-control
//! A Rust library for controlling UPnP/DLNA media renderers through their AVTransport service
//!
//! Playing a file on a renderer:
//! ```no_run
//! # use avtransport_control::ControlPoint;
//! # async fn run() -> Result<(), avtransport_control::ControlError> {
//! let control_url = "http://192.168.1.10:8080/AVTransport/Control";
//!
//! let control_point = ControlPoint::new()?;
//!
//! control_point
//!     .set_transport_uri(control_url, "http://media.local/movie.mp4")
//!     .await?;
//! control_point.play(control_url).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Finding the control URL from a device description:
//! ```no_run
//! # use avtransport_control::ControlPoint;
//! # async fn run() -> Result<(), avtransport_control::ControlError> {
//! let control_point = ControlPoint::new()?;
//!
//! let renderer = control_point
//!     .resolve_endpoint("http://192.168.1.10:8080/description.xml")
//!     .await?;
//!
//! println!("{} -> {}", renderer.friendly_name, renderer.av_transport);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod config;
pub mod control_point;
pub mod description;
pub mod errors;
pub mod responses;
pub mod transport;
mod utils;
pub mod xml;

pub use actions::AVTransportAction;
pub use config::ClientConfig;
pub use control_point::ControlPoint;
pub use description::RendererInfo;
pub use errors::{ControlError, TransportError};
pub use responses::{ControlResponse, SoapFault};
pub use transport::{ControlRequest, HttpTransport, RawResponse, Transport};
pub use utils::RendererEndpoint;
pub use xml::{build_envelope, build_envelope_for, SoapEnvelope};
