//! UPnP RenderingControl SOAP messages.
//!
//! Pure builders and parsers for the two calls the knob needs, `GetVolume`
//! and `SetVolume`, always on instance 0 and the `Master` channel.  No I/O
//! happens here; [`super::sonos`] owns the HTTP side.

use std::string::String;

use crate::error::TransportError;
use crate::volume::VOLUME_MAX;

const SERVICE_URN: &str = "urn:schemas-upnp-org:service:RenderingControl:1";
const CONTROL_PATH: &str = "/MediaRenderer/RenderingControl/Control";

pub const CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

/// RenderingControl action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetVolume,
    SetVolume(u8),
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Self::GetVolume => "GetVolume",
            Self::SetVolume(_) => "SetVolume",
        }
    }
}

/// `http://<host>:<port>/MediaRenderer/RenderingControl/Control`
pub fn control_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}{CONTROL_PATH}")
}

/// Value of the `SOAPACTION` header, quotes included.
pub fn soap_action(action: Action) -> String {
    format!("\"{SERVICE_URN}#{}\"", action.name())
}

/// Full request body for `action`.
pub fn envelope(action: Action) -> String {
    let name = action.name();
    let desired = match action {
        Action::GetVolume => String::new(),
        Action::SetVolume(v) => format!("      <DesiredVolume>{}</DesiredVolume>\n", v.min(VOLUME_MAX)),
    };
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\">\n\
         \x20 <s:Body>\n\
         \x20   <u:{name} xmlns:u=\"{SERVICE_URN}\">\n\
         \x20     <InstanceID>0</InstanceID>\n\
         \x20     <Channel>Master</Channel>\n\
         {desired}\
         \x20   </u:{name}>\n\
         \x20 </s:Body>\n\
         </s:Envelope>"
    )
}

/// Extract `<CurrentVolume>` from a `GetVolumeResponse` body.
///
/// Values above 100 are clamped.
pub fn parse_current_volume(body: &str) -> Result<u8, TransportError> {
    const OPEN: &str = "<CurrentVolume>";
    const CLOSE: &str = "</CurrentVolume>";

    let start = body.find(OPEN).ok_or(TransportError::MalformedResponse)? + OPEN.len();
    let len = body[start..]
        .find(CLOSE)
        .ok_or(TransportError::MalformedResponse)?;
    let raw = body[start..start + len].trim();
    let value: u32 = raw.parse().map_err(|_| TransportError::MalformedResponse)?;
    Ok(value.min(u32::from(VOLUME_MAX)) as u8)
}
