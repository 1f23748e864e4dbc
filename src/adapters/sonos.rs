//! Sonos speaker adapter.
//!
//! Implements [`SpeakerPort`] over UPnP RenderingControl (SOAP over HTTP
//! on port 1400).  Each call opens its own connection and blocks for at
//! most the configured HTTP timeout.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` + `embedded_svc` client.
//! - **all other targets**: in-memory volumes for host-side runs and tests.

use log::debug;
#[cfg(target_os = "espidf")]
use log::warn;

use super::soap::{self, Action};
use crate::app::ports::SpeakerPort;
use crate::config::{KnobConfig, SpeakerConfig};
use crate::error::TransportError;
use crate::volume::OutputRole;

#[cfg(target_os = "espidf")]
use {
    core::time::Duration,
    embedded_svc::http::client::Client as HttpClient,
    esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection},
    esp_idf_svc::io::{Read, Write},
};

/// Largest response body accepted (a `GetVolumeResponse` is ~400 bytes).
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const MAX_RESPONSE_BYTES: usize = 2048;

/// Drain a response into `buf` until `read` reports EOF.  A body that
/// fills `buf` exactly is fine; one more byte after that is an overflow.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn read_body(
    buf: &mut [u8],
    mut read: impl FnMut(&mut [u8]) -> Result<usize, TransportError>,
) -> Result<usize, TransportError> {
    let mut len = 0;
    while len < buf.len() {
        match read(&mut buf[len..])? {
            0 => return Ok(len),
            n => len += n,
        }
    }
    let mut spill = [0u8; 1];
    match read(&mut spill)? {
        0 => Ok(len),
        _ => Err(TransportError::BufferOverflow),
    }
}

fn slot(role: OutputRole) -> usize {
    match role {
        OutputRole::Primary => 0,
        OutputRole::Secondary => 1,
    }
}

pub struct SonosTransport {
    names: [heapless::String<16>; 2],
    urls: [std::string::String; 2],
    #[cfg(target_os = "espidf")]
    timeout_ms: u32,
    /// Simulation: last volume set per output.
    #[cfg(not(target_os = "espidf"))]
    sim_volumes: [u8; 2],
    /// Simulation: fail every request as if the speaker were unreachable.
    #[cfg(not(target_os = "espidf"))]
    sim_offline: bool,
}

impl SonosTransport {
    pub fn new(config: &KnobConfig) -> Self {
        let url = |s: &SpeakerConfig| soap::control_url(&s.host, s.port);
        Self {
            names: [config.primary.name.clone(), config.secondary.name.clone()],
            urls: [url(&config.primary), url(&config.secondary)],
            #[cfg(target_os = "espidf")]
            timeout_ms: config.http_timeout_ms,
            #[cfg(not(target_os = "espidf"))]
            sim_volumes: [0; 2],
            #[cfg(not(target_os = "espidf"))]
            sim_offline: false,
        }
    }

    /// Speaker name configured for `role` (e.g. "Kitchen").
    pub fn name(&self, role: OutputRole) -> &str {
        &self.names[slot(role)]
    }

    pub fn control_url(&self, role: OutputRole) -> &str {
        &self.urls[slot(role)]
    }

    // ── Platform-specific ─────────────────────────────────────

    /// POST `action` and return the response body on HTTP 200.
    #[cfg(target_os = "espidf")]
    fn post(&mut self, role: OutputRole, action: Action) -> Result<std::string::String, TransportError> {
        let url = &self.urls[slot(role)];
        let body = soap::envelope(action);
        let soap_action = soap::soap_action(action);
        let content_length = body.len().to_string();
        let headers = [
            ("Content-Type", soap::CONTENT_TYPE),
            ("SOAPACTION", soap_action.as_str()),
            ("Content-Length", content_length.as_str()),
        ];

        let config = HttpConfiguration {
            timeout: Some(Duration::from_millis(u64::from(self.timeout_ms))),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&config).map_err(|e| {
            warn!("Sonos: HTTP client init failed: {:?}", e);
            TransportError::Connect
        })?;
        let mut client = HttpClient::wrap(conn);

        let mut request = client
            .post(url, &headers)
            .map_err(|_| TransportError::Connect)?;
        request
            .write_all(body.as_bytes())
            .map_err(|_| TransportError::Connect)?;
        request.flush().map_err(|_| TransportError::Connect)?;

        let mut response = request.submit().map_err(|_| TransportError::Connect)?;
        let status = response.status();
        if status != 200 {
            return Err(TransportError::HttpStatus(status));
        }

        let mut buf = [0u8; MAX_RESPONSE_BYTES];
        let len = read_body(&mut buf, |chunk| {
            response.read(chunk).map_err(|_| TransportError::Connect)
        })?;
        Ok(std::string::String::from_utf8_lossy(&buf[..len]).into_owned())
    }

    #[cfg(not(target_os = "espidf"))]
    fn post(&mut self, role: OutputRole, action: Action) -> Result<std::string::String, TransportError> {
        if self.sim_offline {
            return Err(TransportError::Connect);
        }
        let idx = slot(role);
        Ok(match action {
            Action::GetVolume => format!("<CurrentVolume>{}</CurrentVolume>", self.sim_volumes[idx]),
            Action::SetVolume(v) => {
                self.sim_volumes[idx] = v;
                std::string::String::new()
            }
        })
    }

    /// Simulation: preset the volume a speaker reports.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_remote(&mut self, role: OutputRole, volume: u8) {
        self.sim_volumes[slot(role)] = volume;
    }

    /// Simulation: volume last applied to a speaker.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_remote(&self, role: OutputRole) -> u8 {
        self.sim_volumes[slot(role)]
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_offline(&mut self, offline: bool) {
        self.sim_offline = offline;
    }
}

// ───────────────────────────────────────────────────────────────
// SpeakerPort
// ───────────────────────────────────────────────────────────────

impl SpeakerPort for SonosTransport {
    fn get_volume(&mut self, output: OutputRole) -> Result<u8, TransportError> {
        let body = self.post(output, Action::GetVolume)?;
        let volume = soap::parse_current_volume(&body)?;
        debug!("Sonos: {} reports volume {}", self.name(output), volume);
        Ok(volume)
    }

    fn set_volume(&mut self, output: OutputRole, volume: u8) -> Result<(), TransportError> {
        self.post(output, Action::SetVolume(volume))?;
        debug!("Sonos: {} <- {}", self.name(output), volume);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> SonosTransport {
        SonosTransport::new(&KnobConfig::default())
    }

    #[test]
    fn urls_follow_config() {
        let t = transport();
        assert_eq!(
            t.control_url(OutputRole::Primary),
            "http://192.168.1.166:1400/MediaRenderer/RenderingControl/Control"
        );
        assert_eq!(
            t.control_url(OutputRole::Secondary),
            "http://192.168.1.184:1400/MediaRenderer/RenderingControl/Control"
        );
        assert_eq!(t.name(OutputRole::Secondary), "Dining");
    }

    #[test]
    fn set_then_get_roundtrips_through_soap() {
        let mut t = transport();
        t.set_volume(OutputRole::Secondary, 42).unwrap();
        assert_eq!(t.sim_remote(OutputRole::Secondary), 42);
        assert_eq!(t.sim_remote(OutputRole::Primary), 0);
        assert_eq!(t.get_volume(OutputRole::Secondary), Ok(42));
    }

    #[test]
    fn preset_remote_volume_is_read_back() {
        let mut t = transport();
        t.sim_set_remote(OutputRole::Primary, 25);
        assert_eq!(t.get_volume(OutputRole::Primary), Ok(25));
    }

    /// Serves `body` in chunks of at most `chunk` bytes, then EOF.
    fn chunked(body: &[u8], chunk: usize) -> impl FnMut(&mut [u8]) -> Result<usize, TransportError> + '_ {
        let mut at = 0;
        move |out: &mut [u8]| {
            let n = chunk.min(out.len()).min(body.len() - at);
            out[..n].copy_from_slice(&body[at..at + n]);
            at += n;
            Ok(n)
        }
    }

    #[test]
    fn body_filling_buffer_exactly_is_accepted() {
        let body = vec![b'x'; MAX_RESPONSE_BYTES];
        let mut buf = [0u8; MAX_RESPONSE_BYTES];
        assert_eq!(read_body(&mut buf, chunked(&body, 512)), Ok(MAX_RESPONSE_BYTES));
    }

    #[test]
    fn body_one_byte_too_long_overflows() {
        let body = vec![b'x'; MAX_RESPONSE_BYTES + 1];
        let mut buf = [0u8; MAX_RESPONSE_BYTES];
        assert_eq!(
            read_body(&mut buf, chunked(&body, 700)),
            Err(TransportError::BufferOverflow)
        );
    }

    #[test]
    fn short_body_and_read_errors() {
        let mut buf = [0u8; MAX_RESPONSE_BYTES];
        assert_eq!(read_body(&mut buf, chunked(b"<CurrentVolume>7</CurrentVolume>", 5)), Ok(32));
        assert_eq!(&buf[..15], b"<CurrentVolume>");
        assert_eq!(
            read_body(&mut buf, |_| Err(TransportError::Connect)),
            Err(TransportError::Connect)
        );
    }

    #[test]
    fn offline_speaker_reports_connect_error() {
        let mut t = transport();
        t.sim_set_offline(true);
        assert_eq!(t.get_volume(OutputRole::Primary), Err(TransportError::Connect));
        assert_eq!(
            t.set_volume(OutputRole::Primary, 10),
            Err(TransportError::Connect)
        );
    }
}
