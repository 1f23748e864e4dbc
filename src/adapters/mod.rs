//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                   |
//! |------------|--------------------|-------------------------------|
//! | `display`  | DisplayPort        | SH1106 OLED over I²C          |
//! | `knob`     | InputPort          | Encoder ISR slot, button GPIO |
//! | `log_sink` | EventSink          | Serial log output             |
//! | `sonos`    | SpeakerPort        | UPnP RenderingControl (HTTP)  |
//! | `soap`     | —                  | SOAP envelopes for `sonos`    |
//! | `time`     | —                  | ESP32 system timer            |
//! | `wifi`     | ConnectivityPort   | ESP-IDF WiFi STA              |

pub mod display;
pub mod knob;
pub mod log_sink;
pub mod soap;
pub mod sonos;
pub mod time;
pub mod wifi;
