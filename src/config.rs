//! System configuration parameters
//!
//! All tunable parameters for the VolKnob controller.  Values are compiled
//! in; nothing is persisted across restarts.  WiFi credentials come from the
//! build environment (`VOLKNOB_WIFI_SSID` / `VOLKNOB_WIFI_PASSWORD`), and a
//! JSON document in `VOLKNOB_CONFIG` may override any other field.

use core::fmt;

use heapless::String;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stand-in credential used when none is supplied at build time.
pub const WIFI_PLACEHOLDER: &str = "CHANGEME";

const DEFAULT_WIFI_SSID: &str = match option_env!("VOLKNOB_WIFI_SSID") {
    Some(s) => s,
    None => WIFI_PLACEHOLDER,
};

const DEFAULT_WIFI_PASSWORD: &str = match option_env!("VOLKNOB_WIFI_PASSWORD") {
    Some(s) => s,
    None => WIFI_PLACEHOLDER,
};

/// Optional build-time JSON overlay on top of the defaults.
const CONFIG_OVERRIDE: Option<&str> = option_env!("VOLKNOB_CONFIG");

/// Recursive JSON overlay: objects merge per key, anything else replaces.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// UPnP control port every Sonos player listens on.
pub const SONOS_PORT: u16 = 1400;

/// One managed speaker endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerConfig {
    /// Label shown on the display (e.g. "Dining").
    pub name: String<16>,
    /// IPv4 address or hostname.
    pub host: String<64>,
    pub port: u16,
}

impl SpeakerConfig {
    fn new(name: &str, host: &str) -> Self {
        let mut n = String::new();
        let mut h = String::new();
        // Both literals below fit their capacity.
        let _ = n.push_str(name);
        let _ = h.push_str(host);
        Self {
            name: n,
            host: h,
            port: SONOS_PORT,
        }
    }
}

/// Core controller configuration
///
/// Missing fields in a JSON override fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnobConfig {
    // --- Outputs ---
    /// Output that follows the knob directly.
    pub primary: SpeakerConfig,
    /// Output that follows the primary plus an offset.
    pub secondary: SpeakerConfig,

    // --- Steps ---
    /// Primary volume change per encoder detent.
    pub volume_step: u8,
    /// Secondary offset change per encoder detent.
    pub offset_step: u8,

    // --- Timing ---
    /// Minimum gap between two accepted encoder ticks (milliseconds).
    pub encoder_refractory_ms: u32,
    /// Minimum gap between two accepted button presses (milliseconds).
    pub button_debounce_ms: u32,
    /// Idle time after which the offset screen falls back to main (milliseconds).
    pub adjust_timeout_ms: u32,
    /// Control loop throttle (milliseconds).
    pub control_loop_interval_ms: u32,
    /// Per-request HTTP timeout for the speaker transport (milliseconds).
    pub http_timeout_ms: u32,

    // --- Network ---
    pub wifi_ssid: String<32>,
    pub wifi_password: String<64>,
}

impl Default for KnobConfig {
    fn default() -> Self {
        let mut wifi_ssid = String::new();
        let mut wifi_password = String::new();
        // Over-long build-time credentials are left empty and rejected by validate().
        let _ = wifi_ssid.push_str(DEFAULT_WIFI_SSID);
        let _ = wifi_password.push_str(DEFAULT_WIFI_PASSWORD);

        Self {
            // Outputs
            primary: SpeakerConfig::new("Kitchen", "192.168.1.166"),
            secondary: SpeakerConfig::new("Dining", "192.168.1.184"),

            // Steps
            volume_step: 2,
            offset_step: 2,

            // Timing
            encoder_refractory_ms: 100,
            button_debounce_ms: 200,
            adjust_timeout_ms: 3000,
            control_loop_interval_ms: 10, // ~100 Hz poll
            http_timeout_ms: 2000,

            // Network
            wifi_ssid,
            wifi_password,
        }
    }
}

impl KnobConfig {
    /// Compiled-in configuration: defaults, then the `VOLKNOB_CONFIG` overlay.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match CONFIG_OVERRIDE {
            Some(json) => Self::from_json(json)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply a (possibly partial) JSON document over the defaults.  Objects
    /// merge key by key, so `{"secondary":{"host":"10.0.0.7"}}` keeps the
    /// default secondary name and port.  Does not validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let overlay: Value = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        let mut merged = serde_json::to_value(Self::default()).map_err(|_| ConfigError::Malformed)?;
        merge(&mut merged, overlay);
        serde_json::from_value(merged).map_err(|_| ConfigError::Malformed)
    }

    /// Range-check every field.  Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary.host.is_empty() || self.secondary.host.is_empty() {
            return Err(ConfigError::ValidationFailed("speaker host must not be empty"));
        }
        if self.primary.host == self.secondary.host && self.primary.port == self.secondary.port {
            return Err(ConfigError::ValidationFailed("primary and secondary must differ"));
        }
        if self.primary.port == 0 || self.secondary.port == 0 {
            return Err(ConfigError::ValidationFailed("speaker port must be non-zero"));
        }
        if !(1..=10).contains(&self.volume_step) {
            return Err(ConfigError::ValidationFailed("volume_step must be 1..=10"));
        }
        if !(1..=10).contains(&self.offset_step) {
            return Err(ConfigError::ValidationFailed("offset_step must be 1..=10"));
        }
        if self.control_loop_interval_ms == 0 || self.control_loop_interval_ms > 100 {
            return Err(ConfigError::ValidationFailed("control_loop_interval_ms must be 1..=100"));
        }
        if self.adjust_timeout_ms <= self.control_loop_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "adjust_timeout_ms must exceed the loop interval",
            ));
        }
        if self.http_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("http_timeout_ms must be non-zero"));
        }
        if self.wifi_ssid.is_empty() {
            return Err(ConfigError::ValidationFailed("wifi_ssid must not be empty"));
        }
        Ok(())
    }
}

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The JSON override could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Malformed => write!(f, "config JSON malformed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = KnobConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.volume_step, 2);
        assert_eq!(c.offset_step, 2);
        assert_eq!(c.encoder_refractory_ms, 100);
        assert_eq!(c.button_debounce_ms, 200);
        assert_eq!(c.adjust_timeout_ms, 3000);
        assert_eq!(c.primary.port, SONOS_PORT);
    }

    #[test]
    fn serde_roundtrip() {
        let c = KnobConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: KnobConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = KnobConfig::from_json(
            r#"{"secondary":{"name":"Patio","host":"10.0.0.7","port":1400},"adjust_timeout_ms":5000}"#,
        )
        .unwrap();
        assert_eq!(c.secondary.name.as_str(), "Patio");
        assert_eq!(c.adjust_timeout_ms, 5000);
        assert_eq!(c.primary, KnobConfig::default().primary);
        assert_eq!(c.volume_step, 2);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_speaker_keeps_its_own_defaults() {
        let c = KnobConfig::from_json(r#"{"secondary":{"host":"10.0.0.7"}}"#).unwrap();
        assert_eq!(c.secondary.host.as_str(), "10.0.0.7");
        assert_eq!(c.secondary.name.as_str(), "Dining");
        assert_eq!(c.secondary.port, SONOS_PORT);
        assert_eq!(c.primary, KnobConfig::default().primary);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn overlay_of_wrong_shape_is_rejected() {
        assert_eq!(KnobConfig::from_json("[1, 2]"), Err(ConfigError::Malformed));
        assert_eq!(
            KnobConfig::from_json(r#"{"primary":{"port":"http"}}"#),
            Err(ConfigError::Malformed)
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert_eq!(KnobConfig::from_json("{volume_step: 2"), Err(ConfigError::Malformed));
        assert_eq!(
            KnobConfig::from_json(r#"{"volume_step": 300}"#),
            Err(ConfigError::Malformed)
        );
    }

    #[test]
    fn rejects_zero_step() {
        let mut c = KnobConfig::default();
        c.volume_step = 0;
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn rejects_same_speaker_twice() {
        let mut c = KnobConfig::default();
        c.secondary.host = c.primary.host.clone();
        assert!(c.validate().is_err());
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = KnobConfig::default();
        assert!(
            c.control_loop_interval_ms < c.encoder_refractory_ms,
            "loop should poll faster than the encoder can tick"
        );
        assert!(
            c.button_debounce_ms < c.adjust_timeout_ms,
            "a press must be possible before the adjust screen times out"
        );
    }
}
