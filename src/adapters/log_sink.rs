//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC on the device, stderr on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { volume } => {
                info!("START | volume={}", volume);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {} -> {}", from, to);
            }
            AppEvent::VolumeChanged(volume) => {
                info!("VOL | {}", volume);
            }
            AppEvent::OffsetChanged(offset) => {
                info!("OFFSET | {:+}", offset);
            }
            AppEvent::MenuActionExecuted(item) => {
                info!("MENU | {}", item);
            }
            AppEvent::VolumePushed { output, volume } => {
                info!("PUSH | {}={}", output, volume);
            }
            AppEvent::TransportFailed { output, error } => {
                warn!("TRANSPORT | {} failed: {}", output, error);
            }
        }
    }
}
