//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder).

use crate::error::TransportError;
use crate::fsm::UiMode;
use crate::menu::MenuItem;
use crate::volume::OutputRole;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started with this primary volume.
    Started { volume: u8 },

    /// The UI moved between modes (press or timeout).
    ModeChanged { from: UiMode, to: UiMode },

    /// Primary volume after a tick in `Main`.
    VolumeChanged(u8),

    /// Secondary offset after a tick in `SecondaryAdjust`.
    OffsetChanged(i8),

    /// A menu entry other than `Exit` was selected.
    MenuActionExecuted(MenuItem),

    /// A speaker accepted a new volume.
    VolumePushed { output: OutputRole, volume: u8 },

    /// A speaker push failed.  Not retried.
    TransportFailed {
        output: OutputRole,
        error: TransportError,
    },
}
