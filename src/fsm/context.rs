//! Shared context threaded through every FSM handler.

use crate::config::KnobConfig;
use crate::menu::{MenuCursor, MenuItem};
use crate::volume::VolumeState;

/// Screen the display should show at the end of the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Main,
    SecondaryAdjust,
    Menu,
}

/// Speaker pushes requested by the handlers, drained by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputRequests {
    /// Primary volume changed: push every output.
    pub all_dirty: bool,
    /// Offset changed: push the secondary output only.
    pub secondary_dirty: bool,
}

/// Mutable UI state plus per-cycle scratch that handlers write into.
pub struct UiContext {
    pub volume: VolumeState,
    pub cursor: MenuCursor,

    // --- Tuning (copied from config) ---
    pub volume_step: i16,
    pub offset_step: i16,
    pub adjust_timeout_ms: u32,

    // --- Timing ---
    /// Monotonic time of the current cycle.
    pub now_ms: u32,
    /// When the current state was entered, or the last qualifying tick in it.
    pub state_entered_ms: u32,

    // --- Outputs of the current dispatch ---
    pub outputs: OutputRequests,
    /// Last render requested; earlier requests in the same cycle are dropped.
    pub render: Option<Screen>,
    /// Menu action chosen on leaving the menu.
    pub executed: Option<MenuItem>,
}

impl UiContext {
    pub fn new(config: &KnobConfig, initial_volume: u8) -> Self {
        Self {
            volume: VolumeState::new(initial_volume),
            cursor: MenuCursor::new(),
            volume_step: i16::from(config.volume_step),
            offset_step: i16::from(config.offset_step),
            adjust_timeout_ms: config.adjust_timeout_ms,
            now_ms: 0,
            state_entered_ms: 0,
            outputs: OutputRequests::default(),
            render: None,
            executed: None,
        }
    }

    pub fn request_render(&mut self, screen: Screen) {
        self.render = Some(screen);
    }

    /// Restart the idle timer of the current state.
    pub fn touch(&mut self) {
        self.state_entered_ms = self.now_ms;
    }

    /// Milliseconds since the current state was entered or last touched.
    pub fn ms_in_state(&self) -> u32 {
        self.now_ms.wrapping_sub(self.state_entered_ms)
    }
}
