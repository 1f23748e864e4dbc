//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (knob input, speakers, display, event sinks) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the domain core never touches hardware directly.

use crate::drivers::encoder::Tick;
use crate::error::TransportError;
use crate::menu::MenuItem;
use crate::volume::OutputRole;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: knob → domain)
// ───────────────────────────────────────────────────────────────

/// Raw knob state, sampled by the service at fixed points of each cycle.
pub trait InputPort {
    /// Take and clear the pending encoder tick, if any.
    fn take_tick(&mut self) -> Option<Tick>;

    /// Current (undebounced) button level, `true` while held down.
    fn button_is_down(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Speaker port (driven adapter: domain → network speakers)
// ───────────────────────────────────────────────────────────────

/// Volume transport to the two managed outputs.
///
/// Calls may block for up to the configured HTTP timeout.  Failures are
/// reported, never retried by the caller.
pub trait SpeakerPort {
    fn get_volume(&mut self, output: OutputRole) -> Result<u8, TransportError>;

    fn set_volume(&mut self, output: OutputRole, volume: u8) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → screen)
// ───────────────────────────────────────────────────────────────

/// One draw call per screen.  Synchronous and non-failing from the
/// caller's point of view; adapters log their own bus errors.
pub trait DisplayPort {
    fn render_main(&mut self, volume: u8, offset: i8);

    fn render_secondary_adjust(&mut self, offset: i8);

    fn render_menu(&mut self, items: &[MenuItem], selected: usize);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
