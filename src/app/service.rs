//! Application service: the hexagonal core and the control-loop dispatch.
//!
//! [`AppService`] owns the UI state machine, its context and the button
//! debouncer.  All I/O flows through port traits injected at call sites,
//! making the entire service testable with mock adapters.
//!
//! ```text
//!   InputPort ──▶ ┌────────────────────────┐ ──▶ SpeakerPort
//!                 │       AppService       │ ──▶ DisplayPort
//!                 │  FSM · Volume · Menu   │ ──▶ EventSink
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::KnobConfig;
use crate::drivers::button::ButtonDebouncer;
use crate::fsm::context::{Screen, UiContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, UiMode};
use crate::menu::MenuItem;
use crate::volume::OutputRole;

use super::events::AppEvent;
use super::ports::{DisplayPort, EventSink, InputPort, SpeakerPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    fsm: Fsm,
    ctx: UiContext,
    button: ButtonDebouncer,
    cycle_count: u64,
}

impl AppService {
    /// Construct the service.  Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: &KnobConfig, initial_volume: u8) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), UiMode::Main),
            ctx: UiContext::new(config, initial_volume),
            button: ButtonDebouncer::new(config.button_debounce_ms),
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter `Main` and draw the first screen.
    pub fn start(
        &mut self,
        now_ms: u32,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        self.ctx.touch();
        self.fsm.start(&mut self.ctx);
        self.render(display);

        let volume = self.ctx.volume.primary();
        sink.emit(&AppEvent::Started { volume });
        info!("AppService started in {} (volume {})", self.fsm.current_state(), volume);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one control cycle: timeout → tick → button → render → push.
    ///
    /// The timeout check runs first so a state expiring this cycle is
    /// resolved before new input could re-arm it.  The tick is handled
    /// before the button so a rotation and a press in the same cycle apply
    /// the rotation under the state active at cycle start.
    pub fn cycle(
        &mut self,
        now_ms: u32,
        input: &mut impl InputPort,
        speakers: &mut impl SpeakerPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        self.cycle_count += 1;
        self.ctx.now_ms = now_ms;

        // 1. Time-driven transitions
        let prev = self.fsm.current_state();
        self.fsm.update(&mut self.ctx);
        self.emit_mode_change(prev, sink);

        // 2. Encoder tick
        if let Some(tick) = input.take_tick() {
            let mode = self.fsm.current_state();
            self.fsm.handle_tick(&mut self.ctx, tick);
            match mode {
                UiMode::Main => sink.emit(&AppEvent::VolumeChanged(self.ctx.volume.primary())),
                UiMode::SecondaryAdjust => {
                    sink.emit(&AppEvent::OffsetChanged(self.ctx.volume.offset()))
                }
                UiMode::Menu => {}
            }

            if core::mem::take(&mut self.ctx.outputs.secondary_dirty) {
                self.push(OutputRole::Secondary, speakers, sink);
            }
        }

        // 3. Button
        if self.button.sample(input.button_is_down(), now_ms).is_some() {
            let prev = self.fsm.current_state();
            self.fsm.handle_press(&mut self.ctx);
            if let Some(item) = self.ctx.executed.take() {
                self.execute(item, sink);
            }
            self.emit_mode_change(prev, sink);
        }

        // 4. Coalesced render
        self.render(display);

        // 5. Primary volume changed: push every output
        if core::mem::take(&mut self.ctx.outputs.all_dirty) {
            for role in OutputRole::ALL {
                self.push(role, speakers, sink);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> UiMode {
        self.fsm.current_state()
    }

    pub fn volume(&self) -> u8 {
        self.ctx.volume.primary()
    }

    pub fn offset(&self) -> i8 {
        self.ctx.volume.offset()
    }

    pub fn menu_index(&self) -> usize {
        self.ctx.cursor.index()
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn push(&self, role: OutputRole, speakers: &mut impl SpeakerPort, sink: &mut impl EventSink) {
        let volume = self.ctx.volume.target(role);
        match speakers.set_volume(role, volume) {
            Ok(()) => sink.emit(&AppEvent::VolumePushed { output: role, volume }),
            Err(error) => {
                warn!("set_volume({}, {}) failed: {}", role, volume, error);
                sink.emit(&AppEvent::TransportFailed { output: role, error });
            }
        }
    }

    /// Menu side effects.  Entries are placeholders today; they only
    /// surface as events.
    fn execute(&self, item: MenuItem, sink: &mut impl EventSink) {
        info!("Menu: execute {}", item);
        sink.emit(&AppEvent::MenuActionExecuted(item));
    }

    fn emit_mode_change(&self, from: UiMode, sink: &mut impl EventSink) {
        let to = self.fsm.current_state();
        if to != from {
            sink.emit(&AppEvent::ModeChanged { from, to });
        }
    }

    fn render(&mut self, display: &mut impl DisplayPort) {
        let Some(screen) = self.ctx.render.take() else {
            return;
        };
        match screen {
            Screen::Main => display.render_main(self.ctx.volume.primary(), self.ctx.volume.offset()),
            Screen::SecondaryAdjust => display.render_secondary_adjust(self.ctx.volume.offset()),
            Screen::Menu => display.render_menu(&MenuItem::ALL, self.ctx.cursor.index()),
        }
    }
}
