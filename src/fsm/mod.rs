//! Function-pointer finite state machine for the knob UI.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                          │
//! │  ┌─────────────────┬──────────┬────────────┬──────────┬───────────┐  │
//! │  │ UiMode          │ on_enter │ on_tick    │ on_press │ on_update │  │
//! │  ├─────────────────┼──────────┼────────────┼──────────┼───────────┤  │
//! │  │ Main            │ fn(ctx)  │ fn(ctx, t) │ fn->Mode │    —      │  │
//! │  │ SecondaryAdjust │ fn(ctx)  │ fn(ctx, t) │ fn->Mode │  timeout  │  │
//! │  │ Menu            │ fn(ctx)  │ fn(ctx, t) │ fn->Mode │    —      │  │
//! │  └─────────────────┴──────────┴────────────┴──────────┴───────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Encoder ticks are routed to the current state's `on_tick`.  A debounced
//! press always leaves the current state: `on_press` names the next one.
//! `on_update` runs once per control cycle for time-driven transitions.
//! Every transition runs the target state's `on_enter`.

pub mod context;
pub mod states;

use context::UiContext;
use log::info;

use crate::drivers::encoder::Tick;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UiMode {
    Main = 0,
    SecondaryAdjust = 1,
    Menu = 2,
}

impl UiMode {
    pub const COUNT: usize = 3;

    /// Convert an index back to `UiMode`.  Out-of-range falls back to `Main`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Main,
            1 => Self::SecondaryAdjust,
            2 => Self::Menu,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Main
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::SecondaryAdjust => "SecondaryAdjust",
            Self::Menu => "Menu",
        }
    }
}

impl core::fmt::Display for UiMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Runs once when a state is entered.
pub type StateActionFn = fn(&mut UiContext);

/// Handles one encoder tick while the state is current.
pub type TickHandlerFn = fn(&mut UiContext, Tick);

/// Handles a debounced press and names the next state.
pub type PressHandlerFn = fn(&mut UiContext) -> UiMode;

/// Per-cycle check for time-driven transitions.
pub type StateUpdateFn = fn(&mut UiContext) -> Option<UiMode>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: UiMode,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_tick: TickHandlerFn,
    pub on_press: PressHandlerFn,
    pub on_update: Option<StateUpdateFn>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `UiMode as usize`.
    table: [StateDescriptor; UiMode::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; UiMode::COUNT], initial: UiMode) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first cycle.
    pub fn start(&mut self, ctx: &mut UiContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Time-driven check for the current state.
    pub fn update(&mut self, ctx: &mut UiContext) {
        let Some(update) = self.table[self.current].on_update else {
            return;
        };
        if let Some(next) = update(ctx) {
            self.transition(next, ctx);
        }
    }

    pub fn handle_tick(&mut self, ctx: &mut UiContext, tick: Tick) {
        (self.table[self.current].on_tick)(ctx, tick);
    }

    pub fn handle_press(&mut self, ctx: &mut UiContext) {
        let next = (self.table[self.current].on_press)(ctx);
        self.transition(next, ctx);
    }

    pub fn current_state(&self) -> UiMode {
        UiMode::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: UiMode, ctx: &mut UiContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        self.current = next_idx;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
