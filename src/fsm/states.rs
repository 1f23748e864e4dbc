//! Concrete state handlers for the knob UI.
//!
//! | State           | Tick                          | Press              | Timeout           |
//! |-----------------|-------------------------------|--------------------|-------------------|
//! | Main            | primary ± step, push all      | → SecondaryAdjust  | —                 |
//! | SecondaryAdjust | offset ± step, push secondary | → Menu             | idle > 3 s → Main |
//! | Menu            | cursor ± 1 (no wrap)          | run item → Main    | —                 |

use log::debug;

use super::context::{Screen, UiContext};
use super::{StateDescriptor, UiMode};
use crate::drivers::encoder::Tick;

/// Build the state table.  Order must match `UiMode` discriminants.
pub fn build_state_table() -> [StateDescriptor; UiMode::COUNT] {
    [
        StateDescriptor {
            id: UiMode::Main,
            name: "Main",
            on_enter: Some(main_enter),
            on_tick: main_tick,
            on_press: main_press,
            on_update: None,
        },
        StateDescriptor {
            id: UiMode::SecondaryAdjust,
            name: "SecondaryAdjust",
            on_enter: Some(adjust_enter),
            on_tick: adjust_tick,
            on_press: adjust_press,
            on_update: Some(adjust_update),
        },
        StateDescriptor {
            id: UiMode::Menu,
            name: "Menu",
            on_enter: Some(menu_enter),
            on_tick: menu_tick,
            on_press: menu_press,
            on_update: None,
        },
    ]
}

// ── Main ──────────────────────────────────────────────────────

fn main_enter(ctx: &mut UiContext) {
    ctx.request_render(Screen::Main);
}

fn main_tick(ctx: &mut UiContext, tick: Tick) {
    let volume = ctx.volume.nudge_primary(i16::from(tick.delta()) * ctx.volume_step);
    debug!("Main: volume -> {}", volume);
    ctx.outputs.all_dirty = true;
    ctx.request_render(Screen::Main);
}

fn main_press(_ctx: &mut UiContext) -> UiMode {
    UiMode::SecondaryAdjust
}

// ── SecondaryAdjust ───────────────────────────────────────────

fn adjust_enter(ctx: &mut UiContext) {
    ctx.touch();
    ctx.request_render(Screen::SecondaryAdjust);
}

fn adjust_tick(ctx: &mut UiContext, tick: Tick) {
    let offset = ctx.volume.nudge_offset(i16::from(tick.delta()) * ctx.offset_step);
    debug!("SecondaryAdjust: offset -> {:+}", offset);
    ctx.touch();
    ctx.outputs.secondary_dirty = true;
    ctx.request_render(Screen::SecondaryAdjust);
}

fn adjust_press(_ctx: &mut UiContext) -> UiMode {
    UiMode::Menu
}

fn adjust_update(ctx: &mut UiContext) -> Option<UiMode> {
    (ctx.ms_in_state() > ctx.adjust_timeout_ms).then_some(UiMode::Main)
}

// ── Menu ──────────────────────────────────────────────────────

fn menu_enter(ctx: &mut UiContext) {
    ctx.cursor.reset();
    ctx.request_render(Screen::Menu);
}

fn menu_tick(ctx: &mut UiContext, tick: Tick) {
    ctx.cursor.step(tick.delta());
    ctx.request_render(Screen::Menu);
}

fn menu_press(ctx: &mut UiContext) -> UiMode {
    let item = ctx.cursor.selected();
    if item.is_action() {
        ctx.executed = Some(item);
    }
    UiMode::Main
}
