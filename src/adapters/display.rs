//! OLED display adapter.
//!
//! Implements [`DisplayPort`] on the SH1106 panel.  Every render clears
//! the framebuffer, draws one full screen with `embedded-graphics` and
//! flushes.  Bus errors are logged and dropped: the UI state is already
//! correct and the next render repaints the whole screen.

use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X15_BOLD, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Text};
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::DisplayPort;
use crate::drivers::sh1106::{Framebuffer, Sh1106, HEIGHT, WIDTH};
use crate::error::DisplayError;
use crate::menu::MenuItem;

const CENTER_X: i32 = WIDTH as i32 / 2;
const MENU_FIRST_BASELINE: i32 = 14;
const MENU_ROW_PITCH: i32 = 15;
const MENU_TEXT_X: i32 = 10;

fn style(font: &'static MonoFont<'static>) -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(font)
        .text_color(BinaryColor::On)
        .build()
}

/// `+10`, `-4`, `0`.
fn signed(value: i8) -> heapless::String<8> {
    let mut s = heapless::String::new();
    // Four characters at most: fits.
    let _ = if value > 0 {
        write!(s, "+{}", value)
    } else {
        write!(s, "{}", value)
    };
    s
}

pub struct OledDisplay<I> {
    oled: Sh1106<I>,
    adjust_title: heapless::String<24>,
}

impl<I: I2c> OledDisplay<I> {
    /// Initialise the panel.  `secondary_name` labels the offset screen.
    pub fn new(i2c: I, address: u8, secondary_name: &str) -> Result<Self, DisplayError> {
        let mut oled = Sh1106::new(i2c, address);
        oled.init()?;

        let mut adjust_title = heapless::String::new();
        let _ = write!(adjust_title, "{} Adjust", secondary_name);

        Ok(Self { oled, adjust_title })
    }

    /// Boot splash: one centred word.
    pub fn splash(&mut self, text: &str) {
        self.oled.framebuffer_mut().clear_all();
        let center = Point::new(CENTER_X, HEIGHT as i32 / 2 + 5);
        let _ = Text::with_alignment(text, center, style(&FONT_10X20), Alignment::Center)
            .draw(&mut self.oled);
        self.flush();
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.oled.framebuffer()
    }

    pub fn release(self) -> I {
        self.oled.release()
    }

    fn flush(&mut self) {
        if let Err(e) = self.oled.flush() {
            warn!("Display: flush failed: {}", e);
        }
    }
}

impl<I: I2c> DisplayPort for OledDisplay<I> {
    fn render_main(&mut self, volume: u8, offset: i8) {
        self.oled.framebuffer_mut().clear_all();

        let _ = Text::with_alignment(
            "Volume",
            Point::new(CENTER_X, 16),
            style(&FONT_9X15_BOLD),
            Alignment::Center,
        )
        .draw(&mut self.oled);

        let mut level: heapless::String<4> = heapless::String::new();
        let _ = write!(level, "{}", volume);
        let _ = Text::with_alignment(
            &level,
            Point::new(CENTER_X, 46),
            style(&FONT_10X20),
            Alignment::Center,
        )
        .draw(&mut self.oled);

        // Offset only shows while it is in effect.
        if offset != 0 {
            let _ = Text::with_alignment(
                &signed(offset),
                Point::new(WIDTH as i32 - 1, HEIGHT as i32 - 2),
                style(&FONT_6X10),
                Alignment::Right,
            )
            .draw(&mut self.oled);
        }

        self.flush();
    }

    fn render_secondary_adjust(&mut self, offset: i8) {
        self.oled.framebuffer_mut().clear_all();

        let _ = Text::with_alignment(
            &self.adjust_title,
            Point::new(CENTER_X, 14),
            style(&FONT_6X10),
            Alignment::Center,
        )
        .draw(&mut self.oled);

        let _ = Text::with_alignment(
            &signed(offset),
            Point::new(CENTER_X, 44),
            style(&FONT_10X20),
            Alignment::Center,
        )
        .draw(&mut self.oled);

        self.flush();
    }

    fn render_menu(&mut self, items: &[MenuItem], selected: usize) {
        self.oled.framebuffer_mut().clear_all();

        let row_style = style(&FONT_6X10);
        for (row, item) in items.iter().enumerate() {
            let y = MENU_FIRST_BASELINE + row as i32 * MENU_ROW_PITCH;
            if row == selected {
                let _ = Text::new(">", Point::new(0, y), row_style).draw(&mut self.oled);
            }
            let _ = Text::new(item.label(), Point::new(MENU_TEXT_X, y), row_style)
                .draw(&mut self.oled);
        }

        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sh1106::tests::RecordingI2c;

    fn display() -> OledDisplay<RecordingI2c> {
        OledDisplay::new(RecordingI2c::default(), 0x3C, "Dining").unwrap()
    }

    /// Lit pixels in the bottom-right corner where the offset is drawn.
    fn corner(d: &OledDisplay<RecordingI2c>) -> usize {
        d.framebuffer().lit_in(WIDTH - 32, HEIGHT - 12, WIDTH, HEIGHT)
    }

    /// Lit pixels in the marker column of menu row `row`.
    fn marker(d: &OledDisplay<RecordingI2c>, row: usize) -> usize {
        let baseline = (MENU_FIRST_BASELINE + row as i32 * MENU_ROW_PITCH) as usize;
        d.framebuffer().lit_in(0, baseline - 11, 6, baseline + 3)
    }

    #[test]
    fn signed_formats_sign() {
        assert_eq!(signed(10).as_str(), "+10");
        assert_eq!(signed(-4).as_str(), "-4");
        assert_eq!(signed(0).as_str(), "0");
        assert_eq!(signed(-50).as_str(), "-50");
    }

    #[test]
    fn main_screen_hides_zero_offset() {
        let mut d = display();
        d.render_main(36, 0);
        assert!(d.framebuffer().lit_count() > 0);
        assert_eq!(corner(&d), 0);
    }

    #[test]
    fn main_screen_shows_nonzero_offset() {
        let mut d = display();
        d.render_main(36, 10);
        assert!(corner(&d) > 0);
    }

    #[test]
    fn render_flushes_every_page() {
        let mut d = display();
        d.render_main(36, 0);
        let i2c = d.release();
        // init: sequence + 8 pages, then one more 8-page frame.
        assert_eq!(i2c.writes.len(), 1 + 16 + 16);
    }

    #[test]
    fn adjust_screen_draws_title_and_value() {
        let mut d = display();
        d.render_secondary_adjust(-6);
        assert!(d.framebuffer().lit_in(0, 0, WIDTH, 16) > 0);
        assert!(d.framebuffer().lit_in(0, 24, WIDTH, 48) > 0);
    }

    #[test]
    fn menu_marker_follows_selection() {
        let mut d = display();
        d.render_menu(&MenuItem::ALL, 2);
        assert_eq!(marker(&d, 0), 0);
        assert_eq!(marker(&d, 1), 0);
        assert!(marker(&d, 2) > 0);
        assert_eq!(marker(&d, 3), 0);
    }

    #[test]
    fn each_render_replaces_previous_frame() {
        let mut d = display();
        d.render_main(36, 10);
        d.render_menu(&MenuItem::ALL, 0);
        assert_eq!(corner(&d), 0);
    }

    #[test]
    fn bus_failure_is_swallowed() {
        let mut d = display();
        let mut i2c = d.release();
        i2c.fail = true;
        let mut d = OledDisplay {
            oled: Sh1106::new(i2c, 0x3C),
            adjust_title: heapless::String::new(),
        };
        d.render_main(10, 0);
        assert!(d.framebuffer().lit_count() > 0);
    }
}
