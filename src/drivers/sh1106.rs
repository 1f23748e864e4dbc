//! SH1106 128x64 monochrome OLED driver over I²C.
//!
//! Drawing happens into a RAM [`Framebuffer`] through `embedded-graphics`;
//! [`Sh1106::flush`] then pushes all eight pages to the controller.
//!
//! The SH1106 has 132 columns of display RAM for a 128-column glass, so
//! every page write starts at column 2.  SSD1306 driver crates assume RAM
//! and glass are the same width and have no column-offset hook, which is
//! why the controller is driven directly here.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_hal::i2c::I2c;

use crate::error::DisplayError;

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;
const COLUMN_OFFSET: u8 = 2;

/// Control byte: the rest of the transfer is commands.
const CTRL_COMMAND: u8 = 0x00;
/// Control byte: the rest of the transfer is display data.
const CTRL_DATA: u8 = 0x40;

/// Power-on sequence for a 128x64 panel with the internal DC-DC enabled.
const INIT_SEQUENCE: &[u8] = &[
    0xAE, // display off
    0xD5, 0x80, // clock divide / oscillator
    0xA8, 0x3F, // multiplex ratio 1/64
    0xD3, 0x00, // display offset
    0x40, // start line 0
    0xAD, 0x8B, // DC-DC on
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0x1F, // pre-charge
    0xDB, 0x40, // VCOMH
    0x33, // pump voltage 9 V
    0xA6, // normal (not inverted)
    0xA4, // follow RAM
    0xAF, // display on
];

// ---------------------------------------------------------------------------
// Framebuffer
// ---------------------------------------------------------------------------

/// Page-ordered 1-bit framebuffer: byte `page * WIDTH + x` holds rows
/// `page*8 .. page*8+8` of column `x`, LSB on top.
pub struct Framebuffer {
    buf: [u8; WIDTH * PAGES],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; WIDTH * PAGES],
        }
    }

    pub fn clear_all(&mut self) {
        self.buf.fill(0);
    }

    /// Out-of-bounds coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let idx = (y / 8) * WIDTH + x;
        let bit = 1u8 << (y % 8);
        if on {
            self.buf[idx] |= bit;
        } else {
            self.buf[idx] &= !bit;
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.buf[(y / 8) * WIDTH + x] & (1 << (y % 8)) != 0
    }

    /// Number of lit pixels (diagnostics and tests).
    pub fn lit_count(&self) -> usize {
        self.buf.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Lit pixels inside the half-open box `x0..x1`, `y0..y1`.
    pub fn lit_in(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> usize {
        (y0..y1.min(HEIGHT))
            .flat_map(|y| (x0..x1.min(WIDTH)).map(move |x| (x, y)))
            .filter(|&(x, y)| self.pixel(x, y))
            .count()
    }

    fn page(&self, page: usize) -> &[u8] {
        &self.buf[page * WIDTH..(page + 1) * WIDTH]
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Sh1106<I> {
    i2c: I,
    address: u8,
    fb: Framebuffer,
}

impl<I: I2c> Sh1106<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            fb: Framebuffer::new(),
        }
    }

    /// Send the power-on sequence and blank the panel.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.command(INIT_SEQUENCE)?;
        self.fb.clear_all();
        self.flush()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.fb
    }

    /// Push the whole framebuffer to display RAM.
    pub fn flush(&mut self) -> Result<(), DisplayError> {
        let mut data = [0u8; WIDTH + 1];
        data[0] = CTRL_DATA;
        for page in 0..PAGES {
            self.command(&[
                0xB0 | page as u8,             // page address
                COLUMN_OFFSET & 0x0F,          // column low nibble
                0x10 | (COLUMN_OFFSET >> 4),   // column high nibble
            ])?;
            data[1..].copy_from_slice(self.fb.page(page));
            self.i2c
                .write(self.address, &data)
                .map_err(|_| DisplayError::Bus)?;
        }
        Ok(())
    }

    /// Release the bus.
    pub fn release(self) -> I {
        self.i2c
    }

    fn command(&mut self, cmds: &[u8]) -> Result<(), DisplayError> {
        // Longest command run is the init sequence.
        let mut buf = [0u8; 32];
        buf[0] = CTRL_COMMAND;
        buf[1..=cmds.len()].copy_from_slice(cmds);
        self.i2c
            .write(self.address, &buf[..=cmds.len()])
            .map_err(|_| DisplayError::Bus)
    }
}

impl<I> OriginDimensions for Sh1106<I> {
    fn size(&self) -> Size {
        self.fb.size()
    }
}

impl<I> DrawTarget for Sh1106<I> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<P>(&mut self, pixels: P) -> Result<(), Self::Error>
    where
        P: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.fb.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        if color.is_on() {
            self.fb.buf.fill(0xFF);
        } else {
            self.fb.clear_all();
        }
        Ok(())
    }
}
