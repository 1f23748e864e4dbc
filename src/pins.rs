//! GPIO / peripheral pin assignments for the VolKnob board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Rotary encoder (EC11-style, common pin to GND)
// ---------------------------------------------------------------------------

/// Quadrature channel A (CLK).  Any-edge interrupt source.
pub const ENCODER_A_GPIO: i32 = 4;
/// Quadrature channel B (DT).  Sampled from the channel-A ISR only.
pub const ENCODER_B_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// User button (encoder push switch, active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Push switch.  Polled once per control cycle, no interrupt.
pub const BUTTON_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// I²C bus (SH1106 128x64 OLED)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
/// 7-bit address of the OLED controller (SA0 tied low).
pub const OLED_I2C_ADDR: u8 = 0x3C;
/// I²C clock for the OLED (fast mode).
pub const OLED_I2C_FREQ_HZ: u32 = 400_000;
