//! ISR-side quadrature decoder for the rotary encoder.
//!
//! ## Hardware
//!
//! Two active-low channels with pull-ups.  Channel A raises an interrupt on
//! every edge; the ISR samples both channel levels and hands them to
//! [`EncoderDecoder::on_edge`].  Channel B never interrupts.
//!
//! ## Decoding
//!
//! | A edge  | Action                                                      |
//! |---------|-------------------------------------------------------------|
//! | falling | latch B as `b_on_fall`                                      |
//! | rising  | `b_on_fall` high, B low → `-1`; low, high → `+1`; else drop |
//!
//! Any edge arriving less than the refractory interval after the last
//! emitted tick is discarded before the levels are even looked at.  The
//! 100 ms default rejects contact bounce and also caps the usable rotation
//! speed at ten detents per second.
//!
//! ## Hand-off
//!
//! The decoded tick lands in a single-slot register.  A second tick before
//! the control loop takes the first overwrites it: fast spins lose
//! detents, they never corrupt state.  Both sides only use atomic
//! load/store/swap, so the ISR never waits on the loop.

use core::sync::atomic::{AtomicBool, AtomicI8, AtomicU32, Ordering};

/// Default minimum gap between two emitted ticks.
pub const REFRACTORY_MS: u32 = 100;

/// One detent of rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum Tick {
    CounterClockwise = -1,
    Clockwise = 1,
}

impl Tick {
    /// Signed unit step (`-1` or `+1`).
    pub const fn delta(self) -> i8 {
        self as i8
    }

    const fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            -1 => Some(Self::CounterClockwise),
            1 => Some(Self::Clockwise),
            _ => None,
        }
    }
}

/// Channel levels read inside one channel-A interrupt.
/// `true` = electrically high (idle, contact open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSample {
    pub a_high: bool,
    pub b_high: bool,
}

/// Lock-free decoder shared between the encoder ISR and the control loop.
pub struct EncoderDecoder {
    refractory_ms: AtomicU32,
    /// Level of B latched on the last falling edge of A.
    b_on_fall: AtomicBool,
    /// Timestamp of the last emitted tick.
    last_tick_ms: AtomicU32,
    /// Pending tick as `-1`/`+1`; `0` = empty.
    slot: AtomicI8,
}

impl EncoderDecoder {
    pub const fn new(refractory_ms: u32) -> Self {
        Self {
            refractory_ms: AtomicU32::new(refractory_ms),
            b_on_fall: AtomicBool::new(false),
            last_tick_ms: AtomicU32::new(0),
            slot: AtomicI8::new(0),
        }
    }

    /// Change the refractory interval.  Call before enabling the interrupt.
    pub fn set_refractory_ms(&self, ms: u32) {
        self.refractory_ms.store(ms, Ordering::Relaxed);
    }

    /// Feed one channel-A edge.  ISR context: bounded, never blocks.
    ///
    /// Returns the tick that was published, if any.
    pub fn on_edge(&self, now_ms: u32, sample: EncoderSample) -> Option<Tick> {
        let last = self.last_tick_ms.load(Ordering::Relaxed);
        if now_ms.wrapping_sub(last) < self.refractory_ms.load(Ordering::Relaxed) {
            return None;
        }

        if !sample.a_high {
            self.b_on_fall.store(sample.b_high, Ordering::Relaxed);
            return None;
        }

        let tick = match (self.b_on_fall.load(Ordering::Relaxed), sample.b_high) {
            (true, false) => Tick::CounterClockwise,
            (false, true) => Tick::Clockwise,
            _ => return None,
        };

        self.slot.store(tick.delta(), Ordering::Release);
        self.last_tick_ms.store(now_ms, Ordering::Relaxed);
        Some(tick)
    }

    /// Take and clear the pending tick.  Control-loop side.
    pub fn take_tick(&self) -> Option<Tick> {
        Tick::from_raw(self.slot.swap(0, Ordering::AcqRel))
    }

    /// Whether a tick is waiting to be taken.
    pub fn has_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire) != 0
    }
}

/// The decoder wired to the physical encoder.
/// `static` because ESP-IDF ISR callbacks cannot capture state.
pub static ENCODER: EncoderDecoder = EncoderDecoder::new(REFRACTORY_MS);

/// ISR handler.  Register this on the channel-A any-edge interrupt.
pub fn encoder_isr_handler(now_ms: u32, sample: EncoderSample) {
    let _ = ENCODER.on_edge(now_ms, sample);
}
