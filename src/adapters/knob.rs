//! Knob input adapter.
//!
//! Implements [`InputPort`] on top of the encoder ISR slot and the polled
//! button GPIO.

use crate::app::ports::InputPort;
use crate::drivers::button;
use crate::drivers::encoder::{EncoderDecoder, Tick, ENCODER};

pub struct KnobInput {
    encoder: &'static EncoderDecoder,
}

impl Default for KnobInput {
    fn default() -> Self {
        Self::new()
    }
}

impl KnobInput {
    /// Bind to the decoder the GPIO ISR feeds.
    pub fn new() -> Self {
        Self { encoder: &ENCODER }
    }
}

impl InputPort for KnobInput {
    fn take_tick(&mut self) -> Option<Tick> {
        self.encoder.take_tick()
    }

    fn button_is_down(&mut self) -> bool {
        button::button_is_down()
    }
}
