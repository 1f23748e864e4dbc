//! Mock adapters for integration tests.
//!
//! Records every speaker push, screen and event so tests can assert on the
//! full history without a network or an I²C bus.  The knob mock owns a
//! real [`EncoderDecoder`], so ticks travel the same atomic slot the ISR
//! uses on the device.

use volknob::app::events::AppEvent;
use volknob::app::ports::{DisplayPort, EventSink, InputPort, SpeakerPort};
use volknob::app::service::AppService;
use volknob::config::KnobConfig;
use volknob::drivers::encoder::{EncoderDecoder, EncoderSample, Tick};
use volknob::error::TransportError;
use volknob::menu::MenuItem;
use volknob::volume::OutputRole;

// ── Knob ──────────────────────────────────────────────────────

pub struct MockKnob {
    pub encoder: EncoderDecoder,
    pub button_down: bool,
}

impl MockKnob {
    pub fn new(refractory_ms: u32) -> Self {
        Self {
            encoder: EncoderDecoder::new(refractory_ms),
            button_down: false,
        }
    }

    /// One detent: A falls then rises, with B in quadrature.
    pub fn turn(&self, tick: Tick, at_ms: u32) -> Option<Tick> {
        let ccw = tick == Tick::CounterClockwise;
        let _ = self.encoder.on_edge(
            at_ms,
            EncoderSample {
                a_high: false,
                b_high: ccw,
            },
        );
        self.encoder.on_edge(
            at_ms + 1,
            EncoderSample {
                a_high: true,
                b_high: !ccw,
            },
        )
    }
}

impl InputPort for MockKnob {
    fn take_tick(&mut self) -> Option<Tick> {
        self.encoder.take_tick()
    }

    fn button_is_down(&mut self) -> bool {
        self.button_down
    }
}

// ── Speakers ──────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSpeakers {
    pub pushes: Vec<(OutputRole, u8)>,
    pub fail: bool,
}

#[allow(dead_code)]
impl RecordingSpeakers {
    pub fn pushes_to(&self, role: OutputRole) -> Vec<u8> {
        self.pushes
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|&(_, v)| v)
            .collect()
    }
}

impl SpeakerPort for RecordingSpeakers {
    fn get_volume(&mut self, _output: OutputRole) -> Result<u8, TransportError> {
        Ok(0)
    }

    fn set_volume(&mut self, output: OutputRole, volume: u8) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::HttpStatus(500));
        }
        self.pushes.push((output, volume));
        Ok(())
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Main { volume: u8, offset: i8 },
    SecondaryAdjust { offset: i8 },
    Menu { items: Vec<MenuItem>, selected: usize },
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<Frame>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl DisplayPort for RecordingDisplay {
    fn render_main(&mut self, volume: u8, offset: i8) {
        self.frames.push(Frame::Main { volume, offset });
    }

    fn render_secondary_adjust(&mut self, offset: i8) {
        self.frames.push(Frame::SecondaryAdjust { offset });
    }

    fn render_menu(&mut self, items: &[MenuItem], selected: usize) {
        self.frames.push(Frame::Menu {
            items: items.to_vec(),
            selected,
        });
    }
}

// ── Events ────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Bench: service + mocks + simulated clock ─────────────────

/// Control-loop period used by the bench.
pub const CYCLE_MS: u32 = 10;

pub struct Bench {
    pub app: AppService,
    pub knob: MockKnob,
    pub speakers: RecordingSpeakers,
    pub display: RecordingDisplay,
    pub sink: RecordingSink,
    pub now_ms: u32,
}

#[allow(dead_code)]
impl Bench {
    pub fn new(initial_volume: u8) -> Self {
        Self::with_config(&KnobConfig::default(), initial_volume)
    }

    pub fn with_config(config: &KnobConfig, initial_volume: u8) -> Self {
        let mut bench = Self {
            app: AppService::new(config, initial_volume),
            knob: MockKnob::new(config.encoder_refractory_ms),
            speakers: RecordingSpeakers::default(),
            display: RecordingDisplay::default(),
            sink: RecordingSink::default(),
            // Clear of the decoder's boot-time refractory window.
            now_ms: 1_000,
        };
        bench
            .app
            .start(bench.now_ms, &mut bench.display, &mut bench.sink);
        bench
    }

    /// One control cycle, `CYCLE_MS` after the previous one.
    pub fn cycle(&mut self) {
        self.now_ms += CYCLE_MS;
        self.app.cycle(
            self.now_ms,
            &mut self.knob,
            &mut self.speakers,
            &mut self.display,
            &mut self.sink,
        );
    }

    /// Run idle cycles for at least `ms`.
    pub fn idle(&mut self, ms: u32) {
        for _ in 0..ms.div_ceil(CYCLE_MS) {
            self.cycle();
        }
    }

    /// Wait out the refractory window, turn one detent, run one cycle.
    pub fn turn(&mut self, tick: Tick) {
        self.idle(150);
        let emitted = self.knob.turn(tick, self.now_ms + 1);
        assert_eq!(emitted, Some(tick), "decoder rejected a clean detent");
        self.cycle();
    }

    /// Press for one cycle, release, then wait out the debounce window.
    pub fn press(&mut self) {
        self.knob.button_down = true;
        self.cycle();
        self.knob.button_down = false;
        self.idle(250);
    }
}
