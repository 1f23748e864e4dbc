//! End-to-end control-loop scenarios: encoder edges in, speaker pushes,
//! screens and events out.

use volknob::app::events::AppEvent;
use volknob::config::KnobConfig;
use volknob::drivers::encoder::Tick;
use volknob::error::TransportError;
use volknob::fsm::UiMode;
use volknob::menu::MenuItem;
use volknob::volume::OutputRole;

use crate::mock_hw::{Bench, Frame};

use OutputRole::{Primary, Secondary};

#[test]
fn start_shows_initial_volume_without_pushing() {
    let bench = Bench::new(30);
    assert_eq!(bench.app.mode(), UiMode::Main);
    assert_eq!(bench.display.last(), Some(&Frame::Main { volume: 30, offset: 0 }));
    assert!(bench.speakers.pushes.is_empty());
    assert_eq!(bench.sink.events, vec![AppEvent::Started { volume: 30 }]);
}

#[test]
fn turn_press_adjust_and_time_out() {
    let mut bench = Bench::new(30);

    // Three detents clockwise on the main screen: both outputs follow.
    for _ in 0..3 {
        bench.turn(Tick::Clockwise);
    }
    assert_eq!(bench.app.volume(), 36);
    assert_eq!(
        bench.speakers.pushes,
        vec![
            (Primary, 32),
            (Secondary, 32),
            (Primary, 34),
            (Secondary, 34),
            (Primary, 36),
            (Secondary, 36),
        ]
    );

    // Press: offset screen.
    bench.press();
    assert_eq!(bench.app.mode(), UiMode::SecondaryAdjust);
    assert_eq!(bench.display.last(), Some(&Frame::SecondaryAdjust { offset: 0 }));

    // Five detents: only the secondary moves.
    bench.speakers.pushes.clear();
    for _ in 0..5 {
        bench.turn(Tick::Clockwise);
    }
    assert_eq!(bench.app.offset(), 10);
    assert_eq!(bench.speakers.pushes_to(Primary), Vec::<u8>::new());
    assert_eq!(bench.speakers.pushes_to(Secondary), vec![38, 40, 42, 44, 46]);
    assert_eq!(bench.display.last(), Some(&Frame::SecondaryAdjust { offset: 10 }));

    // Leave it alone: back to the main screen with the offset shown.
    bench.idle(3_100);
    assert_eq!(bench.app.mode(), UiMode::Main);
    assert_eq!(bench.display.last(), Some(&Frame::Main { volume: 36, offset: 10 }));
    assert!(bench.sink.events.contains(&AppEvent::ModeChanged {
        from: UiMode::SecondaryAdjust,
        to: UiMode::Main,
    }));

    // Main screen again drives both, with the offset applied.
    bench.speakers.pushes.clear();
    bench.turn(Tick::CounterClockwise);
    assert_eq!(bench.speakers.pushes, vec![(Primary, 34), (Secondary, 44)]);
}

#[test]
fn adjust_screen_stays_while_turning() {
    let mut bench = Bench::new(20);
    bench.press();

    // Each detent restarts the inactivity window.
    for _ in 0..30 {
        bench.turn(Tick::CounterClockwise);
    }
    assert_eq!(bench.app.mode(), UiMode::SecondaryAdjust);
    assert_eq!(bench.app.offset(), -50);
}

#[test]
fn unread_tick_is_overwritten_by_newer_one() {
    let mut bench = Bench::new(30);
    bench.idle(150);

    let t0 = bench.now_ms + 1;
    assert_eq!(bench.knob.turn(Tick::Clockwise, t0), Some(Tick::Clockwise));
    assert_eq!(
        bench.knob.turn(Tick::CounterClockwise, t0 + 150),
        Some(Tick::CounterClockwise)
    );
    assert!(bench.knob.encoder.has_pending());

    bench.cycle();
    assert_eq!(bench.app.volume(), 28);
    assert_eq!(bench.speakers.pushes, vec![(Primary, 28), (Secondary, 28)]);
    assert!(!bench.knob.encoder.has_pending());
}

#[test]
fn bounce_inside_refractory_window_is_ignored() {
    let mut bench = Bench::new(30);
    bench.idle(150);

    let t0 = bench.now_ms + 1;
    assert_eq!(bench.knob.turn(Tick::Clockwise, t0), Some(Tick::Clockwise));
    assert_eq!(bench.knob.turn(Tick::Clockwise, t0 + 20), None);

    bench.cycle();
    bench.idle(50);
    assert_eq!(bench.app.volume(), 32);
    assert_eq!(bench.speakers.pushes.len(), 2);
}

#[test]
fn menu_runs_action_and_returns_home() {
    let mut bench = Bench::new(30);
    bench.press();
    bench.press();
    assert_eq!(bench.app.mode(), UiMode::Menu);
    assert_eq!(
        bench.display.last(),
        Some(&Frame::Menu {
            items: MenuItem::ALL.to_vec(),
            selected: 0,
        })
    );

    bench.turn(Tick::Clockwise);
    assert_eq!(bench.app.menu_index(), 1);
    // Menu navigation never talks to the speakers.
    assert!(bench.speakers.pushes.is_empty());

    bench.press();
    assert_eq!(bench.app.mode(), UiMode::Main);
    assert!(
        bench
            .sink
            .events
            .contains(&AppEvent::MenuActionExecuted(MenuItem::Stations))
    );
    assert_eq!(bench.display.last(), Some(&Frame::Main { volume: 30, offset: 0 }));
}

#[test]
fn menu_exit_runs_nothing() {
    let mut bench = Bench::new(30);
    bench.press();
    bench.press();
    for _ in 0..6 {
        bench.turn(Tick::Clockwise);
    }
    assert_eq!(bench.app.menu_index(), MenuItem::COUNT - 1);

    bench.press();
    assert_eq!(bench.app.mode(), UiMode::Main);
    assert!(
        !bench
            .sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::MenuActionExecuted(_)))
    );
}

#[test]
fn menu_never_times_out() {
    let mut bench = Bench::new(30);
    bench.press();
    bench.press();
    bench.idle(10_000);
    assert_eq!(bench.app.mode(), UiMode::Menu);
}

#[test]
fn unreachable_speakers_do_not_stall_the_ui() {
    let mut bench = Bench::new(30);
    bench.speakers.fail = true;

    bench.turn(Tick::Clockwise);
    assert_eq!(bench.app.volume(), 32);
    assert_eq!(bench.display.last(), Some(&Frame::Main { volume: 32, offset: 0 }));
    for output in OutputRole::ALL {
        assert!(bench.sink.events.contains(&AppEvent::TransportFailed {
            output,
            error: TransportError::HttpStatus(500),
        }));
    }

    // Next change goes through once the network is back.
    bench.speakers.fail = false;
    bench.turn(Tick::Clockwise);
    assert_eq!(bench.speakers.pushes, vec![(Primary, 34), (Secondary, 34)]);
}

#[test]
fn configured_steps_and_timeout_apply() {
    let config = KnobConfig {
        volume_step: 5,
        offset_step: 3,
        adjust_timeout_ms: 1_000,
        ..KnobConfig::default()
    };
    let mut bench = Bench::with_config(&config, 50);

    bench.turn(Tick::Clockwise);
    assert_eq!(bench.app.volume(), 55);

    bench.press();
    bench.turn(Tick::CounterClockwise);
    assert_eq!(bench.app.offset(), -3);

    bench.idle(1_100);
    assert_eq!(bench.app.mode(), UiMode::Main);
}
