//! Polled, debounced push-button driver.
//!
//! ## Hardware
//!
//! Encoder push switch, active-low with pull-up.  The control loop samples
//! the level once per cycle; there is no interrupt.
//!
//! ## Edge detection
//!
//! A press is reported when the level goes released → pressed between two
//! samples **and** at least `debounce_ms` have passed since the previous
//! accepted press.  Holding the button never repeats.

/// Default minimum gap between two accepted presses.
pub const DEBOUNCE_MS: u32 = 200;

/// A debounced press (released → pressed transition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEdge {
    /// Monotonic time the press was accepted at.
    pub at_ms: u32,
}

pub struct ButtonDebouncer {
    debounce_ms: u32,
    was_pressed: bool,
    last_accept_ms: Option<u32>,
}

impl ButtonDebouncer {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            was_pressed: false,
            last_accept_ms: None,
        }
    }

    /// Feed one sample.  `pressed` is the logical state (contact closed).
    pub fn sample(&mut self, pressed: bool, now_ms: u32) -> Option<ButtonEdge> {
        let rising = pressed && !self.was_pressed;
        self.was_pressed = pressed;

        if !rising {
            return None;
        }
        let settled = self
            .last_accept_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= self.debounce_ms);
        if !settled {
            return None;
        }

        self.last_accept_ms = Some(now_ms);
        Some(ButtonEdge { at_ms: now_ms })
    }
}

/// Read the physical button.  `true` while held down.
#[cfg(target_os = "espidf")]
pub fn button_is_down() -> bool {
    !crate::drivers::hw_init::gpio_read(crate::pins::BUTTON_GPIO)
}

/// Read the physical button.  Never pressed in simulation.
#[cfg(not(target_os = "espidf"))]
pub fn button_is_down() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_events_without_press() {
        let mut btn = ButtonDebouncer::new(DEBOUNCE_MS);
        assert_eq!(btn.sample(false, 100), None);
        assert_eq!(btn.sample(false, 200), None);
    }

    #[test]
    fn first_press_is_reported_once() {
        let mut btn = ButtonDebouncer::new(DEBOUNCE_MS);
        assert_eq!(btn.sample(true, 1000), Some(ButtonEdge { at_ms: 1000 }));
        // Held: no repeat.
        assert_eq!(btn.sample(true, 1500), None);
        assert_eq!(btn.sample(true, 5000), None);
    }

    #[test]
    fn jitter_within_window_is_filtered() {
        let mut btn = ButtonDebouncer::new(DEBOUNCE_MS);
        assert!(btn.sample(true, 1000).is_some());
        btn.sample(false, 1020);
        assert_eq!(btn.sample(true, 1040), None);
        btn.sample(false, 1100);
        assert_eq!(btn.sample(true, 1199), None);
    }

    #[test]
    fn press_after_window_is_reported() {
        let mut btn = ButtonDebouncer::new(DEBOUNCE_MS);
        assert!(btn.sample(true, 1000).is_some());
        btn.sample(false, 1100);
        assert!(btn.sample(true, 1200).is_some());
    }

    #[test]
    fn press_must_be_released_first() {
        let mut btn = ButtonDebouncer::new(DEBOUNCE_MS);
        assert!(btn.sample(true, 1000).is_some());
        // Still held well past the window: no second edge.
        assert_eq!(btn.sample(true, 2000), None);
    }
}
