//! Low-level drivers: GPIO, ISR, display controller, watchdog.

pub mod button;
pub mod encoder;
pub mod hw_init;
pub mod sh1106;
pub mod watchdog;
