//! One-shot hardware peripheral initialization.
//!
//! Configures the encoder and button GPIOs and installs the encoder ISR
//! using raw ESP-IDF sys calls.  Called once from `main()` before the
//! control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrAddFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrAddFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::GpioConfigFailed(_) => Self::Init("GPIO config failed"),
            HwInitError::IsrInstallFailed(_) => Self::Init("GPIO ISR service install failed"),
            HwInitError::IsrAddFailed(_) => Self::Init("GPIO ISR handler add failed"),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // Encoder A interrupts on both edges; B and the button are plain inputs.
    let inputs = [
        (pins::ENCODER_A_GPIO, gpio_int_type_t_GPIO_INTR_ANYEDGE),
        (pins::ENCODER_B_GPIO, gpio_int_type_t_GPIO_INTR_DISABLE),
        (pins::BUTTON_GPIO, gpio_int_type_t_GPIO_INTR_DISABLE),
    ];

    for &(pin, intr_type) in &inputs {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!(
        "hw_init: GPIO inputs configured (enc A={} B={} button={})",
        pins::ENCODER_A_GPIO,
        pins::ENCODER_B_GPIO,
        pins::BUTTON_GPIO
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe from task and ISR context.
    (unsafe { gpio_get_level(pin) }) != 0
}

/// Idle level of every pulled-up input.
#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::encoder::{encoder_isr_handler, EncoderSample};

#[cfg(target_os = "espidf")]
unsafe extern "C" fn encoder_a_gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is a counter read; gpio_get_level is a
    // register read.  Both are ISR-safe.
    let now_ms = (unsafe { esp_timer_get_time() } / 1_000) as u32;
    let sample = EncoderSample {
        a_high: unsafe { gpio_get_level(pins::ENCODER_A_GPIO) } != 0,
        b_high: unsafe { gpio_get_level(pins::ENCODER_B_GPIO) } != 0,
    };
    encoder_isr_handler(now_ms, sample);
}

/// Install the per-pin GPIO ISR service and register the encoder handler.
/// Call after init_peripherals() and before the control loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed.  The handler only touches atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let ret = gpio_isr_handler_add(
            pins::ENCODER_A_GPIO,
            Some(encoder_a_gpio_isr),
            core::ptr::null_mut(),
        );
        if ret != ESP_OK as i32 {
            return Err(HwInitError::IsrAddFailed(ret));
        }
        gpio_intr_enable(pins::ENCODER_A_GPIO);

        info!("hw_init: ISR service installed (encoder A any-edge)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn sim_init_is_a_no_op() {
        assert_eq!(init_peripherals(), Ok(()));
        assert_eq!(init_isr_service(), Ok(()));
    }

    #[test]
    fn init_errors_keep_stage_not_code() {
        assert_eq!(
            Error::from(HwInitError::IsrAddFailed(-1)),
            Error::Init("GPIO ISR handler add failed")
        );
        assert_eq!(
            HwInitError::GpioConfigFailed(258).to_string(),
            "GPIO config failed (rc=258)"
        );
    }
}
