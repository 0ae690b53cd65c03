//! One-shot hardware peripheral initialization.
//!
//! Configures the four ADC1 sensor channels, the buzzer and status-LED
//! outputs, and the spare pull-up input using raw ESP-IDF sys calls.
//! Called once from `main()` before the orchestrator loop starts.
//!
//! On the host the same functions are backed by thread-local simulation
//! state so tests can inject ADC readings and observe output levels.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
        init_gpio_outputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    sim::reset();
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    // 12 dB attenuation spans the full 0-3.3 V sensor output.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for &channel in &pins::SENSOR_ADC1_CHANNELS {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }
    }

    info!("hw_init: ADC1 configured (CH{:?})", pins::SENSOR_ADC1_CHANNELS);
    Ok(())
}

/// Raw 12-bit sample from ADC1 `channel`; 0 on read failure.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(channel: u32) -> u16 {
    sim::adc(channel)
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::AUX_INPUT_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: GPIO{} input (pull-up)", pins::AUX_INPUT_GPIO);
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = pins::BUZZER_GPIOS
        .iter()
        .chain(core::iter::once(&pins::STATUS_LED_GPIO));

    for &pin in output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured (buzzers {:?}, LED {})",
        pins::BUZZER_GPIOS, pins::STATUS_LED_GPIO);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim::set_output(pin, high);
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub use sim::{sim_output_level, sim_set_adc};

/// Per-thread peripheral state; every test thread sees its own board.
#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::cell::Cell;

    /// ADC1 has channels 0..=9 on the ESP32.
    const ADC1_CHANNELS: usize = 10;

    thread_local! {
        static ADC: Cell<[u16; ADC1_CHANNELS]> = const { Cell::new([0; ADC1_CHANNELS]) };
        static OUTPUTS: Cell<u64> = const { Cell::new(0) };
    }

    pub(super) fn reset() {
        ADC.with(|a| a.set([0; ADC1_CHANNELS]));
        OUTPUTS.with(|o| o.set(0));
    }

    pub(super) fn adc(channel: u32) -> u16 {
        ADC.with(|a| a.get().get(channel as usize).copied().unwrap_or(0))
    }

    pub(super) fn set_output(pin: i32, high: bool) {
        if !(0..64).contains(&pin) {
            return;
        }
        OUTPUTS.with(|o| {
            let mask = 1u64 << pin;
            o.set(if high { o.get() | mask } else { o.get() & !mask });
        });
    }

    /// Inject the raw reading returned for ADC1 `channel`.
    pub fn sim_set_adc(channel: u32, raw: u16) {
        ADC.with(|a| {
            let mut v = a.get();
            if let Some(slot) = v.get_mut(channel as usize) {
                *slot = raw;
            }
            a.set(v);
        });
    }

    /// Last level written to output `pin`.
    pub fn sim_output_level(pin: i32) -> bool {
        (0..64).contains(&pin) && OUTPUTS.with(|o| o.get() & (1u64 << pin) != 0)
    }
}
