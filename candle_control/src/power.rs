use crate::bsp::pwm::{Channel, Pwm};
use crate::flicker::PWM_MIN;
use crate::mode::Mode;

/// How long the low battery warning lights up channel 1
pub const LOW_BATTERY_PULSE_MS: u32 = 25;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerPath {
    /// PWM off, deep sleep until the next sampler tick
    Sleep,
    /// Short dim flash on channel 1, then deep sleep
    LowBatteryPulse,
    /// Stay awake and run the flicker generator
    Flicker,
}

pub fn arbitrate(mode: Mode, battery_low: bool) -> PowerPath {
    match (mode, battery_low) {
        (Mode::Off, _) => PowerPath::Sleep,
        (Mode::On, true) => PowerPath::LowBatteryPulse,
        (Mode::On, false) => PowerPath::Flicker,
    }
}

/// Owns the PWM timer state transitions
pub struct PowerManager<'a> {
    pwm: &'a dyn Pwm,
}

impl<'a> PowerManager<'a> {
    pub fn new(pwm: &'a dyn Pwm) -> Self {
        PowerManager { pwm }
    }

    /// Starts the PWM timer with both channels at zero, if it is not running yet.
    /// Returns true if the timer had to be started.
    pub fn activate(&self) -> bool {
        if self.pwm.is_running() {
            false
        } else {
            self.pwm.set_duty(Channel::Led1, 0);
            self.pwm.set_duty(Channel::Led2, 0);
            self.pwm.start();
            true
        }
    }

    /// Stops the PWM timer, which also forces both LED outputs low
    pub fn power_down(&self) {
        if self.pwm.is_running() {
            self.pwm.stop();
        }
    }

    pub fn start_low_battery_pulse(&self) {
        self.pwm.set_duty(Channel::Led1, PWM_MIN);
    }

    pub fn show(&self, duty1: u8, duty2: u8) {
        self.pwm.set_duty(Channel::Led2, duty2);
        self.pwm.set_duty(Channel::Led1, duty1);
    }

    pub fn duty(&self, channel: Channel) -> u8 {
        self.pwm.duty(channel)
    }

    pub fn is_running(&self) -> bool {
        self.pwm.is_running()
    }
}
