use no_std_compat::cell::Cell;

use crate::battery::BatteryMonitor;
use crate::bsp::pin::Pin;
use crate::bsp::pwm::{Channel, Pwm};
use crate::edt::EDT;
use crate::flicker::{Flicker, STEPS, STEP_MS};
use crate::light_sampler::LightLevel;
use crate::mode::{Mode, ModeSwitch};
use crate::power::{arbitrate, PowerManager, PowerPath, LOW_BATTERY_PULSE_MS};

#[derive(Clone, Debug, Eq, PartialEq, Copy)]
pub enum Action {
    /// One iteration of the control loop
    Evaluate,
    FlickerStep {
        step: u8,
    },
    EndLowBatteryPulse,
}

/// Control logic: reads the light level and the battery, and either flickers or sleeps.
///
/// Sleeping is expressed by leaving the [EDT] empty. The board then suspends until the next
/// sampler interrupt and calls [CandleControl::wake].
pub struct CandleControl<'a, B: Pin> {
    battery: BatteryMonitor<B>,
    mode: ModeSwitch,
    flicker: Cell<Flicker>,
    power: PowerManager<'a>,
    light_level: &'a LightLevel,
    edt: &'a EDT<Action>,
}

impl<'a, B: Pin> CandleControl<'a, B> {
    pub fn new(
        battery_pin: B,
        pwm: &'a dyn Pwm,
        light_level: &'a LightLevel,
        edt: &'a EDT<Action>,
    ) -> Self {
        CandleControl {
            battery: BatteryMonitor::new(battery_pin),
            mode: ModeSwitch::new(),
            flicker: Cell::new(Flicker::default()),
            power: PowerManager::new(pwm),
            light_level,
            edt,
        }
    }

    pub fn start(&self) {
        self.edt.schedule(0, Action::Evaluate);
    }

    /// Resumes the control loop after sleep
    pub fn wake(&self) {
        self.edt.schedule(0, Action::Evaluate);
    }

    pub fn process_message(&self, action: Action) {
        match action {
            Action::Evaluate => self.evaluate(),
            Action::FlickerStep { step } => self.flicker_step(step),
            Action::EndLowBatteryPulse => self.power.power_down(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn battery_count(&self) -> u8 {
        self.battery.count()
    }

    pub fn is_battery_low(&self) -> bool {
        self.battery.is_low()
    }

    pub fn is_active(&self) -> bool {
        self.power.is_running()
    }

    pub fn duty(&self, channel: Channel) -> u8 {
        self.power.duty(channel)
    }

    fn evaluate(&self) {
        self.battery.sample();
        let light_level = self.light_level.load();
        let mode = self.mode.update(light_level);
        let path = arbitrate(mode, self.battery.is_low());

        if path != PowerPath::Sleep && self.power.activate() {
            let mut flicker = self.flicker.get();
            flicker.reseed(light_level);
            self.flicker.set(flicker);
        }

        match path {
            PowerPath::Sleep => self.power.power_down(),
            PowerPath::LowBatteryPulse => {
                self.power.start_low_battery_pulse();
                self.edt
                    .schedule(LOW_BATTERY_PULSE_MS, Action::EndLowBatteryPulse);
            }
            PowerPath::Flicker => {
                let mut flicker = self.flicker.get();
                flicker.begin_cycle(
                    self.power.duty(Channel::Led1),
                    self.power.duty(Channel::Led2),
                );
                self.flicker.set(flicker);
                self.flicker_step(0);
            }
        }
    }

    /// Applies one interpolation step and holds it for [STEP_MS]
    fn flicker_step(&self, step: u8) {
        let mut flicker = self.flicker.get();
        let (duty1, duty2) = flicker.advance(step);
        self.flicker.set(flicker);
        self.power.show(duty1, duty2);

        let next = if step + 1 < STEPS {
            Action::FlickerStep { step: step + 1 }
        } else {
            Action::Evaluate
        };
        self.edt.schedule(STEP_MS, next);
    }
}
