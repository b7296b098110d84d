//! Ambient light measurement.
//!
//! A capacitor is charged through the sense pin and then discharged through a photoresistor.
//! The time it takes for the pin to read low is proportional to the resistance of the
//! photoresistor, so larger counts mean darker surroundings.
use portable_atomic::{AtomicU16, Ordering};

use crate::bsp::delay::Delay;
use crate::bsp::rc::RcPin;
use crate::mode::TURN_ON;

/// Period of the timer interrupt which runs the sampler
pub const SAMPLE_PERIOD_MS: u32 = 1000;
pub const CHARGE_US: u32 = 100;
pub const POLL_US: u32 = 1;
pub const DRAIN_US: u32 = 200;
/// Counting stops here, anything darker is reported as this value.
///
/// The count is compared with `>=`, so it stops at exactly `3 * TURN_ON` rather than one
/// count later.
pub const DARK_CAP: u16 = TURN_ON * 3;

/// Light level shared between the sampler interrupt and the control loop.
///
/// There is exactly one writer (the interrupt handler) and one reader (the control loop).
/// Both sides use `Relaxed` loads and stores and nothing else is published through this cell.
/// A `u16` is a native atomic on every supported target, so the reader never sees a torn
/// value; it may however act on a reading which is up to one [SAMPLE_PERIOD_MS] old. The
/// band between [crate::mode::TURN_OFF] and [TURN_ON] is wide enough to absorb that.
pub struct LightLevel(AtomicU16);

impl LightLevel {
    pub const fn new() -> Self {
        LightLevel(AtomicU16::new(0))
    }

    pub fn load(&self) -> u16 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn store(&self, level: u16) {
        self.0.store(level, Ordering::Relaxed)
    }
}

impl Default for LightLevel {
    fn default() -> Self {
        Self::new()
    }
}

/// Measures the discharge time of the capacitor in [POLL_US] units.
///
/// Runs in bounded time: after [DARK_CAP] polls the capacitor is drained through the pin and
/// the capped value is returned. Otherwise the pin is left as a floating input.
pub fn sample<R: RcPin, D: Delay>(pin: &R, delay: &D) -> u16 {
    pin.charge();
    delay.delay_us(CHARGE_US);
    pin.release();

    let mut count: u16 = 0;
    while pin.is_high() {
        delay.delay_us(POLL_US);
        count += 1;
        if count >= DARK_CAP {
            pin.drain();
            delay.delay_us(DRAIN_US);
            break;
        }
    }
    count
}

/// Body of the periodic timer interrupt
pub struct LightSampler<R: RcPin, D: Delay> {
    pin: R,
    delay: D,
}

impl<R: RcPin, D: Delay> LightSampler<R, D> {
    pub fn new(pin: R, delay: D) -> Self {
        LightSampler { pin, delay }
    }

    /// Takes one sample and publishes it. The count is accumulated locally, so the control
    /// loop never observes a partial measurement.
    pub fn on_tick(&self, level: &LightLevel) {
        level.store(sample(&self.pin, &self.delay));
    }
}

#[cfg(test)]
mod test {
    use no_std_compat::cell::Cell;

    use crate::bsp::delay::Delay;
    use crate::bsp::rc::RcPin;
    use crate::light_sampler::{
        sample, LightLevel, LightSampler, CHARGE_US, DARK_CAP, DRAIN_US,
    };

    /// Capacitor which reads high for `discharge_polls` reads after being released
    struct Capacitor {
        discharge_polls: u32,
        reads: Cell<u32>,
        drained: Cell<bool>,
        charged: Cell<bool>,
    }

    impl Capacitor {
        fn new(discharge_polls: u32) -> Self {
            Capacitor {
                discharge_polls,
                reads: Cell::new(0),
                drained: Cell::new(false),
                charged: Cell::new(false),
            }
        }
    }

    impl RcPin for Capacitor {
        fn charge(&self) {
            self.charged.set(true);
        }

        fn release(&self) {
            self.reads.set(0);
        }

        fn is_high(&self) -> bool {
            let reads = self.reads.get();
            self.reads.set(reads + 1);
            self.charged.get() && reads < self.discharge_polls
        }

        fn drain(&self) {
            self.drained.set(true);
            self.charged.set(false);
        }
    }

    struct CountingDelay {
        total_us: Cell<u32>,
    }

    impl Delay for CountingDelay {
        fn delay_us(&self, us: u32) {
            self.total_us.set(self.total_us.get() + us);
        }
    }

    fn delay() -> CountingDelay {
        CountingDelay {
            total_us: Cell::new(0),
        }
    }

    #[test]
    fn counts_polls_until_the_capacitor_is_discharged() {
        let pin = Capacitor::new(750);
        let delay = delay();
        assert_eq!(sample(&pin, &delay), 750);
        assert!(!pin.drained.get());
        assert_eq!(delay.total_us.get(), CHARGE_US + 750);
    }

    #[test]
    fn bright_light_reads_zero() {
        let pin = Capacitor::new(0);
        assert_eq!(sample(&pin, &delay()), 0);
    }

    #[test]
    fn darkness_is_capped_and_the_capacitor_drained() {
        let pin = Capacitor::new(50_000);
        let delay = delay();
        assert_eq!(sample(&pin, &delay), DARK_CAP);
        assert!(pin.drained.get());
        assert_eq!(
            delay.total_us.get(),
            CHARGE_US + DARK_CAP as u32 + DRAIN_US
        );
    }

    #[test]
    fn disconnected_sensor_reads_as_dark() {
        let pin = Capacitor::new(u32::MAX);
        assert_eq!(sample(&pin, &delay()), DARK_CAP);
    }

    #[test]
    fn tick_publishes_the_sample() {
        let level = LightLevel::new();
        assert_eq!(level.load(), 0);
        let sampler = LightSampler::new(Capacitor::new(1234), delay());
        sampler.on_tick(&level);
        assert_eq!(level.load(), 1234);
    }
}
