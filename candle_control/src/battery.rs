use no_std_compat::cell::Cell;

use crate::bsp::pin::Pin;

/// More consecutive low samples than this mean the battery is empty
pub const LOW_BATTERY_THRESHOLD: u8 = 100;
/// One below the wrap point, the counter stays "low" for as long as the signal is asserted
pub const LOW_BATTERY_COUNT_CAP: u8 = u8::MAX - 1;

/// Debounces the battery-low comparator. Sampled once per control loop iteration.
pub struct BatteryMonitor<P: Pin> {
    pin: P,
    count: Cell<u8>,
}

impl<P: Pin> BatteryMonitor<P> {
    pub fn new(pin: P) -> Self {
        BatteryMonitor {
            pin,
            count: Cell::new(0),
        }
    }

    pub fn sample(&self) {
        let count = if self.pin.is_high() {
            (self.count.get() + 1).min(LOW_BATTERY_COUNT_CAP)
        } else {
            0
        };
        self.count.set(count);
    }

    pub fn count(&self) -> u8 {
        self.count.get()
    }

    pub fn is_low(&self) -> bool {
        self.count.get() > LOW_BATTERY_THRESHOLD
    }
}
