pub mod pin {
    /// A digital input, e.g. the output of the battery-low comparator (high = asserted)
    pub trait Pin {
        fn is_high(&self) -> bool;
    }
}

pub mod rc {
    /// Sense pin of the photoresistor / capacitor divider.
    ///
    /// The same pin is used as an output to charge or drain the capacitor and as a
    /// floating input to time the discharge through the photoresistor.
    pub trait RcPin {
        /// Output, driven high
        fn charge(&self);
        /// High-impedance input, no pull-up
        fn release(&self);
        fn is_high(&self) -> bool;
        /// Output, driven low
        fn drain(&self);
    }
}

pub mod delay {
    /// Busy wait, must be usable from the interrupt handler
    pub trait Delay {
        fn delay_us(&self, us: u32);
    }
}

pub mod pwm {
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum Channel {
        Led1,
        Led2,
    }

    /// 8-bit PWM timer driving both LED channels.
    pub trait Pwm {
        fn set_duty(&self, channel: Channel, duty: u8);
        fn duty(&self, channel: Channel) -> u8;
        fn start(&self);
        /// Stops the timer and forces both LED outputs low. Duty values are kept.
        fn stop(&self);
        fn is_running(&self) -> bool;
    }
}
