//! Candle flicker: pseudo-random brightness targets approached in a few linear steps.
use crate::bsp::pwm::Channel;

/// Lowest brightness of a flicker target, also used for the low battery pulse
pub const PWM_MIN: u8 = 0x80;
/// Duration of one flicker cycle
pub const CYCLE_MS: u32 = 127;
pub const STEP_SHIFT: u32 = 3;
/// Steps per cycle, the last one lands exactly on the target
pub const STEPS: u8 = 1 << STEP_SHIFT;
pub const STEP_MS: u32 = CYCLE_MS >> STEP_SHIFT;

const RAND_MAX: u32 = (1 << 31) - 1;
const TARGET_SPAN: u32 = 0x7F;

/// Linear congruential generator, `x = (214013 * x + 2531011) mod 2^31`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Prng {
    state: u32,
}

impl Prng {
    pub fn seed(seed: u16) -> Self {
        Prng {
            state: u32::from(seed),
        }
    }

    pub fn next(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(214_013)
            .wrapping_add(2_531_011)
            & RAND_MAX;
        self.state
    }
}

/// Maps a PRNG output to a brightness in `[PWM_MIN, PWM_MIN + 126]`
pub fn target_from(random: u32) -> u8 {
    (random % TARGET_SPAN) as u8 | PWM_MIN
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BrightnessChannel {
    pub duty: u8,
    pub step: i8,
    pub target: u8,
}

impl BrightnessChannel {
    /// Starts a new interpolation from `duty` towards `target`.
    ///
    /// The increment is the difference shifted right arithmetically, so negative differences
    /// round towards negative infinity. The snap in the last step absorbs the error.
    pub fn aim(&mut self, duty: u8, target: u8) {
        self.duty = duty;
        self.target = target;
        self.step = ((i16::from(target) - i16::from(duty)) >> STEP_SHIFT) as i8;
    }

    /// Applies step `i` of [STEPS] and returns the new duty
    pub fn advance(&mut self, i: u8) -> u8 {
        self.duty = if i + 1 < STEPS {
            // 8-bit register arithmetic
            self.duty.wrapping_add(self.step as u8)
        } else {
            self.target
        };
        self.duty
    }
}

/// Two channels, the second one follows the targets of the first with one cycle delay.
///
/// Targets survive deactivation, only the duties are restarted from zero.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Flicker {
    prng: Prng,
    led1: BrightnessChannel,
    led2: BrightnessChannel,
}

impl Flicker {
    pub fn reseed(&mut self, seed: u16) {
        self.prng = Prng::seed(seed);
    }

    /// Draws the next target and aims both channels, starting from the current duties
    pub fn begin_cycle(&mut self, duty1: u8, duty2: u8) {
        let previous = self.led1.target;
        let target = target_from(self.prng.next());
        self.led2.aim(duty2, previous);
        self.led1.aim(duty1, target);
    }

    pub fn advance(&mut self, i: u8) -> (u8, u8) {
        (self.led1.advance(i), self.led2.advance(i))
    }

    pub fn channel(&self, channel: Channel) -> BrightnessChannel {
        match channel {
            Channel::Led1 => self.led1,
            Channel::Led2 => self.led2,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::bsp::pwm::Channel;
    use crate::flicker::{target_from, BrightnessChannel, Flicker, Prng, PWM_MIN, STEPS, STEP_MS};

    #[test]
    fn prng_sequence() {
        let mut prng = Prng::seed(0);
        assert_eq!(prng.next(), 2_531_011);
        assert_eq!(prng.next(), 505_908_858);
        assert_eq!(prng.next(), 1_391_876_949);
    }

    #[test]
    fn prng_stays_within_31_bits() {
        let mut prng = Prng::seed(u16::MAX);
        for _ in 0..10_000 {
            assert!(prng.next() < 1 << 31);
        }
    }

    #[test]
    fn target_bounds() {
        assert_eq!(target_from(0), PWM_MIN);
        assert_eq!(target_from(126), 254);
        assert_eq!(target_from(127), PWM_MIN);
    }

    #[test]
    fn step_timing() {
        assert_eq!(STEPS, 8);
        assert_eq!(STEP_MS, 15);
    }

    #[test]
    fn increment_rounds_towards_negative_infinity() {
        let mut channel = BrightnessChannel::default();
        channel.aim(200, 190);
        // -10 >> 3
        assert_eq!(channel.step, -2);
        channel.aim(190, 200);
        assert_eq!(channel.step, 1);
    }

    #[test]
    fn interpolation_lands_on_target() {
        let mut channel = BrightnessChannel::default();
        channel.aim(0, 0xC5);
        let duties: Vec<u8> = (0..STEPS).map(|i| channel.advance(i)).collect();
        assert_eq!(duties, vec![24, 48, 72, 96, 120, 144, 168, 0xC5]);
    }

    #[test]
    fn second_channel_follows_with_one_cycle_delay() {
        let mut flicker = Flicker::default();
        flicker.reseed(4000);

        flicker.begin_cycle(0, 0);
        let first = flicker.channel(Channel::Led1).target;
        // nothing drawn before the first cycle
        assert_eq!(flicker.channel(Channel::Led2).target, 0);
        for i in 0..STEPS {
            flicker.advance(i);
        }

        flicker.begin_cycle(first, 0);
        assert_eq!(flicker.channel(Channel::Led2).target, first);
        assert_ne!(flicker.channel(Channel::Led1).target, 0);
    }

    #[test]
    fn targets_survive_reseeding() {
        let mut flicker = Flicker::default();
        flicker.reseed(2000);
        flicker.begin_cycle(0, 0);
        let target = flicker.channel(Channel::Led1).target;

        flicker.reseed(3000);
        flicker.begin_cycle(0, 0);
        assert_eq!(flicker.channel(Channel::Led2).target, target);
    }
}
