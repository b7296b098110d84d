//! Dark / light detection with hysteresis.
use no_std_compat::cell::Cell;

/// Light levels at or below this are daylight
pub const TURN_OFF: u16 = 400;
/// Light levels at or above this are darkness
pub const TURN_ON: u16 = TURN_OFF + 800;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Off,
    On,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Off
    }
}

/// Levels strictly between [TURN_OFF] and [TURN_ON] keep the previous mode.
pub struct ModeSwitch {
    mode: Cell<Mode>,
}

impl ModeSwitch {
    pub fn new() -> Self {
        ModeSwitch {
            mode: Cell::new(Mode::default()),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    /// Applies a new light level and returns the resulting mode
    pub fn update(&self, light_level: u16) -> Mode {
        let next = if light_level <= TURN_OFF {
            Mode::Off
        } else if light_level >= TURN_ON {
            Mode::On
        } else {
            self.mode.get()
        };
        self.mode.set(next);
        next
    }
}

impl Default for ModeSwitch {
    fn default() -> Self {
        Self::new()
    }
}
