//! Volume control with mute memory
//!
//! Volume is a linear gain in [0, 1]. Muting remembers the level it
//! interrupted and shows 0; unmuting brings that level back.

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Current level (0.0-1.0); 0 while muted
    level: f64,

    /// Mute state
    muted: bool,

    /// Level to return to when unmuting
    previous: f64,
}

impl Volume {
    /// Create new volume controller
    pub fn new(level: f64) -> Self {
        let level = clamp_level(level);
        Self {
            level,
            muted: false,
            previous: level,
        }
    }

    /// Set volume level, clamped to [0, 1]
    ///
    /// A positive level while muted unmutes.
    pub fn set_level(&mut self, level: f64) {
        self.level = clamp_level(level);
        if self.level > 0.0 && self.muted {
            self.muted = false;
        }
    }

    /// Set the level from a slider drag, remembering the level it replaced
    pub fn drag_to(&mut self, level: f64) {
        self.previous = self.level;
        self.set_level(level);
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Mute, remembering the current level
    pub fn mute(&mut self) {
        if self.muted {
            return;
        }
        self.previous = self.level;
        self.muted = true;
        self.level = 0.0;
    }

    /// Unmute, restoring the remembered level (full volume if none)
    pub fn unmute(&mut self) {
        if !self.muted {
            return;
        }
        self.muted = false;
        self.level = if self.previous > 0.0 { self.previous } else { 1.0 };
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.unmute();
        } else {
            self.mute();
        }
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Effective gain sent to the output
    pub fn gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(0.8);
        assert_eq!(vol.level(), 0.8);
        assert!(!vol.is_muted());
    }

    #[test]
    fn set_volume_level_clamps() {
        let mut vol = Volume::new(0.5);

        vol.set_level(0.75);
        assert_eq!(vol.level(), 0.75);

        vol.set_level(1.5);
        assert_eq!(vol.level(), 1.0);

        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);

        vol.set_level(f64::NAN);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn mute_unmute_restores_level() {
        let mut vol = Volume::new(0.6);

        vol.mute();
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 0.0);
        assert_eq!(vol.gain(), 0.0);

        vol.unmute();
        assert!(!vol.is_muted());
        assert_eq!(vol.level(), 0.6);
    }

    #[test]
    fn toggle_mute() {
        let mut vol = Volume::new(0.3);

        vol.toggle_mute();
        assert!(vol.is_muted());

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.level(), 0.3);
    }

    #[test]
    fn unmute_from_silence_goes_to_full() {
        let mut vol = Volume::new(0.0);
        vol.mute();
        vol.unmute();
        assert_eq!(vol.level(), 1.0);
    }

    #[test]
    fn raising_volume_while_muted_unmutes() {
        let mut vol = Volume::new(0.7);
        vol.mute();

        vol.set_level(0.0);
        assert!(vol.is_muted());

        vol.set_level(0.4);
        assert!(!vol.is_muted());
        assert_eq!(vol.gain(), 0.4);
    }

    #[test]
    fn drag_remembers_replaced_level() {
        let mut vol = Volume::new(0.9);
        vol.drag_to(0.2);
        vol.mute();
        vol.unmute();
        assert_eq!(vol.level(), 0.2);
    }
}
