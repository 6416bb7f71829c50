//! Runtime configuration for the cloud view and keyboard.
//!
//! Defaults come from `constants.rs`; the web front-end may override a few
//! fields from `data-*` attributes on the page.

use crate::constants::*;
use crate::error::ConfigError;
use std::str::FromStr;

/// What the cloud does when the held note is released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Ignore note-off; energy keeps its linear decay and pitch holds.
    #[default]
    Decay,
    /// Retarget pitch to the rest pitch and ease back; energy keeps decaying.
    Ease,
    /// Drop energy to zero and put pitch back at rest immediately.
    Snap,
}

impl FromStr for ReleasePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "decay" | "" => Ok(Self::Decay),
            "ease" => Ok(Self::Ease),
            "snap" => Ok(Self::Snap),
            _ => Err(ConfigError::UnknownReleasePolicy(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CloudConfig {
    pub decay_per_sec: f32,
    pub idle_speed: f32,
    pub active_boost: f32,
    /// Exponential easing rate `k` in `1 - exp(-k * dt)`.
    pub responsiveness: f32,
    pub release: ReleasePolicy,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            decay_per_sec: ENERGY_DECAY_PER_SEC,
            idle_speed: IDLE_SPEED,
            active_boost: ACTIVE_BOOST,
            responsiveness: PITCH_RESPONSIVENESS,
            release: ReleasePolicy::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardConfig {
    pub octave: i8,
    pub velocity: f32,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            octave: DEFAULT_OCTAVE,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

impl KeyboardConfig {
    pub fn with_octave_str(mut self, octave: &str) -> Result<Self, ConfigError> {
        let parsed: i8 = octave
            .trim()
            .parse()
            .map_err(|_| ConfigError::OctaveOutOfRange(octave.to_string()))?;
        if !(0..=MAX_OCTAVE).contains(&parsed) {
            return Err(ConfigError::OctaveOutOfRange(octave.to_string()));
        }
        self.octave = parsed;
        Ok(self)
    }
}
