//! Per-frame cloud parameters driven by note messages.
//!
//! Note-ons kick `energy` to 1 and retarget the pitch fields; every frame the
//! energy decays linearly, `time` advances in proportion to the energy, and the
//! smoothed pitch fields ease toward their targets with a frame-rate
//! independent exponential filter.

use crate::config::{CloudConfig, ReleasePolicy};
use crate::constants::{MIDI_NORM_HIGH, MIDI_NORM_LOW, REST_MIDI};
use crate::event::NoteMessage;
use crate::note::midi_to_hz;
use glam::Vec2;

/// Map a MIDI number onto the visual pitch band: 36 -> 0.0, 84 -> 1.0, clamped.
#[inline]
pub fn midi_norm(midi: f32) -> f32 {
    ((midi - MIDI_NORM_LOW) / (MIDI_NORM_HIGH - MIDI_NORM_LOW)).clamp(0.0, 1.0)
}

/// Blend factor of one easing step of length `dt` at rate `k`.
#[inline]
pub fn smoothing_alpha(k: f32, dt: f32) -> f32 {
    1.0 - (-k * dt).exp()
}

#[inline]
fn ease(smoothed: &mut f32, target: f32, alpha: f32) {
    *smoothed += (target - *smoothed) * alpha;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Energy is zero and time is frozen.
    Idle,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub time: f32,
    pub energy: f32,
    pub freq_target: f32,
    pub freq_smoothed: f32,
    pub midi_norm_target: f32,
    pub midi_norm_smoothed: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        let rest_freq = midi_to_hz(REST_MIDI as f32);
        let rest_norm = midi_norm(REST_MIDI as f32);
        Self {
            time: 0.0,
            energy: 0.0,
            freq_target: rest_freq,
            freq_smoothed: rest_freq,
            midi_norm_target: rest_norm,
            midi_norm_smoothed: rest_norm,
        }
    }
}

/// Values handed to the shading stage every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudUniforms {
    /// Viewport size in device pixels.
    pub resolution: Vec2,
    pub time: f32,
    pub energy: f32,
    pub freq: f32,
    pub midi_norm: f32,
}

impl AnimationState {
    pub fn phase(&self) -> Phase {
        if self.energy > 0.0 {
            Phase::Active
        } else {
            Phase::Idle
        }
    }

    /// React to a bridge message. Successive note-ons are last-writer-wins.
    pub fn apply(&mut self, config: &CloudConfig, message: &NoteMessage) {
        match message {
            NoteMessage::On(ev) => {
                self.energy = 1.0;
                self.freq_target = ev.freq;
                self.midi_norm_target = midi_norm(ev.midi as f32);
            }
            NoteMessage::Off => match config.release {
                ReleasePolicy::Decay => {}
                ReleasePolicy::Ease => {
                    let rest = Self::default();
                    self.freq_target = rest.freq_target;
                    self.midi_norm_target = rest.midi_norm_target;
                }
                ReleasePolicy::Snap => {
                    let rest = Self::default();
                    self.energy = 0.0;
                    self.freq_target = rest.freq_target;
                    self.freq_smoothed = rest.freq_smoothed;
                    self.midi_norm_target = rest.midi_norm_target;
                    self.midi_norm_smoothed = rest.midi_norm_smoothed;
                }
            },
        }
    }

    /// Move the state forward by `dt` seconds. Negative or non-finite `dt` is
    /// treated as zero.
    pub fn advance(&mut self, config: &CloudConfig, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.energy = (self.energy - config.decay_per_sec * dt).max(0.0);

        let speed = config.idle_speed + config.active_boost * self.energy;
        self.time += speed * dt;

        let alpha = smoothing_alpha(config.responsiveness, dt);
        ease(&mut self.freq_smoothed, self.freq_target, alpha);
        ease(&mut self.midi_norm_smoothed, self.midi_norm_target, alpha);
    }

    /// Pure form of one frame: apply the latest message (if any), then advance.
    pub fn step(mut self, config: &CloudConfig, dt: f32, latest: Option<&NoteMessage>) -> Self {
        if let Some(message) = latest {
            self.apply(config, message);
        }
        self.advance(config, dt);
        self
    }

    pub fn uniforms(&self, resolution: Vec2) -> CloudUniforms {
        CloudUniforms {
            resolution,
            time: self.time,
            energy: self.energy,
            freq: self.freq_smoothed,
            midi_norm: self.midi_norm_smoothed,
        }
    }
}
