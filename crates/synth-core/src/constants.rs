// Cloud animation tuning. Rates are per second.

// Linear energy decay after a note-on (1.0 -> 0.0 in 0.4 s)
pub const ENERGY_DECAY_PER_SEC: f32 = 2.5;

// Time advance speed: frozen when idle, slow drift while notes ring
pub const IDLE_SPEED: f32 = 0.0;
pub const ACTIVE_BOOST: f32 = 0.08;

// Exponential easing responsiveness (1/s) for the pitch-derived fields
pub const PITCH_RESPONSIVENESS: f32 = 20.0;

// MIDI band mapped onto the normalized pitch [0, 1]
pub const MIDI_NORM_LOW: f32 = 36.0;
pub const MIDI_NORM_HIGH: f32 = 84.0;

// Rest pitch the cloud returns to under the ease/snap release policies (C4)
pub const REST_MIDI: u8 = 60;

// Keyboard defaults
pub const DEFAULT_OCTAVE: i8 = 4;
pub const MAX_OCTAVE: i8 = 8;
pub const DEFAULT_VELOCITY: f32 = 1.0;

// 12-TET reference
pub const A4_MIDI: f32 = 69.0;
pub const A4_HZ: f32 = 440.0;
