// Tuning and page wiring constants for the web front-end.

// Page elements
pub const CLOUD_CANVAS_ID: &str = "cloud-canvas";
pub const KEYBOARD_ID: &str = "keyboard";
pub const AUDIO_OVERLAY_ID: &str = "audio-overlay";
pub const AUDIO_ENABLE_ID: &str = "audio-enable";
pub const AUDIO_STATUS_ID: &str = "audio-status";

// Page-level overrides
pub const RELEASE_ATTR: &str = "data-release"; // on the cloud canvas
pub const OCTAVE_ATTR: &str = "data-octave"; // on the keyboard container

// Canvas backing store: device pixel ratio is clamped to this range
pub const MIN_DEVICE_PIXEL_RATIO: f64 = 1.0;
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

// Frame loop: longest step fed to the animation (backgrounded tabs)
pub const MAX_FRAME_DT_SEC: f32 = 0.1;

// Synth voice
pub const MASTER_GAIN: f32 = 0.25;
pub const VOICE_PEAK_GAIN: f32 = 0.8;
pub const ATTACK_SEC: f64 = 0.01;
pub const RELEASE_TAU_SEC: f64 = 0.08; // exponential tail time constant
pub const RELEASE_STOP_AFTER_SEC: f64 = 0.6; // oscillator stop after release
pub const TONE_LOWPASS_HZ: f32 = 2400.0;

// Static background: dot grid
pub const GRID_PITCH_PX: u32 = 30;
pub const GRID_DOT_PX: u32 = 2;
pub const GRID_DOT_COLOR: &str = "#73737350";

// Cloud pass
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

// CSS classes
pub const KEY_CLASS: &str = "key";
pub const KEY_BLACK_CLASS: &str = "key-black";
pub const KEY_WHITE_CLASS: &str = "key-white";
pub const KEY_ACTIVE_CLASS: &str = "active";
pub const HIDDEN_CLASS: &str = "hidden";
