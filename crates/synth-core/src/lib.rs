pub mod animation;
pub mod bridge;
pub mod cloud;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod keyboard;
pub mod note;

pub use animation::{AnimationState, CloudUniforms, Phase};
pub use bridge::{NoteBridge, Subscription};
pub use cloud::{CloudBinding, CloudModel};
pub use config::{CloudConfig, KeyboardConfig, ReleasePolicy};
pub use error::{ConfigError, NoteParseError, UnlockError};
pub use event::{NoteEvent, NoteKind, NoteMessage};
pub use keyboard::{AudioEngine, Key, Keyboard, UnlockState};
pub use note::{midi_to_hz, Pitch, PitchClass, CHROMATIC};
