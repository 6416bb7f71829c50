use thiserror::Error;

/// Failure to read a pitch such as `"C#4"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteParseError {
    #[error("empty note name")]
    Empty,
    #[error("unknown pitch class `{0}`")]
    UnknownPitchClass(String),
    #[error("invalid octave `{0}`")]
    InvalidOctave(String),
    #[error("note `{0}` is outside the MIDI range")]
    OutOfRange(String),
}

/// The audio engine could not be started from a user gesture.
///
/// This is the only failure shown to the user; it is always recoverable by
/// repeating the gesture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnlockError {
    #[error("audio was blocked by the browser: {0}")]
    Blocked(String),
    #[error("no audio output device is available")]
    NoDevice,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown release policy `{0}` (expected decay, ease or snap)")]
    UnknownReleasePolicy(String),
    #[error("octave `{0}` is outside 0..=8")]
    OctaveOutOfRange(String),
}
