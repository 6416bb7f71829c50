use crate::note::Pitch;

/// Metadata of a single note-on, as announced by the keyboard.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteEvent {
    /// Scientific pitch name, e.g. `"C#4"`.
    pub note: String,
    pub midi: u8,
    pub freq: f32,
    /// 0..1
    pub velocity: f32,
}

impl NoteEvent {
    pub fn from_pitch(pitch: &Pitch, velocity: f32) -> Self {
        Self {
            note: pitch.to_string(),
            midi: pitch.midi(),
            freq: pitch.frequency_hz(),
            velocity: velocity.clamp(0.0, 1.0),
        }
    }
}

/// Subscription key on the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoteKind {
    On,
    Off,
}

/// What a subscriber receives. Note-off carries no payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NoteMessage {
    On(NoteEvent),
    Off,
}

impl NoteMessage {
    pub fn kind(&self) -> NoteKind {
        match self {
            NoteMessage::On(_) => NoteKind::On,
            NoteMessage::Off => NoteKind::Off,
        }
    }
}
