//! Pitch naming and 12-TET conversions.
//!
//! Octaves follow the scientific convention where C4 is middle C (MIDI 60)
//! and A4 is 440 Hz. Accidentals are always spelled with sharps on output;
//! flats are accepted on input.

use crate::constants::{A4_HZ, A4_MIDI};
use crate::error::NoteParseError;
use std::fmt;
use std::str::FromStr;

const NOTES_PER_OCTAVE: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

/// The twelve pitch classes of one octave, starting at C.
pub const CHROMATIC: [PitchClass; 12] = [
    PitchClass::C,
    PitchClass::CSharp,
    PitchClass::D,
    PitchClass::DSharp,
    PitchClass::E,
    PitchClass::F,
    PitchClass::FSharp,
    PitchClass::G,
    PitchClass::GSharp,
    PitchClass::A,
    PitchClass::ASharp,
    PitchClass::B,
];

impl PitchClass {
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Self {
        CHROMATIC[(index % NOTES_PER_OCTAVE) as usize]
    }

    pub const fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// True for pitch classes spelled with an accidental, i.e. the black keys.
    pub const fn is_accidental(self) -> bool {
        matches!(
            self,
            PitchClass::CSharp
                | PitchClass::DSharp
                | PitchClass::FSharp
                | PitchClass::GSharp
                | PitchClass::ASharp
        )
    }

    fn natural(letter: char) -> Option<u8> {
        match letter.to_ascii_uppercase() {
            'C' => Some(0),
            'D' => Some(2),
            'E' => Some(4),
            'F' => Some(5),
            'G' => Some(7),
            'A' => Some(9),
            'B' => Some(11),
            _ => None,
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Letter plus accidentals, as a semitone offset from C that may fall
/// outside `0..12` (`Cb` is -1, `B#` is 12).
fn spelled_semitone(name: &str) -> Result<i32, NoteParseError> {
    let mut chars = name.chars();
    let letter = chars.next().ok_or(NoteParseError::Empty)?;
    let base = PitchClass::natural(letter)
        .ok_or_else(|| NoteParseError::UnknownPitchClass(name.to_string()))?;
    let mut offset = 0i32;
    for c in chars {
        match c {
            '#' => offset += 1,
            'b' => offset -= 1,
            _ => return Err(NoteParseError::UnknownPitchClass(name.to_string())),
        }
    }
    Ok(base as i32 + offset)
}

impl FromStr for PitchClass {
    type Err = NoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let semitone = spelled_semitone(s)?;
        Ok(Self::from_index(semitone.rem_euclid(NOTES_PER_OCTAVE as i32) as u8))
    }
}

/// A pitch class in a concrete octave, always within the MIDI range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    class: PitchClass,
    octave: i8,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: i8) -> Result<Self, NoteParseError> {
        let midi = (octave as i32 + 1) * NOTES_PER_OCTAVE as i32 + class.index() as i32;
        if !(0..=127).contains(&midi) {
            return Err(NoteParseError::OutOfRange(format!("{}{}", class, octave)));
        }
        Ok(Self { class, octave })
    }

    pub fn from_midi(midi: u8) -> Result<Self, NoteParseError> {
        if midi > 127 {
            return Err(NoteParseError::OutOfRange(midi.to_string()));
        }
        Ok(Self {
            class: PitchClass::from_index(midi % NOTES_PER_OCTAVE),
            octave: (midi / NOTES_PER_OCTAVE) as i8 - 1,
        })
    }

    pub fn class(&self) -> PitchClass {
        self.class
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn midi(&self) -> u8 {
        ((self.octave as i16 + 1) * NOTES_PER_OCTAVE as i16 + self.class.index() as i16) as u8
    }

    pub fn frequency_hz(&self) -> f32 {
        midi_to_hz(self.midi() as f32)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}

impl FromStr for Pitch {
    type Err = NoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NoteParseError::Empty);
        }
        // The octave starts at the first digit or at a minus sign following the name.
        let split = s
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_ascii_digit() || *c == '-')
            .map(|(i, _)| i)
            .ok_or_else(|| NoteParseError::InvalidOctave(s.to_string()))?;
        let (name, octave) = s.split_at(split);
        let semitone = spelled_semitone(name)?;
        let octave: i8 = octave
            .parse()
            .map_err(|_| NoteParseError::InvalidOctave(octave.to_string()))?;
        // Accidentals may carry the note across an octave boundary (Cb4 is B3).
        let midi = (octave as i32 + 1) * NOTES_PER_OCTAVE as i32 + semitone;
        u8::try_from(midi)
            .map_err(|_| NoteParseError::OutOfRange(s.to_string()))
            .and_then(Self::from_midi)
    }
}

pub fn midi_to_hz(midi: f32) -> f32 {
    A4_HZ * (2.0_f32).powf((midi - A4_MIDI) / 12.0)
}
