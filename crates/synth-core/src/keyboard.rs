//! One-octave monophonic keyboard model.
//!
//! The keyboard owns its audio engine and announces every note on the bridge.
//! Sound is gated on an explicit unlock (browsers refuse to start audio without
//! a user gesture). Until the unlock succeeds, presses are dropped, not queued.

use crate::bridge::NoteBridge;
use crate::config::KeyboardConfig;
use crate::error::{NoteParseError, UnlockError};
use crate::event::NoteEvent;
use crate::note::{Pitch, CHROMATIC};

/// Whatever actually makes the sound.
pub trait AudioEngine {
    /// Start sounding `pitch`. Attacking the pitch that is already sounding
    /// must not restart it.
    fn attack(&mut self, pitch: &Pitch, velocity: f32);
    fn release(&mut self);
    /// Free the engine's resources. Called once, on unmount.
    fn dispose(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Key {
    pub pitch: Pitch,
}

impl Key {
    pub fn label(&self) -> &'static str {
        self.pitch.class().name()
    }

    pub fn is_black(&self) -> bool {
        self.pitch.class().is_accidental()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnlockState {
    Locked,
    Unlocking,
    Ready,
    Failed(UnlockError),
}

pub struct Keyboard<A: AudioEngine> {
    keys: Vec<Key>,
    velocity: f32,
    audio: A,
    bridge: NoteBridge,
    unlock: UnlockState,
    held: Option<usize>,
    disposed: bool,
}

impl<A: AudioEngine> Keyboard<A> {
    pub fn new(
        config: &KeyboardConfig,
        audio: A,
        bridge: NoteBridge,
    ) -> Result<Self, NoteParseError> {
        let keys = CHROMATIC
            .iter()
            .map(|&class| Pitch::new(class, config.octave).map(|pitch| Key { pitch }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            keys,
            velocity: config.velocity.clamp(0.0, 1.0),
            audio,
            bridge,
            unlock: UnlockState::Locked,
            held: None,
            disposed: false,
        })
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn unlock_state(&self) -> &UnlockState {
        &self.unlock
    }

    /// True while the UI should offer the "enable audio" affordance.
    pub fn needs_gesture(&self) -> bool {
        matches!(self.unlock, UnlockState::Locked | UnlockState::Failed(_))
    }

    pub fn is_ready(&self) -> bool {
        self.unlock == UnlockState::Ready && !self.disposed
    }

    /// Called from the user gesture. Returns false when an unlock is already
    /// running or done, in which case the caller should not start another.
    pub fn begin_unlock(&mut self) -> bool {
        if self.disposed || !self.needs_gesture() {
            return false;
        }
        self.unlock = UnlockState::Unlocking;
        true
    }

    pub fn finish_unlock(&mut self, result: Result<(), UnlockError>) {
        if self.disposed {
            return;
        }
        self.unlock = match result {
            Ok(()) => {
                log::info!("[keys] audio unlocked");
                UnlockState::Ready
            }
            Err(e) => {
                log::warn!("[keys] audio unlock failed: {}", e);
                UnlockState::Failed(e)
            }
        };
    }

    pub fn held(&self) -> Option<usize> {
        self.held
    }

    /// Sound key `index` and announce it. Presses before the audio is ready,
    /// or for keys that do not exist, are dropped.
    pub fn press(&mut self, index: usize) -> Option<NoteEvent> {
        if !self.is_ready() {
            log::debug!("[keys] press {} dropped, audio not ready", index);
            return None;
        }
        let key = *self.keys.get(index)?;
        self.audio.attack(&key.pitch, self.velocity);
        self.held = Some(index);
        let event = NoteEvent::from_pitch(&key.pitch, self.velocity);
        self.bridge.publish_note_on(event.clone());
        Some(event)
    }

    /// Release key `index` if it is the one sounding. Returns whether a
    /// note-off went out.
    pub fn release(&mut self, index: usize) -> bool {
        if self.held != Some(index) {
            return false;
        }
        self.held = None;
        self.audio.release();
        self.bridge.publish_note_off();
        true
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(index) = self.held {
            self.release(index);
        }
        self.audio.dispose();
        self.disposed = true;
        log::info!("[keys] disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Silent {
        attacks: Vec<u8>,
        releases: usize,
        disposed: bool,
    }

    impl AudioEngine for Silent {
        fn attack(&mut self, pitch: &Pitch, _velocity: f32) {
            self.attacks.push(pitch.midi());
        }
        fn release(&mut self) {
            self.releases += 1;
        }
        fn dispose(&mut self) {
            self.disposed = true;
        }
    }

    fn keyboard() -> Keyboard<Silent> {
        Keyboard::new(&KeyboardConfig::default(), Silent::default(), NoteBridge::new()).unwrap()
    }

    fn ready() -> Keyboard<Silent> {
        let mut kb = keyboard();
        assert!(kb.begin_unlock());
        kb.finish_unlock(Ok(()));
        kb
    }

    #[test]
    fn builds_one_chromatic_octave() {
        let kb = keyboard();
        let labels: Vec<&str> = kb.keys().iter().map(|k| k.label()).collect();
        assert_eq!(
            labels,
            ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"]
        );
        let black = kb.keys().iter().filter(|k| k.is_black()).count();
        assert_eq!(black, 5);
        assert_eq!(kb.keys()[0].pitch.midi(), 60);
    }

    #[test]
    fn presses_before_unlock_are_dropped() {
        let mut kb = keyboard();
        assert!(kb.needs_gesture());
        assert_eq!(kb.press(0), None);
        assert!(kb.begin_unlock());
        assert_eq!(kb.press(0), None);
        assert!(!kb.begin_unlock());
        kb.finish_unlock(Ok(()));
        assert!(kb.audio().attacks.is_empty());
        assert!(kb.press(0).is_some());
    }

    #[test]
    fn failed_unlock_can_be_retried() {
        let mut kb = keyboard();
        kb.begin_unlock();
        kb.finish_unlock(Err(UnlockError::NoDevice));
        assert_eq!(kb.unlock_state(), &UnlockState::Failed(UnlockError::NoDevice));
        assert!(kb.needs_gesture());
        assert_eq!(kb.press(4), None);
        assert!(kb.begin_unlock());
        kb.finish_unlock(Ok(()));
        assert!(kb.is_ready());
        assert!(!kb.needs_gesture());
    }

    #[test]
    fn press_returns_the_announced_event() {
        let mut kb = ready();
        let ev = kb.press(1).unwrap();
        assert_eq!(ev.note, "C#4");
        assert_eq!(ev.midi, 61);
        assert_eq!(kb.audio().attacks, [61]);
        assert_eq!(kb.press(12), None);
    }

    #[test]
    fn releasing_a_superseded_key_is_ignored() {
        let mut kb = ready();
        kb.press(0);
        kb.press(2);
        assert!(!kb.release(0));
        assert_eq!(kb.held(), Some(2));
        assert!(kb.release(2));
        assert!(!kb.release(2));
        assert_eq!(kb.audio().releases, 1);
    }

    #[test]
    fn dispose_releases_and_frees_audio() {
        let mut kb = ready();
        kb.press(0);
        kb.dispose();
        assert!(kb.audio().disposed);
        assert_eq!(kb.audio().releases, 1);
        assert_eq!(kb.press(0), None);
        kb.dispose();
    }
}
