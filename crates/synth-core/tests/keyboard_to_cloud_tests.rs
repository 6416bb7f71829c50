// End-to-end: keyboard presses travel over the bridge into the cloud model.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use synth_core::animation::midi_norm;
use synth_core::*;

#[derive(Default)]
struct Mute;

impl AudioEngine for Mute {
    fn attack(&mut self, _pitch: &Pitch, _velocity: f32) {}
    fn release(&mut self) {}
    fn dispose(&mut self) {}
}

fn index_of(kb: &Keyboard<Mute>, name: &str) -> usize {
    kb.keys()
        .iter()
        .position(|k| k.label() == name)
        .expect("key exists")
}

fn unlocked(bridge: &NoteBridge) -> Keyboard<Mute> {
    let mut kb = Keyboard::new(&KeyboardConfig::default(), Mute, bridge.clone()).unwrap();
    kb.begin_unlock();
    kb.finish_unlock(Ok(()));
    kb
}

fn record(bridge: &NoteBridge) -> (Rc<RefCell<Vec<NoteMessage>>>, Vec<Subscription>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let subs = [NoteKind::On, NoteKind::Off]
        .into_iter()
        .map(|kind| {
            let seen = seen.clone();
            bridge.subscribe(kind, move |m| seen.borrow_mut().push(m.clone()))
        })
        .collect();
    (seen, subs)
}

#[test]
fn press_c_then_release() {
    let bridge = NoteBridge::new();
    let (seen, _subs) = record(&bridge);
    let mut kb = unlocked(&bridge);

    let c = index_of(&kb, "C");
    kb.press(c);
    kb.release(c);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    match &seen[0] {
        NoteMessage::On(ev) => {
            assert_eq!(ev.note, "C4");
            assert_eq!(ev.midi, 60);
            assert!((ev.freq - 261.63).abs() < 0.01);
        }
        other => panic!("expected note-on, got {other:?}"),
    }
    assert_eq!(seen[1], NoteMessage::Off);
}

#[test]
fn rapid_presses_keep_energy_full_and_retarget() {
    let bridge = NoteBridge::new();
    let cloud = CloudBinding::mount(&bridge, CloudConfig::default());
    let mut kb = unlocked(&bridge);
    let res = Vec2::new(800.0, 600.0);

    for name in ["C", "D", "E"] {
        kb.press(index_of(&kb, name));
        assert_eq!(cloud.model().borrow().state().energy, 1.0);
        cloud.frame(1.0 / 60.0, res);
    }

    let state = *cloud.model().borrow().state();
    let e4: Pitch = "E4".parse().unwrap();
    assert_eq!(state.freq_target, e4.frequency_hz());
    assert_eq!(state.midi_norm_target, midi_norm(64.0));
}

#[test]
fn locked_keyboard_sends_nothing() {
    let bridge = NoteBridge::new();
    let (seen, _subs) = record(&bridge);
    let mut kb = Keyboard::new(&KeyboardConfig::default(), Mute, bridge.clone()).unwrap();
    assert!(kb.press(0).is_none());
    assert!(!kb.release(0));
    assert!(seen.borrow().is_empty());
}

#[test]
fn uneven_frame_schedules_agree() {
    let cfg = CloudConfig::default();
    let mut rng = StdRng::seed_from_u64(7);
    let on = NoteMessage::On(NoteEvent::from_pitch(&"A5".parse::<Pitch>().unwrap(), 1.0));
    let start = AnimationState::default().step(&cfg, 0.0, Some(&on));

    let reference = (0..100).fold(start, |s, _| s.step(&cfg, 0.01, None));

    for _ in 0..20 {
        // Random frame lengths summing to one second.
        let mut cuts: Vec<f32> = (0..rng.gen_range(1..40)).map(|_| rng.gen::<f32>()).collect();
        cuts.push(0.0);
        cuts.push(1.0);
        cuts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let s = cuts
            .windows(2)
            .fold(start, |s, w| s.step(&cfg, w[1] - w[0], None));
        assert!((s.freq_smoothed - reference.freq_smoothed).abs() < 1e-3);
        assert!((s.midi_norm_smoothed - reference.midi_norm_smoothed).abs() < 1e-3);
        assert_eq!(s.energy, 0.0);
    }
}

#[test]
fn unmounted_cloud_stops_listening() {
    let bridge = NoteBridge::new();
    let cloud = CloudBinding::mount(&bridge, CloudConfig::default());
    let model = cloud.model().clone();
    let mut kb = unlocked(&bridge);
    cloud.unmount();

    kb.press(0);
    assert_eq!(model.borrow().state().phase(), Phase::Idle);
    assert_eq!(bridge.subscriber_count(NoteKind::On), 0);
}
