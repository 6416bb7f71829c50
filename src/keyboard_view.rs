use crate::audio::{self, WebAudioSynth};
use crate::constants::{
    AUDIO_ENABLE_ID, KEY_ACTIVE_CLASS, KEY_BLACK_CLASS, KEY_CLASS, KEY_WHITE_CLASS, OCTAVE_ATTR,
};
use crate::dom::{self, Listener};
use crate::keymap;
use crate::overlay;
use fnv::FnvHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use synth_core::{Key, Keyboard, KeyboardConfig, NoteBridge, UnlockError, UnlockState};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

type SharedKeyboard = Rc<RefCell<Keyboard<WebAudioSynth>>>;

pub fn read_keyboard_config(container: &web::Element) -> KeyboardConfig {
    let config = KeyboardConfig::default();
    match dom::data_attr(container, OCTAVE_ATTR) {
        Some(raw) => config.clone().with_octave_str(&raw).unwrap_or_else(|e| {
            log::warn!("[keys] {}; using octave {}", e, config.octave);
            config
        }),
        None => config,
    }
}

fn render_keys(
    document: &web::Document,
    container: &web::Element,
    keys: &[Key],
) -> anyhow::Result<Vec<web::Element>> {
    container.set_inner_html("");
    keys.iter()
        .map(|key| {
            let el = document
                .create_element("div")
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            let shade = if key.is_black() {
                KEY_BLACK_CLASS
            } else {
                KEY_WHITE_CLASS
            };
            _ = el.class_list().add_2(KEY_CLASS, shade);
            _ = el.set_attribute("data-note", &key.pitch.to_string());
            el.set_text_content(Some(key.label()));
            container
                .append_child(&el)
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            Ok(el)
        })
        .collect()
}

fn press(
    keyboard: &SharedKeyboard,
    elements: &[web::Element],
    document: &web::Document,
    index: usize,
) {
    let event = keyboard.borrow_mut().press(index);
    match event {
        Some(ev) => {
            for (i, el) in elements.iter().enumerate() {
                _ = el.class_list().toggle_with_force(KEY_ACTIVE_CLASS, i == index);
            }
            log::info!("[keys] {} on ({:.2} Hz, midi {})", ev.note, ev.freq, ev.midi);
        }
        None => {
            if keyboard.borrow().needs_gesture() {
                overlay::show(document);
            }
        }
    }
}

fn release(keyboard: &SharedKeyboard, elements: &[web::Element], index: usize) {
    if keyboard.borrow_mut().release(index) {
        log::info!("[keys] off");
    }
    if let Some(el) = elements.get(index) {
        _ = el.class_list().remove_1(KEY_ACTIVE_CLASS);
    }
}

fn finish_unlock(
    keyboard: &SharedKeyboard,
    document: &web::Document,
    result: Result<(), UnlockError>,
) {
    keyboard.borrow_mut().finish_unlock(result);
    match keyboard.borrow().unlock_state() {
        UnlockState::Ready => overlay::hide(document),
        UnlockState::Failed(e) => overlay::show_unlock_error(document, e),
        UnlockState::Locked | UnlockState::Unlocking => {}
    }
}

/// Runs inside the enable-audio click so the resume call carries the gesture.
fn start_unlock(keyboard: &SharedKeyboard, document: &web::Document) {
    let resumed = {
        let mut kb = keyboard.borrow_mut();
        if !kb.begin_unlock() {
            return;
        }
        kb.audio_mut().resume()
    };
    overlay::show_unlocking(document);
    match resumed {
        Err(e) => finish_unlock(keyboard, document, Err(e)),
        Ok(promise) => {
            let keyboard = keyboard.clone();
            let document = document.clone();
            spawn_local(async move {
                let mut result = audio::await_unlock(promise).await;
                if result.is_ok() && !keyboard.borrow().audio().is_running() {
                    result = Err(UnlockError::Blocked("audio is still suspended".into()));
                }
                finish_unlock(&keyboard, &document, result);
            });
        }
    }
}

/// The on-screen octave: key elements, input listeners and the synth they drive.
pub struct KeyboardView {
    keyboard: SharedKeyboard,
    container: web::Element,
    listeners: Vec<Listener>,
}

impl KeyboardView {
    pub fn mount(
        document: &web::Document,
        container: web::Element,
        bridge: &NoteBridge,
    ) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let config = read_keyboard_config(&container);
        let keyboard = Keyboard::new(&config, WebAudioSynth::new(), bridge.clone())?;
        let elements = Rc::new(render_keys(document, &container, keyboard.keys())?);
        let keyboard: SharedKeyboard = Rc::new(RefCell::new(keyboard));
        log::info!("[keys] mounted octave {}", config.octave);

        let mut listeners = Vec::new();
        // pointer id -> key index, so a release lands on the key that was pressed
        let pointers: Rc<RefCell<FnvHashMap<i32, usize>>> = Rc::default();

        for (index, el) in elements.iter().enumerate() {
            let keyboard = keyboard.clone();
            let elements = elements.clone();
            let pointers = pointers.clone();
            let document = document.clone();
            let target = el.clone();
            listeners.push(Listener::new(el, "pointerdown", move |ev| {
                ev.prevent_default();
                if let Some(pe) = ev.dyn_ref::<web::PointerEvent>() {
                    _ = target.set_pointer_capture(pe.pointer_id());
                    pointers.borrow_mut().insert(pe.pointer_id(), index);
                }
                press(&keyboard, &elements, &document, index);
            }));
        }

        for kind in ["pointerup", "pointercancel"] {
            let keyboard = keyboard.clone();
            let elements = elements.clone();
            let pointers = pointers.clone();
            listeners.push(Listener::new(&window, kind, move |ev| {
                let Some(pe) = ev.dyn_ref::<web::PointerEvent>() else {
                    return;
                };
                let index = pointers.borrow_mut().remove(&pe.pointer_id());
                if let Some(index) = index {
                    release(&keyboard, &elements, index);
                }
            }));
        }

        {
            let keyboard = keyboard.clone();
            let elements = elements.clone();
            let document = document.clone();
            listeners.push(Listener::new(&window, "keydown", move |ev| {
                let Some(ke) = ev.dyn_ref::<web::KeyboardEvent>() else {
                    return;
                };
                if ke.repeat() || ke.ctrl_key() || ke.meta_key() || ke.alt_key() {
                    return;
                }
                if let Some(index) = keymap::computer_key_index(&ke.key()) {
                    press(&keyboard, &elements, &document, index);
                }
            }));
        }
        {
            let keyboard = keyboard.clone();
            let elements = elements.clone();
            listeners.push(Listener::new(&window, "keyup", move |ev| {
                let Some(ke) = ev.dyn_ref::<web::KeyboardEvent>() else {
                    return;
                };
                if let Some(index) = keymap::computer_key_index(&ke.key()) {
                    release(&keyboard, &elements, index);
                }
            }));
        }

        {
            let keyboard = keyboard.clone();
            let document_click = document.clone();
            match dom::add_click_listener(document, AUDIO_ENABLE_ID, move || {
                start_unlock(&keyboard, &document_click)
            }) {
                Some(l) => listeners.push(l),
                None => log::warn!("[keys] missing #{}; audio cannot be enabled", AUDIO_ENABLE_ID),
            }
        }

        // Autoplay may already be allowed (e.g. after a previous visit).
        if keyboard.borrow().audio().is_running() {
            let mut kb = keyboard.borrow_mut();
            kb.begin_unlock();
            kb.finish_unlock(Ok(()));
            overlay::hide(document);
        } else {
            overlay::show_locked(document);
        }

        Ok(Self {
            keyboard,
            container,
            listeners,
        })
    }

    pub fn unmount(self) {
        let Self {
            keyboard,
            container,
            listeners,
        } = self;
        drop(listeners);
        keyboard.borrow_mut().dispose();
        container.set_inner_html("");
    }
}
