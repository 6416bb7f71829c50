use crate::constants::{AUDIO_OVERLAY_ID, AUDIO_STATUS_ID, HIDDEN_CLASS};
use synth_core::UnlockError;
use web_sys as web;

#[inline]
pub fn show(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(AUDIO_OVERLAY_ID) {
        _ = el.class_list().remove_1(HIDDEN_CLASS);
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(AUDIO_OVERLAY_ID) {
        _ = el.class_list().add_1(HIDDEN_CLASS);
        // fallback
        _ = el.set_attribute("style", "display:none");
    }
}

fn set_status(document: &web::Document, text: &str) {
    if let Some(el) = document.get_element_by_id(AUDIO_STATUS_ID) {
        el.set_text_content(Some(text));
    }
}

pub fn show_locked(document: &web::Document) {
    set_status(document, "Click to enable audio");
    show(document);
}

pub fn show_unlocking(document: &web::Document) {
    set_status(document, "Starting audio…");
}

/// The one user-visible failure. The enable button stays up as the retry.
pub fn show_unlock_error(document: &web::Document, err: &UnlockError) {
    set_status(document, &format!("{}. Click to try again.", err));
    show(document);
}
