use crate::constants::{GRID_DOT_COLOR, GRID_DOT_PX, GRID_PITCH_PX};
use crate::page;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// An event listener that is removed again when dropped.
pub struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Option<Closure<dyn FnMut(web::Event)>>,
}

impl Listener {
    pub fn new(
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        Self {
            target: target.clone(),
            kind,
            closure: Some(closure),
        }
    }

    /// Leave the listener installed for the rest of the page's life.
    pub fn forget(mut self) {
        if let Some(closure) = self.closure.take() {
            closure.forget();
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(closure) = &self.closure {
            _ = self
                .target
                .remove_event_listener_with_callback(self.kind, closure.as_ref().unchecked_ref());
        }
    }
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) -> Option<Listener> {
    let el = document.get_element_by_id(element_id)?;
    Some(Listener::new(&el, "click", move |_| handler()))
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        canvas.set_width(page::backing_px(rect.width(), dpr));
        canvas.set_height(page::backing_px(rect.height(), dpr));
    }
}

/// `data-*` attribute value, trimmed; `None` when absent or blank.
pub fn data_attr(el: &web::Element, name: &str) -> Option<String> {
    el.get_attribute(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Decorative dot grid behind everything; independent of audio and visuals.
pub fn apply_grid_background(document: &web::Document) {
    let Some(body) = document.body() else {
        return;
    };
    let style = body.style();
    _ = style.set_property(
        "background-image",
        &format!(
            "radial-gradient(circle, {} {}px, transparent 1px)",
            GRID_DOT_COLOR, GRID_DOT_PX
        ),
    );
    _ = style.set_property(
        "background-size",
        &format!("{}px {}px", GRID_PITCH_PX, GRID_PITCH_PX),
    );
    _ = style.set_property("background-attachment", "fixed");
}
