#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;
use synth_core::NoteBridge;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod cloud_view;
mod constants;
mod dom;
mod frame;
mod keyboard_view;
mod keymap;
mod overlay;
mod page;
mod render;

use cloud_view::CloudView;
use constants::{CLOUD_CANVAS_ID, KEYBOARD_ID};
use keyboard_view::KeyboardView;

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

#[derive(Default)]
struct Mounted {
    keyboard: Option<KeyboardView>,
    cloud: Option<CloudView>,
}

impl Mounted {
    fn teardown(&mut self) {
        if let Some(cloud) = self.cloud.take() {
            cloud.unmount();
        }
        if let Some(keyboard) = self.keyboard.take() {
            keyboard.unmount();
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("cloud-synth starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    dom::apply_grid_background(&document);

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CLOUD_CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", CLOUD_CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let keys_container = document
        .get_element_by_id(KEYBOARD_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", KEYBOARD_ID))?;

    // Maintain canvas internal pixel size to match CSS size * devicePixelRatio
    wire_canvas_resize(&canvas);

    // One bridge per page, handed to both sides.
    let bridge = NoteBridge::new();
    let mounted = Rc::new(RefCell::new(Mounted::default()));

    // Keyboard first: it is usable (and can be unlocked) while WebGPU spins up.
    mounted.borrow_mut().keyboard = Some(KeyboardView::mount(&document, keys_container, &bridge)?);

    let config = cloud_view::read_cloud_config(&canvas);
    let cloud = CloudView::mount(canvas, &bridge, config).await;
    mounted.borrow_mut().cloud = Some(cloud);

    let mounted_teardown = mounted.clone();
    dom::Listener::new(&window, "pagehide", move |ev| {
        let persisted = ev
            .dyn_ref::<web::PageTransitionEvent>()
            .is_some_and(|e| e.persisted());
        match page::on_pagehide(persisted) {
            // Restored pages come back with keys, audio and the loop intact.
            page::PageHide::Keep => log::info!("pagehide: kept in back/forward cache"),
            page::PageHide::Teardown => {
                log::info!("pagehide: tearing down");
                mounted_teardown.borrow_mut().teardown();
            }
        }
    })
    .forget();

    Ok(())
}
