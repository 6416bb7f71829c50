use crate::constants::MAX_FRAME_DT_SEC;
use crate::render::CloudRenderer;
use glam::Vec2;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use synth_core::CloudModel;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub model: Rc<RefCell<CloudModel>>,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<CloudRenderer>,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant)
            .as_secs_f32()
            .min(MAX_FRAME_DT_SEC);
        self.last_instant = now;

        let w = self.canvas.width();
        let h = self.canvas.height();
        let uniforms = self
            .model
            .borrow_mut()
            .frame(dt_sec, Vec2::new(w as f32, h as f32));

        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(w, h);
            if let Err(e) = g.render(&uniforms) {
                log::error!("render error: {:?}", e);
            }
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<CloudRenderer> {
    match CloudRenderer::new(canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// requestAnimationFrame loop that can be stopped from outside the callback.
pub struct FrameLoop {
    tick: Tick,
    running: Rc<Cell<bool>>,
    handle: Rc<Cell<Option<i32>>>,
}

fn request_frame(tick: &Tick) -> Option<i32> {
    let w = web::window()?;
    let tick = tick.borrow();
    let closure = tick.as_ref()?;
    w.request_animation_frame(closure.as_ref().unchecked_ref()).ok()
}

impl FrameLoop {
    pub fn start(frame_ctx: Rc<RefCell<FrameContext>>) -> Self {
        let tick: Tick = Rc::new(RefCell::new(None));
        let running = Rc::new(Cell::new(true));
        let handle = Rc::new(Cell::new(None));

        let tick_clone = tick.clone();
        let running_tick = running.clone();
        let handle_tick = handle.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if !running_tick.get() {
                return;
            }
            frame_ctx.borrow_mut().frame();
            handle_tick.set(request_frame(&tick_clone));
        }) as Box<dyn FnMut()>));
        handle.set(request_frame(&tick));

        Self {
            tick,
            running,
            handle,
        }
    }

    pub fn stop(self) {
        self.running.set(false);
        if let (Some(w), Some(id)) = (web::window(), self.handle.take()) {
            _ = w.cancel_animation_frame(id);
        }
        // Breaks the closure's reference cycle; never called from inside the tick.
        self.tick.borrow_mut().take();
    }
}
