use crate::constants::RELEASE_ATTR;
use crate::dom;
use crate::frame::{self, FrameContext, FrameLoop};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use synth_core::{CloudBinding, CloudConfig, NoteBridge, ReleasePolicy};
use web_sys as web;

pub fn read_cloud_config(canvas: &web::HtmlCanvasElement) -> CloudConfig {
    let mut config = CloudConfig::default();
    if let Some(raw) = dom::data_attr(canvas, RELEASE_ATTR) {
        match raw.parse::<ReleasePolicy>() {
            Ok(policy) => config.release = policy,
            Err(e) => log::warn!("[cloud] {}; using {:?}", e, config.release),
        }
    }
    config
}

/// The cloud panel: bridge subscription, animation model and render loop.
pub struct CloudView {
    binding: CloudBinding,
    frame_loop: FrameLoop,
}

impl CloudView {
    pub async fn mount(
        canvas: web::HtmlCanvasElement,
        bridge: &NoteBridge,
        config: CloudConfig,
    ) -> Self {
        log::info!("[cloud] release policy {:?}", config.release);
        let binding = CloudBinding::mount(bridge, config);
        // A missing GPU still runs the model; there is just nothing to draw.
        let gpu = frame::init_gpu(&canvas).await;
        let frame_ctx = Rc::new(RefCell::new(FrameContext {
            model: binding.model().clone(),
            canvas,
            gpu,
            last_instant: Instant::now(),
        }));
        let frame_loop = FrameLoop::start(frame_ctx);
        Self {
            binding,
            frame_loop,
        }
    }

    pub fn unmount(self) {
        self.frame_loop.stop();
        self.binding.unmount();
    }
}
