//! The cloud view's subscription to the bridge and its animation state.
//!
//! Bridge handlers only hold a `Weak` to the model and check `mounted`
//! before touching it, so a message that arrives after unmount is a no-op.

use crate::animation::{AnimationState, CloudUniforms};
use crate::bridge::{NoteBridge, Subscription};
use crate::config::CloudConfig;
use crate::event::{NoteKind, NoteMessage};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug)]
pub struct CloudModel {
    config: CloudConfig,
    state: AnimationState,
    mounted: bool,
}

impl CloudModel {
    pub fn new(config: CloudConfig) -> Self {
        Self {
            config,
            state: AnimationState::default(),
            mounted: true,
        }
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn receive(&mut self, message: &NoteMessage) {
        if !self.mounted {
            log::debug!("[cloud] dropped {:?} after unmount", message.kind());
            return;
        }
        self.state.apply(&self.config, message);
    }

    /// Advance one frame and return the shader inputs for it.
    pub fn frame(&mut self, dt: f32, resolution: Vec2) -> CloudUniforms {
        if self.mounted {
            self.state.advance(&self.config, dt);
        }
        self.state.uniforms(resolution)
    }
}

/// A mounted cloud model wired to a bridge.
pub struct CloudBinding {
    model: Rc<RefCell<CloudModel>>,
    subscriptions: Vec<Subscription>,
}

impl CloudBinding {
    pub fn mount(bridge: &NoteBridge, config: CloudConfig) -> Self {
        let model = Rc::new(RefCell::new(CloudModel::new(config)));
        let subscriptions: Vec<Subscription> = [NoteKind::On, NoteKind::Off]
            .into_iter()
            .map(|kind| {
                let weak: Weak<RefCell<CloudModel>> = Rc::downgrade(&model);
                bridge.subscribe(kind, move |message| {
                    if let Some(model) = weak.upgrade() {
                        model.borrow_mut().receive(message);
                    }
                })
            })
            .collect();
        log::info!("[cloud] mounted");
        Self {
            model,
            subscriptions,
        }
    }

    pub fn model(&self) -> &Rc<RefCell<CloudModel>> {
        &self.model
    }

    pub fn frame(&self, dt: f32, resolution: Vec2) -> CloudUniforms {
        self.model.borrow_mut().frame(dt, resolution)
    }

    /// Stop reacting to notes and freeze the animation.
    pub fn unmount(self) {
        self.model.borrow_mut().mounted = false;
        for sub in self.subscriptions {
            sub.unsubscribe();
        }
        log::info!("[cloud] unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Phase;
    use crate::event::NoteEvent;

    fn e4() -> NoteEvent {
        NoteEvent {
            note: "E4".into(),
            midi: 64,
            freq: 329.63,
            velocity: 1.0,
        }
    }

    #[test]
    fn mount_subscribes_to_both_kinds() {
        let bridge = NoteBridge::new();
        let cloud = CloudBinding::mount(&bridge, CloudConfig::default());
        assert_eq!(bridge.subscriber_count(NoteKind::On), 1);
        assert_eq!(bridge.subscriber_count(NoteKind::Off), 1);
        cloud.unmount();
        assert_eq!(bridge.subscriber_count(NoteKind::On), 0);
        assert_eq!(bridge.subscriber_count(NoteKind::Off), 0);
    }

    #[test]
    fn frames_before_first_note_are_idle() {
        let bridge = NoteBridge::new();
        let cloud = CloudBinding::mount(&bridge, CloudConfig::default());
        let u = cloud.frame(0.016, Vec2::new(100.0, 100.0));
        assert_eq!(u.energy, 0.0);
        assert_eq!(u.time, 0.0);
    }

    #[test]
    fn note_on_through_bridge_activates() {
        let bridge = NoteBridge::new();
        let cloud = CloudBinding::mount(&bridge, CloudConfig::default());
        bridge.publish_note_on(e4());
        assert_eq!(cloud.model().borrow().state().phase(), Phase::Active);
        assert_eq!(cloud.model().borrow().state().freq_target, 329.63);
    }

    #[test]
    fn unmounted_model_ignores_late_messages() {
        let bridge = NoteBridge::new();
        let cloud = CloudBinding::mount(&bridge, CloudConfig::default());
        let model = cloud.model().clone();
        cloud.unmount();
        model.borrow_mut().receive(&NoteMessage::On(e4()));
        assert_eq!(model.borrow().state().energy, 0.0);
        assert!(!model.borrow().is_mounted());
    }

    #[test]
    fn unmount_from_inside_a_handler() {
        let bridge = NoteBridge::new();
        let holder: Rc<RefCell<Option<CloudBinding>>> = Rc::new(RefCell::new(None));
        let holder_h = holder.clone();
        // Registered first, so it runs before the cloud's own handler.
        let _teardown = bridge.subscribe(NoteKind::On, move |_| {
            if let Some(cloud) = holder_h.borrow_mut().take() {
                cloud.unmount();
            }
        });
        let cloud = CloudBinding::mount(&bridge, CloudConfig::default());
        let model = cloud.model().clone();
        *holder.borrow_mut() = Some(cloud);

        bridge.publish_note_on(e4());
        assert_eq!(model.borrow().state().energy, 0.0);
        assert_eq!(bridge.subscriber_count(NoteKind::On), 1);
    }
}
