// Page lifecycle and viewport decisions, kept free of web-sys so they can be
// tested on the host.

use crate::constants::{MAX_DEVICE_PIXEL_RATIO, MIN_DEVICE_PIXEL_RATIO};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageHide {
    /// The page goes into the back/forward cache and may be shown again as-is.
    Keep,
    Teardown,
}

#[inline]
pub fn on_pagehide(persisted: bool) -> PageHide {
    if persisted {
        PageHide::Keep
    } else {
        PageHide::Teardown
    }
}

/// Canvas backing size in device pixels for a CSS length; never 0.
#[inline]
pub fn backing_px(css_px: f64, device_pixel_ratio: f64) -> u32 {
    let dpr = if device_pixel_ratio.is_finite() {
        device_pixel_ratio.clamp(MIN_DEVICE_PIXEL_RATIO, MAX_DEVICE_PIXEL_RATIO)
    } else {
        MIN_DEVICE_PIXEL_RATIO
    };
    ((css_px * dpr) as u32).max(1)
}
