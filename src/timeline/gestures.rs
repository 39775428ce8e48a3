use serde::Deserialize;

use crate::{follow::FollowMode, timemap::GaplessMap, viewport::ZOOM_STEP};

use super::surface::TimelineSurface;

/// One wheel/trackpad event over the timeline.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WheelInput {
    /// Horizontal pan, pixels.
    pub delta_x: f64,
    /// Vertical delta, pixels; negative zooms in.
    pub delta_y: f64,
    /// Pointer position relative to the timeline's left edge.
    pub cursor_x_px: Option<f64>,
}

/// 100 px of wheel travel is one zoom step.
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    ZOOM_STEP.powf(-delta_y / 100.0)
}

/// Every viewport gesture leaves follow mode.
fn take_manual(surface: &mut TimelineSurface) {
    surface.follow = FollowMode::Manual;
}

pub fn apply_wheel(surface: &mut TimelineSurface, input: WheelInput, map: &GaplessMap) {
    if input.delta_y != 0.0 && input.delta_y.is_finite() {
        let anchor = input
            .cursor_x_px
            .filter(|x| x.is_finite())
            .unwrap_or(surface.width_px / 2.0);
        surface
            .viewport
            .zoom_around(wheel_zoom_factor(input.delta_y), anchor);
    }
    if input.delta_x != 0.0 && input.delta_x.is_finite() {
        let delta_ms = input.delta_x / surface.viewport.pixels_per_ms();
        surface.viewport.scroll_by(delta_ms);
    }
    take_manual(surface);
    surface.clamp_scroll(map);
}

pub fn apply_zoom_in(surface: &mut TimelineSurface, map: &GaplessMap) {
    surface.viewport.zoom_in();
    take_manual(surface);
    surface.clamp_scroll(map);
}

pub fn apply_zoom_out(surface: &mut TimelineSurface, map: &GaplessMap) {
    surface.viewport.zoom_out();
    take_manual(surface);
    surface.clamp_scroll(map);
}

pub fn apply_fit(surface: &mut TimelineSurface, map: &GaplessMap) {
    let duration = surface.display_duration_ms(map);
    surface.viewport.fit_to_view(duration, surface.width_px);
    take_manual(surface);
}

pub fn apply_scroll_to(surface: &mut TimelineSurface, start_ms: f64, map: &GaplessMap) {
    surface.viewport.scroll_to(start_ms);
    take_manual(surface);
    surface.clamp_scroll(map);
}

/// `fraction` is the thumb position along the free track, 0 at the start
/// and 1 at the end of the content.
pub fn apply_scrollbar_drag(surface: &mut TimelineSurface, fraction: f64, map: &GaplessMap) {
    if fraction.is_nan() {
        return;
    }
    let max_scroll = surface
        .viewport
        .max_scroll_ms(surface.display_duration_ms(map), surface.width_px);
    surface.viewport.scroll_to(fraction.clamp(0.0, 1.0) * max_scroll);
    take_manual(surface);
}
