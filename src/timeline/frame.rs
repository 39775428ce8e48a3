//! Render model of one timeline frame. Built from a consistent read of the
//! store, surface and playback snapshot; the host draws it as-is.

use serde::Serialize;

use crate::{
    follow::FollowMode,
    models::{ContentType, Segment, Selection, Silence, Waveform},
    playback::PlaybackSnapshot,
    timemap::{enabled_sorted, GaplessMap},
    viewport::ruler::{ruler_ticks, RulerTick},
};

use super::surface::{TimelineMode, TimelineSurface};

const MIN_THUMB_PX: f64 = 24.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentBlock {
    pub id: String,
    pub x_px: f64,
    pub width_px: f64,
    pub enabled: bool,
    pub selected: bool,
    pub content_type: Option<ContentType>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SilenceBlock {
    pub index: usize,
    pub x_px: f64,
    pub width_px: f64,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayheadMarker {
    pub x_px: f64,
    pub transitioning: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrollbarThumb {
    pub x_px: f64,
    pub width_px: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFrame {
    pub mode: TimelineMode,
    pub follow: FollowMode,
    pub width_px: f64,
    pub zoom_level: f64,
    pub viewport_start_ms: f64,
    pub duration_ms: f64,
    pub ruler: Vec<RulerTick>,
    /// One peak per pixel column.
    pub waveform: Vec<f32>,
    pub segments: Vec<SegmentBlock>,
    pub silences: Vec<SilenceBlock>,
    pub playhead: Option<PlayheadMarker>,
    pub scrollbar: Option<ScrollbarThumb>,
}

pub struct FrameInput<'a> {
    pub surface: &'a TimelineSurface,
    pub segments: &'a [Segment],
    pub silences: &'a [Silence],
    pub selection: &'a Selection,
    pub map: &'a GaplessMap,
    pub playback: PlaybackSnapshot,
    pub waveform: Option<&'a Waveform>,
}

fn overlaps_view(x_px: f64, width_px: f64, view_width_px: f64) -> bool {
    x_px + width_px >= 0.0 && x_px <= view_width_px
}

pub fn build_frame(input: FrameInput<'_>) -> TimelineFrame {
    let FrameInput {
        surface,
        segments,
        silences,
        selection,
        map,
        playback,
        waveform,
    } = input;
    let viewport = &surface.viewport;
    let width = surface.width_px;
    let duration_ms = surface.display_duration_ms(map);

    TimelineFrame {
        mode: surface.mode,
        follow: surface.follow,
        width_px: width,
        zoom_level: viewport.zoom_level(),
        viewport_start_ms: viewport.viewport_start_ms(),
        duration_ms,
        ruler: ruler_ticks(viewport, width),
        waveform: waveform
            .map(|waveform| waveform_columns(surface, map, waveform, duration_ms))
            .unwrap_or_default(),
        segments: segment_blocks(surface, segments, selection, map),
        silences: silence_blocks(surface, silences, selection, map),
        playhead: playhead_marker(surface, map, playback),
        scrollbar: scrollbar_thumb(surface, duration_ms),
    }
}

fn segment_blocks(
    surface: &TimelineSurface,
    segments: &[Segment],
    selection: &Selection,
    map: &GaplessMap,
) -> Vec<SegmentBlock> {
    let viewport = &surface.viewport;
    let ppm = viewport.pixels_per_ms();

    let placed: Vec<(f64, &Segment)> = match surface.mode {
        TimelineMode::Full => segments.iter().map(|s| (s.start_ms, s)).collect(),
        TimelineMode::Gapless => {
            let enabled = enabled_sorted(segments);
            let mut placed = Vec::with_capacity(enabled.len());
            for (span, segment) in map.spans().iter().zip(enabled.iter()) {
                if let Some(original) = segments.iter().find(|s| s.id == segment.id) {
                    placed.push((span.offset_ms, original));
                }
            }
            placed
        }
    };

    placed
        .into_iter()
        .filter_map(|(display_start_ms, segment)| {
            let x_px = viewport.ms_to_px(display_start_ms);
            let width_px = segment.duration_ms() * ppm;
            overlaps_view(x_px, width_px, surface.width_px).then(|| SegmentBlock {
                id: segment.id.clone(),
                x_px,
                width_px,
                enabled: segment.enabled,
                selected: selection.is_segment(&segment.id),
                content_type: segment.content_type(),
            })
        })
        .collect()
}

fn silence_blocks(
    surface: &TimelineSurface,
    silences: &[Silence],
    selection: &Selection,
    map: &GaplessMap,
) -> Vec<SilenceBlock> {
    let viewport = &surface.viewport;
    silences
        .iter()
        .enumerate()
        .filter_map(|(index, silence)| {
            let start = surface.to_display(silence.start_ms, map);
            let end = surface.to_display(silence.end_ms, map);
            let x_px = viewport.ms_to_px(start);
            let width_px = (end - start) * viewport.pixels_per_ms();
            // Silences inside cut regions vanish in gapless mode.
            (width_px > 0.0 && overlaps_view(x_px, width_px, surface.width_px)).then(|| {
                SilenceBlock {
                    index,
                    x_px,
                    width_px,
                    selected: *selection == Selection::Silence(index),
                }
            })
        })
        .collect()
}

fn waveform_columns(
    surface: &TimelineSurface,
    map: &GaplessMap,
    waveform: &Waveform,
    duration_ms: f64,
) -> Vec<f32> {
    let viewport = &surface.viewport;
    let ms_per_px = 1.0 / viewport.pixels_per_ms();
    let columns = surface.width_px.ceil().max(0.0) as usize;

    (0..columns)
        .map(|column| {
            let display_ms = viewport.px_to_ms(column as f64);
            if display_ms >= duration_ms {
                return 0.0;
            }
            let original_ms = surface.to_original(display_ms, map);
            waveform.peak_between(original_ms, original_ms + ms_per_px)
        })
        .collect()
}

fn playhead_marker(
    surface: &TimelineSurface,
    map: &GaplessMap,
    playback: PlaybackSnapshot,
) -> Option<PlayheadMarker> {
    let display_ms = surface.to_display(playback.current_time_ms, map);
    let x_px = surface.viewport.ms_to_px(display_ms);
    (x_px >= 0.0 && x_px <= surface.width_px).then_some(PlayheadMarker {
        x_px,
        transitioning: playback.is_transitioning,
    })
}

fn scrollbar_thumb(surface: &TimelineSurface, duration_ms: f64) -> Option<ScrollbarThumb> {
    let width = surface.width_px;
    let visible = surface.visible_duration_ms();
    if !(duration_ms > visible) || !(width > 0.0) {
        return None;
    }
    let thumb = (width * visible / duration_ms).max(MIN_THUMB_PX).min(width);
    let max_scroll = surface.viewport.max_scroll_ms(duration_ms, width);
    let position = (surface.viewport.viewport_start_ms() / max_scroll).clamp(0.0, 1.0);
    Some(ScrollbarThumb {
        x_px: position * (width - thumb),
        width_px: thumb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> Vec<Segment> {
        vec![
            Segment::new("a", 0.0, 1000.0, true),
            Segment::new("b", 1000.0, 2000.0, false),
            Segment::new("c", 2000.0, 3000.0, true),
        ]
    }

    fn frame(surface: &TimelineSurface, playhead_ms: f64) -> TimelineFrame {
        let segments = segments();
        let map = GaplessMap::from_segments(&segments);
        let silences = vec![Silence::new(1200.0, 1500.0), Silence::new(2400.0, 2600.0)];
        let waveform = Waveform::new(vec![0.5; 30], 3000.0);
        build_frame(FrameInput {
            surface,
            segments: &segments,
            silences: &silences,
            selection: &Selection::Segment("c".into()),
            map: &map,
            playback: PlaybackSnapshot {
                current_time_ms: playhead_ms,
                is_playing: true,
                is_transitioning: false,
                gapless: true,
            },
            waveform: Some(&waveform),
        })
    }

    #[test]
    fn full_mode_draws_everything_at_original_positions() {
        let surface = TimelineSurface::new(3000.0, 300.0);
        let frame = frame(&surface, 2500.0);

        assert_eq!(frame.segments.len(), 3);
        assert_eq!(frame.segments[1].x_px, 100.0);
        assert!(!frame.segments[1].enabled);
        assert!(frame.segments[2].selected);
        assert_eq!(frame.silences.len(), 2);
        assert_eq!(frame.playhead.unwrap().x_px, 250.0);
        assert_eq!(frame.waveform.len(), 300);
        assert!(frame.scrollbar.is_none());
    }

    #[test]
    fn gapless_mode_packs_enabled_segments() {
        let mut surface = TimelineSurface::new(3000.0, 200.0);
        surface.mode = TimelineMode::Gapless;
        let frame = frame(&surface, 2500.0);

        let ids: Vec<&str> = frame.segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(frame.segments[1].x_px, 100.0);
        assert_eq!(frame.duration_ms, 2000.0);
        // The silence inside the disabled segment disappears.
        assert_eq!(frame.silences.len(), 1);
        assert_eq!(frame.silences[0].index, 1);
        assert_eq!(frame.silences[0].x_px, 140.0);
        assert_eq!(frame.playhead.unwrap().x_px, 150.0);
    }

    #[test]
    fn scrollbar_appears_when_zoomed_in() {
        let mut surface = TimelineSurface::new(3000.0, 100.0);
        surface.viewport.scroll_to(2000.0);
        let frame = frame(&surface, 500.0);

        let thumb = frame.scrollbar.unwrap();
        assert!((thumb.width_px - 100.0 / 3.0).abs() < 1e-9);
        assert!((thumb.x_px + thumb.width_px - 100.0).abs() < 1e-9);
        assert!(frame.playhead.is_none());
        assert_eq!(frame.segments.len(), 2);
    }
}
