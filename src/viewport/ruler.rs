use serde::Serialize;

use super::Viewport;

/// Minimum spacing between labelled ticks.
const MIN_MAJOR_SPACING_PX: f64 = 80.0;
/// Unlabelled ticks drawn between majors.
const MINOR_TICKS_PER_MAJOR: u32 = 5;

/// Candidate major intervals, shortest first.
const NICE_INTERVALS_MS: [f64; 17] = [
    10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1_000.0, 2_000.0, 5_000.0, 10_000.0, 15_000.0,
    30_000.0, 60_000.0, 120_000.0, 300_000.0, 600_000.0, 1_800_000.0,
];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RulerTick {
    pub x_px: f64,
    pub time_ms: f64,
    pub major: bool,
    pub label: Option<String>,
}

pub fn major_interval_ms(pixels_per_ms: f64) -> f64 {
    NICE_INTERVALS_MS
        .iter()
        .copied()
        .find(|interval| interval * pixels_per_ms >= MIN_MAJOR_SPACING_PX)
        .unwrap_or(NICE_INTERVALS_MS[NICE_INTERVALS_MS.len() - 1])
}

/// Ticks covering `[viewport_start, viewport_start + width)`, labels in
/// display time (whatever timeline the viewport is laid over).
pub fn ruler_ticks(viewport: &Viewport, width_px: f64) -> Vec<RulerTick> {
    if !(width_px > 0.0) {
        return Vec::new();
    }
    let major = major_interval_ms(viewport.pixels_per_ms());
    let minor = major / MINOR_TICKS_PER_MAJOR as f64;
    let start = viewport.viewport_start_ms();
    let end = start + viewport.visible_duration_ms(width_px);

    let mut ticks = Vec::new();
    let mut index = (start / minor).floor() as i64;
    loop {
        let time_ms = index as f64 * minor;
        if time_ms > end {
            break;
        }
        if time_ms >= start {
            let is_major = index % MINOR_TICKS_PER_MAJOR as i64 == 0;
            ticks.push(RulerTick {
                x_px: viewport.ms_to_px(time_ms),
                time_ms,
                major: is_major,
                label: is_major.then(|| format_timecode(time_ms, major < 1_000.0)),
            });
        }
        index += 1;
    }
    ticks
}

/// `m:ss`, or `m:ss.mmm` when sub-second precision matters.
pub fn format_timecode(ms: f64, with_millis: bool) -> String {
    let total_ms = ms.max(0.0).round() as u64;
    let minutes = total_ms / 60_000;
    let seconds = (total_ms / 1_000) % 60;
    if with_millis {
        format!("{minutes}:{seconds:02}.{:03}", total_ms % 1_000)
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_grows_as_zoom_shrinks() {
        // zoom 1.0 -> 0.1 px/ms, one second is 100 px.
        assert_eq!(major_interval_ms(0.1), 1_000.0);
        assert_eq!(major_interval_ms(0.01), 10_000.0);
        assert_eq!(major_interval_ms(2.0), 50.0);
        assert_eq!(major_interval_ms(1e-9), 1_800_000.0);
    }

    #[test]
    fn ticks_cover_visible_range_with_labels_on_majors() {
        let mut viewport = Viewport::new();
        viewport.scroll_to(2_500.0);
        let ticks = ruler_ticks(&viewport, 1000.0);

        assert!(ticks.iter().all(|t| t.time_ms >= 2_500.0 && t.time_ms <= 12_500.0));
        let majors: Vec<_> = ticks.iter().filter(|t| t.major).collect();
        assert_eq!(majors.first().unwrap().time_ms, 3_000.0);
        assert_eq!(majors.first().unwrap().label.as_deref(), Some("0:03"));
        assert!(ticks.iter().filter(|t| !t.major).all(|t| t.label.is_none()));
        assert!((majors[0].x_px - 50.0).abs() < 1e-9);
    }

    #[test]
    fn timecode_formatting() {
        assert_eq!(format_timecode(61_250.0, false), "1:01");
        assert_eq!(format_timecode(61_250.0, true), "1:01.250");
        assert_eq!(format_timecode(-3.0, false), "0:00");
    }

    #[test]
    fn zero_width_has_no_ticks() {
        assert!(ruler_ticks(&Viewport::new(), 0.0).is_empty());
    }
}
