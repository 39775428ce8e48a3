use anyhow::{Context, Result};
use log::warn;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::segmentation::SegmentationConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackSettings {
    /// How close to a segment end a tick must land to trigger the jump.
    /// Roughly one frame at 60 Hz.
    pub lookahead_ms: f64,
    /// Jump targets this close to the previous one are treated as repeats.
    pub jump_tolerance_ms: f64,
    /// Releases the in-flight guard if the element never reports the seek done.
    pub seek_timeout_ms: u64,
    /// Cadence of the optional frame clock that polls the media element.
    pub frame_interval_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            lookahead_ms: 17.0,
            jump_tolerance_ms: 50.0,
            seek_timeout_ms: 200,
            frame_interval_ms: 16,
        }
    }
}

impl PlaybackSettings {
    pub fn seek_timeout(&self) -> Duration {
        Duration::from_millis(self.seek_timeout_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FollowSettings {
    /// Fraction of the visible span treated as the edge zone on each side.
    pub edge_margin: f64,
    /// Where the playhead is placed after a follow scroll, from the left edge.
    pub anchor: f64,
    pub tick_interval_ms: u64,
}

impl Default for FollowSettings {
    fn default() -> Self {
        Self {
            edge_margin: 0.1,
            anchor: 0.2,
            tick_interval_ms: 16,
        }
    }
}

impl FollowSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineSettings {
    pub playback: PlaybackSettings,
    pub follow: FollowSettings,
    pub segmentation: SegmentationConfig,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<TimelineSettings>,
}

impl SettingsStore {
    /// Loads from `path`, falling back to defaults when the file is missing or
    /// cannot be parsed.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings at {}: {err}", path.display());
                TimelineSettings::default()
            })
        } else {
            TimelineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> TimelineSettings {
        self.data.read().clone()
    }

    pub fn playback(&self) -> PlaybackSettings {
        self.data.read().playback.clone()
    }

    pub fn follow(&self) -> FollowSettings {
        self.data.read().follow.clone()
    }

    pub fn update(&self, settings: TimelineSettings) -> Result<()> {
        let mut guard = self.data.write();
        *guard = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: TimelineSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        *self.data.write() = data;
        Ok(())
    }

    fn persist(&self, data: &TimelineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
