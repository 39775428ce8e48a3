//! Single source of truth for segment data, silences and selection, keyed by
//! media item. One writer lock; every mutation is applied atomically and bumps
//! a store-wide revision that renderers can poll or subscribe to. Changes to a
//! media item's segment set also bump that item's own segment revision.

use std::{collections::HashMap, sync::Arc};

use log::warn;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    models::{Segment, SegmentEdge, Selection, Silence},
    timemap::{enabled_sorted, GaplessMap},
};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditRejected {
    #[error("no media item {0} in the store")]
    UnknownVideo(String),
    #[error("segment {0} not found")]
    UnknownSegment(String),
    #[error("silence #{0} not found")]
    UnknownSilence(usize),
    #[error("segment range {start_ms}..{end_ms} is empty or inverted")]
    EmptyRange { start_ms: f64, end_ms: f64 },
    #[error("time {0} is not a finite, non-negative millisecond value")]
    InvalidTime(f64),
}

#[derive(Debug, Default)]
struct MediaItem {
    segments: Vec<Segment>,
    silences: Vec<Silence>,
    selection: Selection,
    segments_revision: u64,
}

impl MediaItem {
    fn segment_mut(&mut self, id: &str) -> Result<&mut Segment, EditRejected> {
        self.segments
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| EditRejected::UnknownSegment(id.to_string()))
    }

    fn drop_stale_selection(&mut self) {
        let stale = match &self.selection {
            Selection::None => false,
            Selection::Segment(id) => !self.segments.iter().any(|s| &s.id == id),
            Selection::Silence(index) => *index >= self.silences.len(),
        };
        if stale {
            self.selection = Selection::None;
        }
    }
}

#[derive(Default)]
struct StoreInner {
    items: HashMap<String, MediaItem>,
}

#[derive(Clone)]
pub struct SegmentStore {
    inner: Arc<RwLock<StoreInner>>,
    revision_tx: Arc<watch::Sender<u64>>,
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_time(value: f64) -> Result<f64, EditRejected> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EditRejected::InvalidTime(value))
    }
}

impl SegmentStore {
    pub fn new() -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
            revision_tx: Arc::new(revision_tx),
        }
    }

    /// Monotonic counter bumped by every successful mutation, on any media
    /// item. Selection and silence changes count.
    pub fn revision(&self) -> u64 {
        *self.revision_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    /// Counter bumped only when the segment set of `video_id` changes
    /// (import, clear, resize, toggle, add). 0 for unknown media items.
    pub fn segments_revision(&self, video_id: &str) -> u64 {
        self.inner
            .read()
            .items
            .get(video_id)
            .map_or(0, |item| item.segments_revision)
    }

    fn bump(&self) {
        self.revision_tx.send_modify(|revision| *revision += 1);
    }

    fn mutate<R>(
        &self,
        video_id: &str,
        create: bool,
        touches_segments: bool,
        f: impl FnOnce(&mut MediaItem) -> Result<R, EditRejected>,
    ) -> Result<R, EditRejected> {
        let result = {
            let mut inner = self.inner.write();
            let item = if create {
                Some(inner.items.entry(video_id.to_string()).or_default())
            } else {
                inner.items.get_mut(video_id)
            };
            match item {
                Some(item) => {
                    let result = f(item);
                    if touches_segments && result.is_ok() {
                        item.segments_revision += 1;
                    }
                    result
                }
                None => Err(EditRejected::UnknownVideo(video_id.to_string())),
            }
        };
        match &result {
            Ok(_) => self.bump(),
            Err(err) => warn!("rejected edit on {video_id}: {err}"),
        }
        result
    }

    /// Bulk import: replaces every segment of the media item. Entries with an
    /// empty or non-finite range are skipped.
    pub fn replace_segments(&self, video_id: &str, segments: Vec<Segment>) -> usize {
        let total = segments.len();
        let valid: Vec<Segment> = segments.into_iter().filter(Segment::is_valid_range).collect();
        if valid.len() != total {
            warn!(
                "dropped {} segments with invalid ranges while importing {video_id}",
                total - valid.len()
            );
        }
        let kept = valid.len();
        let _ = self.mutate(video_id, true, true, move |item| {
            item.segments = valid;
            item.drop_stale_selection();
            Ok(())
        });
        kept
    }

    /// Bulk delete of all segments for the media item.
    pub fn clear_segments(&self, video_id: &str) {
        let _ = self.mutate(video_id, true, true, |item| {
            item.segments.clear();
            item.drop_stale_selection();
            Ok(())
        });
    }

    pub fn set_silences(&self, video_id: &str, silences: Vec<Silence>) {
        let _ = self.mutate(video_id, true, false, move |item| {
            item.silences = silences;
            item.drop_stale_selection();
            Ok(())
        });
    }

    /// Moves one boundary. Rejected (no change) if the result would not keep
    /// `start_ms < end_ms`.
    pub fn resize_segment(
        &self,
        video_id: &str,
        id: &str,
        edge: SegmentEdge,
        value: f64,
    ) -> Result<(), EditRejected> {
        let value = validate_time(value).map_err(|err| {
            warn!("rejected resize of {id}: {err}");
            err
        })?;
        self.mutate(video_id, false, true, |item| {
            let segment = item.segment_mut(id)?;
            let (start_ms, end_ms) = match edge {
                SegmentEdge::StartMs => (value, segment.end_ms),
                SegmentEdge::EndMs => (segment.start_ms, value),
            };
            if start_ms >= end_ms {
                return Err(EditRejected::EmptyRange { start_ms, end_ms });
            }
            segment.start_ms = start_ms;
            segment.end_ms = end_ms;
            Ok(())
        })
    }

    /// Flips `enabled` in place and returns the new value.
    pub fn toggle_segment(&self, video_id: &str, id: &str) -> Result<bool, EditRejected> {
        self.mutate(video_id, false, true, |item| {
            let segment = item.segment_mut(id)?;
            segment.enabled = !segment.enabled;
            Ok(segment.enabled)
        })
    }

    /// Adds an enabled segment, kept in start order, and returns its id.
    pub fn add_segment(
        &self,
        video_id: &str,
        start_ms: f64,
        end_ms: f64,
    ) -> Result<String, EditRejected> {
        let start_ms = validate_time(start_ms)?;
        let end_ms = validate_time(end_ms)?;
        if start_ms >= end_ms {
            warn!("rejected new segment {start_ms}..{end_ms} on {video_id}");
            return Err(EditRejected::EmptyRange { start_ms, end_ms });
        }
        self.mutate(video_id, true, true, |item| {
            let id = Uuid::new_v4().to_string();
            let index = item
                .segments
                .iter()
                .position(|s| s.start_ms > start_ms)
                .unwrap_or(item.segments.len());
            item.segments
                .insert(index, Segment::new(id.clone(), start_ms, end_ms, true));
            Ok(id)
        })
    }

    pub fn select(&self, video_id: &str, selection: Selection) -> Result<(), EditRejected> {
        self.mutate(video_id, true, false, |item| {
            match &selection {
                Selection::Segment(id) if !item.segments.iter().any(|s| &s.id == id) => {
                    return Err(EditRejected::UnknownSegment(id.clone()));
                }
                Selection::Silence(index) if *index >= item.silences.len() => {
                    return Err(EditRejected::UnknownSilence(*index));
                }
                _ => {}
            }
            item.selection = selection;
            Ok(())
        })
    }

    pub fn segments_for(&self, video_id: &str) -> Vec<Segment> {
        self.inner
            .read()
            .items
            .get(video_id)
            .map(|item| item.segments.clone())
            .unwrap_or_default()
    }

    pub fn segment(&self, video_id: &str, id: &str) -> Option<Segment> {
        self.inner
            .read()
            .items
            .get(video_id)
            .and_then(|item| item.segments.iter().find(|s| s.id == id).cloned())
    }

    pub fn enabled_segments_for(&self, video_id: &str) -> Vec<Segment> {
        self.inner
            .read()
            .items
            .get(video_id)
            .map(|item| enabled_sorted(&item.segments))
            .unwrap_or_default()
    }

    pub fn gapless_map_for(&self, video_id: &str) -> GaplessMap {
        GaplessMap::new(&self.enabled_segments_for(video_id))
    }

    pub fn silences_for(&self, video_id: &str) -> Vec<Silence> {
        self.inner
            .read()
            .items
            .get(video_id)
            .map(|item| item.silences.clone())
            .unwrap_or_default()
    }

    pub fn selection_for(&self, video_id: &str) -> Selection {
        self.inner
            .read()
            .items
            .get(video_id)
            .map(|item| item.selection.clone())
            .unwrap_or_default()
    }
}
