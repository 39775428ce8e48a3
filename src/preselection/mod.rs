//! Glue to the AI preselection collaborator: fetch a classified segment set,
//! import it as the media item's initial segments, and surface failures and
//! warnings as notices. A failed run never touches the store.

pub mod notices;

use std::future::Future;

use anyhow::{bail, Context, Result};

use crate::{
    models::{PreselectionResult, PreselectionSummary, Segment},
    store::SegmentStore,
};

pub use notices::{Notice, NoticeBoard, NoticeLevel};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Whatever produces preselection results (remote API, cached file).
pub trait PreselectionSource: Send + Sync {
    fn preselect(&self, video_id: &str) -> impl Future<Output = Result<PreselectionResult>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub imported: usize,
    /// Entries skipped for an empty or non-finite range.
    pub dropped: usize,
    pub warnings: usize,
    pub summary: PreselectionSummary,
}

/// Replaces the media item's segments with the preselected set.
pub fn import_preselection(
    store: &SegmentStore,
    notices: &NoticeBoard,
    video_id: &str,
    result: PreselectionResult,
) -> Result<ImportReport> {
    let PreselectionResult {
        segments,
        summary,
        warnings,
    } = result;

    let total = segments.len();
    let segments: Vec<Segment> = segments
        .into_iter()
        .map(|segment| segment.into_segment())
        .filter(Segment::is_valid_range)
        .collect();
    if total > 0 && segments.is_empty() {
        bail!("preselection returned {total} segments, none with a usable range");
    }

    let imported = store.replace_segments(video_id, segments);
    for warning in &warnings {
        log_warn!("preselection warning ({}): {}", warning.kind, warning.message);
        notices.push(
            NoticeLevel::Warning,
            warning.message.clone(),
            warning.affected_script_lines.clone().unwrap_or_default(),
        );
    }

    log_info!(
        "imported {imported}/{total} preselected segments for {video_id} ({} selected)",
        summary.selected_segments
    );
    Ok(ImportReport {
        imported,
        dropped: total - imported,
        warnings: warnings.len(),
        summary,
    })
}

/// Runs `source` and imports its result. On failure the previous segment
/// set stays in place and an error notice is raised.
pub async fn run_preselection<S: PreselectionSource>(
    source: &S,
    store: &SegmentStore,
    notices: &NoticeBoard,
    video_id: &str,
) -> Result<ImportReport> {
    let outcome = source
        .preselect(video_id)
        .await
        .with_context(|| format!("AI preselection for {video_id} failed"))
        .and_then(|result| import_preselection(store, notices, video_id, result));

    if let Err(err) = &outcome {
        log_error!("{err:#}");
        notices.push(NoticeLevel::Error, format!("{err:#}"), Vec::new());
    }
    outcome
}
