use serde::{Deserialize, Serialize};

/// What the editor panel is currently showing detail for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,
    Segment(String),
    /// Index into the media item's silence list.
    Silence(usize),
}

impl Selection {
    pub fn segment_id(&self) -> Option<&str> {
        match self {
            Selection::Segment(id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn is_segment(&self, id: &str) -> bool {
        self.segment_id() == Some(id)
    }
}
