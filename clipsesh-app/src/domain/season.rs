use super::RatingValue;
use serde::{Deserialize, Serialize};

/// Metadata of a stored season bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonArchive {
    pub id: uuid::Uuid,
    pub url: String,
    pub season: String,
    pub name: String,
    pub size: i64,
    pub clip_amount: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A clip handed to the archival pipeline with its rating already resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipDescriptor {
    #[serde(default)]
    pub id: Option<uuid::Uuid>,
    pub url: String,
    pub streamer: String,
    pub title: String,
    pub rating: RatingValue,
}

impl ClipDescriptor {
    /// `{rating}-{streamer}-{title}.mp4`, with characters that would escape
    /// the archive root replaced.
    pub fn entry_name(&self) -> String {
        let raw = format!("{}-{}-{}", self.rating, self.streamer, self.title);
        let cleaned: String = raw
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '\0' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        format!("{}.mp4", cleaned.trim_start_matches('.'))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleClips {
    pub clips: Vec<ClipDescriptor>,
    pub denied_count: usize,
}
