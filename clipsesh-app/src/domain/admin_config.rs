use serde::{Deserialize, Serialize};

pub const DEFAULT_DENY_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfig {
    pub deny_threshold: i32,
    pub latest_video_link: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            deny_threshold: DEFAULT_DENY_THRESHOLD,
            latest_video_link: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub deny_threshold: Option<i32>,
    pub latest_video_link: Option<String>,
}

impl AdminConfig {
    pub fn merged(mut self, update: ConfigUpdate) -> Self {
        if let Some(threshold) = update.deny_threshold {
            self.deny_threshold = threshold;
        }
        if let Some(link) = update.latest_video_link {
            self.latest_video_link = link;
        }
        self
    }
}
