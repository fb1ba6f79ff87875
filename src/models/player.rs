use serde::{Deserialize, Serialize};

use crate::models::{ExternalUrls, Playable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_active: bool,
    #[serde(default)]
    pub is_private_session: bool,
    #[serde(default)]
    pub is_restricted: bool,
    pub volume_percent: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Devices {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackContext {
    #[serde(rename = "type")]
    pub kind: String,
    pub href: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    pub timestamp: i64,
    pub progress_ms: Option<u64>,
    pub is_playing: bool,
    pub context: Option<PlaybackContext>,
    pub item: Option<Playable>,
    pub currently_playing_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub device: Device,
    pub repeat_state: String,
    pub shuffle_state: bool,
    pub timestamp: i64,
    pub progress_ms: Option<u64>,
    pub is_playing: bool,
    pub context: Option<PlaybackContext>,
    pub item: Option<Playable>,
    pub currently_playing_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayHistory {
    pub played_at: String,
    pub track: crate::models::Track,
    pub context: Option<PlaybackContext>,
}
