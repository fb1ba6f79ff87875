use serde::{Deserialize, Serialize};

use crate::models::{ExternalIds, ExternalUrls, Image, Restrictions, SimpleAlbum, SimpleArtist};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleTrack {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub duration_ms: u64,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    #[serde(default)]
    pub explicit: bool,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    pub album: Option<SimpleAlbum>,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub duration_ms: u64,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    #[serde(default)]
    pub explicit: bool,
    pub popularity: Option<u32>,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    pub is_playable: Option<bool>,
    pub restrictions: Option<Restrictions>,
    #[serde(default)]
    pub external_ids: ExternalIds,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeveralTracks {
    pub tracks: Vec<Option<Track>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistTopTracks {
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTrack {
    pub added_at: String,
    pub track: Track,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: Option<String>,
}

/// Anything that can sit in a playlist or the player: a track or an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Playable {
    Track(Track),
    Episode(Episode),
}

impl Playable {
    pub fn name(&self) -> &str {
        match self {
            Playable::Track(track) => &track.name,
            Playable::Episode(episode) => &episode.name,
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            Playable::Track(track) => &track.uri,
            Playable::Episode(episode) => &episode.uri,
        }
    }
}
