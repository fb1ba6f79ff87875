use serde::{Deserialize, Serialize};

use crate::{
    models::{ExternalUrls, Followers, Image, Playable, PublicUser},
    paging::PagingObject,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub added_at: Option<String>,
    pub added_by: Option<PublicUser>,
    #[serde(default)]
    pub is_local: bool,
    pub track: Option<Playable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTracksRef {
    pub href: String,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplePlaylist {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub description: Option<String>,
    pub owner: PublicUser,
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    pub snapshot_id: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub tracks: Option<PlaylistTracksRef>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub description: Option<String>,
    pub owner: PublicUser,
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    pub snapshot_id: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub followers: Option<Followers>,
    pub tracks: PagingObject<PlaylistTrack>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: Option<String>,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}
