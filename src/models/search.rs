use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    models::{Artist, SimpleAlbum, SimplePlaylist, Track},
    paging::PagingObject,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchType {
    Album,
    Artist,
    Playlist,
    Track,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Album => "album",
            SearchType::Artist => "artist",
            SearchType::Playlist => "playlist",
            SearchType::Track => "track",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search results; only the requested types are present. Playlists may
/// contain `null` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub albums: Option<PagingObject<SimpleAlbum>>,
    pub artists: Option<PagingObject<Artist>>,
    pub playlists: Option<PagingObject<Option<SimplePlaylist>>>,
    pub tracks: Option<PagingObject<Track>>,
}
