//! Table rows printed by the commands.

use tabled::Tabled;

use crate::models::{Artist, SavedTrack, SimpleAlbum, SimpleArtist, SimplePlaylist, SimpleTrack, Track};

#[derive(Tabled)]
pub struct ArtistRow {
    pub name: String,
    pub genres: String,
    pub followers: u32,
}

impl From<&Artist> for ArtistRow {
    fn from(artist: &Artist) -> Self {
        Self {
            name: artist.name.clone(),
            genres: artist
                .genres
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(","),
            followers: artist.followers.total,
        }
    }
}

#[derive(Tabled)]
pub struct TrackRow {
    #[tabled(rename = "#")]
    pub number: String,
    pub name: String,
    pub artists: String,
    pub duration: String,
}

impl TrackRow {
    pub fn from_simple(track: &SimpleTrack) -> Self {
        Self {
            number: track.track_number.map(|n| n.to_string()).unwrap_or_default(),
            name: track.name.clone(),
            artists: artist_names(&track.artists),
            duration: format_duration(track.duration_ms),
        }
    }

    pub fn from_track(index: usize, track: &Track) -> Self {
        Self {
            number: (index + 1).to_string(),
            name: track.name.clone(),
            artists: artist_names(&track.artists),
            duration: format_duration(track.duration_ms),
        }
    }
}

#[derive(Tabled)]
pub struct SavedTrackRow {
    pub added: String,
    pub name: String,
    pub artists: String,
    pub duration: String,
}

impl From<&SavedTrack> for SavedTrackRow {
    fn from(saved: &SavedTrack) -> Self {
        Self {
            added: saved.added_at.chars().take(10).collect(),
            name: saved.track.name.clone(),
            artists: artist_names(&saved.track.artists),
            duration: format_duration(saved.track.duration_ms),
        }
    }
}

#[derive(Tabled)]
pub struct AlbumRow {
    pub date: String,
    pub name: String,
    pub artists: String,
}

impl From<&SimpleAlbum> for AlbumRow {
    fn from(album: &SimpleAlbum) -> Self {
        Self {
            date: album.release_date.clone().unwrap_or_default(),
            name: album.name.clone(),
            artists: artist_names(&album.artists),
        }
    }
}

#[derive(Tabled)]
pub struct PlaylistRow {
    pub name: String,
    pub owner: String,
    pub tracks: String,
}

impl From<&SimplePlaylist> for PlaylistRow {
    fn from(playlist: &SimplePlaylist) -> Self {
        Self {
            name: playlist.name.clone(),
            owner: playlist
                .owner
                .display_name
                .clone()
                .unwrap_or_else(|| playlist.owner.id.clone()),
            tracks: playlist
                .tracks
                .as_ref()
                .map(|t| t.total.to_string())
                .unwrap_or_default(),
        }
    }
}

pub fn artist_names(artists: &[SimpleArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats milliseconds as `m:ss`, or `h:mm:ss` from one hour on.
pub fn format_duration(ms: u64) -> String {
    let total = ms / 1000;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
