//! Typed views of the Web API objects the endpoint families return.
//!
//! Only the commonly used fields are modelled; unknown fields are ignored.

mod album;
mod artist;
mod browse;
mod common;
mod player;
mod playlist;
mod search;
mod track;
mod user;

pub use album::{Album, AlbumType, SeveralAlbums, SimpleAlbum};
pub use artist::{Artist, SeveralArtists, SimpleArtist};
pub use browse::{Category, FeaturedPlaylists, Markets};
pub use common::{Copyright, ExternalIds, ExternalUrls, Followers, Image, Restrictions};
pub use player::{CurrentlyPlaying, Device, Devices, PlayHistory, PlaybackContext, PlaybackState};
pub use playlist::{
    CreatePlaylistRequest, Playlist, PlaylistTrack, PlaylistTracksRef, SimplePlaylist,
    SnapshotResponse,
};
pub use search::{SearchResult, SearchType};
pub use track::{ArtistTopTracks, Episode, Playable, SavedTrack, SeveralTracks, SimpleTrack, Track};
pub use user::{PrivateUser, PublicUser};
