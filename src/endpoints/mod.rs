//! Typed wrappers around the Web API endpoint families.
//!
//! Every family owns an [`Endpoint`](crate::endpoint::Endpoint) named after
//! itself; that name is also the cache partition its responses land in.
//! Families reachable with an app token hang off [`crate::SpotifyApi`], the
//! user-scoped ones only off [`crate::SpotifyClientApi`].

mod albums;
mod artists;
mod browse;
mod following;
mod library;
mod personalization;
mod player;
mod playlists;
mod search;
mod tracks;
mod users;

pub use albums::AlbumsApi;
pub use artists::ArtistsApi;
pub use browse::BrowseApi;
pub use following::FollowingApi;
pub use library::LibraryApi;
pub use personalization::{PersonalizationApi, TimeRange};
pub use player::PlayerApi;
pub use playlists::{ClientPlaylistsApi, PlaylistsApi};
pub use search::SearchApi;
pub use tracks::TracksApi;
pub use users::{ClientProfileApi, UserProfileApi};

/// Comma separated id list as expected by the `ids` query parameter.
fn join_ids(ids: &[&str]) -> String {
    ids.join(",")
}

/// Percent-encodes a single path segment such as an id or a category name.
fn segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
