use serde_json::json;

use crate::{
    Result,
    api::SpotifyApi,
    endpoint::{Endpoint, decode, json_body},
    endpoints::segment,
    models::{CreatePlaylistRequest, Playlist, PlaylistTrack, SimplePlaylist, SnapshotResponse},
    paging::{PagingObject, decode_page},
};

/// Read access to public playlists.
#[derive(Clone)]
pub struct PlaylistsApi {
    endpoint: Endpoint,
}

impl PlaylistsApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "playlists"),
        }
    }

    /// Fetches a playlist with its first page of items.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the playlist
    /// * `market` - Optional market for track relinking
    ///
    /// # API Endpoint
    ///
    /// `GET /playlists/{id}`
    pub async fn playlist(&self, id: &str, market: Option<&str>) -> Result<Playlist> {
        let url = self
            .endpoint
            .url(&format!("/playlists/{}", segment(id)))
            .param("market", market)
            .build();
        self.endpoint.get_json(&url).await
    }

    /// Items of a playlist. Tracks that are no longer available come back
    /// with `track: None`.
    pub async fn playlist_tracks(
        &self,
        id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
        market: Option<&str>,
    ) -> Result<PagingObject<PlaylistTrack>> {
        let url = self
            .endpoint
            .url(&format!("/playlists/{}/tracks", segment(id)))
            .param("limit", limit)
            .param("offset", offset)
            .param("market", market)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }

    /// Public playlists owned or followed by `user_id`.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Spotify user ID
    /// * `limit` - Page size (1-50)
    /// * `offset` - Index of the first playlist to return
    pub async fn user_playlists(
        &self,
        user_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PagingObject<SimplePlaylist>> {
        let url = self
            .endpoint
            .url(&format!("/users/{}/playlists", segment(user_id)))
            .param("limit", limit)
            .param("offset", offset)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }
}

/// Playlist management on behalf of the signed in user.
///
/// Writes need the `playlist-modify-public` or `playlist-modify-private`
/// scope, listing private playlists needs `playlist-read-private`.
#[derive(Clone)]
pub struct ClientPlaylistsApi {
    endpoint: Endpoint,
}

impl ClientPlaylistsApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "client-playlists"),
        }
    }

    /// Playlists owned or followed by the signed in user, private ones
    /// included when the token has `playlist-read-private`.
    pub async fn current_user_playlists(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PagingObject<SimplePlaylist>> {
        let url = self
            .endpoint
            .url("/me/playlists")
            .param("limit", limit)
            .param("offset", offset)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }

    /// Creates an empty playlist for `user_id`.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Must be the signed in user
    /// * `request` - Name, description and visibility of the new playlist
    ///
    /// # Returns
    ///
    /// The created playlist as returned by the Web API.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`](crate::Error::BadRequest) with status 403 when
    /// `user_id` is not the signed in user or a modify scope is missing.
    ///
    /// # API Endpoint
    ///
    /// `POST /users/{user_id}/playlists`
    pub async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<Playlist> {
        let url = self
            .endpoint
            .url(&format!("/users/{}/playlists", segment(user_id)))
            .build();
        let body = self.endpoint.post(&url, Some(json_body(request)?)).await?;
        decode(&body)
    }

    /// Appends `uris` or inserts them at `position`.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Spotify ID of the playlist
    /// * `uris` - Track or episode URIs, at most 100
    /// * `position` - Zero based insert position; appends when `None`
    ///
    /// # Returns
    ///
    /// The snapshot id of the playlist after the change.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[&str],
        position: Option<u32>,
    ) -> Result<String> {
        let url = self
            .endpoint
            .url(&format!("/playlists/{}/tracks", segment(playlist_id)))
            .build();
        let mut payload = json!({ "uris": uris });
        if let Some(position) = position {
            payload["position"] = json!(position);
        }
        let body = self.endpoint.post(&url, Some(json_body(&payload)?)).await?;
        decode::<SnapshotResponse>(&body).map(|s| s.snapshot_id)
    }

    /// Removes every occurrence of `uris`.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Spotify ID of the playlist
    /// * `uris` - Track or episode URIs, at most 100
    /// * `snapshot_id` - Apply the removal to this playlist version
    ///
    /// # Returns
    ///
    /// The new snapshot id.
    ///
    /// # API Endpoint
    ///
    /// `DELETE /playlists/{id}/tracks`. The track list travels in the DELETE
    /// body.
    pub async fn remove_tracks(
        &self,
        playlist_id: &str,
        uris: &[&str],
        snapshot_id: Option<&str>,
    ) -> Result<String> {
        let url = self
            .endpoint
            .url(&format!("/playlists/{}/tracks", segment(playlist_id)))
            .build();
        let tracks: Vec<_> = uris.iter().map(|uri| json!({ "uri": uri })).collect();
        let mut payload = json!({ "tracks": tracks });
        if let Some(snapshot_id) = snapshot_id {
            payload["snapshot_id"] = json!(snapshot_id);
        }
        let body = self.endpoint.delete(&url, Some(json_body(&payload)?)).await?;
        decode::<SnapshotResponse>(&body).map(|s| s.snapshot_id)
    }
}
