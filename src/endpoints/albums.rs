use crate::{
    Result,
    api::SpotifyApi,
    endpoint::{Endpoint, decode},
    endpoints::{join_ids, segment},
    models::{Album, SeveralAlbums, SimpleTrack},
    paging::{PagingObject, decode_page},
};

/// Album lookups, available to app and user tokens.
#[derive(Clone)]
pub struct AlbumsApi {
    endpoint: Endpoint,
}

impl AlbumsApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "albums"),
        }
    }

    /// Fetches a single album with its first page of tracks.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the album
    /// * `market` - ISO 3166-1 alpha-2 country code used for track relinking
    ///
    /// # Returns
    ///
    /// The full album. Further tracks are reachable through
    /// [`PagingObject::next`](crate::paging::PagingObject::next) on `album.tracks`.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`](crate::Error::BadRequest) with status 404 for an
    /// unknown id, 400 for a malformed one.
    ///
    /// # API Endpoint
    ///
    /// `GET /albums/{id}`
    pub async fn album(&self, id: &str, market: Option<&str>) -> Result<Album> {
        let url = self
            .endpoint
            .url(&format!("/albums/{}", segment(id)))
            .param("market", market)
            .build();
        self.endpoint.get_json(&url).await
    }

    /// Fetches up to 20 albums in one request.
    ///
    /// # Arguments
    ///
    /// * `ids` - Spotify IDs, at most 20
    /// * `market` - Optional market for track relinking
    ///
    /// # Returns
    ///
    /// One slot per id in request order. Unknown ids come back as `None`
    /// instead of failing the whole call.
    ///
    /// # API Endpoint
    ///
    /// `GET /albums?ids=...`
    pub async fn albums(&self, ids: &[&str], market: Option<&str>) -> Result<Vec<Option<Album>>> {
        let url = self
            .endpoint
            .url("/albums")
            .param("ids", Some(join_ids(ids)))
            .param("market", market)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode::<SeveralAlbums>(&body).map(|several| several.albums)
    }

    /// One page of an album's tracks.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the album
    /// * `limit` - Page size (1-50, server default 20)
    /// * `offset` - Index of the first track to return
    /// * `market` - Optional market for track relinking
    ///
    /// # API Endpoint
    ///
    /// `GET /albums/{id}/tracks`
    pub async fn album_tracks(
        &self,
        id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
        market: Option<&str>,
    ) -> Result<PagingObject<SimpleTrack>> {
        let url = self
            .endpoint
            .url(&format!("/albums/{}/tracks", segment(id)))
            .param("limit", limit)
            .param("offset", offset)
            .param("market", market)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }
}
