use crate::{
    Result,
    api::SpotifyApi,
    endpoint::{Endpoint, decode},
    endpoints::{join_ids, segment},
    models::{AlbumType, Artist, ArtistTopTracks, SeveralArtists, SimpleAlbum, Track},
    paging::{PagingObject, decode_page},
};

/// Artist lookups, available to app and user tokens.
#[derive(Clone)]
pub struct ArtistsApi {
    endpoint: Endpoint,
}

impl ArtistsApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "artists"),
        }
    }

    /// Fetches a single artist.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`](crate::Error::BadRequest) with status 404 for an
    /// unknown id.
    pub async fn artist(&self, id: &str) -> Result<Artist> {
        let url = self.endpoint.url(&format!("/artists/{}", segment(id))).build();
        self.endpoint.get_json(&url).await
    }

    /// Fetches up to 50 artists in one request.
    ///
    /// # Returns
    ///
    /// One slot per id in request order. Unknown ids come back as `None`.
    pub async fn artists(&self, ids: &[&str]) -> Result<Vec<Option<Artist>>> {
        let url = self
            .endpoint
            .url("/artists")
            .param("ids", Some(join_ids(ids)))
            .build();
        let body = self.endpoint.get(&url).await?;
        decode::<SeveralArtists>(&body).map(|several| several.artists)
    }

    /// Retrieves the releases of an artist.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the artist
    /// * `groups` - Release groups to include; all groups when empty
    /// * `limit` - Page size (1-50)
    /// * `offset` - Index of the first release to return
    /// * `market` - Only releases available in this market
    ///
    /// # API Endpoint
    ///
    /// `GET /artists/{id}/albums` with `include_groups` as a comma separated
    /// list of `album`, `single`, `compilation` and `appears_on`.
    pub async fn artist_albums(
        &self,
        id: &str,
        groups: &[AlbumType],
        limit: Option<u32>,
        offset: Option<u32>,
        market: Option<&str>,
    ) -> Result<PagingObject<SimpleAlbum>> {
        let include_groups = (!groups.is_empty()).then(|| {
            groups
                .iter()
                .map(AlbumType::as_str)
                .collect::<Vec<_>>()
                .join(",")
        });
        let url = self
            .endpoint
            .url(&format!("/artists/{}/albums", segment(id)))
            .param("include_groups", include_groups)
            .param("limit", limit)
            .param("offset", offset)
            .param("market", market)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }

    /// Top tracks of an artist in `market`.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the artist
    /// * `market` - ISO 3166-1 alpha-2 country code; required by the Web API
    ///
    /// # API Endpoint
    ///
    /// `GET /artists/{id}/top-tracks`
    pub async fn top_tracks(&self, id: &str, market: &str) -> Result<Vec<Track>> {
        let url = self
            .endpoint
            .url(&format!("/artists/{}/top-tracks", segment(id)))
            .param("market", Some(market))
            .build();
        let body = self.endpoint.get(&url).await?;
        decode::<ArtistTopTracks>(&body).map(|top| top.tracks)
    }

    /// Artists similar to `id`, as computed from listener overlap.
    pub async fn related_artists(&self, id: &str) -> Result<Vec<Artist>> {
        let url = self
            .endpoint
            .url(&format!("/artists/{}/related-artists", segment(id)))
            .build();
        let body = self.endpoint.get(&url).await?;
        decode::<SeveralArtists>(&body)
            .map(|several| several.artists.into_iter().flatten().collect())
    }
}
