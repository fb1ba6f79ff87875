use crate::{
    Result,
    api::SpotifyApi,
    endpoint::{Endpoint, decode},
    endpoints::join_ids,
    models::SavedTrack,
    paging::{PagingObject, decode_page},
};

/// The user's saved tracks ("Liked Songs").
#[derive(Clone)]
pub struct LibraryApi {
    endpoint: Endpoint,
}

impl LibraryApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "library"),
        }
    }

    /// One page of saved tracks, most recently added first.
    ///
    /// # Arguments
    ///
    /// * `limit` - Page size (1-50)
    /// * `offset` - Index of the first saved track to return
    /// * `market` - Optional market for track relinking
    ///
    /// # Returns
    ///
    /// Each item carries the track and the time it was saved.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`](crate::Error::BadRequest) with status 403 when the
    /// token lacks `user-library-read`.
    ///
    /// # API Endpoint
    ///
    /// `GET /me/tracks`
    pub async fn saved_tracks(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        market: Option<&str>,
    ) -> Result<PagingObject<SavedTrack>> {
        let url = self
            .endpoint
            .url("/me/tracks")
            .param("limit", limit)
            .param("offset", offset)
            .param("market", market)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }

    /// Adds up to 50 tracks to the library. Needs `user-library-modify`.
    pub async fn save_tracks(&self, ids: &[&str]) -> Result<()> {
        let url = self.ids_url("/me/tracks", ids);
        self.endpoint.put(&url, None).await.map(drop)
    }

    /// Removes up to 50 tracks from the library.
    pub async fn remove_tracks(&self, ids: &[&str]) -> Result<()> {
        let url = self.ids_url("/me/tracks", ids);
        self.endpoint.delete(&url, None).await.map(drop)
    }

    /// Whether each id is saved, in request order.
    pub async fn contains_tracks(&self, ids: &[&str]) -> Result<Vec<bool>> {
        let url = self.ids_url("/me/tracks/contains", ids);
        let body = self.endpoint.get(&url).await?;
        decode(&body)
    }

    fn ids_url(&self, path: &str, ids: &[&str]) -> String {
        self.endpoint
            .url(path)
            .param("ids", Some(join_ids(ids)))
            .build()
    }
}
