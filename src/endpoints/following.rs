use crate::{
    Result,
    api::SpotifyApi,
    endpoint::{Endpoint, decode},
    endpoints::join_ids,
    models::Artist,
    paging::{CursorBasedPagingObject, decode_page},
};

/// Artists the user follows. Needs `user-follow-read` / `user-follow-modify`.
#[derive(Clone)]
pub struct FollowingApi {
    endpoint: Endpoint,
}

impl FollowingApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "following"),
        }
    }

    /// First page of followed artists, continuing after the artist id
    /// `after` when given.
    ///
    /// # Arguments
    ///
    /// * `limit` - Page size (1-50)
    /// * `after` - Last artist id of the previous page
    ///
    /// # Returns
    ///
    /// A cursor page. Walk it with
    /// [`CursorBasedPagingObject::next`](crate::paging::CursorBasedPagingObject::next)
    /// or collect everything with `all_items`.
    ///
    /// # API Endpoint
    ///
    /// `GET /me/following?type=artist`. The page arrives wrapped in an
    /// `artists` object and is cursor based, so it can only be walked forward.
    pub async fn followed_artists(
        &self,
        limit: Option<u32>,
        after: Option<&str>,
    ) -> Result<CursorBasedPagingObject<Artist>> {
        let url = self
            .endpoint
            .url("/me/following")
            .param("type", Some("artist"))
            .param("limit", limit)
            .param("after", after)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }

    /// Follows up to 50 artists.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`](crate::Error::BadRequest) with status 403 when the
    /// token lacks `user-follow-modify`.
    pub async fn follow_artists(&self, ids: &[&str]) -> Result<()> {
        let url = self.artist_ids_url("/me/following", ids);
        self.endpoint.put(&url, None).await.map(drop)
    }

    /// Unfollows up to 50 artists. Ids not followed are ignored.
    pub async fn unfollow_artists(&self, ids: &[&str]) -> Result<()> {
        let url = self.artist_ids_url("/me/following", ids);
        self.endpoint.delete(&url, None).await.map(drop)
    }

    /// One flag per id, in request order.
    pub async fn is_following_artists(&self, ids: &[&str]) -> Result<Vec<bool>> {
        let url = self.artist_ids_url("/me/following/contains", ids);
        let body = self.endpoint.get(&url).await?;
        decode(&body)
    }

    fn artist_ids_url(&self, path: &str, ids: &[&str]) -> String {
        self.endpoint
            .url(path)
            .param("type", Some("artist"))
            .param("ids", Some(join_ids(ids)))
            .build()
    }
}
