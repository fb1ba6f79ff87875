use crate::{
    Result,
    api::SpotifyApi,
    endpoint::{Endpoint, decode},
    endpoints::segment,
    models::{Category, FeaturedPlaylists, Markets, SimpleAlbum},
    paging::{PagingObject, decode_page},
};

/// Editorial content: new releases, categories and featured playlists.
#[derive(Clone)]
pub struct BrowseApi {
    endpoint: Endpoint,
}

impl BrowseApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "browse"),
        }
    }

    /// One page of newly released albums.
    ///
    /// # Arguments
    ///
    /// * `country` - Only releases relevant to this market
    /// * `limit` - Page size (1-50)
    /// * `offset` - Index of the first album to return
    ///
    /// # Returns
    ///
    /// The page is unwrapped from the `albums` object the Web API nests it in.
    ///
    /// # API Endpoint
    ///
    /// `GET /browse/new-releases`
    pub async fn new_releases(
        &self,
        country: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PagingObject<SimpleAlbum>> {
        let url = self
            .endpoint
            .url("/browse/new-releases")
            .param("country", country)
            .param("limit", limit)
            .param("offset", offset)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }

    /// One page of browse categories, with names localised to `locale`
    /// (for example `de_DE`).
    pub async fn categories(
        &self,
        locale: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PagingObject<Category>> {
        let url = self
            .endpoint
            .url("/browse/categories")
            .param("locale", locale)
            .param("limit", limit)
            .param("offset", offset)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }

    /// A single browse category.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`](crate::Error::BadRequest) with status 404 for an
    /// unknown category id.
    pub async fn category(&self, id: &str, locale: Option<&str>) -> Result<Category> {
        let url = self
            .endpoint
            .url(&format!("/browse/categories/{}", segment(id)))
            .param("locale", locale)
            .build();
        self.endpoint.get_json(&url).await
    }

    /// Playlists currently featured by Spotify, with the editorial message
    /// shown above them.
    ///
    /// # Arguments
    ///
    /// * `locale` - Language of the message and playlist names
    /// * `limit` - Page size (1-50)
    /// * `offset` - Index of the first playlist to return
    ///
    /// # API Endpoint
    ///
    /// `GET /browse/featured-playlists`
    pub async fn featured_playlists(
        &self,
        locale: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<FeaturedPlaylists> {
        let url = self
            .endpoint
            .url("/browse/featured-playlists")
            .param("locale", locale)
            .param("limit", limit)
            .param("offset", offset)
            .build();
        self.endpoint.get_json(&url).await
    }

    /// Markets the catalogue is available in.
    pub async fn markets(&self) -> Result<Vec<String>> {
        let url = self.endpoint.url("/markets").build();
        let body = self.endpoint.get(&url).await?;
        decode::<Markets>(&body).map(|m| m.markets)
    }
}
