use crate::{
    Result,
    api::SpotifyApi,
    endpoint::Endpoint,
    models::{SearchResult, SearchType},
};

/// Catalogue search, available to app and user tokens.
#[derive(Clone)]
pub struct SearchApi {
    endpoint: Endpoint,
}

impl SearchApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "search"),
        }
    }

    /// Searches the catalogue for `query` across the requested `types`.
    ///
    /// # Arguments
    ///
    /// * `query` - Search text; supports field filters such as `artist:` or
    ///   `year:`
    /// * `types` - Item kinds to search for; at least one
    /// * `limit` - Page size per type (1-50)
    /// * `offset` - Index of the first result of each type
    /// * `market` - Only content playable in this market
    ///
    /// # Returns
    ///
    /// A [`SearchResult`] carrying pages only for the requested types; each
    /// page can be walked further with
    /// [`PagingObject::next`](crate::paging::PagingObject::next).
    ///
    /// # API Endpoint
    ///
    /// `GET /search`
    pub async fn search(
        &self,
        query: &str,
        types: &[SearchType],
        limit: Option<u32>,
        offset: Option<u32>,
        market: Option<&str>,
    ) -> Result<SearchResult> {
        let kinds = types
            .iter()
            .map(SearchType::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let url = self
            .endpoint
            .url("/search")
            .param("q", Some(query))
            .param("type", Some(kinds))
            .param("limit", limit)
            .param("offset", offset)
            .param("market", market)
            .build();
        self.endpoint.get_json(&url).await
    }
}
