use std::fmt;

use crate::{
    Result,
    api::SpotifyApi,
    endpoint::Endpoint,
    models::{Artist, Track},
    paging::{PagingObject, decode_page},
};

/// Window the affinity for top items is computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    /// Roughly the last four weeks.
    ShortTerm,
    /// Roughly the last six months.
    #[default]
    MediumTerm,
    /// Several years of data.
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top artists and tracks. Needs `user-top-read`.
#[derive(Clone)]
pub struct PersonalizationApi {
    endpoint: Endpoint,
}

impl PersonalizationApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "personalization"),
        }
    }

    /// The user's top artists over `time_range`.
    ///
    /// # Arguments
    ///
    /// * `time_range` - Affinity window; [`TimeRange::MediumTerm`] when `None`
    /// * `limit` - Page size (1-50)
    /// * `offset` - Index of the first artist to return
    ///
    /// # API Endpoint
    ///
    /// `GET /me/top/artists`
    pub async fn top_artists(
        &self,
        time_range: Option<TimeRange>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PagingObject<Artist>> {
        self.top("artists", time_range, limit, offset).await
    }

    /// The user's top tracks over `time_range`. See [`Self::top_artists`].
    pub async fn top_tracks(
        &self,
        time_range: Option<TimeRange>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PagingObject<Track>> {
        self.top("tracks", time_range, limit, offset).await
    }

    async fn top<T: serde::de::DeserializeOwned>(
        &self,
        kind: &str,
        time_range: Option<TimeRange>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PagingObject<T>> {
        let url = self
            .endpoint
            .url(&format!("/me/top/{kind}"))
            .param("time_range", time_range)
            .param("limit", limit)
            .param("offset", offset)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }
}
