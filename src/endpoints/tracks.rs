use crate::{
    Result,
    api::SpotifyApi,
    endpoint::{Endpoint, decode},
    endpoints::{join_ids, segment},
    models::{SeveralTracks, Track},
};

/// Track lookups, available to app and user tokens.
#[derive(Clone)]
pub struct TracksApi {
    endpoint: Endpoint,
}

impl TracksApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "tracks"),
        }
    }

    /// Fetches a single track.
    ///
    /// # Arguments
    ///
    /// * `id` - Spotify ID of the track
    /// * `market` - Market to relink the track in; without it, `is_playable`
    ///   is absent from the response
    ///
    /// # API Endpoint
    ///
    /// `GET /tracks/{id}`
    pub async fn track(&self, id: &str, market: Option<&str>) -> Result<Track> {
        let url = self
            .endpoint
            .url(&format!("/tracks/{}", segment(id)))
            .param("market", market)
            .build();
        self.endpoint.get_json(&url).await
    }

    /// Fetches up to 50 tracks in one request. Unknown ids come back as
    /// `None`.
    pub async fn tracks(&self, ids: &[&str], market: Option<&str>) -> Result<Vec<Option<Track>>> {
        let url = self
            .endpoint
            .url("/tracks")
            .param("ids", Some(join_ids(ids)))
            .param("market", market)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode::<SeveralTracks>(&body).map(|several| several.tracks)
    }
}
