use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
    Result,
    api::SpotifyApi,
    endpoint::{Endpoint, decode, json_body},
    models::{CurrentlyPlaying, Device, Devices, PlayHistory, PlaybackState},
    paging::{CursorBasedPagingObject, decode_page},
};

/// Playback control on the user's devices.
///
/// Reading needs `user-read-playback-state`, controlling needs
/// `user-modify-playback-state` and a Premium account.
#[derive(Clone)]
pub struct PlayerApi {
    endpoint: Endpoint,
}

impl PlayerApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "player"),
        }
    }

    /// Playback state of the user's active device.
    ///
    /// # Returns
    ///
    /// `None` when nothing is playing on any device (the Web API answers
    /// `204 No Content`).
    ///
    /// # API Endpoint
    ///
    /// `GET /me/player`
    pub async fn playback_state(&self) -> Result<Option<PlaybackState>> {
        let url = self.endpoint.url("/me/player").build();
        self.optional(&url).await
    }

    /// The track or episode currently playing, `None` when idle.
    ///
    /// # Arguments
    ///
    /// * `market` - Optional market for track relinking
    pub async fn currently_playing(&self, market: Option<&str>) -> Result<Option<CurrentlyPlaying>> {
        let url = self
            .endpoint
            .url("/me/player/currently-playing")
            .param("market", market)
            .build();
        self.optional(&url).await
    }

    /// Devices currently available for playback.
    pub async fn devices(&self) -> Result<Vec<Device>> {
        let url = self.endpoint.url("/me/player/devices").build();
        let body = self.endpoint.get(&url).await?;
        decode::<Devices>(&body).map(|d| d.devices)
    }

    /// Tracks played most recently, newest first.
    ///
    /// # Arguments
    ///
    /// * `limit` - Page size (1-50)
    /// * `after` - Unix timestamp in milliseconds; only plays after it are
    ///   returned
    ///
    /// # Returns
    ///
    /// A cursor page; older plays are reached through its `next` link.
    pub async fn recently_played(
        &self,
        limit: Option<u32>,
        after: Option<i64>,
    ) -> Result<CursorBasedPagingObject<PlayHistory>> {
        let url = self
            .endpoint
            .url("/me/player/recently-played")
            .param("limit", limit)
            .param("after", after)
            .build();
        let body = self.endpoint.get(&url).await?;
        decode_page(&body)
    }

    /// Starts or resumes playback.
    ///
    /// # Arguments
    ///
    /// * `device_id` - Target device; the active one when `None`
    /// * `uris` - Tracks that replace the current queue; resumes when `None`
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`](crate::Error::BadRequest) with status 403 for
    /// non-Premium accounts and 404 when no device is active.
    ///
    /// # API Endpoint
    ///
    /// `PUT /me/player/play`
    pub async fn play(&self, device_id: Option<&str>, uris: Option<&[&str]>) -> Result<()> {
        let url = self
            .endpoint
            .url("/me/player/play")
            .param("device_id", device_id)
            .build();
        let body = match uris {
            Some(uris) => Some(json_body(&json!({ "uris": uris }))?),
            None => None,
        };
        self.endpoint.put(&url, body).await.map(drop)
    }

    /// Pauses playback on `device_id`, or on the active device.
    pub async fn pause(&self, device_id: Option<&str>) -> Result<()> {
        let url = self.device_url("/me/player/pause", device_id);
        self.endpoint.put(&url, None).await.map(drop)
    }

    /// Skips to the next item in the queue.
    pub async fn next(&self, device_id: Option<&str>) -> Result<()> {
        let url = self.device_url("/me/player/next", device_id);
        self.endpoint.post(&url, None).await.map(drop)
    }

    /// Skips back to the previous item.
    pub async fn previous(&self, device_id: Option<&str>) -> Result<()> {
        let url = self.device_url("/me/player/previous", device_id);
        self.endpoint.post(&url, None).await.map(drop)
    }

    /// Sets the volume, clamped to 0-100.
    ///
    /// Devices without volume control (for example some speakers) reject the
    /// call with status 403.
    pub async fn set_volume(&self, percent: u8, device_id: Option<&str>) -> Result<()> {
        let url = self
            .endpoint
            .url("/me/player/volume")
            .param("volume_percent", Some(percent.min(100)))
            .param("device_id", device_id)
            .build();
        self.endpoint.put(&url, None).await.map(drop)
    }

    fn device_url(&self, path: &str, device_id: Option<&str>) -> String {
        self.endpoint
            .url(path)
            .param("device_id", device_id)
            .build()
    }

    // 204 No Content carries an empty body.
    async fn optional<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let body = self.endpoint.get(url).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        decode(&body).map(Some)
    }
}
