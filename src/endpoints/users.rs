use crate::{
    Result,
    api::SpotifyApi,
    endpoint::Endpoint,
    endpoints::segment,
    models::{PrivateUser, PublicUser},
};

/// Public profiles of any user.
#[derive(Clone)]
pub struct UserProfileApi {
    endpoint: Endpoint,
}

impl UserProfileApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "users"),
        }
    }

    /// Public profile of `user_id`.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`](crate::Error::BadRequest) with status 404 for an
    /// unknown user.
    pub async fn profile(&self, user_id: &str) -> Result<PublicUser> {
        let url = self
            .endpoint
            .url(&format!("/users/{}", segment(user_id)))
            .build();
        self.endpoint.get_json(&url).await
    }
}

/// Profile of the signed in user. `email` needs `user-read-email`, `country`
/// and `product` need `user-read-private`.
#[derive(Clone)]
pub struct ClientProfileApi {
    endpoint: Endpoint,
}

impl ClientProfileApi {
    pub(crate) fn new(api: SpotifyApi) -> Self {
        Self {
            endpoint: Endpoint::new(api, "client-profile"),
        }
    }

    /// Profile of the user the token belongs to.
    pub async fn current_user(&self) -> Result<PrivateUser> {
        let url = self.endpoint.url("/me").build();
        self.endpoint.get_json(&url).await
    }
}
