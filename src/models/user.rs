use serde::{Deserialize, Serialize};

use crate::models::{ExternalUrls, Followers, Image};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub display_name: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub followers: Option<Followers>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Profile of the user the token belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateUser {
    pub id: String,
    pub display_name: Option<String>,
    pub uri: String,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub followers: Option<Followers>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}
