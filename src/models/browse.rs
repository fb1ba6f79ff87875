use serde::{Deserialize, Serialize};

use crate::{
    models::{Image, SimplePlaylist},
    paging::PagingObject,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub href: String,
    #[serde(default, alias = "icons")]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedPlaylists {
    pub message: Option<String>,
    pub playlists: PagingObject<SimplePlaylist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markets {
    pub markets: Vec<String>,
}
