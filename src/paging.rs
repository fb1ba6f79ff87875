//! Offset and cursor based result pages.
//!
//! A page is an immutable snapshot. Moving to an adjacent page issues a GET
//! on its `next`/`previous` URL through [`Endpoint::execute`], so traversal
//! gets the same caching, retry and refresh behaviour as any other call. No
//! state is kept between calls besides the URLs carried by the page.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Result, api::SpotifyApi, endpoint::Endpoint};

const PAGING_ENDPOINT: &str = "paging";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingObject<T> {
    pub href: String,
    pub items: Vec<T>,
    pub limit: u32,
    pub next: Option<String>,
    pub offset: u32,
    pub previous: Option<String>,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub after: Option<String>,
    pub before: Option<String>,
}

/// Forward-only page, e.g. followed artists or recently played tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorBasedPagingObject<T> {
    pub href: String,
    pub items: Vec<T>,
    pub limit: u32,
    pub next: Option<String>,
    #[serde(default)]
    pub cursors: Cursor,
    pub total: Option<u32>,
}

impl<T: DeserializeOwned> PagingObject<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub async fn next(&self, api: &SpotifyApi) -> Result<Option<Self>> {
        match &self.next {
            Some(url) => fetch_page(api, url).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn previous(&self, api: &SpotifyApi) -> Result<Option<Self>> {
        match &self.previous {
            Some(url) => fetch_page(api, url).await.map(Some),
            None => Ok(None),
        }
    }

    /// This page followed by every page after it.
    pub async fn all_pages(self, api: &SpotifyApi) -> Result<Vec<Self>> {
        let mut pages = Vec::new();
        let mut current = Some(self);
        while let Some(page) = current {
            current = page.next(api).await?;
            pages.push(page);
        }
        Ok(pages)
    }

    pub async fn all_items(self, api: &SpotifyApi) -> Result<Vec<T>> {
        let pages = self.all_pages(api).await?;
        Ok(pages.into_iter().flat_map(|page| page.items).collect())
    }
}

impl<T: DeserializeOwned> CursorBasedPagingObject<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub async fn next(&self, api: &SpotifyApi) -> Result<Option<Self>> {
        match &self.next {
            Some(url) => fetch_page(api, url).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn all_pages(self, api: &SpotifyApi) -> Result<Vec<Self>> {
        let mut pages = Vec::new();
        let mut current = Some(self);
        while let Some(page) = current {
            current = page.next(api).await?;
            pages.push(page);
        }
        Ok(pages)
    }

    pub async fn all_items(self, api: &SpotifyApi) -> Result<Vec<T>> {
        let pages = self.all_pages(api).await?;
        Ok(pages.into_iter().flat_map(|page| page.items).collect())
    }
}

async fn fetch_page<P: DeserializeOwned>(api: &SpotifyApi, url: &str) -> Result<P> {
    let body = Endpoint::new(api.clone(), PAGING_ENDPOINT).get(url).await?;
    decode_page(&body)
}

/// Decodes a page that may come wrapped in a single-key object such as
/// `{"artists": {...}}`, which is how search and follow results arrive.
pub fn decode_page<P: DeserializeOwned>(body: &str) -> Result<P> {
    let value: Value = serde_json::from_str(body).map_err(|e| Error::parse(e, body))?;
    let value = match value {
        Value::Object(mut map) if !map.contains_key("items") && map.len() == 1 => map
            .values_mut()
            .next()
            .map(Value::take)
            .unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| Error::parse(e, body))
}
