use std::path::{Path, PathBuf};

use crate::{Error, Result, auth::Token, config};

/// Persists a token as JSON so a login survives process restarts.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    /// `<data_local_dir>/spotapi/cache/token.json`
    pub fn default_location() -> Self {
        let mut path = config::data_dir();
        path.push("cache/token.json");
        TokenStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Token> {
        let content = async_fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content).map_err(|e| Error::parse(e, content))
    }

    pub async fn persist(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(token).map_err(|e| Error::parse(e, ""))?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
