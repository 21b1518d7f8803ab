use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::{
    Res,
    error::SpotError,
    spotify::auth::{self, Credentials},
    types::Token,
    warning,
};

const EXPIRY_MARGIN_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
    path: Option<PathBuf>,
}

impl TokenManager {
    /// Wraps a token. With a `path` the token is written back there after every refresh.
    pub fn new(token: Token, path: Option<PathBuf>) -> Self {
        TokenManager { token, path }
    }

    /// Reads the token cache. A missing file means there is no cached token.
    pub async fn load(path: &Path) -> Res<Option<Self>> {
        let content = match async_fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SpotError::io(path, e)),
        };
        let token: Token = serde_json::from_str(&content)?;
        Ok(Some(Self {
            token,
            path: Some(path.to_path_buf()),
        }))
    }

    pub async fn persist(&self) -> Res<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| SpotError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(path, json)
            .await
            .map_err(|e| SpotError::io(path, e))
    }

    pub async fn get_valid_token(&mut self, credentials: &Credentials) -> Res<String> {
        if self.is_expired() {
            self.token = auth::renew(credentials, &self.token).await?;
            if let Err(e) = self.persist().await {
                warning!("Failed to write refreshed token: {}", e);
            }
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
