use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// OAuth client credentials registered for the application.
///
/// Read from a JSON file of the form
/// `{"client_id": "...", "client_secret": "..."}`.
#[derive(Clone, Deserialize)]
pub struct AppSecret {
    pub client_id: String,
    pub client_secret: String,
}

impl AppSecret {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Secret {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        let secret: AppSecret = serde_json::from_str(&text).map_err(|e| Error::Secret {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        if secret.client_id.is_empty() || secret.client_secret.is_empty() {
            return Err(Error::Secret {
                path: path.to_path_buf(),
                source: "client_id and client_secret must not be empty".into(),
            });
        }
        Ok(secret)
    }
}

impl fmt::Debug for AppSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSecret")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
