use desktop_sync_contract::{server_base, InvalidServerUrl};

use crate::error::SyncClientError;

impl From<InvalidServerUrl> for SyncClientError {
    fn from(err: InvalidServerUrl) -> Self {
        Self::InvalidUrl(err.0)
    }
}

/// Strips a trailing slash and checks the scheme.
pub(crate) fn normalize_base(server_url: &str) -> Result<String, SyncClientError> {
    Ok(server_base(server_url)?.to_string())
}

/// Derives the push channel URL from the server base URL.
///
/// # Errors
///
/// Returns [`SyncClientError::InvalidUrl`] for non-HTTP URLs.
pub fn sync_url(server_url: &str) -> Result<String, SyncClientError> {
    Ok(desktop_sync_contract::sync_url(server_url)?)
}
