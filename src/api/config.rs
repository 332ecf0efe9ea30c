//! Client Configuration

use std::path::PathBuf;

use crate::network::TransportConfig;

/// Configuration for the client facade.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Transport settings (server URL, timeouts, reconnect policy).
    pub transport: TransportConfig,
    /// Where to persist the current user's profile; `None` disables
    /// persistence entirely.
    pub profile_cache_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Creates a config pointing at the given realtime server.
    pub fn for_server(server_url: &str) -> Self {
        ClientConfig {
            transport: TransportConfig::for_server(server_url),
            profile_cache_path: None,
        }
    }

    /// Sets the profile cache location.
    pub fn with_profile_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_cache_path = Some(path.into());
        self
    }
}
