//! Client configuration: upstream URLs and debug switches.

use crate::parsing::DEFAULT_PLAYLIST_URL_BASE;

/// Environment variable that turns on dumping every fetched body to disk.
pub const DEBUG_SAVE_RESPONSES_ENV: &str = "WFMU_DEBUG_SAVE_RESPONSES";

/// Every upstream URL the client talks to.
///
/// Defaults point at the production wfmu.org endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Now-playing JSON feed
    pub status_feed: String,
    /// Login page and login submit target (`auth.php`)
    pub auth: String,
    /// Where the login form redirects after signing in (`r` parameter)
    pub login_redirect: String,
    /// Prefix that playlist ids are appended to
    pub playlist_base: String,
    /// Comment post target, used by both legs of the comment relay
    pub comment_post: String,
    /// Favorite toggle target
    pub favorite_toggle: String,
    /// The logged-in user's favorites page
    pub favorites_page: String,
    /// Comments XML feed for the current playlist
    pub comments_feed: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            status_feed: "https://wfmu.org/wp-content/themes/wfmu-theme/status/main.json"
                .to_string(),
            auth: "https://wfmu.org/auth.php".to_string(),
            login_redirect: "https://wfmu.org/index.shtml".to_string(),
            playlist_base: DEFAULT_PLAYLIST_URL_BASE.to_string(),
            comment_post: "https://wfmu.org/playlistcommentpost.php".to_string(),
            favorite_toggle: "https://wfmu.org/kdb_favorite.php".to_string(),
            favorites_page: "https://wfmu.org/auth.php?a=favorites".to_string(),
            comments_feed: "https://wfmu.org/current_playlist_xml.php?m=comments&c=1"
                .to_string(),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at `base_url` (scheme and host, no trailing
    /// slash), keeping the production paths. Useful for mirrors and tests.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            status_feed: format!("{base}/wp-content/themes/wfmu-theme/status/main.json"),
            auth: format!("{base}/auth.php"),
            login_redirect: format!("{base}/index.shtml"),
            playlist_base: format!("{base}/playlists/shows/"),
            comment_post: format!("{base}/playlistcommentpost.php"),
            favorite_toggle: format!("{base}/kdb_favorite.php"),
            favorites_page: format!("{base}/auth.php?a=favorites"),
            comments_feed: format!("{base}/current_playlist_xml.php?m=comments&c=1"),
        }
    }

    pub fn playlist_url(&self, playlist_id: &str) -> String {
        format!("{}{}", self.playlist_base, playlist_id)
    }
}

/// Configuration for a [`WfmuClientImpl`](crate::WfmuClientImpl).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    /// Write every fetched body under `debug_responses/`
    pub debug_save_responses: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            debug_save_responses: std::env::var(DEBUG_SAVE_RESPONSES_ENV).is_ok(),
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Shorthand for `with_endpoints(Endpoints::with_base_url(base_url))`
    pub fn with_base_url(self, base_url: &str) -> Self {
        self.with_endpoints(Endpoints::with_base_url(base_url))
    }

    pub fn with_debug_save_responses(mut self, enabled: bool) -> Self {
        self.debug_save_responses = enabled;
        self
    }
}
