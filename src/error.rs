use thiserror::Error;

/// The document (or relay step) a token was harvested from.
///
/// Used by [`WfmuError::MissingToken`] to say which step of which relay
/// could not continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStage {
    /// The login page fetched before submitting credentials.
    LoginPage,
    /// The show's playlist page fetched before posting a comment.
    PlaylistPage,
    /// The response to the first comment submission.
    CommentDraft,
}

impl std::fmt::Display for RelayStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RelayStage::LoginPage => "login page",
            RelayStage::PlaylistPage => "playlist page",
            RelayStage::CommentDraft => "comment draft response",
        };
        f.write_str(name)
    }
}

/// The playlist page no longer has the shape the parser expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse playlist page: {0}")]
pub struct PlaylistParseError(pub String);

/// The comments feed no longer has the shape the parser expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse comments feed: {0}")]
pub struct CommentParseError(pub String);

/// The favorites page no longer has the shape the parser expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse favorites page: {0}")]
pub struct FavoritesParseError(pub String);

/// Error types for WFMU operations.
///
/// Every scraped document kind has its own parse error so callers can tell
/// "the site changed shape" apart from transport failures and from an
/// honestly empty result.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use wfmu_client::{WfmuClientImpl, WfmuError};
///
/// # tokio_test::block_on(async {
/// let client = WfmuClientImpl::new(Box::new(http_client::native::NativeClient::new()));
///
/// match client.get_playlist("12345").await {
///     Ok(songs) => println!("{} songs", songs.len()),
///     Err(WfmuError::Playlist(e)) => eprintln!("Playlist markup changed: {}", e),
///     Err(WfmuError::Http(msg)) => eprintln!("Network error: {}", msg),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # });
/// ```
#[derive(Error, Debug)]
pub enum WfmuError {
    /// HTTP/network related errors.
    ///
    /// Connection failures, DNS and TLS errors, unreadable bodies. Never
    /// retried by this crate.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A required anti-forgery field was absent from a harvested document.
    ///
    /// The relay stops before issuing the request that would have needed
    /// the token.
    #[error("Form field '{field}' not found in {stage}")]
    MissingToken {
        /// Which relay step the document came from
        stage: RelayStage,
        /// The missing `<input>` name
        field: String,
    },

    #[error(transparent)]
    Playlist(#[from] PlaylistParseError),

    #[error(transparent)]
    Comments(#[from] CommentParseError),

    #[error(transparent)]
    Favorites(#[from] FavoritesParseError),

    /// The now-playing feed did not match its documented JSON schema.
    #[error("Failed to decode status feed: {0}")]
    Decode(String),

    /// A mutation was attempted without a completed login.
    ///
    /// Checked locally; no request is sent.
    #[error("Not logged in: {0}")]
    NotLoggedIn(String),

    /// A mutation needed the current show or song but the status feed has
    /// never been polled and no explicit id was given.
    #[error("No now-playing status available; poll the status feed first or pass explicit ids")]
    NoStatus,

    /// The last polled status has no song id (e.g. a set break) and no
    /// explicit song id was given.
    #[error("The now-playing status carries no song id; pass an explicit song id")]
    NoCurrentSong,

    /// File system I/O errors (debug response dumps).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for WfmuError {
    fn from(err: serde_json::Error) -> Self {
        WfmuError::Decode(err.to_string())
    }
}
