//! # wfmu-client
//!
//! A Rust client for the WFMU listener features of wfmu.org: the now-playing
//! feed, show playlists, listener comments and per-song favorites.
//!
//! wfmu.org has no API for most of this, so playlists and favorites are
//! scraped from HTML and every write goes through the site's own forms,
//! relaying the hidden tokens each page hands out to the next request.
//!
//! ```rust,no_run
//! use wfmu_client::{Result, WfmuClientImpl};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = WfmuClientImpl::new(Box::new(http_client::native::NativeClient::new()));
//!
//!     let now = client.poll_status().await?;
//!     for song in client.get_playlist(&now.show.playlist_id).await? {
//!         println!("{song}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod forms;
pub mod headers;
pub mod parsing;
pub mod relay;
pub mod session;
pub mod r#trait;
pub mod transport;
pub mod types;

pub use client::WfmuClientImpl;
pub use config::{ClientConfig, Endpoints};
pub use error::{
    CommentParseError, FavoritesParseError, PlaylistParseError, RelayStage, WfmuError,
};
pub use forms::{extract_input_values, TokenBag};
pub use parsing::WfmuParser;
pub use r#trait::WfmuClient;
#[cfg(feature = "mock")]
pub use r#trait::MockWfmuClient;
pub use session::{SessionState, WfmuSession};
pub use types::{Comment, CommentParent, FavoriteState, NowPlaying, Show, Song, Year};

// Re-export scraper types for testing
pub use scraper::Html;

pub type Result<T> = std::result::Result<T, WfmuError>;
