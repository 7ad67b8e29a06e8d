use crate::session::WfmuSession;
use crate::{Comment, NowPlaying, Result, Song};
use async_trait::async_trait;

/// Trait for wfmu.org client operations that can be mocked for testing.
///
/// Host applications (a desktop widget, a chat bot) should depend on this
/// trait rather than on [`WfmuClientImpl`](crate::WfmuClientImpl) directly.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockWfmuClient`
/// that implements this trait using the `mockall` library.
///
/// Optional ids are owned so the generated mock can match on them.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait WfmuClient {
    /// Run the login relay.
    async fn login(&self, username: &str, password: &str) -> Result<()>;

    /// The identity recorded by the last login, if any.
    async fn username(&self) -> Option<String>;

    async fn is_logged_in(&self) -> bool;

    /// Fetch and decode the now-playing feed.
    async fn poll_status(&self) -> Result<NowPlaying>;

    async fn artist(&self) -> Result<String> {
        Ok(self.poll_status().await?.song.artist)
    }

    async fn title(&self) -> Result<String> {
        Ok(self.poll_status().await?.song.title)
    }

    async fn album(&self) -> Result<Option<String>> {
        Ok(self.poll_status().await?.song.album)
    }

    async fn show_name(&self) -> Result<String> {
        Ok(self.poll_status().await?.show.name)
    }

    async fn playlist_id(&self) -> Result<String> {
        Ok(self.poll_status().await?.show.playlist_id)
    }

    async fn is_live(&self) -> Result<bool> {
        Ok(self.poll_status().await?.show.live)
    }

    async fn is_setbreak(&self) -> Result<bool> {
        Ok(self.poll_status().await?.show.setbreak)
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<Vec<Song>>;

    async fn get_favorites(&self) -> Result<Vec<Song>>;

    async fn get_comments(&self) -> Result<Vec<Comment>>;

    /// Run the comment relay; `playlist_id` defaults to the last polled show.
    async fn post_comment(&self, text: &str, playlist_id: Option<String>) -> Result<()>;

    /// Add a song to favorites; ids default to the last polled song and show.
    async fn favorite(&self, song_id: Option<String>, playlist_id: Option<String>)
        -> Result<()>;

    async fn unfavorite(
        &self,
        song_id: Option<String>,
        playlist_id: Option<String>,
    ) -> Result<()>;

    /// Extract the current session state for persistence.
    async fn get_session(&self) -> WfmuSession;

    /// Replace the session state with a previously extracted one.
    async fn restore_session(&self, session: WfmuSession);
}

#[async_trait(?Send)]
impl WfmuClient for crate::WfmuClientImpl {
    async fn login(&self, username: &str, password: &str) -> Result<()> {
        crate::WfmuClientImpl::login(self, username, password).await
    }

    async fn username(&self) -> Option<String> {
        crate::WfmuClientImpl::username(self).await
    }

    async fn is_logged_in(&self) -> bool {
        crate::WfmuClientImpl::is_logged_in(self).await
    }

    async fn poll_status(&self) -> Result<NowPlaying> {
        crate::WfmuClientImpl::poll_status(self).await
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<Vec<Song>> {
        crate::WfmuClientImpl::get_playlist(self, playlist_id).await
    }

    async fn get_favorites(&self) -> Result<Vec<Song>> {
        crate::WfmuClientImpl::get_favorites(self).await
    }

    async fn get_comments(&self) -> Result<Vec<Comment>> {
        crate::WfmuClientImpl::get_comments(self).await
    }

    async fn post_comment(&self, text: &str, playlist_id: Option<String>) -> Result<()> {
        crate::WfmuClientImpl::post_comment(self, text, playlist_id.as_deref()).await
    }

    async fn favorite(&self, song_id: Option<String>, playlist_id: Option<String>) -> Result<()> {
        crate::WfmuClientImpl::favorite(self, song_id.as_deref(), playlist_id.as_deref()).await
    }

    async fn unfavorite(
        &self,
        song_id: Option<String>,
        playlist_id: Option<String>,
    ) -> Result<()> {
        crate::WfmuClientImpl::unfavorite(self, song_id.as_deref(), playlist_id.as_deref()).await
    }

    async fn get_session(&self) -> WfmuSession {
        crate::WfmuClientImpl::get_session(self).await
    }

    async fn restore_session(&self, session: WfmuSession) {
        crate::WfmuClientImpl::restore_session(self, session).await
    }
}
