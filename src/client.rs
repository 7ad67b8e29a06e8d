use crate::config::ClientConfig;
use crate::parsing::WfmuParser;
use crate::relay::{self, RelayContext};
use crate::session::{SessionState, WfmuSession};
use crate::transport::Transport;
use crate::types::{Comment, FavoriteState, NowPlaying, Show, Song};
use crate::{Result, WfmuError};
use http_client::HttpClient;
use scraper::Html;
use std::sync::{Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;

/// Main client for interacting with wfmu.org.
///
/// This client handles the now-playing feed, playlist, favorites and comment
/// scraping, and the token relays behind login, commenting and favoriting.
///
/// All authentication state lives in one [`SessionState`] behind an async
/// mutex. Every relay holds that lock from its first request to its last,
/// so two concurrent mutations on one client never interleave their tokens.
///
/// # Examples
///
/// ```rust,no_run
/// use wfmu_client::{Result, WfmuClientImpl};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let http_client = http_client::native::NativeClient::new();
///     let client = WfmuClientImpl::new(Box::new(http_client));
///
///     let now = client.poll_status().await?;
///     println!("{} is playing {}", now.show, now.song);
///
///     client.login("username", "password").await?;
///     client.post_comment("Great set!", None).await?;
///     client.favorite(None, None).await?;
///
///     Ok(())
/// }
/// ```
pub struct WfmuClientImpl {
    transport: Transport,
    config: ClientConfig,
    parser: WfmuParser,
    session: Mutex<SessionState>,
    last_status: StdMutex<Option<NowPlaying>>,
}

impl WfmuClientImpl {
    /// Create a new [`WfmuClientImpl`] against the production wfmu.org endpoints.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use wfmu_client::WfmuClientImpl;
    ///
    /// let http_client = http_client::native::NativeClient::new();
    /// let client = WfmuClientImpl::new(Box::new(http_client));
    /// ```
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self::with_config(client, ClientConfig::default())
    }

    /// Create a new [`WfmuClientImpl`] with custom endpoints or debug settings.
    pub fn with_config(client: Box<dyn HttpClient>, config: ClientConfig) -> Self {
        Self::with_config_and_session(client, config, SessionState::new())
    }

    /// Create a client that continues a previously extracted session.
    pub fn from_session(client: Box<dyn HttpClient>, session: WfmuSession) -> Self {
        Self::with_config_and_session(
            client,
            ClientConfig::default(),
            SessionState::from_snapshot(session),
        )
    }

    pub fn with_config_and_session(
        client: Box<dyn HttpClient>,
        config: ClientConfig,
        state: SessionState,
    ) -> Self {
        Self {
            transport: Transport::new(client, config.debug_save_responses),
            parser: WfmuParser::with_playlist_url_base(&config.endpoints.playlist_base),
            config,
            session: Mutex::new(state),
            last_status: StdMutex::new(None),
        }
    }

    /// Create a client and run the login relay in one go.
    pub async fn login_with_credentials(
        client: Box<dyn HttpClient>,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let client = Self::new(client);
        client.login(username, password).await?;
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // === AUTHENTICATION ===

    /// Log in with username and password.
    ///
    /// This method:
    /// 1. Fetches the login page and harvests its `__kfid` token
    /// 2. Submits the login form with that token and the credentials
    /// 3. Records the token as the session key and `username` as the identity
    ///
    /// wfmu.org gives no success signal, so `Ok(())` only means the relay
    /// completed. A wrong password shows up later, when a mutation silently
    /// does nothing.
    ///
    /// # Errors
    ///
    /// [`WfmuError::MissingToken`] if the login page has no `__kfid`; the
    /// credentials are not sent in that case.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let mut state = self.session.lock().await;
        let mut ctx = RelayContext {
            transport: &self.transport,
            endpoints: &self.config.endpoints,
            state: &mut state,
        };
        relay::login(&mut ctx, username, password).await
    }

    /// The identity recorded by the last login, if any.
    pub async fn username(&self) -> Option<String> {
        self.session.lock().await.identity().map(str::to_string)
    }

    /// Whether a login relay has completed (or a valid session was restored).
    pub async fn is_logged_in(&self) -> bool {
        self.session.lock().await.is_logged_in()
    }

    /// Extract the current session state for persistence.
    pub async fn get_session(&self) -> WfmuSession {
        self.session.lock().await.snapshot()
    }

    /// Replace the session state with a previously extracted one.
    pub async fn restore_session(&self, session: WfmuSession) {
        *self.session.lock().await = SessionState::from_snapshot(session);
    }

    // === NOW PLAYING ===

    /// Fetch and decode the now-playing feed.
    ///
    /// The result also becomes the default show and song for
    /// [`post_comment`](Self::post_comment) and [`favorite`](Self::favorite).
    pub async fn poll_status(&self) -> Result<NowPlaying> {
        // The feed is public and cookie-free
        let mut anonymous = SessionState::new();
        let body = self
            .transport
            .get(&mut anonymous, &self.config.endpoints.status_feed, &[], None)
            .await?;

        let status = self.parser.parse_status(&body)?;
        *self
            .last_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(status.clone());
        Ok(status)
    }

    /// The result of the most recent [`poll_status`](Self::poll_status),
    /// without polling.
    pub fn last_status(&self) -> Option<NowPlaying> {
        self.last_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn show(&self) -> Result<Show> {
        Ok(self.poll_status().await?.show)
    }

    pub async fn song(&self) -> Result<Song> {
        Ok(self.poll_status().await?.song)
    }

    pub async fn artist(&self) -> Result<String> {
        Ok(self.song().await?.artist)
    }

    pub async fn title(&self) -> Result<String> {
        Ok(self.song().await?.title)
    }

    pub async fn album(&self) -> Result<Option<String>> {
        Ok(self.song().await?.album)
    }

    pub async fn show_name(&self) -> Result<String> {
        Ok(self.show().await?.name)
    }

    pub async fn playlist_id(&self) -> Result<String> {
        Ok(self.show().await?.playlist_id)
    }

    pub async fn playlist_link(&self) -> Result<String> {
        Ok(self.show().await?.playlist_link)
    }

    pub async fn is_live(&self) -> Result<bool> {
        Ok(self.show().await?.live)
    }

    pub async fn is_setbreak(&self) -> Result<bool> {
        Ok(self.show().await?.setbreak)
    }

    // === SCRAPED PAGES ===

    /// Fetch and parse the playlist page for `playlist_id`.
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<Vec<Song>> {
        let url = self.config.endpoints.playlist_url(playlist_id);
        let body = self.fetch_page(&url).await?;
        self.parse_playlist_body(&body)
    }

    /// Poll the status feed, then fetch the playlist of the show on air.
    pub async fn get_current_playlist(&self) -> Result<Vec<Song>> {
        let status = self.poll_status().await?;
        self.get_playlist(&status.show.playlist_id).await
    }

    /// Fetch and parse the logged-in user's favorites page.
    pub async fn get_favorites(&self) -> Result<Vec<Song>> {
        let body = self
            .fetch_page(&self.config.endpoints.favorites_page)
            .await?;
        self.parse_favorites_body(&body)
    }

    /// Fetch and parse the comments feed of the current playlist.
    pub async fn get_comments(&self) -> Result<Vec<Comment>> {
        let body = {
            let mut state = self.session.lock().await;
            self.transport
                .get(&mut state, &self.config.endpoints.comments_feed, &[], None)
                .await?
        };
        Ok(self.parser.parse_comments(&body)?)
    }

    /// GET an HTML page with the session cookies and pick up any fresh key.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let mut state = self.session.lock().await;
        let body = self.transport.get(&mut state, url, &[], None).await?;
        state.observe_key_in(&body);
        Ok(body)
    }

    fn parse_playlist_body(&self, body: &str) -> Result<Vec<Song>> {
        let document = Html::parse_document(body);
        Ok(self.parser.parse_playlist(&document)?)
    }

    fn parse_favorites_body(&self, body: &str) -> Result<Vec<Song>> {
        let document = Html::parse_document(body);
        Ok(self.parser.parse_favorites(&document)?)
    }

    // === MUTATIONS ===

    /// Post a comment on a playlist.
    ///
    /// `playlist_id` defaults to the show from the last
    /// [`poll_status`](Self::poll_status). Success only means no transport
    /// error occurred; wfmu.org returns no confirmation.
    ///
    /// # Errors
    ///
    /// - [`WfmuError::NotLoggedIn`] without a prior login, before any request
    /// - [`WfmuError::NoStatus`] with no `playlist_id` and no prior poll
    /// - [`WfmuError::MissingToken`] when a relay step finds no token
    pub async fn post_comment(&self, text: &str, playlist_id: Option<&str>) -> Result<()> {
        let mut state = self.session.lock().await;
        state.require_identity()?;

        let playlist_id = self.resolve_playlist_id(playlist_id)?;
        let playlist_url = self.config.endpoints.playlist_url(&playlist_id);

        let mut ctx = RelayContext {
            transport: &self.transport,
            endpoints: &self.config.endpoints,
            state: &mut state,
        };
        relay::post_comment(&mut ctx, &playlist_url, text).await
    }

    /// Add a song to the user's favorites.
    ///
    /// Ids default to the song and show from the last
    /// [`poll_status`](Self::poll_status). If that status has no song id
    /// (a set break), this fails with [`WfmuError::NoCurrentSong`] before
    /// any request.
    pub async fn favorite(&self, song_id: Option<&str>, playlist_id: Option<&str>) -> Result<()> {
        self.toggle_favorite(song_id, playlist_id, FavoriteState::Add)
            .await
    }

    /// Remove a song from the user's favorites.
    pub async fn unfavorite(
        &self,
        song_id: Option<&str>,
        playlist_id: Option<&str>,
    ) -> Result<()> {
        self.toggle_favorite(song_id, playlist_id, FavoriteState::Remove)
            .await
    }

    async fn toggle_favorite(
        &self,
        song_id: Option<&str>,
        playlist_id: Option<&str>,
        favorite_state: FavoriteState,
    ) -> Result<()> {
        let mut state = self.session.lock().await;
        state.require_key()?;

        let song_id = match song_id {
            Some(id) => id.to_string(),
            None => {
                let song_id = self.last_status().ok_or(WfmuError::NoStatus)?.song.song_id;
                if song_id.trim().is_empty() {
                    return Err(WfmuError::NoCurrentSong);
                }
                song_id
            }
        };
        let playlist_id = self.resolve_playlist_id(playlist_id)?;

        let mut ctx = RelayContext {
            transport: &self.transport,
            endpoints: &self.config.endpoints,
            state: &mut state,
        };
        relay::toggle_favorite(&mut ctx, &song_id, &playlist_id, favorite_state).await
    }

    fn resolve_playlist_id(&self, playlist_id: Option<&str>) -> Result<String> {
        match playlist_id {
            Some(id) => Ok(id.to_string()),
            None => self
                .last_status()
                .map(|status| status.show.playlist_id)
                .ok_or(WfmuError::NoStatus),
        }
    }
}
