//! Token relays for the authenticated wfmu.org forms.
//!
//! Each write on wfmu.org has to present a short-lived token harvested from
//! the response just before it. The relays here are explicit state machines:
//! every [`step`](LoginRelay::step) performs exactly one HTTP exchange and
//! either moves to the next state or stops with an error. A missing token is
//! a transition to failure taken *before* the dependent request is built, so
//! a blank token is never submitted.
//!
//! All relays run against a `&mut SessionState` that the caller keeps
//! locked for the whole relay.

use crate::config::Endpoints;
use crate::error::RelayStage;
use crate::forms::{extract_input_values_from_str, KFID_FIELD};
use crate::session::SessionState;
use crate::transport::Transport;
use crate::types::FavoriteState;
use crate::Result;

/// Field carrying the per-page comment token on playlist pages.
const POST_TOKEN_FIELD: &str = "e";
const DRAFT_COMMENT_FIELD: &str = "c";
const DRAFT_POST_FIELD: &str = "pe";

/// Everything a relay step needs besides its own state.
pub struct RelayContext<'a> {
    pub transport: &'a Transport,
    pub endpoints: &'a Endpoints,
    pub state: &'a mut SessionState,
}

// ================================================================================================
// LOGIN
// ================================================================================================

/// Login relay: `LoggedOut -> TokenPending -> LoggedIn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRelay {
    /// Nothing fetched yet
    LoggedOut,
    /// The login page has been read and its `__kfid` harvested
    TokenPending { kfid: String },
    /// Credentials submitted; the server's verdict is not observable
    LoggedIn,
}

impl LoginRelay {
    pub fn is_complete(&self) -> bool {
        matches!(self, LoginRelay::LoggedIn)
    }

    /// Perform the exchange for the current state and return the next one.
    pub async fn step(
        self,
        ctx: &mut RelayContext<'_>,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let query = [("a", "login"), ("r", ctx.endpoints.login_redirect.as_str())];

        match self {
            LoginRelay::LoggedOut => {
                log::debug!("Login: fetching login page");
                let body = ctx
                    .transport
                    .get(ctx.state, &ctx.endpoints.auth, &query, None)
                    .await?;

                let kfid = extract_input_values_from_str(&[KFID_FIELD], &body)
                    .require(RelayStage::LoginPage, KFID_FIELD)?;
                Ok(LoginRelay::TokenPending { kfid })
            }
            LoginRelay::TokenPending { kfid } => {
                log::debug!("Login: submitting credentials for {username}");
                let form = [
                    (KFID_FIELD, kfid.as_str()),
                    ("a", "login_submit"),
                    ("r", ctx.endpoints.login_redirect.as_str()),
                    ("sk", ""),
                    ("u", username),
                    ("p", password),
                    ("login", "Sign in"),
                ];
                let body = ctx
                    .transport
                    .post_form(ctx.state, &ctx.endpoints.auth, &query, &form, &ctx.endpoints.auth)
                    .await?;

                ctx.state.set_key(kfid);
                if ctx.state.observe_key_in(&body) {
                    log::debug!("Login: submit response carried a newer key");
                }
                ctx.state.set_identity(username);
                Ok(LoginRelay::LoggedIn)
            }
            LoginRelay::LoggedIn => Ok(LoginRelay::LoggedIn),
        }
    }
}

/// Drive a [`LoginRelay`] from `LoggedOut` to `LoggedIn`.
///
/// Completion means the relay ran, not that the credentials were accepted:
/// wfmu.org answers a bad password with the same page as a good one.
pub async fn login(ctx: &mut RelayContext<'_>, username: &str, password: &str) -> Result<()> {
    let mut relay = LoginRelay::LoggedOut;
    while !relay.is_complete() {
        relay = relay.step(ctx, username, password).await?;
    }
    log::debug!("Login relay completed for {username}");
    Ok(())
}

// ================================================================================================
// COMMENT POST
// ================================================================================================

/// Tokens harvested from the first comment submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftTokens {
    pub kfid: String,
    pub c: String,
    pub pe: String,
}

/// Comment relay:
/// `FetchPostToken -> SubmitDraft -> Confirm -> Posted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentRelay {
    /// Read the playlist page to harvest the `e` post token
    FetchPostToken { playlist_url: String },
    /// Submit the comment once, harvesting the confirmation tokens
    SubmitDraft { playlist_url: String, post_token: String },
    /// Submit the confirmation form
    Confirm { playlist_url: String, tokens: DraftTokens },
    /// Done; upstream sends no structured confirmation
    Posted,
}

impl CommentRelay {
    pub fn new(playlist_url: String) -> Self {
        CommentRelay::FetchPostToken { playlist_url }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, CommentRelay::Posted)
    }

    pub async fn step(self, ctx: &mut RelayContext<'_>, text: &str) -> Result<Self> {
        match self {
            CommentRelay::FetchPostToken { playlist_url } => {
                log::debug!("Comment: fetching post token from playlist page");
                let body = ctx.transport.get(ctx.state, &playlist_url, &[], None).await?;

                ctx.state.observe_key_in(&body);
                let post_token = extract_input_values_from_str(&[POST_TOKEN_FIELD], &body)
                    .require(RelayStage::PlaylistPage, POST_TOKEN_FIELD)?;
                Ok(CommentRelay::SubmitDraft {
                    playlist_url,
                    post_token,
                })
            }
            CommentRelay::SubmitDraft {
                playlist_url,
                post_token,
            } => {
                let identity = ctx.state.require_identity()?.to_string();
                log::debug!("Comment: submitting draft as {identity}");
                let form = [
                    ("a", identity.as_str()),
                    ("c", text),
                    ("d", "Post+!"),
                    ("e", post_token.as_str()),
                    ("f", ""),
                    ("g", ""),
                ];
                let body = ctx
                    .transport
                    .post_form(ctx.state, &ctx.endpoints.comment_post, &[], &form, &playlist_url)
                    .await?;

                let bag = extract_input_values_from_str(
                    &[DRAFT_COMMENT_FIELD, DRAFT_POST_FIELD, KFID_FIELD],
                    &body,
                );
                let tokens = DraftTokens {
                    c: bag.require(RelayStage::CommentDraft, DRAFT_COMMENT_FIELD)?,
                    pe: bag.require(RelayStage::CommentDraft, DRAFT_POST_FIELD)?,
                    kfid: bag.require(RelayStage::CommentDraft, KFID_FIELD)?,
                };
                ctx.state.set_key(tokens.kfid.clone());
                Ok(CommentRelay::Confirm {
                    playlist_url,
                    tokens,
                })
            }
            CommentRelay::Confirm {
                playlist_url,
                tokens,
            } => {
                let identity = ctx.state.require_identity()?.to_string();
                log::debug!("Comment: confirming post");
                let form = [
                    (KFID_FIELD, tokens.kfid.as_str()),
                    ("c", tokens.c.as_str()),
                    ("pa", identity.as_str()),
                    ("pb", ""),
                    ("pc", text),
                    ("pe", tokens.pe.as_str()),
                    ("pf", ""),
                    ("pg", ""),
                    ("b", "POST THAT NOW!"),
                ];
                ctx.transport
                    .post_form(
                        ctx.state,
                        &ctx.endpoints.comment_post,
                        &[("p", "1")],
                        &form,
                        &playlist_url,
                    )
                    .await?;
                Ok(CommentRelay::Posted)
            }
            CommentRelay::Posted => Ok(CommentRelay::Posted),
        }
    }
}

/// Post `text` as a comment on the playlist at `playlist_url`.
///
/// Fails with [`WfmuError::NotLoggedIn`](crate::WfmuError::NotLoggedIn)
/// before any request if no identity is set.
pub async fn post_comment(ctx: &mut RelayContext<'_>, playlist_url: &str, text: &str) -> Result<()> {
    ctx.state.require_identity()?;

    let mut relay = CommentRelay::new(playlist_url.to_string());
    while !relay.is_complete() {
        relay = relay.step(ctx, text).await?;
    }
    log::debug!("Comment relay completed");
    Ok(())
}

// ================================================================================================
// FAVORITE TOGGLE
// ================================================================================================

/// Add or remove `song_id` from the user's favorites.
///
/// A single request, but it needs the current session key; without one it
/// fails locally and nothing is sent.
pub async fn toggle_favorite(
    ctx: &mut RelayContext<'_>,
    song_id: &str,
    playlist_id: &str,
    state: FavoriteState,
) -> Result<()> {
    let key = ctx.state.require_key()?.to_string();
    ctx.state.require_identity()?;

    let playlist_url = ctx.endpoints.playlist_url(playlist_id);
    log::debug!("Favorite: {state:?} song {song_id} on playlist {playlist_id}");
    let form = [
        ("type", "song"),
        ("id", song_id),
        ("state", state.as_form_value()),
        ("key", key.as_str()),
        ("myurl", playlist_url.as_str()),
        ("page_type", "playlist"),
        ("page_id", playlist_id),
    ];
    ctx.transport
        .post_form(
            ctx.state,
            &ctx.endpoints.favorite_toggle,
            &[],
            &form,
            &playlist_url,
        )
        .await?;
    Ok(())
}
