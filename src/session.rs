use crate::error::WfmuError;
use crate::forms::{extract_input_values, KFID_FIELD};
use crate::Result;
use scraper::Html;
use serde::{Deserialize, Serialize};

/// Mutable authentication state owned by one client.
///
/// Holds the cookie jar, the most recently observed anti-forgery key and the
/// logged-in identity. The key is only ever overwritten, never merged: each
/// response that carries a fresh `__kfid` replaces whatever was there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    cookies: Vec<String>,
    key: Option<String>,
    identity: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some() && self.key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub(crate) fn set_key(&mut self, key: String) {
        log::trace!("Session key updated: {key}");
        self.key = Some(key);
    }

    pub(crate) fn set_identity(&mut self, identity: &str) {
        self.identity = Some(identity.to_string());
    }

    /// The current key, or [`WfmuError::NotLoggedIn`] if none has been
    /// observed yet.
    pub fn require_key(&self) -> Result<&str> {
        match self.key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(WfmuError::NotLoggedIn(
                "no session key; log in first".to_string(),
            )),
        }
    }

    pub fn require_identity(&self) -> Result<&str> {
        self.identity
            .as_deref()
            .ok_or_else(|| WfmuError::NotLoggedIn("no identity; log in first".to_string()))
    }

    /// Overwrite the key with any non-blank `__kfid` found in `document`.
    ///
    /// Returns whether the document carried one. A blank `__kfid` leaves the
    /// current key alone.
    pub fn observe_key(&mut self, document: &Html) -> bool {
        match extract_input_values(&[KFID_FIELD], document).get(KFID_FIELD) {
            Some(kfid) if !kfid.trim().is_empty() => {
                self.set_key(kfid.to_string());
                true
            }
            _ => false,
        }
    }

    /// Same as [`observe_key`](Self::observe_key) for raw HTML text.
    pub fn observe_key_in(&mut self, html: &str) -> bool {
        let document = Html::parse_document(html);
        self.observe_key(&document)
    }

    /// Fold `Set-Cookie` header values into the jar, replacing cookies of the
    /// same name.
    pub fn store_cookies<'a>(&mut self, set_cookie_values: impl IntoIterator<Item = &'a str>) {
        let mut new_cookies = 0;
        for cookie_str in set_cookie_values {
            // Only the name=value part matters; attributes follow the first ';'
            if let Some(cookie_value) = cookie_str.split(';').next() {
                let cookie_value = cookie_value.trim();
                let Some((cookie_name, _)) = cookie_value.split_once('=') else {
                    continue;
                };

                self.cookies
                    .retain(|existing| !existing.starts_with(&format!("{cookie_name}=")));
                self.cookies.push(cookie_value.to_string());
                new_cookies += 1;
            }
        }
        if new_cookies > 0 {
            log::trace!(
                "Stored {} new cookies, total: {}",
                new_cookies,
                self.cookies.len()
            );
        }
    }

    /// Value for a `Cookie` request header, if the jar is not empty.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            None
        } else {
            Some(self.cookies.join("; "))
        }
    }

    pub fn snapshot(&self) -> WfmuSession {
        WfmuSession {
            username: self.identity.clone().unwrap_or_default(),
            cookies: self.cookies.clone(),
            key: self.key.clone(),
        }
    }

    pub fn from_snapshot(session: WfmuSession) -> Self {
        Self {
            cookies: session.cookies,
            key: session.key,
            identity: if session.username.is_empty() {
                None
            } else {
                Some(session.username)
            },
        }
    }
}

/// Serializable copy of a [`SessionState`].
///
/// Lets a host application hand an authenticated session to a new client
/// without logging in again. Where it gets stored is up to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WfmuSession {
    /// The authenticated username
    pub username: String,
    /// Session cookies, as `name=value` pairs
    pub cookies: Vec<String>,
    /// Last observed `__kfid` key
    pub key: Option<String>,
}

impl WfmuSession {
    pub fn new(username: String, cookies: Vec<String>, key: Option<String>) -> Self {
        Self {
            username,
            cookies,
            key,
        }
    }

    /// Check if this session appears to be usable for mutations.
    ///
    /// This doesn't guarantee the session is still active on the server:
    /// wfmu.org gives no way to tell.
    pub fn is_valid(&self) -> bool {
        !self.username.is_empty() && self.key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Serialize session to JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize session from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_is_logged_out() {
        let state = SessionState::new();
        assert!(!state.is_logged_in());
        assert!(matches!(state.require_key(), Err(WfmuError::NotLoggedIn(_))));
        assert!(matches!(
            state.require_identity(),
            Err(WfmuError::NotLoggedIn(_))
        ));
    }

    #[test]
    fn test_observe_key_overwrites() {
        let mut state = SessionState::new();
        state.set_key("old".to_string());

        let page = Html::parse_document(r#"<input name="__kfid" value="new">"#);
        assert!(state.observe_key(&page));
        assert_eq!(state.key(), Some("new"));

        let no_token = Html::parse_document("<p>nothing here</p>");
        assert!(!state.observe_key(&no_token));
        assert_eq!(state.key(), Some("new"));
    }

    #[test]
    fn test_blank_kfid_keeps_current_key() {
        let mut state = SessionState::new();
        state.set_key("good".to_string());

        assert!(!state.observe_key_in(r#"<input type="hidden" name="__kfid">"#));
        assert!(!state.observe_key_in(r#"<input name="__kfid" value="">"#));
        assert_eq!(state.key(), Some("good"));
    }

    #[test]
    fn test_empty_key_does_not_count_as_logged_in() {
        let mut state = SessionState::new();
        state.set_identity("listener");
        state.set_key(String::new());
        assert!(!state.is_logged_in());
        assert!(state.require_key().is_err());
    }

    #[test]
    fn test_cookie_jar_replaces_by_name() {
        let mut state = SessionState::new();
        state.store_cookies(["PHPSESSID=abc; path=/", "theme=dark"]);
        state.store_cookies(["PHPSESSID=def; path=/; HttpOnly"]);

        assert_eq!(state.cookies(), &["theme=dark", "PHPSESSID=def"]);
        assert_eq!(
            state.cookie_header().as_deref(),
            Some("theme=dark; PHPSESSID=def")
        );
    }

    #[test]
    fn test_session_snapshot_round_trip() {
        let mut state = SessionState::new();
        state.set_identity("listener");
        state.set_key("XYZ".to_string());
        state.store_cookies(["PHPSESSID=abc"]);

        let session = state.snapshot();
        assert!(session.is_valid());

        let json = session.to_json().unwrap();
        let restored = SessionState::from_snapshot(WfmuSession::from_json(&json).unwrap());
        assert_eq!(restored, state);
    }

    #[test]
    fn test_invalid_session() {
        let session = WfmuSession::new(String::new(), vec![], None);
        assert!(!session.is_valid());
    }
}
