#![allow(dead_code)]
use http_client::{Error, HttpClient, Request, Response};
use http_types::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use wfmu_client::{ClientConfig, WfmuClientImpl};

pub const BASE_URL: &str = "http://wfmu.test";

/// A canned upstream answer.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub set_cookies: Vec<String>,
}

impl CannedResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            set_cookies: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.set_cookies.push(cookie.to_string());
        self
    }
}

/// What the client actually sent.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub cookie: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Decode an `application/x-www-form-urlencoded` body into ordered pairs.
    pub fn form(&self) -> Vec<(String, String)> {
        if self.body.is_empty() {
            return Vec::new();
        }
        self.body
            .split('&')
            .map(|pair| {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                (
                    urlencoding::decode(name).unwrap().into_owned(),
                    urlencoding::decode(value).unwrap().into_owned(),
                )
            })
            .collect()
    }

    pub fn form_map(&self) -> HashMap<String, String> {
        self.form().into_iter().collect()
    }

    pub fn form_names(&self) -> Vec<String> {
        self.form().into_iter().map(|(name, _)| name).collect()
    }
}

/// An [`HttpClient`] that replays a fixed script of responses in order and
/// records every request it receives.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    script: Arc<Mutex<VecDeque<CannedResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<CannedResponse>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, mut req: Request) -> Result<Response, Error> {
        let body = req.body_string().await?;
        let recorded = RecordedRequest {
            method: req.method().to_string(),
            url: req.url().to_string(),
            cookie: req.header("Cookie").map(|value| value.as_str().to_string()),
            body,
        };

        let canned = {
            self.requests.lock().unwrap().push(recorded.clone());
            self.script.lock().unwrap().pop_front()
        };
        let canned = canned.unwrap_or_else(|| {
            panic!(
                "unexpected request with empty script: {} {}",
                recorded.method, recorded.url
            )
        });

        let status = StatusCode::try_from(canned.status).expect("valid status code");
        let mut response = Response::new(status);
        for cookie in &canned.set_cookies {
            response.append_header("set-cookie", cookie.as_str());
        }
        response.set_body(canned.body);
        Ok(response)
    }
}

/// A client pointed at [`BASE_URL`] whose requests go to `script`.
pub fn scripted_client(script: Vec<CannedResponse>) -> (WfmuClientImpl, ScriptedClient) {
    let http = ScriptedClient::new(script);
    let config = ClientConfig::new()
        .with_base_url(BASE_URL)
        .with_debug_save_responses(false);
    let client = WfmuClientImpl::with_config(Box::new(http.clone()), config);
    (client, http)
}

pub fn login_page(kfid: &str) -> String {
    format!(
        r#"<html><body><form action="/auth.php" method="post">
            <input type="hidden" name="__kfid" value="{kfid}">
            <input type="hidden" name="a" value="login_submit">
            <input type="text" name="u">
            <input type="password" name="p">
        </form></body></html>"#
    )
}

pub fn plain_page() -> String {
    "<html><body><p>Welcome back</p></body></html>".to_string()
}

pub fn status_json(playlist_id: &str, song_id: &str) -> String {
    serde_json::json!({
        "show": "Wake and Bake with Clay Pigeon",
        "showId": "WA",
        "start": "6:00am",
        "end": "9:00am",
        "playlist": { "@attributes": { "id": playlist_id } },
        "liveIndicator": { "@attributes": { "flag": "1" } },
        "setBreak": { "@attributes": { "flag": "0" } },
        "title": "Sister Ray",
        "artist": "The Velvet Underground",
        "album": "White Light/White Heat",
        "year": 1968,
        "label": "Verve",
        "song": { "@attributes": { "id": song_id } }
    })
    .to_string()
}

pub fn playlist_page(post_token: Option<&str>, songs: &[(&str, &str, &str)]) -> String {
    let rows: String = songs
        .iter()
        .map(|(id, artist, title)| {
            format!(
                r#"<tr>
                    <td class="song col_artist">{artist}</td>
                    <td class="song col_song_title">{title}</td>
                    <td class="song col_album_title"></td>
                    <td class="song col_year">1971</td>
                    <td><span class="KDBFavIcon" id="KDBsong-{id}"></span></td>
                </tr>"#
            )
        })
        .collect();
    let form = post_token
        .map(|token| {
            format!(
                r#"<form action="/playlistcommentpost.php" method="post">
                    <input type="hidden" name="e" value="{token}">
                    <textarea name="c"></textarea>
                </form>"#
            )
        })
        .unwrap_or_default();
    format!(
        r#"<html><body>
            <table id="drop_table">
                <tr><th>Artist</th><th>Title</th></tr>
                {rows}
                <tr class="setbreak"><td class="song col_artist"></td><td>Set break</td></tr>
            </table>
            {form}
        </body></html>"#
    )
}

pub fn draft_page(c: &str, pe: &str, kfid: &str) -> String {
    format!(
        r#"<html><body><form action="/playlistcommentpost.php?p=1" method="post">
            <input type="hidden" name="__kfid" value="{kfid}">
            <input type="hidden" name="c" value="{c}">
            <input type="hidden" name="pe" value="{pe}">
            <input type="submit" name="b" value="POST THAT NOW!">
        </form></body></html>"#
    )
}

/// Canned responses for one complete login relay.
pub fn login_script(kfid: &str) -> Vec<CannedResponse> {
    vec![
        CannedResponse::ok(login_page(kfid)).with_cookie("PHPSESSID=sess1; path=/"),
        CannedResponse::ok(plain_page()),
    ]
}
