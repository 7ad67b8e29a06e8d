//! Cookie-carrying GET/POST on top of an [`HttpClient`].
//!
//! The transport itself is stateless; cookies live in the caller's
//! [`SessionState`] so the whole session can be locked as one unit.

use crate::error::WfmuError;
use crate::headers;
use crate::session::SessionState;
use crate::Result;
use http_client::{HttpClient, Request, Response};
use http_types::{Method, Url};
use std::fs;
use std::path::Path;

pub struct Transport {
    client: Box<dyn HttpClient>,
    debug_save_responses: bool,
}

impl Transport {
    pub fn new(client: Box<dyn HttpClient>, debug_save_responses: bool) -> Self {
        Self {
            client,
            debug_save_responses,
        }
    }

    /// GET `url` with extra query parameters and return the body text.
    pub async fn get(
        &self,
        state: &mut SessionState,
        url: &str,
        query: &[(&str, &str)],
        referer: Option<&str>,
    ) -> Result<String> {
        let url = build_url(url, query)?;
        log::debug!("GET {}", url.path());

        let mut request = Request::new(Method::Get, url);
        headers::add_get_headers(&mut request, referer);
        self.send(state, request).await
    }

    /// POST a form-encoded body to `url` with extra query parameters and
    /// return the body text. Fields are sent in the given order.
    pub async fn post_form(
        &self,
        state: &mut SessionState,
        url: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
        referer: &str,
    ) -> Result<String> {
        let url = build_url(url, query)?;
        log::debug!("POST {} ({} fields)", url.path(), form.len());

        let mut request = Request::new(Method::Post, url);
        headers::add_form_headers(&mut request, referer);
        request.set_body(encode_form(form));
        self.send(state, request).await
    }

    async fn send(&self, state: &mut SessionState, mut request: Request) -> Result<String> {
        headers::add_cookies(&mut request, state.cookie_header().as_deref());
        let url = request.url().to_string();

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| WfmuError::Http(e.to_string()))?;

        store_response_cookies(state, &response);

        let status = response.status();
        let body = response
            .body_string()
            .await
            .map_err(|e| WfmuError::Http(e.to_string()))?;

        log::debug!("Response status: {}, {} chars", status, body.len());

        if self.debug_save_responses {
            self.save_debug_response(&url, status.into(), &body);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(WfmuError::Http(format!("{url} returned status {status}")));
        }

        Ok(body)
    }

    /// Save response to debug directory (optional debug feature)
    fn save_debug_response(&self, url: &str, status_code: u16, body: &str) {
        if let Err(e) = try_save_debug_response(url, status_code, body) {
            log::warn!("Failed to save debug response: {e}");
        }
    }
}

fn store_response_cookies(state: &mut SessionState, response: &Response) {
    if let Some(cookie_headers) = response.header("set-cookie") {
        state.store_cookies(cookie_headers.iter().map(|value| value.as_str()));
    }
}

/// Parse `url` and append `query` pairs to whatever query it already has.
pub fn build_url(url: &str, query: &[(&str, &str)]) -> Result<Url> {
    let mut parsed = url
        .parse::<Url>()
        .map_err(|e| WfmuError::Http(format!("invalid URL '{url}': {e}")))?;
    if !query.is_empty() {
        let mut pairs = parsed.query_pairs_mut();
        for (name, value) in query {
            pairs.append_pair(name, value);
        }
    }
    Ok(parsed)
}

/// URL-encode form fields as `application/x-www-form-urlencoded`.
pub fn encode_form(form: &[(&str, &str)]) -> String {
    form.iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn try_save_debug_response(url: &str, status_code: u16, body: &str) -> Result<()> {
    let debug_dir = Path::new("debug_responses");
    fs::create_dir_all(debug_dir)?;

    let url_path = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f");
    let safe_path = url_path.replace(['/', '?', '&', '=', '%', '+', ':'], "_");
    let extension = if body.trim_start().starts_with('{') {
        "json"
    } else if body.trim_start().starts_with("<?xml") {
        "xml"
    } else {
        "html"
    };

    let filename = format!("{timestamp}_{safe_path}_status{status_code}.{extension}");
    let file_path = debug_dir.join(filename);
    fs::write(&file_path, body)?;

    log::debug!("Saved HTTP response to {file_path:?} (status: {status_code})");
    Ok(())
}
