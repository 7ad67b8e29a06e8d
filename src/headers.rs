use http_client::Request;

/// Browser user agent sent with every request; wfmu.org serves reduced pages
/// (without the favorite markers) to unknown agents.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Add common browser headers to a request
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept-Language", "en-US,en;q=0.9");
    let _ = request.insert_header("DNT", "1");
    let _ = request.insert_header("Connection", "keep-alive");
}

/// Add headers for page and feed reads
pub fn add_get_headers(request: &mut Request, referer_url: Option<&str>) {
    add_common_headers(request);
    let _ = request.insert_header("Accept", HTML_ACCEPT);
    let _ = request.insert_header("Upgrade-Insecure-Requests", "1");

    if let Some(referer) = referer_url {
        let _ = request.insert_header("Referer", referer);
    }
}

/// Add headers for form submissions
pub fn add_form_headers(request: &mut Request, referer_url: &str) {
    add_common_headers(request);
    let _ = request.insert_header("Accept", HTML_ACCEPT);
    let _ = request.insert_header("Content-Type", "application/x-www-form-urlencoded");
    let _ = request.insert_header("Referer", referer_url);
}

/// Add cookies to a request if there are any
pub fn add_cookies(request: &mut Request, cookie_header: Option<&str>) {
    if let Some(cookies) = cookie_header {
        let _ = request.insert_header("Cookie", cookies);
    }
}
