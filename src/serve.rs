use lazy_static::lazy_static;
use reqwest::blocking::Client;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{info, span, warn, Level};

use crate::web::{self, Page};
use crate::{route, Error, Result};

/// Listen address when none is given
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

lazy_static! {
    static ref HTML: Header =
        Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..]).expect("header is valid");
    static ref ALLOW: Header = Header::from_bytes(&b"Allow"[..], &b"GET, HEAD"[..]).expect("header is valid");
}

/// Serve rewritten pages on `addr` until the process is stopped. Requests are
/// handled one at a time.
pub fn serve(addr: &str) -> Result<()> {
    let server = Server::http(addr).map_err(|e| Error::Bind {
        addr: addr.to_string(),
        message: e.to_string(),
    })?;
    let client = web::client()?;
    info!(addr, "Listening");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(&client, request) {
            warn!(error = %e, "Could not respond");
        }
    }
    Ok(())
}

fn handle_request(client: &Client, request: Request) -> Result<()> {
    let path = route::path_from_request(request.url());
    let span = span!(Level::INFO, "Request", method = %request.method(), %path);
    let _enter = span.enter();

    if !matches!(request.method(), Method::Get | Method::Head) {
        info!(status = 405, "Method not allowed");
        let response = Response::from_string("405 Method Not Allowed")
            .with_status_code(StatusCode(405))
            .with_header(ALLOW.clone());
        return Ok(request.respond(response)?);
    }

    let (status, body) = render(client, &path);
    info!(status, "Responding");
    let response = Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(HTML.clone());
    Ok(request.respond(response)?)
}

/// Status and markup of the response for `path`. Failures become the error page.
pub fn render(client: &Client, path: &str) -> (u16, String) {
    match Page::fetch(client, path) {
        Ok(page) => (200, page.transform()),
        Err(e) => {
            warn!(error = %e, path, "Upstream failed");
            (502, route::error_page(path, &e))
        }
    }
}
