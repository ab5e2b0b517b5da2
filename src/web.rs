use reqwest::blocking::Client;
use reqwest::header;
use tracing::{debug, span, Level};
use url::Url;

use crate::{route, rewrite, Error, Result, UPSTREAM_ORIGIN};

/// Sent with every upstream request; the site serves a browser-like UA the full page
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// A page of the upstream site, as it was served
pub struct Page {
    /// Normalized path the page was requested for, e.g. `/buzeni`
    pub path: String,
    pub url: Url,
    pub html: String,
}

impl Page {
    /// Fetches the page at `path` on the upstream site
    pub fn fetch(client: &Client, path: &str) -> Result<Self> {
        let path = route::path_from_request(path);
        let url = upstream_url(&path)?;
        let html = Page::get_text_resource(client, &url)?;
        Ok(Self { path, url, html })
    }

    /// A page whose markup was obtained some other way, e.g. read from disk
    pub fn from_html(path: &str, html: String) -> Result<Self> {
        let path = route::path_from_request(path);
        let url = upstream_url(&path)?;
        Ok(Self { path, url, html })
    }

    /// The page as the proxy serves it
    pub fn transform(&self) -> String {
        rewrite::transform(&self.path, &self.html)
    }

    fn get_text_resource(client: &Client, url: &Url) -> Result<String> {
        let span = span!(Level::DEBUG, "Loading resource", "{}", url);
        let _enter = span.enter();
        let fetch_error = |source: reqwest::Error| Error::Fetch {
            url: url.to_string(),
            source,
        };
        let response = client.get(url.as_str()).send().map_err(fetch_error)?;
        let status = response.status();
        debug!(status = status.as_u16(), "Response");
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }
        response.text().map_err(fetch_error)
    }
}

/// The shared upstream client
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(
            [(header::ACCEPT, header::HeaderValue::from_static("text/html"))]
                .into_iter()
                .collect(),
        )
        .build()
        .map_err(|source| Error::Fetch {
            url: UPSTREAM_ORIGIN.to_string(),
            source,
        })
}

/// `path` on the upstream origin. `path` must start with `/`.
pub fn upstream_url(path: &str) -> Result<Url> {
    Ok(Url::parse(UPSTREAM_ORIGIN)?.join(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_url() {
        assert_eq!(upstream_url("/").unwrap().as_str(), "https://buzerant.com/");
        assert_eq!(
            upstream_url("/buzeni/nejaky-vtip").unwrap().as_str(),
            "https://buzerant.com/buzeni/nejaky-vtip"
        );
    }

    #[test]
    fn test_page_stays_on_origin() {
        let page = Page::from_html("//example.org/x", String::new()).unwrap();
        assert_eq!(page.path, "/example.org/x");
        assert_eq!(page.url.host_str(), Some("buzerant.com"));
        let page = Page::from_html("", String::new()).unwrap();
        assert_eq!(page.url.as_str(), "https://buzerant.com/");
    }

    #[test]
    fn test_page_transform() {
        let page = Page::from_html("/buzeni", "<header></header><p>buzerant</p>".to_string()).unwrap();
        assert_eq!(
            page.transform(),
            r#"<header class="main-header"></header><p>Bu*erant</p>"#
        );
    }
}
