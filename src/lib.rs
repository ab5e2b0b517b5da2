//! An HTML-rewriting proxy for a single upstream site.
//!
//! Pages are fetched from [`UPSTREAM_ORIGIN`], stripped of their own
//! presentation, given a replacement stylesheet, and have their links and asset
//! URLs rewritten so that they work when served from the proxy. See
//! [`rewrite::PIPELINE`] for the individual steps.

mod error;
/// The ordered document transformation
pub mod rewrite;
/// Mapping incoming requests to upstream paths, and the error page
pub mod route;
/// Serving transformed pages over HTTP
pub mod serve;
/// Fetching of pages from the upstream site
pub mod web;

pub use error::{Error, Result};
pub use rewrite::transform;

/// Host name of the proxied site
pub const UPSTREAM_HOST: &str = "buzerant.com";
/// The proxied site. Not configurable.
pub const UPSTREAM_ORIGIN: &str = "https://buzerant.com";
