//! Request classification and strategy selection

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::models::{Destination, Request, RequestMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Document,
    Script,
    Style,
    Image,
    Other,
}

/// How a request is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Try the network, fall back to the cache
    NetworkFirst,
    /// Serve from the cache, fill it from the network on a miss
    CacheFirst,
    /// Never touches the cache
    NetworkOnly,
}

/// Relative request paths are resolved against this; only the path is used
const RELATIVE_BASE: &str = "http://localhost/";

fn resolve(url: &str) -> Option<Url> {
    Url::parse(url)
        .or_else(|_| Url::parse(RELATIVE_BASE)?.join(url))
        .ok()
}

fn kind_from_path(path: &str) -> ResourceKind {
    if path.is_empty() || path.ends_with('/') {
        return ResourceKind::Document;
    }

    let extension = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html" | "htm") => ResourceKind::Document,
        Some("js" | "mjs") => ResourceKind::Script,
        Some("css") => ResourceKind::Style,
        Some("png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "avif") => {
            ResourceKind::Image
        }
        _ => ResourceKind::Other,
    }
}

/// Decide what kind of resource a request is for.
///
/// The declared destination wins; navigations are documents; otherwise the
/// URL's file extension decides.
pub fn classify(request: &Request) -> ResourceKind {
    match request.destination {
        Destination::Document => return ResourceKind::Document,
        Destination::Script => return ResourceKind::Script,
        Destination::Style => return ResourceKind::Style,
        Destination::Image => return ResourceKind::Image,
        Destination::Font | Destination::Manifest => return ResourceKind::Other,
        Destination::Empty => {}
    }

    if request.mode == RequestMode::Navigate {
        return ResourceKind::Document;
    }

    match resolve(&request.url) {
        Some(url) => kind_from_path(url.path()),
        None => ResourceKind::Other,
    }
}

pub fn strategy_for_kind(kind: ResourceKind) -> Strategy {
    match kind {
        ResourceKind::Script | ResourceKind::Style | ResourceKind::Image => Strategy::CacheFirst,
        ResourceKind::Document | ResourceKind::Other => Strategy::NetworkFirst,
    }
}

pub fn strategy_for(request: &Request) -> Strategy {
    if !request.is_get() {
        return Strategy::NetworkOnly;
    }
    strategy_for_kind(classify(request))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_wins() {
        let request = Request::get("/data.json").with_destination(Destination::Script);
        assert_eq!(classify(&request), ResourceKind::Script);
    }

    #[test]
    fn test_navigation_is_document() {
        assert_eq!(classify(&Request::navigate("/study/middle1")), ResourceKind::Document);
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(classify(&Request::get("/")), ResourceKind::Document);
        assert_eq!(classify(&Request::get("/index.html")), ResourceKind::Document);
        assert_eq!(classify(&Request::get("/assets/app.3f2a.js")), ResourceKind::Script);
        assert_eq!(classify(&Request::get("/assets/app.css?v=2")), ResourceKind::Style);
        assert_eq!(
            classify(&Request::get("https://cdn.example.com/icons/icon-192.PNG")),
            ResourceKind::Image
        );
        assert_eq!(classify(&Request::get("https://example.com")), ResourceKind::Document);
        assert_eq!(classify(&Request::get("/manifest.json")), ResourceKind::Other);
        assert_eq!(classify(&Request::get("/api/voices")), ResourceKind::Other);
    }

    #[test]
    fn test_query_and_fragment_are_ignored() {
        assert_eq!(classify(&Request::get("assets/app.js#top")), ResourceKind::Script);
        assert_eq!(
            classify(&Request::get("https://cards.test/img/card.png?size=2#x")),
            ResourceKind::Image
        );
        assert_eq!(
            classify(&Request::get("https://cards.test/?from=home")),
            ResourceKind::Document
        );
        assert_eq!(classify(&Request::get("/sheet.css#v2")), ResourceKind::Style);
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(strategy_for(&Request::navigate("/")), Strategy::NetworkFirst);
        assert_eq!(strategy_for(&Request::get("/app.js")), Strategy::CacheFirst);
        assert_eq!(strategy_for(&Request::get("/app.css")), Strategy::CacheFirst);
        assert_eq!(strategy_for(&Request::get("/logo.svg")), Strategy::CacheFirst);
        assert_eq!(strategy_for(&Request::get("/manifest.json")), Strategy::NetworkFirst);
        assert_eq!(
            strategy_for(&Request::get("/app.js").with_method("POST")),
            Strategy::NetworkOnly
        );
    }
}
