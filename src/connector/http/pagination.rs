use axum::http::header::HOST;
use axum::http::{HeaderMap, Uri};
use serde::Serialize;
use url::form_urlencoded;
use url::Url;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Absolute link to `page` of the current listing, keeping every other
/// query parameter. Page 1 is linked without a `page` parameter.
///
/// Returns `None` when the request's host header cannot form a URL.
pub fn page_url(headers: &HeaderMap, uri: &Uri, page: u32) -> Option<String> {
    let scheme = match header(headers, FORWARDED_PROTO) {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };
    let host = header(headers, HOST.as_str()).unwrap_or("localhost");
    let mut url = Url::parse(&format!("{}://{}{}", scheme, host, uri.path())).ok()?;

    let mut pairs: Vec<(String, String)> =
        form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
            .filter(|(key, _)| key != "page")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
    if page > 1 {
        pairs.push(("page".to_string(), page.to_string()));
    }

    // An empty serializer would still leave a bare `?` behind.
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, "api.test:8000".parse().unwrap());
        headers
    }

    #[test]
    fn test_page_replaced_and_filters_kept() {
        let uri: Uri = "/api/offers/?search=logo&page=2&page_size=3".parse().unwrap();
        assert_eq!(
            page_url(&headers(), &uri, 3).as_deref(),
            Some("http://api.test:8000/api/offers/?search=logo&page_size=3&page=3")
        );
    }

    #[test]
    fn test_first_page_drops_page_param() {
        let uri: Uri = "/api/offers/?page=2".parse().unwrap();
        assert_eq!(
            page_url(&headers(), &uri, 1).as_deref(),
            Some("http://api.test:8000/api/offers/")
        );
    }

    #[test]
    fn test_missing_host_falls_back() {
        let uri: Uri = "/api/offers/".parse().unwrap();
        assert_eq!(
            page_url(&HeaderMap::new(), &uri, 2).as_deref(),
            Some("http://localhost/api/offers/?page=2")
        );
    }

    #[test]
    fn test_valueless_page_param_dropped() {
        let uri: Uri = "/api/offers/?page&search=x".parse().unwrap();
        assert_eq!(
            page_url(&headers(), &uri, 2).as_deref(),
            Some("http://api.test:8000/api/offers/?search=x&page=2")
        );
    }

    #[test]
    fn test_encoded_values_survive() {
        let uri: Uri = "/api/offers/?search=logo%20design&page=1".parse().unwrap();
        assert_eq!(
            page_url(&headers(), &uri, 2).as_deref(),
            Some("http://api.test:8000/api/offers/?search=logo+design&page=2")
        );
    }

    #[test]
    fn test_forwarded_https_scheme() {
        let mut headers = headers();
        headers.insert(FORWARDED_PROTO, "https".parse().unwrap());
        let uri: Uri = "/api/offers/".parse().unwrap();
        assert_eq!(
            page_url(&headers, &uri, 2).as_deref(),
            Some("https://api.test:8000/api/offers/?page=2")
        );
    }

    #[test]
    fn test_unusable_host_gives_no_link() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, "bad host".parse().unwrap());
        let uri: Uri = "/api/offers/".parse().unwrap();
        assert_eq!(page_url(&headers, &uri, 2), None);
    }
}
