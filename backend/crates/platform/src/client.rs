//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::HeaderMap;
use std::net::IpAddr;

const REQUEST_ID_HEADER: &str = "x-request-id";
const REQUEST_ID_MAX_LEN: usize = 100;

/// Resolve the client IP, honoring reverse proxies
///
/// The leftmost parseable entry of `X-Forwarded-For` wins; without one
/// the socket address of the direct connection is used.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

/// Extract a client-supplied request id for log correlation
///
/// Accepts printable ASCII up to 100 characters. Anything else is
/// silently dropped since the id is advisory.
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > REQUEST_ID_MAX_LEN {
        return None;
    }
    if !trimmed.chars().all(|c| c.is_ascii_graphic()) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Build the identifier that rate limits are keyed on
///
/// Prefers the client IP; falls back to the supplied value (typically
/// the browser fingerprint) when no address is available.
pub fn client_identifier(ip: Option<IpAddr>, fallback: &str) -> String {
    match ip {
        Some(addr) => addr.to_string(),
        None => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1, 172.16.0.2"),
        );
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_without_proxy_headers() {
        let direct: IpAddr = "127.0.0.1".parse().unwrap();
        assert_eq!(
            extract_client_ip(&HeaderMap::new(), Some(direct)),
            Some(direct)
        );
        assert_eq!(extract_client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_extract_client_ip_invalid_xff_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        let direct: IpAddr = "10.1.2.3".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_extract_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-abc-123"));
        assert_eq!(
            extract_request_id(&headers),
            Some("req-abc-123".to_string())
        );
    }

    #[test]
    fn test_extract_request_id_rejects_invalid() {
        let long = "a".repeat(101);
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&long).unwrap());
        assert_eq!(extract_request_id(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("has space"));
        assert_eq!(extract_request_id(&headers), None);

        assert_eq!(extract_request_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_client_identifier_prefers_ip() {
        let ip: IpAddr = "203.0.113.7".parse().unwrap();
        assert_eq!(client_identifier(Some(ip), "fp"), "203.0.113.7");
        assert_eq!(client_identifier(None, "fp"), "fp");
    }
}
