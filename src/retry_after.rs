//! `Retry-After` header parsing (RFC 7231 section 7.1.3).

use http::header::RETRY_AFTER;
use http::HeaderMap;
use std::time::{Duration, SystemTime};

/// Extract the server-suggested delay, if any.
///
/// Accepts delta-seconds or an HTTP-date; dates in the past clamp to zero.
/// Malformed values yield `None` so the caller falls back to its own
/// schedule.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let date = httpdate::parse_http_date(raw).ok()?;
    Some(date.duration_since(SystemTime::now()).unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn parses_delta_seconds() {
        assert_eq!(parse_retry_after(&headers_with("120")), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after(&headers_with("0")), Some(Duration::ZERO));
    }

    #[test]
    fn parses_future_http_date() {
        let future = SystemTime::now() + Duration::from_secs(90);
        let value = httpdate::fmt_http_date(future);
        let delay = parse_retry_after(&headers_with(&value)).unwrap();
        assert!(delay > Duration::from_secs(80));
        assert!(delay <= Duration::from_secs(90));
    }

    #[test]
    fn past_http_date_clamps_to_zero() {
        let past = SystemTime::now() - Duration::from_secs(3600);
        let value = httpdate::fmt_http_date(past);
        assert_eq!(parse_retry_after(&headers_with(&value)), Some(Duration::ZERO));
    }

    #[test]
    fn garbage_is_ignored() {
        assert_eq!(parse_retry_after(&headers_with("soon")), None);
        assert_eq!(parse_retry_after(&headers_with("-5")), None);
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(parse_retry_after(&headers_with(" 7 ")), Some(Duration::from_secs(7)));
    }
}
