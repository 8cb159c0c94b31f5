//! Session and anti-forgery cookies.
//!
//! The session lives entirely in the signed `kiwiSid` cookie. Its
//! anti-forgery token is mirrored in the readable `XSRF-TOKEN` cookie so the
//! frontend can echo it in the `X-XSRF-TOKEN` header.

use axum::http::header::{COOKIE, HOST, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};
use axum::response::AppendHeaders;
use backoffice_application::IssuedSession;
use backoffice_core::AppError;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};

use crate::error::ApiResult;

pub const SESSION_COOKIE: &str = "kiwiSid";
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";
pub const XSRF_HEADER: &str = "x-xsrf-token";

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// `Set-Cookie` headers of a response.
pub type CookieHeaders = AppendHeaders<Vec<(HeaderName, HeaderValue)>>;

/// Attributes shared by both session cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookiePolicy {
    domain: Option<String>,
    max_age_seconds: i64,
}

impl SessionCookiePolicy {
    pub fn new(domain: Option<String>, max_age_seconds: i64) -> Self {
        Self {
            domain,
            max_age_seconds,
        }
    }

    /// Builds the session cookie and the readable anti-forgery cookie.
    pub fn cookies(&self, issued: &IssuedSession, secure: bool) -> [Cookie<'static>; 2] {
        [
            self.cookie(SESSION_COOKIE, issued.session_token.clone(), true, secure),
            self.cookie(XSRF_COOKIE, issued.xsrf_token.clone(), false, secure),
        ]
    }

    pub fn set_cookie_headers(
        &self,
        issued: &IssuedSession,
        secure: bool,
    ) -> ApiResult<CookieHeaders> {
        let headers = self
            .cookies(issued, secure)
            .iter()
            .map(|cookie| {
                HeaderValue::from_str(&cookie.to_string())
                    .map(|value| (SET_COOKIE, value))
                    .map_err(|error| {
                        AppError::Internal(format!("invalid cookie '{}': {error}", cookie.name()))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AppendHeaders(headers))
    }

    fn cookie(
        &self,
        name: &'static str,
        value: String,
        http_only: bool,
        secure: bool,
    ) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path("/")
            .http_only(http_only)
            .secure(secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(self.max_age_seconds));

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }
}

/// Returns the session token carried by the request cookies.
pub fn read_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
}

/// Returns the anti-forgery token echoed by the client.
pub fn read_xsrf_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(XSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
}

/// Host and scheme the client used to reach the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub host: String,
    pub secure: bool,
}

impl RequestOrigin {
    pub fn from_parts(headers: &HeaderMap, uri: &Uri) -> Self {
        let host = uri
            .host()
            .map(str::to_owned)
            .or_else(|| {
                headers
                    .get(HOST)
                    .and_then(|value| value.to_str().ok())
                    .map(strip_port)
            })
            .unwrap_or_default();

        let secure = match uri.scheme_str() {
            Some(scheme) => scheme.eq_ignore_ascii_case("https"),
            None => headers
                .get(FORWARDED_PROTO)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https")),
        };

        Self { host, secure }
    }
}

fn strip_port(host: &str) -> String {
    if host.starts_with('[') {
        return host
            .split_once(']')
            .map(|(address, _)| format!("{address}]"))
            .unwrap_or_else(|| host.to_owned());
    }

    host.split(':').next().unwrap_or(host).to_owned()
}

#[cfg(test)]
mod tests {
    use axum::http::header::{COOKIE, HOST};
    use axum::http::{HeaderMap, HeaderValue, Uri};
    use backoffice_application::IssuedSession;
    use backoffice_domain::SessionData;
    use proptest::prelude::*;

    use super::{
        RequestOrigin, SESSION_COOKIE, SessionCookiePolicy, XSRF_COOKIE, read_session_token,
        strip_port,
    };

    fn issued() -> IssuedSession {
        let Ok(data) = SessionData::new("xsrf-1", None) else {
            panic!("session data should be valid");
        };
        IssuedSession {
            session_token: "header.claims.signature".to_owned(),
            xsrf_token: "xsrf-1".to_owned(),
            data,
        }
    }

    #[test]
    fn session_cookie_is_http_only_and_xsrf_cookie_is_readable() {
        let policy = SessionCookiePolicy::new(Some("admin.example.com".to_owned()), 3600);
        let [session, xsrf] = policy.cookies(&issued(), true);

        assert_eq!(session.name(), SESSION_COOKIE);
        assert_eq!(session.value(), "header.claims.signature");
        assert_eq!(session.http_only(), Some(true));
        assert_eq!(session.secure(), Some(true));
        assert_eq!(session.path(), Some("/"));
        assert_eq!(session.domain(), Some("admin.example.com"));

        assert_eq!(xsrf.name(), XSRF_COOKIE);
        assert_eq!(xsrf.value(), "xsrf-1");
        assert_eq!(xsrf.http_only(), Some(false));
    }

    #[test]
    fn plain_http_cookies_are_not_secure() {
        let policy = SessionCookiePolicy::new(None, 3600);
        let [session, xsrf] = policy.cookies(&issued(), false);

        assert_eq!(session.secure(), Some(false));
        assert_eq!(xsrf.secure(), Some(false));
        assert_eq!(session.domain(), None);
    }

    #[test]
    fn session_token_is_read_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; kiwiSid=abc.def.ghi; XSRF-TOKEN=x"),
        );

        assert_eq!(read_session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_empty_session_cookie_reads_as_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(read_session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("kiwiSid="));
        assert_eq!(read_session_token(&headers), None);
    }

    #[test]
    fn origin_uses_host_header_and_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("admin.example.com:8443"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        let origin = RequestOrigin::from_parts(&headers, &Uri::from_static("/api/auth/login"));

        assert_eq!(origin.host, "admin.example.com");
        assert!(origin.secure);
    }

    #[test]
    fn absolute_uri_wins_over_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        let origin = RequestOrigin::from_parts(
            &headers,
            &Uri::from_static("http://internal.local/api/auth/login"),
        );

        assert_eq!(origin.host, "internal.local");
        assert!(!origin.secure);
    }

    #[test]
    fn ipv6_host_keeps_brackets() {
        assert_eq!(strip_port("[::1]:3001"), "[::1]");
        assert_eq!(strip_port("localhost"), "localhost");
    }

    proptest! {
        #[test]
        fn any_cookie_safe_token_is_read_back(token in "[A-Za-z0-9_.-]{1,64}") {
            let mut headers = HeaderMap::new();
            let Ok(value) = HeaderValue::from_str(&format!("other=1; kiwiSid={token}")) else {
                panic!("header should be valid");
            };
            headers.insert(COOKIE, value);

            prop_assert_eq!(read_session_token(&headers), Some(token));
        }
    }
}
