/// Header plumbing shared by the route handlers
use crate::{
    db::models::RefreshToken,
    error::{ApiError, ApiResult},
};
use axum::http::{HeaderMap, HeaderValue};

pub const REFRESH_COOKIE: &str = "refreshToken";

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Read the refresh token out of the Cookie header, if present
pub fn extract_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cookie")
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == REFRESH_COOKIE).then(|| value.to_string())
            })
        })
}

/// Set-Cookie value carrying the refresh token. HttpOnly keeps it away from
/// scripts; the expiry mirrors the stored row's.
pub fn refresh_cookie_header(refresh: &RefreshToken) -> ApiResult<HeaderValue> {
    let expires = refresh
        .expires_at
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();

    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Expires={}",
        REFRESH_COOKIE, refresh.token, expires
    ))
    .map_err(|e| ApiError::Internal(format!("Invalid cookie value: {}", e)))
}

/// Set-Cookie value that expires the refresh cookie immediately
pub fn clear_refresh_cookie_header() -> HeaderValue {
    HeaderValue::from_static(
        "refreshToken=; HttpOnly; SameSite=Strict; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn refresh_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; refreshToken=tok123; lang=en"),
        );
        assert_eq!(extract_refresh_cookie(&headers), Some("tok123".to_string()));
    }

    #[test]
    fn missing_refresh_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("theme=dark"));
        assert_eq!(extract_refresh_cookie(&headers), None);
        assert_eq!(extract_refresh_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_header_carries_token_and_attributes() {
        let refresh = RefreshToken {
            id: "rt-1".to_string(),
            token: "tok123".to_string(),
            account_id: "acc-1".to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(7),
        };

        let header = refresh_cookie_header(&refresh).unwrap();
        let value = header.to_str().unwrap();
        assert!(value.starts_with("refreshToken=tok123;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Expires="));
    }

    #[test]
    fn clear_cookie_expires_in_the_past() {
        let value = clear_refresh_cookie_header();
        assert!(value.to_str().unwrap().contains("1970"));
    }
}
