//! HTTP Basic authentication for the pages and the chat endpoint.
//!
//! The decision is a pure function of the resolved [`AuthConfig`] and the
//! request's `Authorization` header; the middleware only turns a refusal into
//! a 401.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::api::json_detail;
use crate::config::AuthConfig;

/// `true` when the request may proceed.
pub fn check_credentials(auth: &AuthConfig, authorization: Option<&HeaderValue>) -> bool {
    if !auth.require_auth {
        return true;
    }
    let Some((username, password)) = authorization.and_then(parse_basic) else {
        return false;
    };
    // Both comparisons always run.
    let user_ok = digest_eq(&username, &auth.username);
    let pass_ok = digest_eq(&password, &auth.password);
    user_ok & pass_ok
}

/// Route layer: pass through or answer 401 with a Basic challenge.
pub async fn require_basic_auth(
    State(auth): State<Arc<AuthConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if !auth.require_auth {
        debug!("skipping authentication: credentials not configured");
        return next.run(request).await;
    }

    if check_credentials(&auth, request.headers().get(header::AUTHORIZATION)) {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "rejected request with invalid credentials");
    let mut response = json_detail(StatusCode::UNAUTHORIZED, "Invalid credentials");
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
    response
}

/// Decode `Basic <base64(user:pass)>`.
fn parse_basic(value: &HeaderValue) -> Option<(String, String)> {
    let value = value.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Compare fixed-length digests so neither timing nor length leaks.
fn digest_eq(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    constant_time_compare(&a, &b)
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guarded() -> AuthConfig {
        AuthConfig::from_credentials(Some("reader".into()), Some("s3cret:pass".into()))
    }

    fn basic(user: &str, pass: &str) -> HeaderValue {
        let token = STANDARD.encode(format!("{user}:{pass}"));
        HeaderValue::from_str(&format!("Basic {token}")).unwrap()
    }

    #[test]
    fn disabled_auth_lets_everything_through() {
        let auth = AuthConfig::disabled();
        assert!(check_credentials(&auth, None));
        assert!(check_credentials(&auth, Some(&HeaderValue::from_static("Bearer x"))));
    }

    #[test]
    fn matching_credentials_pass() {
        assert!(check_credentials(&guarded(), Some(&basic("reader", "s3cret:pass"))));
    }

    #[test]
    fn wrong_or_missing_credentials_fail() {
        let auth = guarded();
        assert!(!check_credentials(&auth, None));
        assert!(!check_credentials(&auth, Some(&basic("reader", "nope"))));
        assert!(!check_credentials(&auth, Some(&basic("other", "s3cret:pass"))));
        assert!(!check_credentials(&auth, Some(&HeaderValue::from_static("Bearer abc"))));
        assert!(!check_credentials(&auth, Some(&HeaderValue::from_static("Basic !!!"))));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let token = STANDARD.encode("reader:s3cret:pass");
        let value = HeaderValue::from_str(&format!("basic {token}")).unwrap();
        assert!(check_credentials(&guarded(), Some(&value)));
    }

    #[test]
    fn compare_rejects_length_mismatch() {
        assert!(constant_time_compare(b"abc", b"abc"));
        assert!(!constant_time_compare(b"abc", b"abd"));
        assert!(!constant_time_compare(b"abc", b"abcd"));
    }
}
