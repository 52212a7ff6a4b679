//! Auth cookie transport.
//!
//! The token travels in a single cookie. Login sets it; any verification or
//! resolution failure re-sets it with an empty value and `Max-Age=0` so a
//! client holding a stale token self-heals on its next request.

/// Name of the authentication cookie.
pub const AUTH_COOKIE_NAME: &str = "X-Auth";

/// `Set-Cookie` value issued on successful login.
///
/// The token is compact base64url, so no quoting is needed.
pub fn build_auth_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{AUTH_COOKIE_NAME}={token}; Path=/; Max-Age={max_age_secs}; HttpOnly")
}

/// `Set-Cookie` value that instructs the client to discard the cookie.
pub const CLEAR_AUTH_COOKIE: &str = "X-Auth=; Path=/; Max-Age=0; HttpOnly";

/// Extract the auth cookie's value from a `Cookie` request header value.
///
/// Returns `None` when the cookie is absent or empty. Not an error:
/// anonymous access is valid for public routes.
pub fn extract_token(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(AUTH_COOKIE_NAME)?.strip_prefix('='))
        .filter(|value| !value.is_empty())
}
