//! Auth gate for protected routes and session cookie helpers

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::{AppState, CookieSettings};

/// Cookie name for the session token
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Find a cookie value across all `Cookie` headers
///
/// When a name repeats, the first pair wins. Browsers list the cookie with
/// the longest matching path first, and only `Path=/` is ever set here.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, settings: &CookieSettings) -> String {
    build_cookie(token, settings.max_age_secs, settings.secure)
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(settings: &CookieSettings) -> String {
    build_cookie("", 0, settings.secure)
}

fn build_cookie(value: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        AUTH_COOKIE_NAME, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Middleware: require a valid session cookie.
///
/// Puts the [`journal_core::AuthenticatedUser`] into the request extensions,
/// or answers 401 without calling the handler.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = state
        .auth
        .authenticate(extract_cookie(req.headers(), AUTH_COOKIE_NAME))?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
