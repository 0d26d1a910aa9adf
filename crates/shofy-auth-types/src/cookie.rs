//! Cookie builders for the session token.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::SESSION_TOKEN_EXP;

/// Cookie name for the session token.
pub const SHOFY_TOKEN: &str = "token";

/// Set the session-token cookie on the jar. Max-Age matches the token lifetime.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use shofy_auth_types::cookie::{set_token_cookie, SHOFY_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_token_cookie(jar, "token_value".to_string());
/// let cookie = jar.get(SHOFY_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86400)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_token_cookie(jar: CookieJar, value: String) -> CookieJar {
    let cookie = Cookie::build((SHOFY_TOKEN, value))
        .path("/")
        .max_age(Duration::seconds(SESSION_TOKEN_EXP as i64))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Clear the session-token cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use shofy_auth_types::cookie::{clear_token_cookie, set_token_cookie, SHOFY_TOKEN};
///
/// let jar = set_token_cookie(CookieJar::new(), "t".to_string());
/// let jar = clear_token_cookie(jar);
/// let cookie = jar.get(SHOFY_TOKEN).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// assert_eq!(cookie.value(), "");
/// ```
pub fn clear_token_cookie(jar: CookieJar) -> CookieJar {
    let cookie = Cookie::build((SHOFY_TOKEN, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
