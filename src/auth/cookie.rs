//! Defines functions for handling user authentication with cookies.
//!
//! The session is a single private (encrypted) cookie holding a JSON [Token].

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{Token, UserID},
};

/// The name of the cookie holding the session token.
pub const COOKIE_TOKEN: &str = "token";

/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::days(1);

/// Add an auth cookie to the cookie jar, indicating that a user is logged in and authenticated.
///
/// The session expires `duration` from now.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the token could not be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    set_auth_cookie_with_expiry(jar, user_id, OffsetDateTime::now_utc() + duration)
}

fn set_auth_cookie_with_expiry(
    jar: PrivateCookieJar,
    user_id: UserID,
    expires_at: OffsetDateTime,
) -> Result<PrivateCookieJar, Error> {
    let token = Token {
        user_id,
        expires_at,
    };
    let token_string = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .path("/")
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read and check the session token in `jar`.
///
/// # Errors
///
/// Returns a:
/// - [Error::CookieMissing] if there is no auth cookie,
/// - or [Error::InvalidAuthToken] if the cookie cannot be decoded or the session has expired.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::InvalidAuthToken(error.to_string()))?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidAuthToken("session expired".to_owned()));
    }

    Ok(token)
}

/// Push the session expiry back to at least `duration` from now.
///
/// Sessions that already last longer than that are left alone.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned. See
/// [get_token_from_cookies] and [set_auth_cookie] for the possible errors.
pub fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let new_expiry = OffsetDateTime::now_utc() + duration;

    if new_expiry <= token.expires_at {
        return Ok(jar);
    }

    set_auth_cookie_with_expiry(jar, token.user_id, max(token.expires_at, new_expiry))
}
