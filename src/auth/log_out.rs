//! The route for logging out the current user.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::auth::cookie::invalidate_auth_cookie;

/// Invalidate the auth cookie.
///
/// Logging out without a session is not an error.
pub async fn post_log_out(jar: PrivateCookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use serde_json::json;
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::auth::COOKIE_TOKEN;

    use super::post_log_out;

    #[tokio::test]
    async fn log_out_invalidates_auth_cookie() {
        let app = Router::new()
            .route("/log_out", post(post_log_out))
            .with_state(Key::from(&Sha512::digest("foobar")));
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server.post("/log_out").await;

        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Logged out successfully" }));
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }
}
