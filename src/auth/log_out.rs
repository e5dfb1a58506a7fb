//! Log-out route handler that ends the remote session and invalidates the session cookie.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::{
    alert::Alert,
    api::{ApiClient, ApiError},
    auth::{Session, cookie::invalidate_session_cookie},
    endpoints,
};

/// End the session with the remote API, invalidate the session cookie and
/// redirect the client to the log-in page.
///
/// A token the API no longer knows is treated as already logged out. Any
/// other failure keeps the session and shows an alert.
pub async fn post_log_out(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
) -> Response {
    match api.log_out(&session.token).await {
        Ok(()) | Err(ApiError::Unauthorized) => (
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            invalidate_session_cookie(jar),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not log out: {error}");
            let status_code = match error {
                ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };

            (
                status_code,
                Alert::Error {
                    message: "Failed to log out".to_owned(),
                    details: error.user_message(""),
                }
                .into_html(),
            )
                .into_response()
        }
    }
}

/// Clear the session cookie and send the browser to the log-in page.
///
/// Used when the remote API rejects the session token of a page request.
pub(crate) fn session_expired(jar: PrivateCookieJar) -> Response {
    tracing::info!("Session token rejected by the API, logging out.");
    (
        invalidate_session_cookie(jar),
        Redirect::to(endpoints::LOG_IN_VIEW),
    )
        .into_response()
}

/// Like [session_expired] but for htmx requests.
pub(crate) fn session_expired_hx(jar: PrivateCookieJar) -> Response {
    tracing::info!("Session token rejected by the API, logging out.");
    (
        HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
        invalidate_session_cookie(jar),
    )
        .into_response()
}
