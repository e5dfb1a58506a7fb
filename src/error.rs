//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, api::ApiError, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// The session cookie could not be decoded or has expired.
    #[error("the session cookie is invalid or has expired")]
    InvalidSession,

    /// There was an error creating or formatting the session expiry date time.
    #[error("could not compute the session expiry")]
    DateError,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The expense form was incomplete or malformed.
    ///
    /// The string is shown to the user as is.
    #[error("invalid expense: {0}")]
    InvalidExpense(String),

    /// A call to the remote expense API failed.
    ///
    /// `action` names the failed operation, e.g. "Failed to add expense",
    /// and is shown to the user when the API did not give a reason.
    #[error("{action}: {source}")]
    Api {
        /// The notification to fall back on.
        action: &'static str,
        /// The underlying API error.
        source: ApiError,
    },
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError::default().into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::Api { action, source } => {
                tracing::error!("{action}: {source}");
                InternalServerError {
                    description: action,
                    fix: &source.user_message(
                        "The expense service could not be reached. Try again later.",
                    ),
                }
                .into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    ///
    /// The status is always a 4xx or 5xx code so that htmx swaps the alert
    /// into the alert container.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::InvalidExpense(message) => {
                (StatusCode::BAD_REQUEST, Alert::ErrorSimple { message })
            }
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not find expense".to_owned(),
                    details: "Try refreshing the page to see if the expense has already been deleted."
                        .to_owned(),
                },
            ),
            Error::Api { action, source } => {
                tracing::warn!("{action}: {source}");
                let status_code = match &source {
                    ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                    ApiError::Rejected { status, .. } => StatusCode::from_u16(*status)
                        .ok()
                        .filter(StatusCode::is_client_error)
                        .unwrap_or(StatusCode::BAD_GATEWAY),
                    ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::BAD_GATEWAY,
                };

                (
                    status_code,
                    Alert::ErrorSimple {
                        message: source.user_message(action),
                    },
                )
            }
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
