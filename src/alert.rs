//! Alert fragments for telling the user that an action succeeded or failed.
//!
//! Error alerts are either swapped into the page's alert container by htmx
//! (`hx-target-error="#alert-container"`) or rendered inline in a page.
//! Mutations are followed by a full page load, so success messages are queued
//! in a short-lived private cookie and shown by the next dashboard render.

use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use maud::{Markup, html};
use time::Duration;

pub(crate) const COOKIE_NOTICE: &str = "notice";
/// How long a queued success message waits for the next page load.
const NOTICE_MAX_AGE: Duration = Duration::minutes(1);

/// A success or error message.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String },
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    fn is_error(&self) -> bool {
        !matches!(self, Alert::Success { .. })
    }

    fn message(&self) -> &str {
        match self {
            Alert::Success { message }
            | Alert::Error { message, .. }
            | Alert::ErrorSimple { message } => message,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Alert::Error { details, .. } if !details.is_empty() => Some(details),
            _ => None,
        }
    }

    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        // Adapted from https://flowbite.com/docs/components/alerts/
        let (style, role) = if self.is_error() {
            (
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 border border-red-300 dark:border-red-800",
                "alert",
            )
        } else {
            (
                "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
                dark:bg-gray-800 dark:text-green-400 border border-green-300 dark:border-green-800",
                "status",
            )
        };

        html! {
            div class=(style) role=(role) data-alert
            {
                p class="font-medium" { (self.message()) }

                @if let Some(details) = self.details() {
                    p class="mt-1" { (details) }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

/// Queue `message` to be shown as a success alert on the next page load.
pub(crate) fn queue_notice(jar: PrivateCookieJar, message: &str) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_NOTICE, message.to_owned()))
            .path("/")
            .max_age(NOTICE_MAX_AGE)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Remove the queued success message from `jar`, returning it as an alert.
pub(crate) fn take_notice(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Alert>) {
    let Some(cookie) = jar.get(COOKIE_NOTICE) else {
        return (jar, None);
    };

    let alert = Alert::Success {
        message: cookie.value().to_owned(),
    };
    let jar = jar.remove(Cookie::build((COOKIE_NOTICE, "")).path("/"));

    (jar, Some(alert))
}
