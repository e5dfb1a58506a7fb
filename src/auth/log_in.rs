//! This file defines the routes for displaying the log-in page and handling log-in requests.
//!
//! Credentials are checked by the remote API, this server only keeps the
//! session token it hands back.

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState,
    api::{ApiClient, ApiError, LogInRequest},
    auth::{
        cookie::{get_session_from_cookies, invalidate_session_cookie, set_session_cookie},
        redirect::normalize_redirect_url,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, loading_spinner, log_in_register, password_input,
        text_input,
    },
};

/// Shown when the username or password field is blank.
pub const MISSING_CREDENTIALS_ERROR_MSG: &str = "Username and password are required.";
/// Shown when log-in fails and the API gave no reason.
pub const LOG_IN_FAILED_ERROR_MSG: &str = "Login failed. Please try again.";

fn log_in_form(username: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (text_input("username", "Username", "text", username, username.is_empty()))

            (password_input("", error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a href=(endpoints::REGISTER_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Register here"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let redirect_url = raw_url.and_then(normalize_redirect_url);

    if let (None, Some(raw_url)) = (&redirect_url, raw_url) {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

/// Display the log-in page.
///
/// Users that already have a valid session are sent to the dashboard.
pub async fn get_log_in_page(
    jar: PrivateCookieJar,
    Query(query): Query<RedirectQuery>,
) -> Response {
    if get_session_from_cookies(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &[], &content).into_response()
}

/// How long the session cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which the session cookie is valid.
    pub cookie_duration: Duration,
    /// The client for the remote expense API.
    pub api: ApiClient,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            api: state.api.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set and the client
/// is redirected to the dashboard page, or to the page they were sent here from.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let username = user_data.username.trim();

    if username.is_empty() || user_data.password.is_empty() {
        return log_in_form(username, Some(MISSING_CREDENTIALS_ERROR_MSG), redirect_url)
            .into_response();
    }

    let credentials = LogInRequest {
        username: username.to_owned(),
        password: user_data.password,
    };

    let auth_response = match state.api.log_in(&credentials).await {
        Ok(auth_response) => auth_response,
        Err(error) => {
            tracing::warn!("Log in failed for {username}: {error}");
            let message = error.user_message(LOG_IN_FAILED_ERROR_MSG);
            return log_in_form(username, Some(&message), redirect_url).into_response();
        }
    };

    let Some(token) = auth_response.session_token() else {
        tracing::error!("Log in for {username} succeeded but {}", ApiError::MissingToken);
        return log_in_form(username, Some(LOG_IN_FAILED_ERROR_MSG), redirect_url)
            .into_response();
    };

    let display_name = auth_response
        .user
        .as_ref()
        .and_then(|user| user.display_name())
        .unwrap_or(username);

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_session_cookie(jar.clone(), token, display_name, cookie_duration) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting session cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_session_cookie(jar),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    #[serde(default)]
    pub username: String,

    /// Password entered during log-in, forwarded to the API as is.
    #[serde(default)]
    pub password: String,

    /// Whether to extend the initial session cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}


#[cfg(test)]
mod log_in_tests {
    use std::collections::HashSet;

    use axum::{
        Form, Router,
        body::Body,
        extract::{FromRef, State},
        http::{Response, StatusCode, header::SET_COOKIE},
        routing::post,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use axum_htmx::HX_REDIRECT;
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::COOKIE_SESSION,
        endpoints,
        test_utils::{
            FakeApi, FakeApiHandle, assert_form_error_message, must_get_form, parse_html_fragment,
            test_app_state,
        },
    };

    use super::{
        LOG_IN_FAILED_ERROR_MSG, LogInData, LoginState, MISSING_CREDENTIALS_ERROR_MSG,
        REMEMBER_ME_COOKIE_DURATION, post_log_in,
    };

    async fn fake_api() -> FakeApiHandle {
        FakeApi::new().with_user("alice", "secret").spawn().await
    }

    fn log_in_data(username: &str, password: &str) -> LogInData {
        LogInData {
            username: username.to_owned(),
            password: password.to_owned(),
            remember_me: None,
            redirect_url: None,
        }
    }

    async fn new_log_in_request(api: &FakeApiHandle, log_in_form: LogInData) -> Response<Body> {
        let state = LoginState::from_ref(&test_app_state(api));
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(log_in_form)).await
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let api = fake_api().await;

        let response = new_log_in_request(&api, log_in_data("alice", "secret")).await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert_set_cookie(&response);
        assert_eq!(api.requests(), vec!["POST /user/login"]);
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let api = fake_api().await;
        let redirect_url = "/expenses/expense-1/edit";

        let response = new_log_in_request(
            &api,
            LogInData {
                redirect_url: Some(redirect_url.to_owned()),
                ..log_in_data("alice", "secret")
            },
        )
        .await;

        assert_hx_redirect(&response, redirect_url);
    }

    #[tokio::test]
    async fn log_in_falls_back_on_invalid_redirect_url() {
        let api = fake_api().await;

        let response = new_log_in_request(
            &api,
            LogInData {
                redirect_url: Some("https://example.com".to_owned()),
                ..log_in_data("alice", "secret")
            },
        )
        .await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let api = fake_api().await;

        let response = new_log_in_request(&api, log_in_data("alice", "wrong")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_error_message(response, "Invalid username or password").await;
    }

    #[tokio::test]
    async fn log_in_requires_username_and_password() {
        let api = fake_api().await;

        let response = new_log_in_request(&api, log_in_data("  ", "secret")).await;

        assert_error_message(response, MISSING_CREDENTIALS_ERROR_MSG).await;
        assert!(api.requests().is_empty(), "the API should not be called");
    }

    #[tokio::test]
    async fn unreachable_api_shows_generic_error() {
        let api = fake_api().await;
        let state = LoginState::from_ref(&test_app_state(&api));
        drop(api);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = post_log_in(State(state), jar, Form(log_in_data("alice", "secret"))).await;

        assert_error_message(response, LOG_IN_FAILED_ERROR_MSG).await;
    }

    /// Test helper macro to assert that two date times are within two seconds
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr$(,)?) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(2),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[tokio::test]
    async fn remember_me_extends_session_cookie_through_form() {
        let api = fake_api().await;
        let state = LoginState::from_ref(&test_app_state(&api));
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let form = [
            ("username", "alice"),
            ("password", "secret"),
            ("remember_me", "on"),
        ];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        let session_cookie = response.cookie(COOKIE_SESSION);
        assert_date_time_close!(
            session_cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION
        );
    }

    #[tokio::test]
    async fn form_deserialises_without_remember_me() {
        let api = fake_api().await;
        let state = LoginState::from_ref(&test_app_state(&api));
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let form = [("username", "alice"), ("password", "secret")];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    }

    #[track_caller]
    fn assert_hx_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get(HX_REDIRECT).unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    #[track_caller]
    fn assert_set_cookie(response: &Response<Body>) {
        let mut found_cookies = HashSet::new();

        for cookie_headers in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_headers.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            match cookie.name() {
                COOKIE_SESSION => {
                    assert!(cookie.expires_datetime() > Some(OffsetDateTime::now_utc()));
                    found_cookies.insert(cookie.name().to_string());
                }
                _ => panic!("Unexpected cookie found: {}", cookie.name()),
            }
        }

        assert!(
            found_cookies.contains(COOKIE_SESSION),
            "could not find cookie '{}' in {:?}",
            COOKIE_SESSION,
            found_cookies
        );
    }

    async fn assert_error_message(response: Response<Body>, message: &str) {
        let fragment = parse_html_fragment(response).await;
        let form = must_get_form(&fragment);

        assert_form_error_message(&form, message);
    }
}
