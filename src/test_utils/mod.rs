#![allow(missing_docs)]

pub(crate) mod fake_api;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

use axum_extra::extract::PrivateCookieJar;

use crate::{
    AppState,
    api::{ApiClient, RegistrationSchema},
    auth::{DEFAULT_COOKIE_DURATION, set_session_cookie},
    config::ApiConfig,
    pagination::PaginationConfig,
};

pub(crate) use fake_api::{FakeApi, FakeApiHandle};
pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_form_select_with_value, assert_form_submit_button_with_text, assert_hx_endpoint,
    must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{
    assert_content_type, assert_hx_redirect, assert_hx_refresh, assert_notice_cleared,
    assert_redirect, assert_session_cleared, assert_status_ok, get_header, queued_notice,
    returned_jar,
};

/// App state that talks to `api`.
pub(crate) fn test_app_state(api: &FakeApiHandle) -> AppState {
    test_app_state_with_schema(api, RegistrationSchema::default())
}

pub(crate) fn test_app_state_with_schema(
    api: &FakeApiHandle,
    registration_schema: RegistrationSchema,
) -> AppState {
    let client = ApiClient::new(&ApiConfig::new(api.base_url()))
        .expect("Could not create API client");

    AppState::new(
        "foobar",
        "Etc/UTC",
        PaginationConfig::default(),
        client,
        registration_schema,
    )
}

/// A cookie jar holding a session for `token`.
pub(crate) fn session_jar(state: &AppState, token: &str) -> PrivateCookieJar {
    set_session_cookie(
        PrivateCookieJar::new(state.cookie_key.clone()),
        token,
        "alice",
        DEFAULT_COOKIE_DURATION,
    )
    .expect("Could not set session cookie")
}
