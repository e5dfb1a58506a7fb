use axum::{
    body::Body,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};
use time::Duration;

use crate::{alert::COOKIE_NOTICE, auth::COOKIE_SESSION};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = get_header(response, "content-type");

    assert!(
        content_type_header.starts_with(content_type),
        "want content type {content_type}, got {content_type_header}"
    );
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    let header_error_message = format!("Headers missing {header_name}");

    response
        .headers()
        .get(header_name)
        .expect(&header_error_message)
        .to_str()
        .expect("Could not convert to str")
        .to_string()
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(get_header(response, "hx-redirect"), endpoint);
}

#[track_caller]
pub(crate) fn assert_hx_refresh(response: &Response<Body>) {
    assert_eq!(get_header(response, "hx-refresh"), "true");
}

#[track_caller]
pub(crate) fn assert_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(get_header(response, "location"), endpoint);
}

/// Assert that the response deletes the session cookie.
#[track_caller]
pub(crate) fn assert_session_cleared(response: &Response<Body>) {
    let session_cookie = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|header| Cookie::parse(header.to_str().ok()?.to_owned()).ok())
        .find(|cookie| cookie.name() == COOKIE_SESSION)
        .expect("No session cookie set");

    assert_eq!(session_cookie.max_age(), Some(Duration::ZERO));
}

/// The success message `response` queued for the next page load, if any.
pub(crate) fn queued_notice(response: &Response<Body>, key: &Key) -> Option<String> {
    jar_from_set_cookies(response, key)
        .get(COOKIE_NOTICE)
        .map(|cookie| cookie.value().to_owned())
}

/// The jar a browser would send back after receiving the cookies set by `jar`.
pub(crate) fn returned_jar(jar: PrivateCookieJar, key: &Key) -> PrivateCookieJar {
    jar_from_set_cookies(&jar.into_response(), key)
}

fn jar_from_set_cookies(response: &Response<Body>, key: &Key) -> PrivateCookieJar {
    let mut headers = HeaderMap::new();

    for cookie in response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|header| Cookie::parse(header.to_str().ok()?.to_owned()).ok())
    {
        let pair = format!("{}={}", cookie.name(), cookie.value());
        headers.append(COOKIE, HeaderValue::from_str(&pair).expect("Invalid cookie header"));
    }

    PrivateCookieJar::from_headers(&headers, key.clone())
}

/// Assert that the response deletes the queued success message.
#[track_caller]
pub(crate) fn assert_notice_cleared(response: &Response<Body>) {
    let notice_cookie = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|header| Cookie::parse(header.to_str().ok()?.to_owned()).ok())
        .find(|cookie| cookie.name() == COOKIE_NOTICE)
        .expect("No notice cookie set");

    assert_eq!(notice_cookie.max_age(), Some(Duration::ZERO));
}
