//! The page to display when a route or resource does not exist.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A 404 page with an optional explanation of what was missing.
pub struct NotFoundError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for NotFoundError<'_> {
    fn default() -> Self {
        Self {
            description: "Something's missing.",
            fix: "Sorry, we can't find that page. You'll find lots to explore on the home page.",
        }
    }
}

impl IntoResponse for NotFoundError<'_> {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            Html(error_view("Not Found", "404", self.description, self.fix).into_string()),
        )
            .into_response()
    }
}

pub async fn get_404_not_found() -> Response {
    NotFoundError::default().into_response()
}
