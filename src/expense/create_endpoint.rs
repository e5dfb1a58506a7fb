//! Defines the endpoint for creating a new expense.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::{alert::queue_notice, auth::Session, endpoints};

use super::core::{ExpenseForm, ExpenseState, api_error_response};

/// A route handler for creating a new expense, redirects to the dashboard on success.
///
/// The dashboard fetches the whole list again, so the new expense shows up
/// exactly as the API stored it, and shows the queued success message.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(error) => {
            tracing::debug!("Rejected expense form: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = state.api.add_expense(&session.token, &draft).await {
        return api_error_response(error, "Failed to add expense", jar);
    }

    (
        queue_notice(jar, "Expense added successfully!"),
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
