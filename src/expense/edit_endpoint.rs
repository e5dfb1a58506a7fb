//! Defines the endpoint for updating an existing expense.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::{alert::queue_notice, api::ExpenseId, auth::Session, endpoints};

use super::core::{ExpenseForm, ExpenseState, api_error_response};

/// A route handler for replacing every field of an expense, redirects to the
/// dashboard on success.
pub async fn edit_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
    Path(expense_id): Path<String>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(error) => {
            tracing::debug!("Rejected expense form: {error}");
            return error.into_alert_response();
        }
    };

    let expense_id = ExpenseId::new(expense_id);

    if let Err(error) = state
        .api
        .update_expense(&session.token, &expense_id, &draft)
        .await
    {
        return api_error_response(error, "Failed to update expense", jar);
    }

    (
        queue_notice(jar, "Expense updated successfully!"),
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
