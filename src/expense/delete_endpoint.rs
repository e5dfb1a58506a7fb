//! Defines the endpoint for deleting an expense.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRefresh;

use crate::{alert::queue_notice, api::ExpenseId, auth::Session};

use super::core::{ExpenseState, api_error_response};

/// A route handler for deleting an expense.
///
/// On success htmx is told to refresh the page so the list is fetched again,
/// and the refreshed page shows the queued success message.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
    Path(expense_id): Path<String>,
) -> Response {
    let expense_id = ExpenseId::new(expense_id);

    match state.api.delete_expense(&session.token, &expense_id).await {
        Ok(()) => (
            queue_notice(jar, "Expense deleted successfully!"),
            HxRefresh(true),
            (),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not delete expense {expense_id}: {error}");
            api_error_response(error, "Failed to delete expense", jar)
        }
    }
}
