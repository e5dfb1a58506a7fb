//! Defines the route handler for the page for editing an existing expense.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    Error,
    api::{ApiError, Expense, ExpenseId},
    auth::{Session, session_expired},
    endpoints::{self, format_endpoint},
    html::{base, currency_input_styles},
    navigation::NavBar,
    not_found::NotFoundError,
};

use super::{
    core::{ExpenseState, find_expense},
    form::{ExpenseFormDefaults, FormAction, expense_form},
};

fn edit_expense_view(nav_bar: NavBar, expense: &Expense) -> Markup {
    let nav_bar = nav_bar.into_html();
    let update_endpoint = format_endpoint(endpoints::EXPENSE_API, expense.id.as_str());
    let draft = expense.to_draft();
    let form = expense_form(
        "Edit Expense",
        FormAction::Put(&update_endpoint),
        &ExpenseFormDefaults::from_draft(&draft),
        "Update Expense",
    );

    let content = html! {
        (nav_bar)
        (form)
    };

    base("Edit Expense", &[currency_input_styles()], &content)
}

/// Renders the page for editing an expense, pre-filled with its current values.
pub async fn get_edit_expense_page(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
    Path(expense_id): Path<String>,
) -> Response {
    let expense_id = ExpenseId::new(expense_id);

    let expense = match find_expense(&state.api, &session.token, &expense_id).await {
        Ok(Some(expense)) => expense,
        Ok(None) => {
            tracing::debug!("Expense {expense_id} not found");
            return NotFoundError {
                description: "Expense not found.",
                fix: "The expense may have been deleted. Go back to the dashboard to see your expenses.",
            }
            .into_response();
        }
        Err(ApiError::Unauthorized) => return session_expired(jar),
        Err(source) => {
            return Error::Api {
                action: "Failed to fetch expense",
                source,
            }
            .into_response();
        }
    };

    // The edit page is not in the navigation bar, so no link is highlighted.
    let nav_bar =
        NavBar::new(endpoints::EDIT_EXPENSE_VIEW).with_display_name(&session.display_name);

    edit_expense_view(nav_bar, &expense).into_response()
}
