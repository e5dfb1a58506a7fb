//! Defines the route handler for the page for creating a new expense.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    auth::Session,
    endpoints,
    html::{base, currency_input_styles},
    navigation::NavBar,
    timezone::local_today,
};

use super::{
    core::ExpenseState,
    form::{ExpenseFormDefaults, FormAction, expense_form},
};

fn create_expense_view(nav_bar: NavBar, today: Date) -> Markup {
    let nav_bar = nav_bar.into_html();
    let form = expense_form(
        "New Expense",
        FormAction::Post(endpoints::EXPENSES_API),
        &ExpenseFormDefaults::new(today),
        "Add Expense",
    );

    let content = html! {
        (nav_bar)
        (form)
    };

    base("Add Expense", &[currency_input_styles()], &content)
}

/// Renders the page for creating an expense, dated today in the local timezone.
pub async fn get_new_expense_page(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
) -> Response {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let nav_bar =
        NavBar::new(endpoints::NEW_EXPENSE_VIEW).with_display_name(&session.display_name);

    create_expense_view(nav_bar, today).into_response()
}
