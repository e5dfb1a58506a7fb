//! Shared state, form parsing and API helpers for the expense pages and endpoints.

use axum::{extract::FromRef, response::Response};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    api::{
        ApiClient, ApiError, Category, DATE_FORMAT, Expense, ExpenseDraft, ExpenseId,
        TransactionType,
    },
    auth::session_expired_hx,
};

/// Shown when one of the required expense fields is blank.
pub const MISSING_REQUIRED_FIELDS_MSG: &str = "Amount, Category, and Date are required.";
/// Shown when the amount is not a number.
pub const INVALID_AMOUNT_MSG: &str = "Amount must be a number.";
/// Shown when the date is not a calendar date.
pub const INVALID_DATE_MSG: &str = "Date must be a valid date, e.g. 2024-01-31.";

/// The state needed by the expense pages and endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The client for the remote expense API.
    pub api: ApiClient,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            api: state.api.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ExpenseState> for Key {
    fn from_ref(state: &ExpenseState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for creating or updating an expense.
///
/// Every field is kept as the raw text the browser sent so that missing and
/// malformed values can be reported to the user instead of rejected by the
/// extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub transaction_type: String,
}

impl ExpenseForm {
    /// Check the form and convert it into the body of an add or update request.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidExpense] with a message for the user if the
    /// amount, category or date is missing or malformed.
    pub fn validate(&self) -> Result<ExpenseDraft, Error> {
        let amount = self.amount.trim();
        let category = self.category.trim();
        let date = self.date.trim();

        if amount.is_empty() || category.is_empty() || date.is_empty() {
            return Err(Error::InvalidExpense(MISSING_REQUIRED_FIELDS_MSG.to_owned()));
        }

        let amount = amount
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| Error::InvalidExpense(INVALID_AMOUNT_MSG.to_owned()))?;

        let category = Category::parse(category)
            .ok_or_else(|| Error::InvalidExpense(format!("Unknown category \"{category}\".")))?;

        let date = Date::parse(date, DATE_FORMAT)
            .map_err(|_| Error::InvalidExpense(INVALID_DATE_MSG.to_owned()))?;

        let transaction_type = match self.transaction_type.trim() {
            "credit" => TransactionType::Credit,
            _ => TransactionType::Expense,
        };

        Ok(ExpenseDraft {
            title: self.title.trim().to_owned(),
            amount,
            category,
            date,
            description: self.description.trim().to_owned(),
            transaction_type,
        })
    }
}

/// Fetch the full list and pick out the expense with `id`.
///
/// The API has no endpoint for a single expense.
pub(super) async fn find_expense(
    api: &ApiClient,
    token: &str,
    id: &ExpenseId,
) -> Result<Option<Expense>, ApiError> {
    let expenses = api.list_expenses(token).await?;

    Ok(expenses.into_iter().find(|expense| &expense.id == id))
}

/// The htmx response for a failed call to the API.
///
/// A rejected session token logs the user out, anything else is shown as an
/// alert with `action` as the fallback message.
pub(super) fn api_error_response(
    error: ApiError,
    action: &'static str,
    jar: PrivateCookieJar,
) -> Response {
    match error {
        ApiError::Unauthorized => session_expired_hx(jar),
        source => Error::Api { action, source }.into_alert_response(),
    }
}
