//! Dashboard HTTP handler and view rendering.

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState,
    alert::{Alert, take_notice},
    api::{ApiClient, ApiError, Expense, SpendingDatum},
    auth::{Session, session_expired},
    dashboard::{
        charts::{DashboardChart, charts_script, charts_view, spending_chart},
        table::{ExpenseTableRow, expenses_table, pagination_view},
    },
    endpoints,
    html::{HeadElement, LINK_STYLE, base},
    navigation::NavBar,
    pagination::{
        PaginationConfig, clamp_page, create_pagination_indicators, page_count, page_slice,
    },
};

const EXPENSES_FALLBACK_ERROR_MSG: &str = "Failed to fetch expenses";
const METRICS_FALLBACK_ERROR_MSG: &str = "Failed to fetch spending metrics";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The client for the remote expense API.
    pub api: ApiClient,
    /// How the expense table is split into pages.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            api: state.api.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.cookie_key.clone()
    }
}

/// The query parameters of the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The 1-based page of the expense table to show.
    pub page: Option<u64>,
}

/// Display the spending chart and a page of the user's expenses.
///
/// The expenses and spending metrics are fetched concurrently. If one of them
/// fails the page is still rendered with whatever was fetched, along with an
/// alert explaining what is missing. A success message queued by the last
/// create, update or delete is shown once and then cleared.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let (expenses, spending) = tokio::join!(
        state.api.list_expenses(&session.token),
        state.api.spending_metrics(&session.token)
    );

    if matches!(expenses, Err(ApiError::Unauthorized))
        || matches!(spending, Err(ApiError::Unauthorized))
    {
        return session_expired(jar);
    }

    let (jar, notice) = take_notice(jar);
    let mut alerts: Vec<Alert> = notice.into_iter().collect();

    let expenses = expenses.unwrap_or_else(|error| {
        tracing::error!("Could not fetch expenses: {error}");
        alerts.push(fetch_error_alert(&error, EXPENSES_FALLBACK_ERROR_MSG));
        Vec::new()
    });

    let spending = spending
        .inspect_err(|error| {
            tracing::error!("Could not fetch spending metrics: {error}");
            alerts.push(fetch_error_alert(error, METRICS_FALLBACK_ERROR_MSG));
        })
        .ok();

    let view = dashboard_view(
        NavBar::new(endpoints::DASHBOARD_VIEW).with_display_name(&session.display_name),
        &expenses,
        spending.as_deref(),
        &alerts,
        query.page.or(Some(state.pagination_config.default_page)),
        &state.pagination_config,
    );

    (jar, view).into_response()
}

fn fetch_error_alert(error: &ApiError, fallback: &str) -> Alert {
    Alert::Error {
        message: fallback.to_owned(),
        details: error.user_message(""),
    }
}

fn dashboard_view(
    nav_bar: NavBar,
    expenses: &[Expense],
    spending: Option<&[SpendingDatum]>,
    alerts: &[Alert],
    page: Option<u64>,
    pagination_config: &PaginationConfig,
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let page_size = pagination_config.default_page_size;
    let page_count = page_count(expenses.len(), page_size);
    let curr_page = clamp_page(page, page_count);
    let rows: Vec<ExpenseTableRow> = page_slice(expenses, curr_page, page_size)
        .iter()
        .map(ExpenseTableRow::new_from_expense)
        .collect();
    let indicators =
        create_pagination_indicators(curr_page, page_count, pagination_config.max_pages);

    let charts = match spending {
        Some(spending) if !spending.is_empty() => vec![DashboardChart {
            id: "spending-chart",
            options: spending_chart(spending).to_string(),
        }],
        _ => Vec::new(),
    };

    let content = html!(
        (nav_bar)

        main
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            header class="flex justify-between flex-wrap items-end w-full mb-4"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                {
                    "Add Expense"
                }
            }

            @if !alerts.is_empty() {
                div id="dashboard-alerts" class="w-full"
                {
                    @for alert in alerts {
                        (alert.clone().into_html())
                    }
                }
            }

            @if !charts.is_empty() {
                (charts_view(&charts))
            } @else if spending.is_some() {
                p class="mb-4 text-gray-500 dark:text-gray-400"
                {
                    "Your spending chart will show up here once you add some expenses."
                }
            }

            section id="expenses" class="w-full space-y-4"
            {
                h2 class="text-lg font-semibold" { "Transactions" }

                (expenses_table(&rows))

                @if page_count > 1 {
                    (pagination_view(&indicators))
                }
            }
        }
    );

    let scripts = if charts.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            charts_script(&charts),
        ]
    };

    base("Dashboard", &scripts, &content)
}
