//! The paginated table of expenses on the dashboard.

use maud::{Markup, html};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    api::{Expense, TransactionType},
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, format_currency,
    },
    pagination::PaginationIndicator,
};

/// The max number of graphemes to display in the table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

const DATE_ATTRIBUTE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// An expense formatted for display in the table.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ExpenseTableRow {
    pub title: String,
    pub amount: f64,
    pub category: &'static str,
    pub date: Date,
    pub description: String,
    pub transaction_type: TransactionType,
    pub edit_url: String,
    pub delete_url: String,
}

impl ExpenseTableRow {
    pub fn new_from_expense(expense: &Expense) -> Self {
        Self {
            title: expense.title.clone(),
            amount: expense.amount,
            category: expense.category.as_str(),
            date: expense.date,
            description: expense.description.clone(),
            transaction_type: expense.transaction_type,
            edit_url: format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id.as_str()),
            delete_url: format_endpoint(endpoints::EXPENSE_API, expense.id.as_str()),
        }
    }
}

fn amount_class(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Expense => "text-red-700 dark:text-red-300",
        TransactionType::Credit => "text-green-700 dark:text-green-300",
    }
}

fn type_label(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Expense => "Expense",
        TransactionType::Credit => "Credit",
    }
}

fn date_datetime_attr(date: Date) -> String {
    date.format(DATE_ATTRIBUTE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Truncate long descriptions, returning the full text as a tooltip when
/// anything was cut off.
fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(description))
    }
}

fn table_row(row: &ExpenseTableRow) -> Markup {
    let (description, tooltip) = format_description(&row.description);
    let confirm_message = format!(
        "Are you sure you want to delete the expense '{}'? This cannot be undone.",
        row.title
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-expense-row="true"
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (row.title)
            }

            td class={ "px-6 py-4 text-right " (amount_class(row.transaction_type)) }
            {
                (format_currency(row.amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(BADGE_STYLE) { (row.category) }
            }

            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(date_datetime_attr(row.date)) { (row.date) }
            }

            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }

            td class=(TABLE_CELL_STYLE) { (type_label(row.transaction_type)) }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(row.edit_url) class=(LINK_STYLE) { "Edit" }

                    button
                        type="button"
                        hx-delete=(row.delete_url)
                        hx-confirm=(confirm_message)
                        hx-target-error="#alert-container"
                        hx-swap="none"
                        hx-disabled-elt="this"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// The table of expenses on the current page.
pub(super) fn expenses_table(rows: &[ExpenseTableRow]) -> Markup {
    html! {
        div class="w-full overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for row in rows {
                        (table_row(row))
                    }

                    @if rows.is_empty() {
                        tr
                        {
                            td
                                colspan="7"
                                data-empty-state="true"
                                class="px-6 py-4 text-center"
                            {
                                "No expenses yet. Add one "
                                a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "here" }
                                "."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn page_url(page: u64) -> String {
    format!("{}?page={page}", endpoints::DASHBOARD_VIEW)
}

/// The page links below the table.
pub(super) fn pagination_view(indicators: &[PaginationIndicator]) -> Markup {
    let link_style = "block px-3 py-2 rounded-sm text-blue-600 hover:underline";

    html! {
        nav class="pagination flex justify-center"
        {
            ul class="pagination flex gap-2 p-0 m-0 items-center"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(link_style) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                p
                                    aria-current="page"
                                    class="block px-3 py-2 rounded-sm font-bold text-black dark:text-white"
                                {
                                    (page)
                                }
                            }
                            PaginationIndicator::Ellipsis => {
                                p class="px-3 py-2" { "..." }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) role="button" class=(link_style) { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) role="button" class=(link_style) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}
