use maud::{Markup, html};
use time::Date;

use crate::{
    api::{Category, ExpenseDraft, TransactionType},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
};

/// The values an expense form starts with.
pub struct ExpenseFormDefaults<'a> {
    pub title: &'a str,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub date: Date,
    pub description: &'a str,
    pub transaction_type: TransactionType,
}

impl<'a> ExpenseFormDefaults<'a> {
    /// An empty form dated `today`.
    pub fn new(today: Date) -> Self {
        Self {
            title: "",
            amount: None,
            category: None,
            date: today,
            description: "",
            transaction_type: TransactionType::Expense,
        }
    }

    /// A form pre-filled from an existing expense.
    pub fn from_draft(draft: &'a ExpenseDraft) -> Self {
        Self {
            title: &draft.title,
            amount: Some(draft.amount),
            category: Some(draft.category),
            date: draft.date,
            description: &draft.description,
            transaction_type: draft.transaction_type,
        }
    }
}

/// How the form is sent to the server.
pub enum FormAction<'a> {
    /// `hx-post` to the given endpoint.
    Post(&'a str),
    /// `hx-put` to the given endpoint.
    Put(&'a str),
}

fn transaction_type_fields(transaction_type: TransactionType) -> Markup {
    let is_expense = transaction_type == TransactionType::Expense;

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="transaction_type"
                        id="transaction-type-expense"
                        type="radio"
                        value=(TransactionType::Expense.as_str())
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="transaction_type"
                        id="transaction-type-credit"
                        type="radio"
                        value=(TransactionType::Credit.as_str())
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-credit"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Credit"
                    }
                }
            }
        }
    }
}

fn expense_form_fields(defaults: &ExpenseFormDefaults<'_>) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));

    html! {
        div
        {
            label for="title" class=(FORM_LABEL_STYLE) { "Title" }

            input
                name="title"
                id="title"
                type="text"
                placeholder="Title"
                value=(defaults.title)
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.00"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select
                name="category"
                id="category"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" disabled selected[defaults.category.is_none()] { "Select a category" }

                @for category in Category::ALL {
                    option
                        value=(category.as_str())
                        selected[defaults.category == Some(category)]
                    {
                        (category.as_str())
                    }
                }
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                required
                value=(defaults.date)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=(defaults.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        (transaction_type_fields(defaults.transaction_type))
    }
}

/// The create/edit expense form.
///
/// Errors from the endpoint are swapped into the alert container, so the
/// form keeps what the user typed.
pub fn expense_form(
    heading: &str,
    action: FormAction<'_>,
    defaults: &ExpenseFormDefaults<'_>,
    submit_text: &str,
) -> Markup {
    let (hx_post, hx_put) = match action {
        FormAction::Post(endpoint) => (Some(endpoint), None),
        FormAction::Put(endpoint) => (None, Some(endpoint)),
    };
    let spinner = loading_spinner();

    html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=[hx_post]
                hx-put=[hx_put]
                hx-target-error="#alert-container"
                hx-disabled-elt="find button[type=submit]"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { (heading) }

                (expense_form_fields(defaults))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " " (submit_text)
                }
            }
        }
    }
}
