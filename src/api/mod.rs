//! The boundary to the remote expense API: wire models and a typed HTTP client.

mod client;
mod models;

pub use client::{ApiClient, ApiError};
pub(crate) use models::DATE_FORMAT;
pub use models::{
    AuthResponse, Category, Expense, ExpenseDraft, ExpenseId, LogInRequest, Registration,
    RegistrationSchema, SpendingDatum, TransactionType, UserProfile,
};
