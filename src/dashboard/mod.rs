//! Dashboard module
//!
//! Provides an overview page with a chart of spending by category and a
//! paginated table of every expense.

mod charts;
mod handlers;
mod table;

pub use handlers::{DashboardState, get_dashboard_page};
