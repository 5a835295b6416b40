//! Recording, editing and listing expenses.

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod list;

pub use core::{
    Expense, ExpenseFields, ExpenseFilter, ExpenseId, QueryWindow, count_expenses,
    count_expenses_with_category, create_expense, create_expense_table, delete_expense,
    get_expense, get_expense_date_bounds, get_expenses, update_expense,
};
pub use create::create_expense_endpoint;
pub use delete::delete_expense_endpoint;
pub use edit::{get_expense_endpoint, update_expense_endpoint};
pub use form::ExpenseForm;
pub use list::{UNKNOWN_CATEGORY_COLOR, UNKNOWN_CATEGORY_NAME, get_expenses_endpoint};
