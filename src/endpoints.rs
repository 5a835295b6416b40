//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}', use [format_endpoint].

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for checking whether an email address is already registered.
pub const CHECK_EMAIL: &str = "/api/auth/check-email";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/auth/log_out";
/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to access a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route for expense totals per category.
pub const EXPENSES_BY_CATEGORY: &str = "/api/expenses/by-category";
/// The route for daily expense totals.
pub const EXPENSES_BY_TIME: &str = "/api/expenses/by-time";
/// The route for monthly expense totals.
pub const EXPENSES_BY_MONTH: &str = "/api/expenses/by-month";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to access a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// `endpoint_path` unchanged.
pub fn format_endpoint(endpoint_path: &str, id: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
