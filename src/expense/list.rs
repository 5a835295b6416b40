//! The expense listing endpoint, flat or paginated.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PaginationConfig, UserID,
    category::{Category, get_all_categories},
    date_time::{DateBound, parse_date_time},
    db::lock_connection,
    expense::{Expense, ExpenseFilter, QueryWindow, count_expenses, get_expenses},
    pagination::{Page, Pagination},
    timezone::local_offset_or_error,
};

/// The name given to expenses whose category cannot be found.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// The color given to expenses whose category cannot be found.
pub const UNKNOWN_CATEGORY_COLOR: &str = "#CCCCCC";

/// The state needed for listing expenses.
#[derive(Debug, Clone)]
pub struct ListExpensesState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for listing expenses.
///
/// Numbers are kept as strings so that malformed values are reported the
/// same way as other failures instead of being rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExpensesQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// An expense with the name and color of its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedExpense {
    #[serde(flatten)]
    pub expense: Expense,
    pub category_name: String,
    pub category_color: String,
}

/// The response body, depending on whether pagination was requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExpenseListing {
    All(Vec<ListedExpense>),
    Paged(Page<ListedExpense>),
}

/// List the user's expenses, newest first.
///
/// The response is a `{data, pagination}` envelope when `page` or `pageSize`
/// is given, otherwise a plain array optionally capped by `limit`.
pub async fn get_expenses_endpoint(
    State(state): State<ListExpensesState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ListExpensesQuery>,
) -> Response {
    match list_expenses(&state, user_id, &query) {
        Ok(listing) => Json(listing).into_response(),
        Err(error) => error.into_json_response("Failed to fetch expenses"),
    }
}

fn list_expenses(
    state: &ListExpensesState,
    user_id: UserID,
    query: &ListExpensesQuery,
) -> Result<ExpenseListing, Error> {
    let local_offset = local_offset_or_error(&state.local_timezone)?;

    let filter = ExpenseFilter {
        category: query
            .category
            .as_deref()
            .filter(|category| !category.is_empty())
            .map(str::to_owned),
        start: query
            .start_date
            .as_deref()
            .map(|raw| parse_date_time(raw, DateBound::Start, local_offset))
            .transpose()?,
        end: query
            .end_date
            .as_deref()
            .map(|raw| parse_date_time(raw, DateBound::End, local_offset))
            .transpose()?,
    };

    let is_paginated = query.page.is_some() || query.page_size.is_some();

    let connection = lock_connection(&state.db_connection)?;

    if is_paginated {
        let page = parse_positive_integer("page", query.page.as_deref())?
            .unwrap_or(state.pagination_config.default_page);
        let page_size = parse_positive_integer("pageSize", query.page_size.as_deref())?
            .unwrap_or(state.pagination_config.default_page_size);

        let total_items = count_expenses(user_id, &filter, &connection)?;
        let pagination = Pagination::new(total_items, page, page_size);
        let window = QueryWindow {
            limit: page_size,
            offset: pagination.offset(),
        };
        let expenses = get_expenses(user_id, &filter, Some(window), &connection)?;
        let categories = get_all_categories(user_id, &connection)?;

        Ok(ExpenseListing::Paged(Page {
            data: annotate_expenses(expenses, &categories),
            pagination,
        }))
    } else {
        let window = parse_positive_integer("limit", query.limit.as_deref())?
            .map(|limit| QueryWindow { limit, offset: 0 });
        let expenses = get_expenses(user_id, &filter, window, &connection)?;
        let categories = get_all_categories(user_id, &connection)?;

        Ok(ExpenseListing::All(annotate_expenses(expenses, &categories)))
    }
}

/// Parse an optional query parameter that must be a whole number above zero.
///
/// # Errors
///
/// Returns an [Error::InvalidQueryParameter] if `raw` is not a positive integer.
fn parse_positive_integer(name: &'static str, raw: Option<&str>) -> Result<Option<u64>, Error> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(Error::InvalidQueryParameter(name, raw.to_owned())),
    }
}

/// Attach the category name and color to each expense.
///
/// Only exact ID matches count; anything else is labelled as unknown.
fn annotate_expenses(expenses: Vec<Expense>, categories: &[Category]) -> Vec<ListedExpense> {
    let categories_by_id: HashMap<&str, &Category> = categories
        .iter()
        .map(|category| (category.id.as_str(), category))
        .collect();

    expenses
        .into_iter()
        .map(|expense| {
            let (category_name, category_color) =
                match categories_by_id.get(expense.category.as_str()) {
                    Some(category) => (category.name.to_string(), category.color.clone()),
                    None => (
                        UNKNOWN_CATEGORY_NAME.to_owned(),
                        UNKNOWN_CATEGORY_COLOR.to_owned(),
                    ),
                };

            ListedExpense {
                expense,
                category_name,
                category_color,
            }
        })
        .collect()
}

#[cfg(test)]
mod list_expenses_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use serde_json::Value;
    use time::{Date, Month};

    use crate::{
        PaginationConfig, UserID,
        category::{CategoryFields, CategoryName, create_category},
        expense::{ExpenseFields, create_expense},
        test_utils::{get_test_connection, insert_test_user, parse_json},
    };

    use super::{ListExpensesQuery, ListExpensesState, get_expenses_endpoint};

    /// Creates 25 expenses on consecutive days in January 2024, amounts 1 to 25.
    ///
    /// Odd amounts use the "Food" category, even amounts use "food", which
    /// only differs in case from Food's ID.
    fn get_test_state() -> (ListExpensesState, UserID, String) {
        let connection = get_test_connection();
        let user = insert_test_user("jane@example.com", &connection);
        let food = create_category(
            CategoryFields {
                name: CategoryName::new_unchecked("Food"),
                color: Some("#FF0000".to_owned()),
                icon: None,
            },
            user.id,
            &connection,
        )
        .unwrap();

        for day in 1..=25u8 {
            let category = if day % 2 == 1 {
                food.id.clone()
            } else {
                food.id.to_uppercase()
            };
            create_expense(
                ExpenseFields {
                    title: format!("Expense {day}"),
                    amount: f64::from(day),
                    date: Date::from_calendar_date(2024, Month::January, day)
                        .unwrap()
                        .midnight(),
                    category,
                    description: None,
                },
                user.id,
                &connection,
            )
            .unwrap();
        }

        let state = ListExpensesState {
            local_timezone: "Etc/UTC".to_owned(),
            pagination_config: PaginationConfig::default(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user.id, food.id)
    }

    async fn list(state: ListExpensesState, user_id: UserID, query: ListExpensesQuery) -> Value {
        let response = get_expenses_endpoint(State(state), Extension(user_id), Query(query)).await;
        assert_eq!(response.status(), StatusCode::OK);
        parse_json(response).await
    }

    fn amounts(expenses: &Value) -> Vec<f64> {
        expenses
            .as_array()
            .unwrap()
            .iter()
            .map(|expense| expense["amount"].as_f64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn lists_all_expenses_newest_first() {
        let (state, user_id, _) = get_test_state();

        let body = list(state, user_id, ListExpensesQuery::default()).await;

        let got = amounts(&body);
        assert_eq!(got.len(), 25);
        assert_eq!(got[0], 25.0);
        assert_eq!(got[24], 1.0);
    }

    #[tokio::test]
    async fn limit_caps_flat_list() {
        let (state, user_id, _) = get_test_state();

        let body = list(
            state,
            user_id,
            ListExpensesQuery {
                limit: Some("3".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(amounts(&body), [25.0, 24.0, 23.0]);
    }

    #[tokio::test]
    async fn annotates_exact_category_matches_only() {
        let (state, user_id, food_id) = get_test_state();

        let body = list(
            state,
            user_id,
            ListExpensesQuery {
                limit: Some("2".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(body[0]["category"], food_id.as_str());
        assert_eq!(body[0]["categoryName"], "Food");
        assert_eq!(body[0]["categoryColor"], "#FF0000");
        assert_eq!(body[1]["category"], food_id.to_uppercase().as_str());
        assert_eq!(body[1]["categoryName"], "Unknown");
        assert_eq!(body[1]["categoryColor"], "#CCCCCC");
    }

    #[tokio::test]
    async fn paginates_with_metadata() {
        let (state, user_id, _) = get_test_state();

        let body = list(
            state,
            user_id,
            ListExpensesQuery {
                page: Some("3".to_owned()),
                page_size: Some("10".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(amounts(&body["data"]), [5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(body["pagination"]["totalItems"], 25);
        assert_eq!(body["pagination"]["totalPages"], 3);
        assert_eq!(body["pagination"]["currentPage"], 3);
        assert_eq!(body["pagination"]["pageSize"], 10);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let (state, user_id, _) = get_test_state();

        let body = list(
            state,
            user_id,
            ListExpensesQuery {
                page: Some("4".to_owned()),
                page_size: Some("10".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(body["data"], serde_json::json!([]));
        assert_eq!(body["pagination"]["totalItems"], 25);
        assert_eq!(body["pagination"]["totalPages"], 3);
        assert_eq!(body["pagination"]["currentPage"], 4);
    }

    #[tokio::test]
    async fn huge_page_is_empty_and_keeps_connection_usable() {
        let (state, user_id, _) = get_test_state();

        let body = list(
            state.clone(),
            user_id,
            ListExpensesQuery {
                page: Some("9223372036854775807".to_owned()),
                page_size: Some("10".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(body["data"], Value::Array(Vec::new()));
        assert_eq!(body["pagination"]["totalItems"], 25);
        assert_eq!(body["pagination"]["totalPages"], 3);
        assert!(!state.db_connection.is_poisoned());

        let body = list(state, user_id, ListExpensesQuery::default()).await;
        assert_eq!(amounts(&body).len(), 25);
    }

    #[tokio::test]
    async fn page_size_alone_uses_default_page() {
        let (state, user_id, _) = get_test_state();

        let body = list(
            state,
            user_id,
            ListExpensesQuery {
                page_size: Some("5".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(amounts(&body["data"]), [25.0, 24.0, 23.0, 22.0, 21.0]);
        assert_eq!(body["pagination"]["currentPage"], 1);
        assert_eq!(body["pagination"]["totalPages"], 5);
    }

    #[tokio::test]
    async fn filters_by_category_and_date() {
        let (state, user_id, food_id) = get_test_state();

        let body = list(
            state,
            user_id,
            ListExpensesQuery {
                category: Some(food_id),
                start_date: Some("2024-01-05".to_owned()),
                end_date: Some("2024-01-09".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(amounts(&body), [9.0, 7.0, 5.0]);
    }

    #[tokio::test]
    async fn malformed_numbers_are_server_errors() {
        for query in [
            ListExpensesQuery {
                page: Some("abc".to_owned()),
                ..Default::default()
            },
            ListExpensesQuery {
                page_size: Some("0".to_owned()),
                ..Default::default()
            },
            ListExpensesQuery {
                limit: Some("-1".to_owned()),
                ..Default::default()
            },
        ] {
            let (state, user_id, _) = get_test_state();

            let response =
                get_expenses_endpoint(State(state), Extension(user_id), Query(query)).await;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                parse_json(response).await["error"],
                "Failed to fetch expenses"
            );
        }
    }

    #[tokio::test]
    async fn malformed_date_is_a_server_error() {
        let (state, user_id, _) = get_test_state();

        let response = get_expenses_endpoint(
            State(state),
            Extension(user_id),
            Query(ListExpensesQuery {
                start_date: Some("yesterday".to_owned()),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            parse_json(response).await["error"],
            "Failed to fetch expenses"
        );
    }
}
