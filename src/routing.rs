//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState,
    auth::{auth_guard, check_email, post_log_in, post_log_out, register_user},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        get_category_endpoint, update_category_endpoint,
    },
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
        get_expenses_endpoint, update_expense_endpoint,
    },
    not_found::get_404_not_found,
    report::{get_expenses_by_category, get_expenses_by_month, get_expenses_by_time},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::CHECK_EMAIL, post(check_email))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::EXPENSES,
            get(get_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .route(
            endpoints::EXPENSES_BY_CATEGORY,
            get(get_expenses_by_category),
        )
        .route(endpoints::EXPENSES_BY_TIME, get(get_expenses_by_time))
        .route(endpoints::EXPENSES_BY_MONTH, get(get_expenses_by_month))
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({ "message": "I'm a teapot" })),
    )
        .into_response()
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, PaginationConfig, auth::COOKIE_TOKEN, endpoints, routing::build_router};

    const PASSWORD: &str = "thisisaverysecurepassword!!!!";

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "routing secret",
            "Etc/UTC",
            PaginationConfig::default(),
        )
        .expect("Could not create app state");

        TestServer::new(build_router(state)).expect("Could not create test server.")
    }

    async fn register_and_log_in(server: &TestServer, email: &str) -> Cookie<'static> {
        server
            .post(endpoints::REGISTER)
            .json(&json!({"name": "Jane", "email": email, "password": PASSWORD}))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": email, "password": PASSWORD}))
            .await;
        response.assert_status_ok();

        response.cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn coffee_is_a_teapot() {
        let server = get_test_server();

        server
            .get(endpoints::COFFEE)
            .await
            .assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nothing-here").await;

        response.assert_status_not_found();
        response.assert_json(&json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn protected_routes_need_a_session() {
        let server = get_test_server();

        for path in [
            endpoints::EXPENSES,
            endpoints::EXPENSES_BY_CATEGORY,
            endpoints::EXPENSES_BY_TIME,
            endpoints::EXPENSES_BY_MONTH,
            endpoints::CATEGORIES,
        ] {
            let response = server.get(path).await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            response.assert_json(&json!({"error": "Unauthorized"}));
        }
    }

    #[tokio::test]
    async fn report_routes_are_not_treated_as_expense_ids() {
        let server = get_test_server();
        let cookie = register_and_log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::EXPENSES_BY_MONTH)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>().as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn category_and_expense_lifecycle() {
        let server = get_test_server();
        let cookie = register_and_log_in(&server, "jane@example.com").await;

        let category: Value = server
            .post(endpoints::CATEGORIES)
            .add_cookie(cookie.clone())
            .json(&json!({"name": "Food", "color": "#FF0000"}))
            .await
            .json();
        let category_id = category["id"].as_str().unwrap().to_owned();

        let response = server
            .post(endpoints::EXPENSES)
            .add_cookie(cookie.clone())
            .json(&json!({
                "title": "Lunch",
                "amount": 50,
                "date": "2024-01-02",
                "category": category_id,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let expense_id = response.json::<Value>()["id"].as_str().unwrap().to_owned();

        let response = server
            .get(endpoints::EXPENSES_BY_CATEGORY)
            .add_query_param("period", "custom")
            .add_query_param("startDate", "2024-01-01")
            .add_query_param("endDate", "2024-01-31")
            .add_cookie(cookie.clone())
            .await;
        response.assert_status_ok();
        response.assert_json(&json!([
            {"categoryId": category_id, "name": "Food", "color": "#FF0000", "amount": 50.0}
        ]));

        let category_path = endpoints::format_endpoint(endpoints::CATEGORY, &category_id);
        let response = server
            .delete(&category_path)
            .add_cookie(cookie.clone())
            .await;
        response.assert_status_bad_request();
        response.assert_json(
            &json!({"error": "Cannot delete category that is being used by expenses"}),
        );

        let expense_path = endpoints::format_endpoint(endpoints::EXPENSE, &expense_id);
        server
            .delete(&expense_path)
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();

        server
            .delete(&category_path)
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();

        server
            .get(&category_path)
            .add_cookie(cookie)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn users_cannot_see_each_others_expenses() {
        let server = get_test_server();
        let jane = register_and_log_in(&server, "jane@example.com").await;
        let john = register_and_log_in(&server, "john@example.com").await;

        let response = server
            .post(endpoints::EXPENSES)
            .add_cookie(jane)
            .json(&json!({
                "title": "Lunch",
                "amount": 12.5,
                "date": "2024-01-02T12:30",
                "category": "food",
            }))
            .await;
        let expense_id = response.json::<Value>()["id"].as_str().unwrap().to_owned();

        server
            .get(&endpoints::format_endpoint(endpoints::EXPENSE, &expense_id))
            .add_cookie(john.clone())
            .await
            .assert_status_not_found();

        let response = server.get(endpoints::EXPENSES).add_cookie(john).await;
        response.assert_status_ok();
        response.assert_json(&json!([]));
    }
}
