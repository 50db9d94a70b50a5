mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, login_admin_action, setup_failing_server, setup_server, signup_action,
};

const SOME_ID: &str = "00000000-0000-4000-8000-000000000001";

/// Every route behind the admin guard, with a path that is valid to route.
fn admin_routes() -> Vec<(&'static str, String)> {
    vec![
        ("POST", String::from("/api/courses")),
        ("PUT", format!("/api/courses/{SOME_ID}")),
        ("DELETE", format!("/api/courses/{SOME_ID}")),
        ("POST", format!("/api/courses/{SOME_ID}/modules")),
        ("POST", String::from("/api/consultations/slots")),
        ("GET", String::from("/api/consultations/all")),
        ("GET", String::from("/api/users")),
        ("PUT", format!("/api/users/{SOME_ID}/role")),
        ("PUT", format!("/api/users/{SOME_ID}/status")),
    ]
}

fn admin_route_action(name: &'static str, method: &'static str, path: String) -> Action {
    let mut action = Action::new(name, method, "/");
    action.path = path;
    if method != "GET" && method != "DELETE" {
        action = action.with_body(json!({}));
    }
    action
}

#[tokio::test]
async fn route_admin_routes_reject_students_test() {
    let mut server = setup_server().await;

    let mut flow = Flow::new().step(
        signup_action("student@test.com", "password1")
            .with_save_cookies(false)
            .with_save_as("student"),
    );
    for (method, path) in admin_routes() {
        flow = flow.step(
            admin_route_action("admin_route_as_student", method, path)
                .with_bearer_of("student")
                .with_save_cookies(false)
                .with_expect(StatusCode::FORBIDDEN)
                .assert_error("Forbidden - Admin access required"),
        );
    }

    flow.run(&mut server).await;
}

#[tokio::test]
async fn route_admin_routes_require_token_test() {
    let mut server = setup_server().await;

    let mut flow = Flow::new();
    for (method, path) in admin_routes() {
        flow = flow.step(
            admin_route_action("admin_route_anonymous", method, path)
                .with_clear_cookies(true)
                .with_save_cookies(false)
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_error("Unauthorized - No token provided"),
        );
    }

    flow.run(&mut server).await;
}

#[tokio::test]
async fn route_admin_guard_fails_closed_test() {
    let (mut server, store) = setup_failing_server().await;

    // the session cookie carries the admin into the next flow
    Flow::new()
        .step(login_admin_action())
        .step(Action::new("list_users", "GET", "/api/users"))
        .run(&mut server)
        .await;

    // the auth check reads the profile once, the role check is the second read
    store.fail_after(1);

    Flow::new()
        .step(
            Action::new("list_users_store_down", "GET", "/api/users")
                .with_expect(StatusCode::INTERNAL_SERVER_ERROR)
                .assert_error("Failed to verify user role"),
        )
        .run(&mut server)
        .await;
}
