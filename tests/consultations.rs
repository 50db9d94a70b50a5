mod common;
use axum::http::StatusCode;
use chrono::{Days, Utc};
use serde_json::json;

use crate::common::{Action, Flow, login_admin_action, setup_server, signup_action};

fn date_from_today(days: i64) -> String {
    let today = Utc::now().date_naive();
    let date = if days >= 0 {
        today.checked_add_days(Days::new(days as u64))
    } else {
        today.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    date.unwrap().to_string()
}

fn create_slot_action(days: i64, time: &str, key: &'static str) -> Action {
    Action::new("create_slot", "POST", "/api/consultations/slots")
        .with_body(json!({
            "date": date_from_today(days),
            "time": time,
            "duration_minutes": 30,
        }))
        .with_bearer_of("admin")
        .with_save_cookies(false)
        .with_expect(StatusCode::CREATED)
        .with_save_as(key)
}

fn book_action(user_key: &'static str, slot_key: &'static str) -> Action {
    Action::new("book", "POST", "/api/consultations/book")
        .with_dyn_body(move |ctx| {
            json!({
                "slot_id": ctx.str_at(slot_key, "/slot/id"),
                "topic": "Career advice",
                "description": "Switching to Rust",
            })
        })
        .with_bearer_of(user_key)
        .with_save_cookies(false)
}

fn cancel_action(user_key: &'static str, booking_key: &'static str) -> Action {
    Action::new("cancel", "POST", "/api/consultations/{id}/cancel")
        .with_dyn_path(move |ctx| {
            format!(
                "/api/consultations/{}/cancel",
                ctx.str_at(booking_key, "/booking/id")
            )
        })
        .with_bearer_of(user_key)
        .with_save_cookies(false)
}

#[tokio::test]
async fn route_slot_listing_test() {
    let mut server = setup_server().await;

    Flow::new()
        .step(login_admin_action().with_save_cookies(false).with_save_as("admin"))
        .step(create_slot_action(3, "09:00:00", "later"))
        .step(create_slot_action(1, "15:30:00", "sooner"))
        .step(create_slot_action(-1, "10:00:00", "past"))
        .step(
            Action::new("list_slots", "GET", "/api/consultations/slots").assert_body(|body| {
                let slots = body["slots"].as_array().unwrap();
                assert_eq!(slots.len(), 2);
                assert_eq!(slots[0]["date"], date_from_today(1));
                assert_eq!(slots[1]["date"], date_from_today(3));
                assert!(slots.iter().all(|s| s["is_booked"] == false));
            }),
        )
        .step(
            Action::new("slot_missing_time", "POST", "/api/consultations/slots")
                .with_body(json!({ "date": date_from_today(2) }))
                .with_bearer_of("admin")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_error("Date and time are required"),
        )
        .run(&mut server)
        .await;
}

#[tokio::test]
async fn route_booking_test() {
    let mut server = setup_server().await;

    Flow::new()
        .step(login_admin_action().with_save_cookies(false).with_save_as("admin"))
        .step(create_slot_action(2, "11:00:00", "slot"))
        .step(create_slot_action(-2, "11:00:00", "past"))
        .step(
            signup_action("first@test.com", "password1")
                .with_save_cookies(false)
                .with_save_as("first"),
        )
        .step(
            signup_action("second@test.com", "password1")
                .with_save_cookies(false)
                .with_save_as("second"),
        )
        .step(
            book_action("first", "slot")
                .with_expect(StatusCode::CREATED)
                .with_save_as("booking")
                .assert_body(|body| {
                    assert_eq!(body["message"], "Consultation booked successfully");
                    assert_eq!(body["booking"]["status"], "scheduled");
                    assert_eq!(body["booking"]["topic"], "Career advice");
                }),
        )
        // the slot is gone for everyone else
        .step(
            book_action("second", "slot")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_error("This slot is no longer available"),
        )
        .step(
            book_action("second", "past")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_error("This slot is no longer available"),
        )
        .step(
            Action::new("book_missing_topic", "POST", "/api/consultations/book")
                .with_dyn_body(|ctx| json!({ "slot_id": ctx.str_at("slot", "/slot/id") }))
                .with_bearer_of("second")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_error("Slot ID and topic are required"),
        )
        .step(
            Action::new("book_unknown_slot", "POST", "/api/consultations/book")
                .with_body(json!({ "slot_id": uuid::Uuid::new_v4(), "topic": "Anything" }))
                .with_bearer_of("second")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("slots_after_booking", "GET", "/api/consultations/slots")
                .assert_body(|body| assert_eq!(body["slots"], json!([]))),
        )
        .step(
            Action::new("my_consultations", "GET", "/api/consultations/my-consultations")
                .with_bearer_of("first")
                .assert_body(|body| {
                    let consultations = body["consultations"].as_array().unwrap();
                    assert_eq!(consultations.len(), 1);
                    assert_eq!(consultations[0]["slot"]["time"], "11:00:00");
                }),
        )
        .step(
            Action::new("others_consultations", "GET", "/api/consultations/my-consultations")
                .with_bearer_of("second")
                .assert_body(|body| assert_eq!(body["consultations"], json!([]))),
        )
        .run(&mut server)
        .await;
}

#[tokio::test]
async fn route_cancel_test() {
    let mut server = setup_server().await;

    Flow::new()
        .step(login_admin_action().with_save_cookies(false).with_save_as("admin"))
        .step(create_slot_action(1, "14:00:00", "slot"))
        .step(
            signup_action("owner@test.com", "password1")
                .with_save_cookies(false)
                .with_save_as("owner"),
        )
        .step(
            signup_action("intruder@test.com", "password1")
                .with_save_cookies(false)
                .with_save_as("intruder"),
        )
        .step(
            book_action("owner", "slot")
                .with_expect(StatusCode::CREATED)
                .with_save_as("booking"),
        )
        // not the owner: indistinguishable from a missing booking
        .step(
            cancel_action("intruder", "booking")
                .with_expect(StatusCode::NOT_FOUND)
                .assert_error("Consultation not found or not authorized"),
        )
        .step(
            cancel_action("owner", "booking")
                .assert_body(|body| {
                    assert_eq!(body["message"], "Consultation cancelled successfully")
                }),
        )
        .step(
            cancel_action("owner", "booking")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_error("Only scheduled consultations can be cancelled"),
        )
        // cancelling released the slot
        .step(
            Action::new("slots_after_cancel", "GET", "/api/consultations/slots")
                .assert_body(|body| {
                    assert_eq!(body["slots"].as_array().unwrap().len(), 1);
                }),
        )
        .step(book_action("intruder", "slot").with_expect(StatusCode::CREATED))
        .step(
            Action::new("all_consultations", "GET", "/api/consultations/all")
                .with_bearer_of("admin")
                .assert_body(|body| {
                    let statuses: Vec<_> = body["consultations"]
                        .as_array()
                        .unwrap()
                        .iter()
                        .map(|c| c["status"].as_str().unwrap().to_string())
                        .collect();
                    assert_eq!(statuses, ["scheduled", "cancelled"]);
                }),
        )
        .step(
            Action::new("all_as_student", "GET", "/api/consultations/all")
                .with_bearer_of("owner")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server)
        .await;
}

#[tokio::test]
async fn route_admin_cancels_any_booking_test() {
    let mut server = setup_server().await;

    Flow::new()
        .step(login_admin_action().with_save_cookies(false).with_save_as("admin"))
        .step(create_slot_action(5, "08:00:00", "slot"))
        .step(
            signup_action("booker@test.com", "password1")
                .with_save_cookies(false)
                .with_save_as("booker"),
        )
        .step(
            book_action("booker", "slot")
                .with_expect(StatusCode::CREATED)
                .with_save_as("booking"),
        )
        .step(cancel_action("admin", "booking"))
        .run(&mut server)
        .await;
}
