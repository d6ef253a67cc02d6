//! Live room HTTP and WebSocket scenarios.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use classhub_entity::user::UserRole;

use crate::helpers::{TestApp, WsClient};

#[tokio::test]
async fn test_teacher_opens_room_and_class_sees_it_live() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;

    let status = app
        .request(
            "GET",
            &format!("/api/classes/{class_id}/live-status"),
            None,
            Some(&student.token),
        )
        .await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["data"]["is_live"], false);

    let created = app
        .request(
            "POST",
            &format!("/api/classes/{class_id}/live-room"),
            Some(json!({ "room_name": "Algebra review" })),
            Some(&teacher.token),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);
    let room_id = created.body["data"]["room_id"].clone();
    assert!(created.body["data"]["join_token"].is_string());

    let status = app
        .request(
            "GET",
            &format!("/api/classes/{class_id}/live-status"),
            None,
            Some(&student.token),
        )
        .await;
    assert_eq!(status.body["data"]["is_live"], true);
    assert_eq!(status.body["data"]["room_id"], room_id);
    assert_eq!(status.body["data"]["teacher_online"], true);

    // A second create converges on the open room.
    let again = app
        .request(
            "POST",
            &format!("/api/classes/{class_id}/live-room"),
            Some(json!({ "room_name": "Another name" })),
            Some(&student.token),
        )
        .await;
    assert_eq!(again.body["data"]["room_id"], room_id);
}

#[tokio::test]
async fn test_teacher_leave_clears_presence_but_room_stays_open() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;

    let created = app
        .request(
            "POST",
            &format!("/api/classes/{class_id}/live-room"),
            Some(json!({ "room_name": "Office hours" })),
            Some(&teacher.token),
        )
        .await;
    let room_id = created.body["data"]["room_id"]
        .as_str()
        .expect("room_id missing")
        .to_string();

    let joined = app
        .request(
            "POST",
            &format!("/api/live-rooms/{room_id}/join"),
            None,
            Some(&student.token),
        )
        .await;
    assert_eq!(joined.status, StatusCode::OK);

    let left = app
        .request(
            "POST",
            &format!("/api/live-rooms/{room_id}/leave"),
            None,
            Some(&teacher.token),
        )
        .await;
    assert_eq!(left.status, StatusCode::NO_CONTENT);

    let status = app
        .request(
            "GET",
            &format!("/api/classes/{class_id}/live-status"),
            None,
            Some(&student.token),
        )
        .await;
    assert_eq!(status.body["data"]["is_live"], true);
    assert_eq!(status.body["data"]["teacher_online"], false);

    // Last participant leaving closes the room; the beacon form carries the
    // token in the query string.
    let left = app
        .request(
            "POST",
            &format!("/api/live-rooms/{room_id}/leave?token={}", student.token),
            None,
            None,
        )
        .await;
    assert_eq!(left.status, StatusCode::NO_CONTENT);

    let status = app
        .request(
            "GET",
            &format!("/api/classes/{class_id}/live-status"),
            None,
            Some(&student.token),
        )
        .await;
    assert_eq!(status.body["data"]["is_live"], false);

    let rejoin = app
        .request(
            "POST",
            &format!("/api/live-rooms/{room_id}/join"),
            None,
            Some(&student.token),
        )
        .await;
    assert_eq!(rejoin.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ping_returns_no_content() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let class_id = app.create_class(&[&teacher], &[]).await;

    let created = app
        .request(
            "POST",
            &format!("/api/classes/{class_id}/live-room"),
            Some(json!({ "room_name": "Lab" })),
            Some(&teacher.token),
        )
        .await;
    let room_id = created.body["data"]["room_id"]
        .as_str()
        .expect("room_id missing")
        .to_string();

    let ping = app
        .request(
            "POST",
            &format!("/api/live-rooms/{room_id}/ping"),
            None,
            Some(&teacher.token),
        )
        .await;
    assert_eq!(ping.status, StatusCode::NO_CONTENT);

    let missing = app
        .request(
            "POST",
            &format!("/api/live-rooms/{}/ping", uuid::Uuid::new_v4()),
            None,
            Some(&teacher.token),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_room_requests_are_validated_and_authenticated() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let outsider = app.create_user("Eve", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[]).await;
    let path = format!("/api/classes/{class_id}/live-room");

    let unauthenticated = app
        .request("POST", &path, Some(json!({ "room_name": "Lab" })), None)
        .await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unauthenticated.body["error"], "UNAUTHORIZED");

    let blank = app
        .request(
            "POST",
            &path,
            Some(json!({ "room_name": "" })),
            Some(&teacher.token),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["error"], "VALIDATION_ERROR");

    let forbidden = app
        .request(
            "POST",
            &path,
            Some(json!({ "room_name": "Lab" })),
            Some(&outsider.token),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_room_events_answer_only_the_initiator() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;
    let addr = app.spawn_server().await;

    let mut teacher_ws = WsClient::connect(addr, &teacher.token).await;
    let mut student_ws = WsClient::connect(addr, &student.token).await;
    teacher_ws.join_class(class_id).await;
    student_ws.join_class(class_id).await;

    teacher_ws
        .send(json!({
            "type": "create_or_join_room",
            "class_id": class_id,
            "room_name": "Algebra review",
        }))
        .await;
    let joined = teacher_ws.expect("room_joined").await;
    assert!(joined["join_token"].is_string());
    student_ws.expect_silence(Duration::from_millis(300)).await;

    student_ws
        .send(json!({ "type": "get_class_live_status", "class_id": class_id }))
        .await;
    let status = student_ws.expect("live_status").await;
    assert_eq!(status["class_id"], json!(class_id));
    assert_eq!(status["is_live"], true);
    assert_eq!(status["room_id"], joined["room_id"]);
    assert_eq!(status["teacher_online"], true);

    // Pings are fire-and-forget.
    teacher_ws
        .send(json!({ "type": "ping_room", "room_id": joined["room_id"] }))
        .await;
    teacher_ws.expect_silence(Duration::from_millis(300)).await;
}
