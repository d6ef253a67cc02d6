//! Roster sync and health endpoints.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use classhub_core::types::ClassId;
use classhub_entity::user::UserRole;

use crate::helpers::{TestApp, WsClient};

#[tokio::test]
async fn test_admin_sync_creates_conversation_and_admits_members() {
    let app = TestApp::new().await;
    let admin = app.create_user("Registrar", UserRole::Admin).await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = ClassId::new();

    let synced = app
        .request(
            "PUT",
            &format!("/api/classes/{class_id}/roster"),
            Some(json!({
                "teacher_ids": [teacher.id],
                "student_ids": [student.id, student.id],
            })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(synced.status, StatusCode::OK, "{:?}", synced.body);
    assert_eq!(synced.body["data"]["member_count"], 2);

    let addr = app.spawn_server().await;
    let mut ws = WsClient::connect(addr, &student.token).await;
    let conversation_id = ws.join_class(class_id).await;
    assert_eq!(synced.body["data"]["conversation_id"], conversation_id);
}

#[tokio::test]
async fn test_unenrolled_student_loses_access() {
    let app = TestApp::new().await;
    let admin = app.create_user("Registrar", UserRole::Admin).await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;

    app.request(
        "PUT",
        &format!("/api/classes/{class_id}/roster"),
        Some(json!({ "teacher_ids": [teacher.id], "student_ids": [] })),
        Some(&admin.token),
    )
    .await;

    let addr = app.spawn_server().await;
    let mut ws = WsClient::connect(addr, &student.token).await;
    ws.send(json!({ "type": "join_conversation", "class_id": class_id }))
        .await;
    assert_eq!(ws.expect("error").await["code"], "forbidden");
}

#[tokio::test]
async fn test_unenrolling_a_joined_student_closes_the_stream() {
    let app = TestApp::new().await;
    let admin = app.create_user("Registrar", UserRole::Admin).await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;
    let addr = app.spawn_server().await;

    let mut student_ws = WsClient::connect(addr, &student.token).await;
    let conversation_id = student_ws.join_class(class_id).await;
    let mut teacher_ws = WsClient::connect(addr, &teacher.token).await;
    teacher_ws.join_class(class_id).await;

    let synced = app
        .request(
            "PUT",
            &format!("/api/classes/{class_id}/roster"),
            Some(json!({ "teacher_ids": [teacher.id], "student_ids": [] })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(synced.status, StatusCode::OK);
    let left = student_ws.expect("conversation_left").await;
    assert_eq!(left["conversation_id"], conversation_id);

    teacher_ws
        .send(json!({
            "type": "send_message",
            "conversation_id": conversation_id,
            "content": "Grades are posted",
        }))
        .await;
    teacher_ws.expect("new_message").await;
    student_ws.expect_silence(Duration::from_millis(300)).await;

    student_ws
        .send(json!({ "type": "load_messages", "conversation_id": conversation_id }))
        .await;
    assert_eq!(student_ws.expect("error").await["code"], "not_joined");
}

#[tokio::test]
async fn test_roster_sync_is_admin_only() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/classes/{}/roster", ClassId::new()),
            Some(json!({ "teacher_ids": [teacher.id], "student_ids": [] })),
            Some(&teacher.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_reports_backends_and_connections() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let addr = app.spawn_server().await;
    let _ws = WsClient::connect(addr, &teacher.token).await;

    // The socket registers after the upgrade completes.
    let mut active = 0;
    for _ in 0..50 {
        let response = app.request("GET", "/api/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["status"], "ok");
        assert_eq!(response.body["data"]["database"], "ok");
        active = response.body["data"]["realtime"]["connections_active"]
            .as_u64()
            .unwrap_or_default();
        if active == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(active, 1);
}
