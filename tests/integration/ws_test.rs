//! WebSocket messaging scenarios.

use std::time::Duration;

use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as WsError;

use classhub_entity::user::UserRole;

use crate::helpers::{TestApp, WsClient};

const QUIET: Duration = Duration::from_millis(300);

#[tokio::test]
async fn test_upgrade_rejected_without_valid_token() {
    let app = TestApp::new().await;
    let addr = app.spawn_server().await;

    let err = connect_async(format!("ws://{addr}/ws?token=not-a-jwt"))
        .await
        .expect_err("upgrade should be refused");
    match err {
        WsError::Http(response) => assert_eq!(response.status().as_u16(), 401),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect_err("upgrade should be refused");
    match err {
        WsError::Http(response) => assert_eq!(response.status().as_u16(), 401),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_send_message_reaches_every_joined_member() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;
    let addr = app.spawn_server().await;

    let mut teacher_ws = WsClient::connect(addr, &teacher.token).await;
    let mut student_ws = WsClient::connect(addr, &student.token).await;
    let conversation_id = teacher_ws.join_class(class_id).await;
    student_ws.join_class(class_id).await;

    student_ws
        .send(json!({
            "type": "send_message",
            "conversation_id": conversation_id,
            "content": "  Is the quiz on Friday?  ",
        }))
        .await;

    for ws in [&mut teacher_ws, &mut student_ws] {
        let event = ws.expect("new_message").await;
        let message = &event["message"];
        assert_eq!(message["content"], "Is the quiz on Friday?");
        assert_eq!(message["kind"], "text");
        assert_eq!(message["sender"]["id"], json!(student.id));
        assert_eq!(message["sender"]["display_name"], "Sam");
    }
}

#[tokio::test]
async fn test_roster_lists_members_on_join() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;
    let addr = app.spawn_server().await;

    let mut ws = WsClient::connect(addr, &student.token).await;
    ws.send(json!({ "type": "join_conversation", "class_id": class_id }))
        .await;
    let joined = ws.expect("conversation_joined").await;

    let members = joined["members"].as_array().expect("members missing");
    assert_eq!(members.len(), 2);
    assert!(members.iter().any(|m| m["display_name"] == "Ms. Rivera"));
}

#[tokio::test]
async fn test_outsider_cannot_join() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let outsider = app.create_user("Eve", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[]).await;
    let addr = app.spawn_server().await;

    let mut ws = WsClient::connect(addr, &outsider.token).await;
    ws.send(json!({ "type": "join_conversation", "class_id": class_id }))
        .await;
    let error = ws.expect("error").await;
    assert_eq!(error["code"], "forbidden");
    assert_eq!(error["request"], "join_conversation");
}

#[tokio::test]
async fn test_events_require_joined_conversation() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let class_id = app.create_class(&[&teacher], &[]).await;
    let conversation = app.conversation_of(class_id).await;
    let addr = app.spawn_server().await;

    let mut ws = WsClient::connect(addr, &teacher.token).await;
    ws.send(json!({
        "type": "send_message",
        "conversation_id": conversation,
        "content": "hello",
    }))
    .await;
    let error = ws.expect("error").await;
    assert_eq!(error["code"], "not_joined");
}

#[tokio::test]
async fn test_history_pages_back_from_newest() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let class_id = app.create_class(&[&teacher], &[]).await;
    let addr = app.spawn_server().await;

    let mut ws = WsClient::connect(addr, &teacher.token).await;
    let conversation_id = ws.join_class(class_id).await;
    for i in 1..=25 {
        ws.send(json!({
            "type": "send_message",
            "conversation_id": conversation_id,
            "content": format!("m{i}"),
        }))
        .await;
        ws.expect("new_message").await;
    }

    ws.send(json!({ "type": "load_messages", "conversation_id": conversation_id }))
        .await;
    let page = ws.expect("messages_loaded").await;
    let messages = page["messages"].as_array().expect("messages missing");
    assert_eq!(messages.len(), 20);
    assert_eq!(page["has_more"], true);
    assert_eq!(messages[0]["content"], "m6");
    assert_eq!(messages[19]["content"], "m25");

    let oldest = messages[0]["id"].clone();
    ws.send(json!({
        "type": "load_messages",
        "conversation_id": conversation_id,
        "before": oldest,
    }))
    .await;
    let page = ws.expect("messages_loaded").await;
    let messages = page["messages"].as_array().expect("messages missing");
    assert_eq!(messages.len(), 5);
    assert_eq!(page["has_more"], false);
    assert_eq!(messages[0]["content"], "m1");
    assert_eq!(messages[4]["content"], "m5");
}

#[tokio::test]
async fn test_mark_read_is_not_echoed_to_reader() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;
    let addr = app.spawn_server().await;

    let mut teacher_ws = WsClient::connect(addr, &teacher.token).await;
    let mut student_ws = WsClient::connect(addr, &student.token).await;
    let conversation_id = teacher_ws.join_class(class_id).await;
    student_ws.join_class(class_id).await;

    teacher_ws
        .send(json!({
            "type": "send_message",
            "conversation_id": conversation_id,
            "content": "Read chapter 4",
        }))
        .await;
    let message_id = teacher_ws.expect("new_message").await["message"]["id"].clone();
    student_ws.expect("new_message").await;

    student_ws
        .send(json!({
            "type": "mark_read",
            "conversation_id": conversation_id,
            "message_id": message_id,
        }))
        .await;

    let read = teacher_ws.expect("message_read").await;
    assert_eq!(read["user_id"], json!(student.id));
    assert_eq!(read["message_id"], message_id);
    student_ws.expect_silence(QUIET).await;
}

#[tokio::test]
async fn test_edit_by_non_owner_is_silent() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;
    let addr = app.spawn_server().await;

    let mut teacher_ws = WsClient::connect(addr, &teacher.token).await;
    let mut student_ws = WsClient::connect(addr, &student.token).await;
    let conversation_id = teacher_ws.join_class(class_id).await;
    student_ws.join_class(class_id).await;

    teacher_ws
        .send(json!({
            "type": "send_message",
            "conversation_id": conversation_id,
            "content": "original",
        }))
        .await;
    let message_id = teacher_ws.expect("new_message").await["message"]["id"].clone();
    student_ws.expect("new_message").await;

    student_ws
        .send(json!({ "type": "edit_message", "message_id": message_id, "content": "hijacked" }))
        .await;
    student_ws.expect_silence(QUIET).await;
    teacher_ws.expect_silence(QUIET).await;

    teacher_ws
        .send(json!({ "type": "edit_message", "message_id": message_id, "content": "fixed" }))
        .await;
    for ws in [&mut teacher_ws, &mut student_ws] {
        let edited = ws.expect("message_edited").await;
        assert_eq!(edited["content"], "fixed");
        assert!(edited["edited_at"].is_string());
    }
}

#[tokio::test]
async fn test_delete_keeps_reactions_and_hides_content() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let student = app.create_user("Sam", UserRole::Student).await;
    let class_id = app.create_class(&[&teacher], &[&student]).await;
    let addr = app.spawn_server().await;

    let mut teacher_ws = WsClient::connect(addr, &teacher.token).await;
    let mut student_ws = WsClient::connect(addr, &student.token).await;
    let conversation_id = teacher_ws.join_class(class_id).await;
    student_ws.join_class(class_id).await;

    student_ws
        .send(json!({
            "type": "send_message",
            "conversation_id": conversation_id,
            "content": "oops",
        }))
        .await;
    let message_id = student_ws.expect("new_message").await["message"]["id"].clone();
    teacher_ws.expect("new_message").await;

    teacher_ws
        .send(json!({ "type": "react_message", "message_id": message_id, "emoji": "👍" }))
        .await;
    teacher_ws.expect("reaction_added").await;
    student_ws.expect("reaction_added").await;

    // Reacting twice changes nothing and broadcasts nothing.
    teacher_ws
        .send(json!({ "type": "react_message", "message_id": message_id, "emoji": "👍" }))
        .await;
    teacher_ws.expect_silence(QUIET).await;

    student_ws
        .send(json!({ "type": "delete_message", "message_id": message_id }))
        .await;
    for ws in [&mut teacher_ws, &mut student_ws] {
        let deleted = ws.expect("message_deleted").await;
        let message = &deleted["message"];
        assert_eq!(message["kind"], "deleted");
        assert!(message["content"].is_null());
        assert!(message["deleted_at"].is_string());
        assert_eq!(message["reactions"][0]["emoji"], "👍");
        assert_eq!(message["reactions"][0]["count"], 1);
    }
}

#[tokio::test]
async fn test_bad_frames_get_scoped_errors() {
    let app = TestApp::new().await;
    let teacher = app.create_user("Ms. Rivera", UserRole::Teacher).await;
    let addr = app.spawn_server().await;

    let mut ws = WsClient::connect(addr, &teacher.token).await;
    ws.send_raw("this is not json").await;
    assert_eq!(ws.expect("error").await["code"], "validation_error");

    ws.send(json!({ "type": "launch_rockets" })).await;
    assert_eq!(ws.expect("error").await["code"], "validation_error");

    // The connection stays usable.
    ws.send(json!({ "type": "get_class_live_status", "class_id": uuid::Uuid::new_v4() }))
        .await;
    assert_eq!(ws.expect("error").await["code"], "not_found");
}
