//! Integration tests for the folder hierarchy.

mod common;

use serde_json::{json, Value};

use common::{login, spawn_app, upload_into};

async fn create_folder(
    server: &axum_test::TestServer,
    token: &str,
    name: &str,
    parent_id: Option<i64>,
) -> i64 {
    let mut body = json!({ "name": name });
    if let Some(parent_id) = parent_id {
        body["parent_id"] = json!(parent_id);
    }

    let response = server
        .post("/api/folders")
        .authorization_bearer(token)
        .json(&body)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_and_list_folder_with_files() {
    let app = spawn_app().await;
    let token = login(&app.server, "telegram", "1001", "alice").await;

    let docs = create_folder(&app.server, &token, "Docs", None).await;
    upload_into(&app.server, &token, "inside.txt", b"x", Some(docs)).await;

    // Root level shows the folder but not the file
    let response = app
        .server
        .get("/api/folders")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"]["folder"].is_null());
    assert_eq!(body["data"]["folders"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["folders"][0]["name"], "Docs");
    assert!(body["data"]["files"].as_array().unwrap().is_empty());

    // The folder level shows the file
    let response = app
        .server
        .get(&format!("/api/folders/{docs}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["folder"]["id"].as_i64(), Some(docs));
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["files"][0]["name"], "inside.txt");
}

#[tokio::test]
async fn test_create_folder_with_blank_name() {
    let app = spawn_app().await;
    let token = login(&app.server, "telegram", "1001", "alice").await;

    let response = app
        .server
        .post("/api/folders")
        .authorization_bearer(&token)
        .json(&json!({ "name": "   " }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_folder_path_from_root() {
    let app = spawn_app().await;
    let token = login(&app.server, "telegram", "1001", "alice").await;

    let a = create_folder(&app.server, &token, "a", None).await;
    let b = create_folder(&app.server, &token, "b", Some(a)).await;
    let c = create_folder(&app.server, &token, "c", Some(b)).await;

    let response = app
        .server
        .get(&format!("/api/folders/path/{c}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_rename_folder() {
    let app = spawn_app().await;
    let token = login(&app.server, "telegram", "1001", "alice").await;
    let docs = create_folder(&app.server, &token, "Docs", None).await;

    let response = app
        .server
        .put(&format!("/api/folders/{docs}"))
        .authorization_bearer(&token)
        .json(&json!({ "new_name": "Papers" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "Papers");
}

#[tokio::test]
async fn test_delete_folder_subtree() {
    let app = spawn_app().await;
    let token = login(&app.server, "telegram", "1001", "alice").await;

    let root = create_folder(&app.server, &token, "Root", None).await;
    let child = create_folder(&app.server, &token, "Child", Some(root)).await;
    upload_into(&app.server, &token, "deep.txt", b"x", Some(child)).await;

    let response = app
        .server
        .delete(&format!("/api/folders/{root}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    // 2 folders + 1 file
    assert_eq!(body["data"]["deleted"], 3);

    // Deleting again is a no-op, not an error
    let response = app
        .server
        .delete(&format!("/api/folders/{root}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["deleted"], 0);
}

#[tokio::test]
async fn test_foreign_folder_is_hidden() {
    let app = spawn_app().await;
    let alice = login(&app.server, "telegram", "1001", "alice").await;
    let bob = login(&app.server, "discord", "2002", "bob").await;

    let docs = create_folder(&app.server, &alice, "Docs", None).await;

    let response = app
        .server
        .get(&format!("/api/folders/{docs}"))
        .authorization_bearer(&bob)
        .await;
    response.assert_status_not_found();

    // Bob cannot nest under Alice's folder either
    let response = app
        .server
        .post("/api/folders")
        .authorization_bearer(&bob)
        .json(&json!({ "name": "Sneaky", "parent_id": docs }))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_upload_into_missing_folder() {
    let app = spawn_app().await;
    let token = login(&app.server, "telegram", "1001", "alice").await;

    let part = axum_test::multipart::Part::bytes(b"x".to_vec())
        .file_name("orphan.txt")
        .mime_type("text/plain");
    let form = axum_test::multipart::MultipartForm::new()
        .add_part("file", part)
        .add_text("folder_id", "999");

    let response = app
        .server
        .post("/api/files/upload")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    response.assert_status_not_found();
}
