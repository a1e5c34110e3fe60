//! Integration tests for the record collections.

mod common;

use common::{pet, TestServer};
use serde_json::{json, Value};

fn animal_body(name: &str) -> Value {
    json!({
        "name": name,
        "type": "Cat",
        "breed": "Persian",
        "date_of_birth": "2018-11-02"
    })
}

async fn create_animal(server: &TestServer, owner: &str, name: &str) -> String {
    let response = server.post(owner, "/animals", &animal_body(name)).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_animal_lifecycle() {
    let server = TestServer::spawn().await;
    let id = create_animal(&server, "alice", "Luna").await;

    let response = server.get("alice", &format!("/animals/{id}")).await;
    assert_eq!(response.status(), 200);
    let tree: Value = response.json().await.unwrap();
    assert_eq!(tree["name"], "Luna");
    assert_eq!(tree["events"], json!([]));

    let response = server
        .put("alice", &format!("/animals/{id}"), &animal_body("Luna Maria"))
        .await;
    assert_eq!(response.status(), 200);

    let list: Value = server.get("alice", "/animals").await.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Luna Maria");

    let response = server.delete("alice", &format!("/animals/{id}")).await;
    assert_eq!(response.status(), 204);

    let response = server.get("alice", &format!("/animals/{id}")).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_client_chosen_id_conflicts_on_reuse() {
    let server = TestServer::spawn().await;
    let id = "8d4a4b0e-9f8c-4f43-9a52-7d3c2b1a0001";
    let mut body = animal_body("Luna");
    body["id"] = json!(id);

    let response = server.post("alice", "/animals", &body).await;
    assert_eq!(response.status(), 201);
    let response = server.post("alice", "/animals", &body).await;
    assert_eq!(response.status(), 409);

    // Another owner may use the same identifier.
    let response = server.post("bob", "/animals", &body).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn test_put_with_mismatched_id_is_bad_request() {
    let server = TestServer::spawn().await;
    let id = create_animal(&server, "alice", "Luna").await;
    let mut body = animal_body("Luna");
    body["id"] = json!("8d4a4b0e-9f8c-4f43-9a52-7d3c2b1a0099");

    let response = server.put("alice", &format!("/animals/{id}"), &body).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_patch_updates_only_sent_fields() {
    let server = TestServer::spawn().await;
    let id = create_animal(&server, "alice", "Luna").await;

    let response = server
        .patch("alice", &format!("/animals/{id}"), &json!({ "breed": "Maine Coon" }))
        .await;
    assert_eq!(response.status(), 200);
    let animal: Value = response.json().await.unwrap();
    assert_eq!(animal["name"], "Luna");
    assert_eq!(animal["type"], "Cat");
    assert_eq!(animal["breed"], "Maine Coon");

    let response = server
        .post(
            "alice",
            &format!("/animals/{id}/vaccines"),
            &json!({
                "name": "V4",
                "application_date": "2024-05-01",
                "next_dose_date": "2025-05-01"
            }),
        )
        .await;
    let vaccine: Value = response.json().await.unwrap();
    let vaccine_path = format!("/animals/{id}/vaccines/{}", vaccine["id"].as_str().unwrap());

    let response = server
        .patch("alice", &vaccine_path, &json!({ "next_dose_date": null }))
        .await;
    assert_eq!(response.status(), 200);
    let vaccine: Value = response.json().await.unwrap();
    assert_eq!(vaccine["name"], "V4");
    assert_eq!(vaccine["next_dose_date"], Value::Null);
}

#[tokio::test]
async fn test_patch_rejects_bad_fields() {
    let server = TestServer::spawn().await;
    let id = create_animal(&server, "alice", "Luna").await;
    let path = format!("/animals/{id}");

    let response = server.patch("alice", &path, &json!({ "name": "" })).await;
    assert_eq!(response.status(), 400);
    let response = server.patch("alice", &path, &json!({ "owner": "bob" })).await;
    assert_eq!(response.status(), 400);
    let response = server
        .patch("bob", &path, &json!({ "name": "Stolen" }))
        .await;
    assert_eq!(response.status(), 404);

    let animal: Value = server.get("alice", &path).await.json().await.unwrap();
    assert_eq!(animal["name"], "Luna");
}

#[tokio::test]
async fn test_invalid_path_id_is_bad_request() {
    let server = TestServer::spawn().await;
    let response = server.get("alice", "/animals/not-a-uuid").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let server = TestServer::spawn().await;
    let response = server.post("alice", "/animals", &animal_body("  ")).await;
    assert_eq!(response.status(), 400);

    let list: Value = server.get("alice", "/animals").await.json().await.unwrap();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_event_and_vaccine_collections() {
    let server = TestServer::spawn().await;
    let id = create_animal(&server, "alice", "Luna").await;

    let response = server
        .post(
            "alice",
            &format!("/animals/{id}/events"),
            &json!({ "type": "Consulta", "date": "2024-05-01", "observation": "checkup" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let event: Value = response.json().await.unwrap();
    let event_id = event["id"].as_str().unwrap().to_string();
    assert_eq!(event["animal"], id.as_str());

    let response = server
        .post(
            "alice",
            &format!("/animals/{id}/vaccines"),
            &json!({ "name": "Antirrábica", "application_date": "2024-05-01" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let vaccine: Value = response.json().await.unwrap();
    assert_eq!(vaccine["next_dose_date"], Value::Null);
    let vaccine_id = vaccine["id"].as_str().unwrap().to_string();

    let response = server
        .put(
            "alice",
            &format!("/animals/{id}/events/{event_id}"),
            &json!({ "type": "Retorno", "date": "2024-05-15" }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let events: Value = server
        .get("alice", &format!("/animals/{id}/events"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["type"], "Retorno");
    assert_eq!(events[0]["observation"], Value::Null);

    let response = server
        .get("alice", &format!("/animals/{id}/vaccines/{vaccine_id}"))
        .await;
    assert_eq!(response.status(), 200);

    let response = server
        .delete("alice", &format!("/animals/{id}/vaccines/{vaccine_id}"))
        .await;
    assert_eq!(response.status(), 204);
    let response = server
        .get("alice", &format!("/animals/{id}/vaccines/{vaccine_id}"))
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_child_of_unknown_animal_is_not_found() {
    let server = TestServer::spawn().await;
    let missing = "8d4a4b0e-9f8c-4f43-9a52-7d3c2b1a0042";

    let response = server
        .post(
            "alice",
            &format!("/animals/{missing}/events"),
            &json!({ "type": "Consulta", "date": "2024-05-01" }),
        )
        .await;
    assert_eq!(response.status(), 404);

    let response = server
        .get("alice", &format!("/animals/{missing}/vaccines"))
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_records_are_invisible_to_other_owners() {
    let server = TestServer::spawn().await;
    let id = create_animal(&server, "alice", "Luna").await;

    let response = server.get("bob", &format!("/animals/{id}")).await;
    assert_eq!(response.status(), 404);
    let response = server
        .put("bob", &format!("/animals/{id}"), &animal_body("Stolen"))
        .await;
    assert_eq!(response.status(), 404);
    let response = server.delete("bob", &format!("/animals/{id}")).await;
    assert_eq!(response.status(), 404);

    let tree: Value = server
        .get("alice", &format!("/animals/{id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(tree["name"], "Luna");
}

#[tokio::test]
async fn test_crud_update_is_visible_to_sync() {
    let server = TestServer::spawn().await;
    let rex = "8d4a4b0e-9f8c-4f43-9a52-7d3c2b1a0007";
    server
        .upload("alice", json!([pet(rex, "Rex", "2024-01-01T00:00:00Z")]))
        .await;

    let checkpoint = server.download("alice", None).await["synced_at"]
        .as_str()
        .unwrap()
        .to_string();

    // Edits stamp the server clock, which is at or after the checkpoint; wait
    // out the microsecond so the change is strictly newer.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let response = server
        .put("alice", &format!("/animals/{rex}"), &animal_body("Rex II"))
        .await;
    assert_eq!(response.status(), 200);

    let counts = server.check_updates("alice", Some(&checkpoint)).await;
    assert_eq!(counts["update_counts"]["animals"], 1);

    let body = server.download("alice", Some(&checkpoint)).await;
    assert_eq!(body["pets"][0]["name"], "Rex II");
}

#[tokio::test]
async fn test_delete_animal_removes_children_from_sync() {
    let server = TestServer::spawn().await;
    let id = create_animal(&server, "alice", "Luna").await;
    server
        .post(
            "alice",
            &format!("/animals/{id}/events"),
            &json!({ "type": "Consulta", "date": "2024-05-01" }),
        )
        .await;

    server.delete("alice", &format!("/animals/{id}")).await;

    let counts = server.check_updates("alice", None).await;
    assert_eq!(
        counts["update_counts"],
        json!({ "animals": 0, "events": 0, "vaccines": 0 })
    );
}
