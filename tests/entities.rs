//! Entity get/save/create/delete against a mocked Signals Notebook API.

use futures::TryStreamExt;
use serde_json::{json, Value};
use signals_notebook::{
    Container, Delete, Eid, Entity, Experiment, Get, Notebook, Save, SignalsClient, SignalsError,
    Text,
};
use wiremock::matchers::{body_json, body_partial_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXPERIMENT: &str = "experiment:79b12479-2b5d-490f-be52-d60c53f16719";
const NOTEBOOK: &str = "journal:1c7ea8f1-0c2f-4a16-9c8e-2a8e8d1c9f10";
const TEXT: &str = "text:5b0e1f3a-9d2c-4c1e-8f7a-6a1d2c3b4e5f";

fn attributes(eid: &str, kind: &str, name: &str) -> Value {
    json!({
        "eid": eid,
        "name": name,
        "description": "",
        "type": kind,
        "createdAt": "2021-10-22T13:43:13.399Z",
        "editedAt": "2021-10-22T13:43:13.399Z",
        "digest": "42"
    })
}

fn single(eid: &str, kind: &str, name: &str) -> Value {
    json!({
        "links": {"self": format!("https://example.com/entities/{eid}")},
        "data": {"type": "entity", "id": eid, "attributes": attributes(eid, kind, name)}
    })
}

async fn mount_get(server: &MockServer, eid: &str, kind: &str, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/entities/{eid}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(single(eid, kind, name)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_get_resolves_specific_kind() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/entities/{EXPERIMENT}")))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single(EXPERIMENT, "experiment", "Run 1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let entity = Entity::get(&client, Eid::parse(EXPERIMENT).unwrap()).await.unwrap();

    assert!(matches!(entity, Entity::Experiment(_)));
    assert_eq!(entity.name(), "Run 1");
    assert_eq!(entity.eid().as_str(), EXPERIMENT);
}

#[tokio::test]
async fn test_get_unknown_kind_falls_back_to_generic() {
    let mock_server = MockServer::start().await;
    let eid = "bioSequence:79b12479-2b5d-490f-be52-d60c53f16719";
    mount_get(&mock_server, eid, "bioSequence", "Plasmid").await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let entity = Entity::get(&client, Eid::parse(eid).unwrap()).await.unwrap();

    assert!(matches!(entity, Entity::Generic(_)));
    assert!(!entity.is_specific());
    assert_eq!(entity.entity_type().as_str(), "bioSequence");
}

#[tokio::test]
async fn test_typed_get_rejects_other_kind() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, NOTEBOOK, "journal", "Lab book").await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let result = Experiment::get(&client, Eid::parse(NOTEBOOK).unwrap()).await;

    assert!(matches!(
        result,
        Err(SignalsError::UnexpectedType {
            expected: "experiment",
            ..
        })
    ));
}

#[tokio::test]
async fn test_get_not_found_reports_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/entities/{EXPERIMENT}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"status": "404", "code": "NotFound", "title": "Not found", "detail": "Entity not found"}]
        })))
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let err = Entity::get(&client, Eid::parse(EXPERIMENT).unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert!(matches!(err, SignalsError::Api { ref message, .. } if message == "Entity not found"));
}

#[tokio::test]
async fn test_save_sends_only_name_and_description() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, EXPERIMENT, "experiment", "Run 1").await;

    Mock::given(method("PATCH"))
        .and(path(format!("/entities/{EXPERIMENT}/properties")))
        .and(query_param("force", "true"))
        .and(body_json(json!({
            "data": [
                {"attributes": {"name": "Name", "value": "Run 2"}},
                {"attributes": {"name": "Description", "value": "repeat"}}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let mut experiment = Experiment::get(&client, Eid::parse(EXPERIMENT).unwrap())
        .await
        .unwrap();
    experiment.common_mut().name = "Run 2".to_string();
    experiment.common_mut().description = Some("repeat".to_string());

    experiment.save(&client).await.unwrap();
}

#[tokio::test]
async fn test_delete_passes_digest_and_force() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, TEXT, "text", "Notes").await;

    Mock::given(method("DELETE"))
        .and(path(format!("/entities/{TEXT}")))
        .and(query_param("digest", "42"))
        .and(query_param("force", "true"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let text = Text::get(&client, Eid::parse(TEXT).unwrap()).await.unwrap();

    text.delete(&client).await.unwrap();
}

#[tokio::test]
async fn test_create_notebook() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/entities"))
        .and(query_param("force", "true"))
        .and(body_json(json!({
            "data": {
                "type": "journal",
                "attributes": {"name": "Lab book", "description": "2024"}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(single(NOTEBOOK, "journal", "Lab book")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let notebook = Notebook::create(&client, "Lab book", Some("2024"), true)
        .await
        .unwrap();

    assert_eq!(notebook.eid().as_str(), NOTEBOOK);
}

#[tokio::test]
async fn test_create_experiment_in_notebook() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, NOTEBOOK, "journal", "Lab book").await;

    Mock::given(method("POST"))
        .and(path("/entities"))
        .and(body_partial_json(json!({
            "data": {
                "type": "experiment",
                "attributes": {"name": "Run 1"},
                "relationships": {
                    "ancestors": {"data": [{"type": "journal", "id": NOTEBOOK}]}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(single(EXPERIMENT, "experiment", "Run 1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let notebook = Notebook::get(&client, Eid::parse(NOTEBOOK).unwrap()).await.unwrap();
    let experiment = Experiment::create(&client, "Run 1", None, None, Some(&notebook), false)
        .await
        .unwrap();

    assert_eq!(experiment.name(), "Run 1");
}

#[tokio::test]
async fn test_children_are_resolved() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, EXPERIMENT, "experiment", "Run 1").await;

    Mock::given(method("GET"))
        .and(path(format!("/entities/{EXPERIMENT}/children")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": {},
            "data": [
                {"type": "entity", "id": TEXT, "attributes": attributes(TEXT, "text", "Notes")},
                {
                    "type": "entity",
                    "id": "uploadedResource:79b12479-2b5d-490f-be52-d60c53f16719",
                    "attributes": attributes(
                        "uploadedResource:79b12479-2b5d-490f-be52-d60c53f16719",
                        "uploadedResource",
                        "data.csv"
                    )
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let experiment = Experiment::get(&client, Eid::parse(EXPERIMENT).unwrap())
        .await
        .unwrap();
    let children: Vec<Entity> = experiment.get_children(&client).try_collect().await.unwrap();

    assert_eq!(children.len(), 2);
    assert!(matches!(children[0], Entity::Text(_)));
    assert!(matches!(children[1], Entity::Generic(_)));
}

#[tokio::test]
async fn test_create_text_uploads_child() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, EXPERIMENT, "experiment", "Run 1").await;

    Mock::given(method("POST"))
        .and(path(format!("/entities/{EXPERIMENT}/children/Notes.txt")))
        .and(query_param("digest", "42"))
        .and(query_param("force", "false"))
        .and(header("content-type", "text/plain"))
        .and(body_string("hello"))
        .respond_with(ResponseTemplate::new(201).set_body_json(single(TEXT, "text", "Notes")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let experiment = Experiment::get(&client, Eid::parse(EXPERIMENT).unwrap())
        .await
        .unwrap();
    let text = Text::create(&client, &experiment, "Notes", "hello", false)
        .await
        .unwrap();

    assert_eq!(text.eid().as_str(), TEXT);
}

#[tokio::test]
async fn test_text_content_is_exported() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, TEXT, "text", "Notes").await;

    Mock::given(method("GET"))
        .and(path(format!("/entities/{TEXT}/export")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .insert_header("content-disposition", "attachment; filename=\"Notes.txt\"")
                .set_body_string("hello"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let text = Text::get(&client, Eid::parse(TEXT).unwrap()).await.unwrap();
    let file = text.get_content(&client).await.unwrap();

    assert_eq!(file.name, "Notes.txt");
    assert_eq!(file.content_type, "text/plain");
    assert_eq!(file.text(), "hello");
}

#[tokio::test]
async fn test_refresh_takes_server_name() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, TEXT, "text", "Server name").await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let mut text = Text::get(&client, Eid::parse(TEXT).unwrap()).await.unwrap();
    text.common_mut().name = "Local edit".to_string();

    text.common_mut().refresh(&client).await.unwrap();
    assert_eq!(text.name(), "Server name");
}
