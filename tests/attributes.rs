//! Attribute operations against a mocked Signals Notebook API.

use serde_json::{json, Value};
use signals_notebook::{AttrId, Attribute, AttributeOption, Delete, Get, List, Save, SignalsClient, SignalsError};
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(id: i64, name: &str) -> Value {
    json!({
        "type": "attribute",
        "id": format!("attribute:{id}"),
        "attributes": {
            "type": "choice",
            "id": format!("attribute:{id}"),
            "name": name,
            "description": ""
        }
    })
}

async fn mount_get(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/attributes/attribute:42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": record(42, "Color")})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_attributes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/attributes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record(1, "Color"), record(2, "Solvent")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let attributes = Attribute::list_all(&client, &()).await.unwrap();

    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes[1].id(), &AttrId::new(2));
    assert_eq!(attributes[1].name, "Solvent");
}

#[tokio::test]
async fn test_options_are_fetched_once() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/attributes/attribute:42/options"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"type": "option", "id": "o1", "attributes": {"id": "o1", "key": "red", "value": "Red"}},
                {"type": "option", "id": "o2", "attributes": {"id": "o2", "key": "blue", "value": "Blue"}}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let mut attribute = Attribute::get(&client, AttrId::new(42)).await.unwrap();

    assert_eq!(attribute.options(&client).await.unwrap().len(), 2);
    assert_eq!(attribute.validate(&client, "Blue").await.unwrap(), "Blue");
    assert!(matches!(
        attribute.validate(&client, "Green").await,
        Err(SignalsError::Validation(_))
    ));
}

#[tokio::test]
async fn test_save_sends_options_only() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server).await;

    Mock::given(method("PATCH"))
        .and(path("/attributes/attribute:42"))
        .and(body_json(json!({
            "data": {
                "type": "attribute",
                "id": "attribute:42",
                "attributes": {
                    "options": [{"id": null, "key": "green", "value": "Green"}]
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": record(42, "Color")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let mut attribute = Attribute::get(&client, AttrId::new(42)).await.unwrap();
    attribute.name = "Colour".to_string();
    attribute.set_options(vec![AttributeOption {
        id: None,
        key: "green".to_string(),
        value: "Green".to_string(),
    }]);

    attribute.save(&client).await.unwrap();
}

#[tokio::test]
async fn test_create_and_delete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/attributes"))
        .and(body_partial_json(json!({
            "data": {
                "type": "attribute",
                "attributes": {"name": "Color", "type": "choice", "options": ["o1"]}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": record(42, "Color")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/attributes/attribute:42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let options = [AttributeOption {
        id: Some("o1".to_string()),
        key: "red".to_string(),
        value: "Red".to_string(),
    }];
    let attribute = Attribute::create(&client, "Color", "choice", "", &options)
        .await
        .unwrap();
    assert_eq!(attribute.id().id(), 42);

    attribute.delete(&client).await.unwrap();
}
