//! Materials hierarchy against a mocked Signals Notebook API.

use futures::TryStreamExt;
use serde_json::{json, Value};
use signals_notebook::{Asset, Batch, Get, Library, List, Material, Mid, SignalsClient, SignalsError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIBRARY_ID: &str = "6ee1b4a5c0fd4a1b";

fn record(kind: &str, hex: &str, name: &str) -> Value {
    let eid = format!("{kind}:{hex}");
    json!({
        "type": kind,
        "id": eid,
        "attributes": {
            "assetTypeId": LIBRARY_ID,
            "library": "Reagents",
            "eid": eid,
            "name": name,
            "description": "",
            "type": kind,
            "createdAt": "2020-09-06T03:12:35.129Z",
            "editedAt": "2020-09-06T15:22:47.309Z",
            "digest": "53263456"
        }
    })
}

#[tokio::test]
async fn test_get_material_resolves_batch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/materials/batch:0a1b2c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": record("batch", "0a1b2c", "Lot 1")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let material = Material::get(&client, Mid::parse("batch:0a1b2c").unwrap())
        .await
        .unwrap();

    assert!(matches!(material, Material::Batch(_)));
    assert_eq!(material.name(), "Lot 1");
}

#[tokio::test]
async fn test_typed_get_rejects_other_kind() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/materials/asset:ff01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": record("asset", "ff01", "Ethanol")
        })))
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let result = Batch::get(&client, Mid::parse("asset:ff01").unwrap()).await;

    assert!(matches!(
        result,
        Err(SignalsError::UnexpectedType { expected: "batch", .. })
    ));
}

#[tokio::test]
async fn test_library_assets_and_batches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/materials/libraries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("assetType", LIBRARY_ID, "Reagents")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/materials/Reagents/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("asset", "ff01", "Ethanol"), record("asset", "ff02", "Water")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/materials/Reagents/assets/Ethanol/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("batch", "0a1b", "Lot 1")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let libraries = Library::list_all(&client, &()).await.unwrap();
    assert_eq!(libraries.len(), 1);

    let assets: Vec<Asset> = libraries[0].get_assets(&client).try_collect().await.unwrap();
    let names: Vec<&str> = assets.iter().map(Asset::name).collect();
    assert_eq!(names, vec!["Ethanol", "Water"]);

    let batches: Vec<Batch> = assets[0].get_batches(&client).try_collect().await.unwrap();
    assert_eq!(batches[0].eid().as_str(), "batch:0a1b");
}

#[tokio::test]
async fn test_asset_library_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/materials/Reagents/assets/Ethanol"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": record("asset", "ff01", "Ethanol")
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/materials/assetType:{LIBRARY_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": record("assetType", LIBRARY_ID, "Reagents")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let library: Library = serde_json::from_value(record("assetType", LIBRARY_ID, "Reagents")["attributes"].clone()).unwrap();
    let asset = library.get_asset(&client, "Ethanol").await.unwrap();
    let owner = asset.library(&client).await.unwrap();

    assert_eq!(owner.name(), "Reagents");
}

#[tokio::test]
async fn test_asset_in_library_listing_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/materials/libraries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("asset", "ff01", "Ethanol")]
        })))
        .mount(&mock_server)
        .await;

    let client = SignalsClient::new("test-key", &mock_server.uri()).unwrap();
    let result = Library::list_all(&client, &()).await;

    assert!(matches!(result, Err(SignalsError::UnexpectedType { .. })));
}
