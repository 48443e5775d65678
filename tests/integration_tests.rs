use area_merge::{
    parse_area, AreaService, FileBoundaryStore, MergeConfig, PcMilerSource,
};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

const AREA_ID: &str = "3b0c4a52-7a1e-4c43-9a0f-4f0c9a6f5e21";

fn area_json() -> String {
    json!({
        "id": AREA_ID,
        "name": "West coast minus one zip",
        "states": [
            {"code": "CA", "name": "California"},
            {"code": "NV", "name": "Nevada"}
        ],
        "postalCodes": [
            {"code": "89001", "include": false}
        ]
    })
    .to_string()
}

#[tokio::test]
async fn test_merge_area_over_http_to_file_store() {
    let server = MockServer::start();
    let states_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/polygons/state")
            .query_param("states", "CA,NV")
            .query_param("authToken", "test-token");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"Name": "California", "Abbreviation": "CA", "Polygon": "POLYGON((0 0,2 0,2 2,0 2,0 0))"},
                {"Name": "Nevada", "Abbreviation": "NV", "Polygon": "POLYGON((2 0,4 0,4 2,2 2,2 0))"}
            ]));
    });
    let zip_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/polygons/zip")
            .query_param("zipcodes", "89001");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"Code": "89001", "Polygon": "POLYGON((3 0,4 0,4 1,3 1,3 0))"}
            ]));
    });

    let temp_dir = TempDir::new().unwrap();
    let config = MergeConfig::from_toml_str(&format!(
        r#"
[source]
endpoint = "{}"
auth_token = "test-token"
timeout_seconds = 5

[fetch]
batch_size = 10
concurrency = 2

[store]
path = "{}"
"#,
        server.base_url(),
        temp_dir.path().display()
    ))
    .unwrap();

    let source = PcMilerSource::new(config.source.endpoint.clone(), config.auth_token().unwrap())
        .with_timeout(Duration::from_secs(5));
    let store = FileBoundaryStore::new(config.store.path.clone());
    let service = AreaService::new(source, store, config.settings());

    let spec = parse_area(&area_json()).unwrap();
    let record = service.merge_area(&spec).await.unwrap();

    states_mock.assert();
    zip_mock.assert();
    assert!(record.error_message.is_none(), "{:?}", record.error_message);
    assert_eq!(record.boundary.as_ref().unwrap().kind, "Polygon");

    let stored_path = temp_dir.path().join(format!("{}.json", AREA_ID));
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&stored_path).unwrap()).unwrap();
    assert_eq!(stored["areaId"], AREA_ID);
    assert_eq!(stored["geometry"]["type"], "Polygon");
    assert!(stored["errorMessage"].is_null());
    assert!(stored["centerPoint"]["latitude"].as_f64().unwrap() > 0.0);

    service.delete_area(spec.id).await.unwrap();
    assert!(!stored_path.exists());
}

#[tokio::test]
async fn test_upstream_failure_for_states_yields_error_record() {
    let server = MockServer::start();
    let states_mock = server.mock(|when, then| {
        when.method(GET).path("/polygons/state");
        then.status(500).body("Internal Server Error");
    });

    let temp_dir = TempDir::new().unwrap();
    let source = PcMilerSource::new(server.base_url(), "test-token");
    let store = FileBoundaryStore::new(temp_dir.path());
    let service = AreaService::new(source, store, Default::default());

    let spec = parse_area(
        &json!({
            "id": AREA_ID,
            "states": [{"code": "ca"}]
        })
        .to_string(),
    )
    .unwrap();
    let record = service.merge_area(&spec).await.unwrap();

    states_mock.assert();
    assert_eq!(
        record.error_message.as_deref(),
        Some("No boundary polygons returned for included regions")
    );
    assert!(service.get_record(spec.id).await.unwrap().unwrap().is_error());
}
