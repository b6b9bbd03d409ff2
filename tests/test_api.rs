// REST API tests
// Author: Gabriel Demetrios Lafis

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value as JsonValue};

use sparkly_data_engine::{
    api::{configure, AppState},
    storage::MemoryStorage,
    utils::DataConfig,
};

const PEOPLE_CSV: &str = "Name,Age,Tags\nBob,30,a;b\nAmy,,c\n,,\n";

fn state() -> web::Data<AppState> {
    let data = DataConfig {
        page_size: 2,
        split_delimiter: ";".to_string(),
        chart_top_n: 10,
    };
    web::Data::new(AppState::new(Arc::new(MemoryStorage::new()), data))
}

macro_rules! service {
    () => {
        test::init_service(App::new().app_data(state()).configure(configure)).await
    };
}

macro_rules! import_people {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/datasets/import?name=people&format=csv")
            .set_payload(PEOPLE_CSV)
            .to_request();
        let body: JsonValue = test::call_and_read_body_json(&$app, req).await;
        body["id"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_health_check() {
    let app = service!();

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_import_and_list() {
    let app = service!();
    let id = import_people!(app);

    let req = test::TestRequest::get().uri("/api/v1/datasets").to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.as_array().unwrap().len(), 1);
    let entry = &body[0];
    assert_eq!(entry["id"], id.as_str());
    assert_eq!(entry["name"], "people");
    assert_eq!(entry["columns"], json!(["name", "age", "tags"]));
    assert_eq!(entry["row_count"], 3);
    assert_eq!(entry["cleaned"], false);
    assert!(entry.get("rows").is_none());

    let req = test::TestRequest::get().uri(&format!("/api/v1/datasets/{}", id)).to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rows"][0]["name"], "Bob");
    assert_eq!(body["rows"][1]["age"], JsonValue::Null);
}

#[actix_web::test]
async fn test_create_dataset() {
    let app = service!();

    let payload = json!({
        "id": "fixed-id",
        "name": "scores",
        "columns": ["team", "points"],
        "rows": [{"team": "red", "points": 3}, {"team": "blue", "points": 1.5}]
    });

    let req = test::TestRequest::post().uri("/api/v1/datasets").set_json(&payload).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post().uri("/api/v1/datasets").set_json(&payload).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get().uri("/api/v1/datasets/fixed-id").to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["row_count"], 2);
    assert_eq!(body["rows"][1]["points"], 1.5);
}

#[actix_web::test]
async fn test_create_rejects_duplicate_columns() {
    let app = service!();

    let payload = json!({"name": "bad", "columns": ["a", "a"], "rows": []});
    let req = test::TestRequest::post().uri("/api/v1/datasets").set_json(&payload).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_import_errors() {
    let app = service!();

    let req = test::TestRequest::post()
        .uri("/api/v1/datasets/import?format=xlsx")
        .set_payload("whatever")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/datasets/import?format=json")
        .set_payload("[]")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: JsonValue = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("No data"));

    // nothing was stored
    let req = test::TestRequest::get().uri("/api/v1/datasets").to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_unknown_dataset_is_not_found() {
    let app = service!();

    let req = test::TestRequest::get().uri("/api/v1/datasets/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: JsonValue = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("nope"));

    let req = test::TestRequest::post().uri("/api/v1/datasets/nope/clean/remove-null-rows").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_summary_endpoint() {
    let app = service!();
    let id = import_people!(app);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/datasets/{}/summary", id))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["totalRows"], 3);
    assert_eq!(body["totalColumns"], 3);
    let age = &body["columnSummaries"][1];
    assert_eq!(age["column"], "age");
    assert_eq!(age["type"], "number");
    assert_eq!(age["count"], 1);
    assert_eq!(age["nullCount"], 2);
    assert_eq!(age["mean"], 30.0);
    assert_eq!(age["std"], 0.0);
}

#[actix_web::test]
async fn test_aggregate_endpoint() {
    let app = service!();
    let id = import_people!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/aggregate", id))
        .set_json(json!({"group_column": "name", "value_column": "age", "function": "sum"}))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!([
            {"group": "Bob", "value": 30.0},
            {"group": "Amy", "value": 0.0},
            {"group": "Unknown", "value": 0.0}
        ])
    );

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/aggregate", id))
        .set_json(json!({"group_column": "name", "value_column": "age", "function": "count", "limit": 1}))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/aggregate", id))
        .set_json(json!({"group_column": "city", "value_column": "age", "function": "sum"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_view_endpoint() {
    let app = service!();
    let id = import_people!(app);

    // page size defaults to the configured value
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/view", id))
        .set_json(json!({}))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/view", id))
        .set_json(json!({
            "search": "AMY",
            "sort": {"column": "name", "direction": "desc"},
            "page": 5,
            "page_size": 10
        }))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_rows"], 1);
    assert_eq!(body["rows"][0]["name"], "Amy");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/view", id))
        .set_json(json!({"filters": {"tags": "b"}, "sort": {"column": "age"}}))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_rows"], 1);
    assert_eq!(body["rows"][0]["name"], "Bob");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/view", id))
        .set_json(json!({"page_size": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_view_sorts_mixed_column() {
    let app = service!();

    let payload = json!({
        "id": "mixed",
        "name": "mixed",
        "columns": ["v"],
        "rows": [{"v": 9}, {"v": "10"}, {"v": "x"}, {"v": 2.5}, {"v": null}, {"v": "9"}, {"v": true}]
    });
    let req = test::TestRequest::post().uri("/api/v1/datasets").set_json(&payload).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/datasets/mixed/view")
        .set_json(json!({"sort": {"column": "v", "direction": "asc"}, "page_size": 10}))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;

    let sorted: Vec<JsonValue> = body["rows"].as_array().unwrap().iter().map(|row| row["v"].clone()).collect();
    assert_eq!(
        sorted,
        vec![json!(true), json!(2.5), json!(9), json!("10"), json!("9"), json!("x"), JsonValue::Null]
    );
}

#[actix_web::test]
async fn test_cleaning_endpoints_persist_results() {
    let app = service!();
    let id = import_people!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/clean/remove-null-rows", id))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rows_removed"], 1);
    assert_eq!(body["dataset"]["row_count"], 2);
    assert_eq!(body["dataset"]["cleaned"], true);

    // delimiter falls back to the configured one
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/clean/split-column", id))
        .set_json(json!({"column": "tags"}))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["new_columns"], json!(["tags_1", "tags_2"]));
    assert_eq!(body["dataset"]["rows"][0]["tags_2"], "b");

    let req = test::TestRequest::get().uri(&format!("/api/v1/datasets/{}", id)).to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["columns"], json!(["name", "age", "tags", "tags_1", "tags_2"]));
    assert_eq!(body["row_count"], 2);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/datasets/{}/clean/split-column", id))
        .set_json(json!({"column": "tags", "delimiter": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_export_csv() {
    let app = service!();
    let id = import_people!(app);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/datasets/{}/export.csv", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"name,age,tags\nBob,30,a;b\nAmy,,c\n,,");
}

#[actix_web::test]
async fn test_patch_and_delete() {
    let app = service!();
    let id = import_people!(app);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/datasets/{}", id))
        .set_json(json!({"name": "staff", "cleaned": false}))
        .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "staff");
    assert_eq!(body["row_count"], 3);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/datasets/{}", id))
        .set_json(json!({"name": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete().uri(&format!("/api/v1/datasets/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete().uri(&format!("/api/v1/datasets/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
