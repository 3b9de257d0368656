//! Integration tests for the operation dispatcher.
//!
//! These tests verify that the dispatcher:
//! - Builds method, path, query, and body per the plan table
//! - Applies returnAll vs. bounded-limit list semantics
//! - Sends hard-coded status-transition bodies
//! - Aborts or continues a batch per the configured failure policy
//! - Tags every output record with its originating item index

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clarity_bridge_client::{Batch, BridgeError, ClarityClient, StaticCredentials, run_batch};
use clarity_bridge_core::{AuthType, Credential, Operation, Params, Resource};

fn client_for(server: &MockServer) -> ClarityClient {
    let credential =
        Credential::new(server.uri(), AuthType::ApiKey).with_api_key("jwt-key", "CLIENT_MY-APP");
    ClarityClient::new(Arc::new(StaticCredentials::new(credential)))
}

fn params(value: Value) -> Params {
    Params::from(value)
}

#[tokio::test]
async fn test_create_posts_merged_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ppm/rest/v1/projects"))
        .and(body_json(json!({
            "code": "PRJ001",
            "name": "Migration",
            "isActive": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_internalId": 1,
            "code": "PRJ001"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = Batch::single(
        Resource::Project,
        Operation::Create,
        params(json!({
            "code": "PRJ001",
            "name": "Migration",
            "additionalFields": { "isActive": true }
        })),
    );

    let output = run_batch(&client, &batch).await.unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].item, 0);
    assert_eq!(output[0].json["code"], json!("PRJ001"));
}

#[tokio::test]
async fn test_missing_required_fields_fail_before_any_call() {
    let server = MockServer::start().await;

    let client = client_for(&server);
    let batch = Batch::single(
        Resource::Project,
        Operation::Create,
        params(json!({ "code": "PRJ001" })),
    );

    let err = run_batch(&client, &batch).await.unwrap_err();
    match err {
        BridgeError::Validation(e) => assert_eq!(e.missing, vec!["name"]),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_many_bounded_sends_limit_and_unwraps_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ppm/rest/v1/projects"))
        .and(query_param("limit", "10"))
        .and(query_param("filter", "(isActive = true)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_results": [{ "_internalId": 1 }, { "_internalId": 2 }],
            "_next": "ignored-on-bounded-path"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = Batch::single(
        Resource::Project,
        Operation::GetMany,
        params(json!({
            "returnAll": false,
            "limit": 10,
            "filters": { "isActive": true }
        })),
    );

    let output = run_batch(&client, &batch).await.unwrap();
    assert_eq!(output.len(), 2);
    assert!(output.iter().all(|record| record.item == 0));
}

#[tokio::test]
async fn test_get_many_return_all_paginates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ppm/rest/v1/resources"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_results": [{ "_internalId": 1 }],
            "_next": "more"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ppm/rest/v1/resources"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_results": [{ "_internalId": 2 }],
            "_next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = Batch::single(
        Resource::Resource,
        Operation::GetMany,
        params(json!({ "returnAll": true })),
    );

    let output = run_batch(&client, &batch).await.unwrap();
    assert_eq!(output.len(), 2);
}

#[tokio::test]
async fn test_submit_and_approve_send_fixed_status_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/ppm/rest/v1/timesheets/55"))
        .and(body_json(json!({ "status": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/ppm/rest/v1/timesheets/56"))
        .and(body_json(json!({ "status": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let submit = Batch::single(
        Resource::Timesheet,
        Operation::Submit,
        params(json!({ "timesheetId": "55" })),
    );
    run_batch(&client, &submit).await.unwrap();

    let approve = Batch::single(
        Resource::Timesheet,
        Operation::Approve,
        params(json!({ "timesheetId": "56" })),
    );
    run_batch(&client, &approve).await.unwrap();
}

#[tokio::test]
async fn test_task_routes_are_scoped_to_project() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/ppm/rest/v1/projects/7/tasks/13"))
        .and(body_json(json!({ "percentComplete": 50 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_internalId": 13 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = Batch::single(
        Resource::Task,
        Operation::Update,
        params(json!({
            "projectId": "7",
            "taskId": "13",
            "updateFields": { "percentComplete": 50 }
        })),
    );

    run_batch(&client, &batch).await.unwrap();
}

#[tokio::test]
async fn test_cost_plan_get_many_always_scopes_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ppm/rest/v1/costPlans"))
        .and(query_param(
            "filter",
            "(investmentId = 5001000) and (planType = 'BUDGET')",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = Batch::single(
        Resource::CostPlan,
        Operation::GetMany,
        params(json!({
            "investmentIdFilter": 5001000,
            "filters": { "planType": "BUDGET" }
        })),
    );

    let output = run_batch(&client, &batch).await.unwrap();
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_lookup_values_path_and_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ppm/rest/v1/lookups/PRJ_STATUS/lookupValues"))
        .and(query_param("filter", "(isActive = true)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_results": [{ "id": "OPEN" }, { "id": "CLOSED" }],
            "_next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = Batch::single(
        Resource::Lookup,
        Operation::GetValues,
        params(json!({
            "lookupCode": "PRJ_STATUS",
            "returnAll": true,
            "options": { "isActive": true }
        })),
    );

    let output = run_batch(&client, &batch).await.unwrap();
    assert_eq!(output.len(), 2);
}

#[tokio::test]
async fn test_undefined_pair_produces_no_records() {
    let server = MockServer::start().await;

    let client = client_for(&server);
    let batch = Batch::single(Resource::UserProfile, Operation::Delete, Params::new());

    let output = run_batch(&client, &batch).await.unwrap();
    assert!(output.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

async fn mount_project_get(server: &MockServer, id: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/ppm/rest/v1/projects/{}", id)))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

fn three_item_batch(continue_on_fail: bool) -> Batch {
    Batch {
        resource: Resource::Project,
        operation: Operation::Get,
        items: vec![
            params(json!({ "projectId": "1" })),
            params(json!({ "projectId": "2" })),
            params(json!({ "projectId": "3" })),
        ],
        continue_on_fail,
    }
}

#[tokio::test]
async fn test_batch_aborts_on_first_failure() {
    let server = MockServer::start().await;
    mount_project_get(&server, "1", 200, json!({ "_internalId": 1 })).await;
    mount_project_get(
        &server,
        "2",
        500,
        json!({ "_errors": [{ "errorMessage": "boom" }] }),
    )
    .await;
    mount_project_get(&server, "3", 200, json!({ "_internalId": 3 })).await;

    let client = client_for(&server);
    let err = run_batch(&client, &three_item_batch(false)).await.unwrap_err();
    assert_eq!(err.message(), "boom");

    // Item 3 was never attempted.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_batch_continues_on_failure_with_tagged_error_record() {
    let server = MockServer::start().await;
    mount_project_get(&server, "1", 200, json!({ "_internalId": 1 })).await;
    mount_project_get(
        &server,
        "2",
        500,
        json!({ "_errors": [{ "errorMessage": "boom" }] }),
    )
    .await;
    mount_project_get(&server, "3", 200, json!({ "_internalId": 3 })).await;

    let client = client_for(&server);
    let output = run_batch(&client, &three_item_batch(true)).await.unwrap();

    assert_eq!(output.len(), 3);
    assert_eq!(output[0].item, 0);
    assert_eq!(output[0].json, json!({ "_internalId": 1 }));
    assert_eq!(output[1].item, 1);
    assert_eq!(output[1].json, json!({ "error": "boom" }));
    assert_eq!(output[2].item, 2);
    assert_eq!(output[2].json, json!({ "_internalId": 3 }));
}

#[tokio::test]
async fn test_user_profile_get_hits_virtual_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ppm/rest/v1/virtual/userProfile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userName": "admin",
            "email": "admin@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let batch = Batch::single(Resource::UserProfile, Operation::Get, Params::new());

    let output = run_batch(&client, &batch).await.unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].json["userName"], json!("admin"));
}
