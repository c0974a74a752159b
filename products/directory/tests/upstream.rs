//! Directory service against a mocked upstream API.

use std::time::Duration;

use httpmock::prelude::*;
use products_directory::{
    DirectoryService, EmployeeDirectory, UpstreamClient, UpstreamConfig,
};
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value, json};

fn service_at(base: &str, tune: impl FnOnce(&mut UpstreamConfig)) -> DirectoryService {
    let mut config = UpstreamConfig::new(Url::parse(base).unwrap());
    tune(&mut config);
    DirectoryService::new(UpstreamClient::new(&config).unwrap())
}

fn service_for(server: &MockServer) -> DirectoryService {
    service_at(&server.url("/api/v1"), |_| {})
}

fn john_doe_listing() -> Value {
    json!({
        "status": "success",
        "data": [{
            "id": "1",
            "employee_name": "John Doe",
            "employee_salary": "100000",
            "employee_age": "30",
            "profile_image": ""
        }]
    })
}

fn create_input() -> Map<String, Value> {
    match json!({ "name": "John Doe", "salary": "100000", "age": "30" }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn single_record_listing_drives_every_view() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/employees");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(john_doe_listing());
    });
    let service = service_for(&server);

    let highest = service.highest_salary().await;
    assert_eq!(highest.status, StatusCode::OK);
    assert_eq!(highest.body, Some(100_000));

    let top = service.top_ten_earners().await;
    assert_eq!(top.body, Some(vec![Some("John Doe".to_string())]));

    let hits = service.search_by_name("doe").await;
    assert_eq!(hits.status, StatusCode::OK);
    let hits = hits.body.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "1");
    assert_eq!(hits[0].salary, Some(100_000));

    let misses = service.search_by_name("xyz").await;
    assert_eq!(misses.status, StatusCode::OK);
    assert_eq!(misses.body, Some(vec![]));

    mock.assert_calls(4);
}

#[tokio::test]
async fn list_all_returns_the_snapshot_in_order() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/employees");
        then.status(200).json_body(json!({
            "status": "success",
            "data": [
                { "id": 2, "employee_name": "Garrett Winters", "employee_salary": 170750, "employee_age": 63, "profile_image": "" },
                { "id": "5", "employee_name": null, "employee_salary": "433060", "employee_age": "22" }
            ]
        }));
    });

    let outcome = service_for(&server).list_all().await;
    assert_eq!(outcome.status, StatusCode::OK);
    let employees = outcome.body.unwrap();
    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0].id, "2");
    assert_eq!(employees[0].salary, Some(170_750));
    assert_eq!(employees[1].name, None);
}

#[tokio::test]
async fn upstream_rejection_is_propagated_without_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/employees");
        then.status(429).body("Too Many Attempts.");
    });
    let service = service_for(&server);

    let listing = service.list_all().await;
    assert_eq!(listing.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(listing.body.is_none());

    let highest = service.highest_salary().await;
    assert_eq!(highest.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(highest.body.is_none());
}

#[tokio::test]
async fn malformed_salary_fails_the_whole_operation() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/employees");
        then.status(200).json_body(json!({
            "status": "success",
            "data": [
                { "id": "1", "employee_name": "A", "employee_salary": "100", "employee_age": "30" },
                { "id": "2", "employee_name": "B", "employee_salary": "n/a", "employee_age": "30" }
            ]
        }));
    });
    let service = service_for(&server);

    assert_eq!(
        service.highest_salary().await.status,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        service.top_ten_earners().await.status,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(service.list_all().await.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_salary_only_fails_aggregates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/employees");
        then.status(200).json_body(json!({
            "status": "success",
            "data": [{ "id": "1", "employee_name": "A" }]
        }));
    });
    let service = service_for(&server);

    assert_eq!(service.list_all().await.status, StatusCode::OK);
    let highest = service.highest_salary().await;
    assert_eq!(highest.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(highest.body.is_none());
}

#[tokio::test]
async fn undecodable_body_is_a_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/employees");
        then.status(200).body("<html>maintenance</html>");
    });

    let outcome = service_for(&server).search_by_name("a").await;
    assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(outcome.body.is_none());
}

#[tokio::test]
async fn get_by_id_reads_the_single_endpoint() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/employee/1");
        then.status(200).json_body(json!({
            "status": "success",
            "data": { "id": 1, "employee_name": "Tiger Nixon", "employee_salary": 320800, "employee_age": 61, "profile_image": "" }
        }));
    });

    let outcome = service_for(&server).get_by_id("1").await;
    mock.assert();
    assert_eq!(outcome.status, StatusCode::OK);
    let employee = outcome.body.unwrap();
    assert_eq!(employee.name.as_deref(), Some("Tiger Nixon"));
    assert_eq!(employee.age, Some(61));
}

#[tokio::test]
async fn get_by_id_without_record_is_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/employee/404");
        then.status(200)
            .json_body(json!({ "status": "success", "data": null }));
    });

    let outcome = service_for(&server).get_by_id("404").await;
    assert_eq!(outcome.status, StatusCode::NOT_FOUND);
    assert!(outcome.body.is_none());
}

#[tokio::test]
async fn get_by_id_propagates_upstream_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/employee/7");
        then.status(503);
    });

    let outcome = service_for(&server).get_by_id("7").await;
    assert_eq!(outcome.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn create_forwards_the_input_and_reports_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/create")
            .json_body(json!({ "name": "John Doe", "salary": "100000", "age": "30" }));
        then.status(200).json_body(json!({
            "status": "success",
            "data": { "name": "John Doe", "salary": "100000", "age": "30", "id": 25 }
        }));
    });

    let outcome = service_for(&server).create_employee(create_input()).await;
    mock.assert();
    assert_eq!(outcome.status, StatusCode::OK);
    assert_eq!(outcome.body.as_deref(), Some("success"));
}

#[tokio::test]
async fn create_with_business_failure_keeps_upstream_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/create");
        then.status(201)
            .json_body(json!({ "status": "error", "message": "duplicate" }));
    });

    let outcome = service_for(&server).create_employee(create_input()).await;
    assert_eq!(outcome.status, StatusCode::CREATED);
    assert_eq!(outcome.body.as_deref(), Some("failed"));
}

#[tokio::test]
async fn create_rejected_upstream_reports_failed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/create");
        then.status(400).json_body(json!({ "status": "success" }));
    });

    let outcome = service_for(&server).create_employee(create_input()).await;
    assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
    assert_eq!(outcome.body.as_deref(), Some("failed"));
}

#[tokio::test]
async fn delete_confirms_with_the_requested_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/delete/1");
        then.status(200)
            .json_body(json!({ "status": "success", "data": "1", "message": "deleted" }));
    });

    let outcome = service_for(&server).delete_by_id("1").await;
    mock.assert();
    assert_eq!(outcome.status, StatusCode::OK);
    assert_eq!(
        outcome.body.as_deref(),
        Some("Employee with id 1 has been successfully deleted.")
    );
}

#[tokio::test]
async fn delete_failure_reports_status_and_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/delete/9");
        then.status(200).json_body(json!({ "status": "failure" }));
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/delete/10");
        then.status(404);
    });
    let service = service_for(&server);

    let refused = service.delete_by_id("9").await;
    assert_eq!(refused.status, StatusCode::OK);
    assert_eq!(
        refused.body.as_deref(),
        Some("Failed to delete employee with id 9.")
    );

    let missing = service.delete_by_id("10").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.body.unwrap().starts_with("Failed to delete"));
}

#[tokio::test]
async fn mutation_without_marker_keeps_upstream_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/delete/1");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/delete/2");
        then.status(200).json_body(json!({ "status": null }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/create");
        then.status(200).body("null");
    });
    let service = service_for(&server);

    let empty = service.delete_by_id("1").await;
    assert_eq!(empty.status, StatusCode::NO_CONTENT);
    assert_eq!(
        empty.body.as_deref(),
        Some("Failed to delete employee with id 1.")
    );

    let null_marker = service.delete_by_id("2").await;
    assert_eq!(null_marker.status, StatusCode::OK);
    assert_eq!(
        null_marker.body.as_deref(),
        Some("Failed to delete employee with id 2.")
    );

    let null_body = service.create_employee(create_input()).await;
    assert_eq!(null_body.status, StatusCode::OK);
    assert_eq!(null_body.body.as_deref(), Some("failed"));
}

#[tokio::test]
async fn undecodable_mutation_reply_is_a_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/create");
        then.status(200).body("<html>maintenance</html>");
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/delete/3");
        then.status(200).body("{\"status\":");
    });
    let service = service_for(&server);

    let created = service.create_employee(create_input()).await;
    assert_eq!(created.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(created.body.as_deref(), Some("failed"));

    let deleted = service.delete_by_id("3").await;
    assert_eq!(deleted.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        deleted.body.as_deref(),
        Some("Failed to delete employee with id 3.")
    );
}

#[tokio::test]
async fn transport_failure_is_a_server_error_everywhere() {
    // Nothing listens on port 1.
    let service = service_at("http://127.0.0.1:1/api/v1", |_| {});
    let server_error = StatusCode::INTERNAL_SERVER_ERROR;

    assert_eq!(service.list_all().await.status, server_error);
    assert_eq!(service.search_by_name("doe").await.status, server_error);
    assert_eq!(service.highest_salary().await.status, server_error);
    assert_eq!(service.top_ten_earners().await.status, server_error);
    assert_eq!(service.get_by_id("1").await.status, server_error);

    let created = service.create_employee(create_input()).await;
    assert_eq!(created.status, server_error);
    assert_eq!(created.body.as_deref(), Some("failed"));

    let deleted = service.delete_by_id("1").await;
    assert_eq!(deleted.status, server_error);
    assert!(deleted.body.unwrap().starts_with("Failed to delete"));
}

#[tokio::test]
async fn slow_upstream_times_out_as_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/employees");
        then.status(200)
            .delay(Duration::from_millis(800))
            .json_body(john_doe_listing());
    });
    let service = service_at(&server.url("/api/v1"), |config| {
        config.timeout = Duration::from_millis(100);
    });

    let outcome = service.list_all().await;
    assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn saturated_pool_queues_instead_of_dropping() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/employees");
        then.status(200)
            .delay(Duration::from_millis(50))
            .json_body(john_doe_listing());
    });
    let service = service_at(&server.url("/api/v1"), |config| {
        config.max_in_flight = 1;
    });

    let (a, b, c) = tokio::join!(
        service.list_all(),
        service.highest_salary(),
        service.top_ten_earners()
    );
    assert_eq!(a.status, StatusCode::OK);
    assert_eq!(b.body, Some(100_000));
    assert_eq!(c.status, StatusCode::OK);
    mock.assert_calls(3);
}
