use async_trait::async_trait;
use platform_api::Outcome;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::{
    client::UpstreamClient,
    error::DirectoryError,
    model::{Employee, SUCCESS_MARKER},
    transform::{self, TOP_EARNERS_LIMIT},
};

const CREATE_FAILED: &str = "failed";

/// The seven operations the routing layer exposes.
///
/// Implementations never fail: every error path is already folded into the
/// returned [`Outcome`].
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn list_all(&self) -> Outcome<Vec<Employee>>;

    async fn search_by_name(&self, fragment: &str) -> Outcome<Vec<Employee>>;

    async fn get_by_id(&self, id: &str) -> Outcome<Employee>;

    async fn highest_salary(&self) -> Outcome<i64>;

    async fn top_ten_earners(&self) -> Outcome<Vec<Option<String>>>;

    async fn create_employee(&self, input: Map<String, Value>) -> Outcome<String>;

    async fn delete_by_id(&self, id: &str) -> Outcome<String>;
}

/// Stateless read-through provider backed by the upstream API.
#[derive(Clone, Debug)]
pub struct DirectoryService {
    upstream: UpstreamClient,
}

impl DirectoryService {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }
}

#[async_trait]
impl EmployeeDirectory for DirectoryService {
    async fn list_all(&self) -> Outcome<Vec<Employee>> {
        info!("fetching all employees");
        let result = self.upstream.list_employees().await;
        if let Ok(employees) = &result {
            info!(count = employees.len(), "fetched employees");
        }
        settle("list employees", result)
    }

    async fn search_by_name(&self, fragment: &str) -> Outcome<Vec<Employee>> {
        info!(fragment, "searching employees by name");
        let result = self
            .upstream
            .list_employees()
            .await
            .map(|employees| transform::filter_by_name(employees, fragment));
        if let Ok(hits) = &result {
            info!(fragment, count = hits.len(), "name search matched");
        }
        settle("search employees", result)
    }

    async fn get_by_id(&self, id: &str) -> Outcome<Employee> {
        info!(employee_id = id, "fetching employee");
        match self.upstream.employee(id).await {
            Ok(Some(employee)) => Outcome::ok(employee),
            Ok(None) => {
                warn!(employee_id = id, "upstream returned no record");
                Outcome::status_only(StatusCode::NOT_FOUND)
            }
            Err(err) => settle("fetch employee", Err(err)),
        }
    }

    async fn highest_salary(&self) -> Outcome<i64> {
        info!("computing highest salary");
        let result = self
            .upstream
            .list_employees()
            .await
            .and_then(|employees| transform::highest_salary(&employees));
        if let Ok(highest) = &result {
            info!(highest, "highest salary computed");
        }
        settle("highest salary", result)
    }

    async fn top_ten_earners(&self) -> Outcome<Vec<Option<String>>> {
        info!("ranking top earners");
        let result = self
            .upstream
            .list_employees()
            .await
            .and_then(|employees| transform::top_earners(employees, TOP_EARNERS_LIMIT));
        if let Ok(names) = &result {
            info!(count = names.len(), "top earners ranked");
        }
        settle("top earners", result)
    }

    async fn create_employee(&self, input: Map<String, Value>) -> Outcome<String> {
        info!(keys = ?input.keys().collect::<Vec<_>>(), "creating employee");
        match self.upstream.create_employee(&input).await {
            Ok(reply) if reply.succeeded() => {
                info!(status = %reply.status, "employee created");
                Outcome::ok(SUCCESS_MARKER.to_string())
            }
            Ok(reply) => {
                warn!(status = %reply.status, marker = ?reply.marker, "employee creation refused");
                Outcome::with_body(reply.status, CREATE_FAILED.to_string())
            }
            Err(err) => {
                error!(error = %err, "employee creation failed");
                Outcome::with_body(err.status(), CREATE_FAILED.to_string())
            }
        }
    }

    async fn delete_by_id(&self, id: &str) -> Outcome<String> {
        info!(employee_id = id, "deleting employee");
        match self.upstream.delete_employee(id).await {
            Ok(reply) if reply.succeeded() => {
                info!(employee_id = id, "employee deleted");
                Outcome::ok(format!(
                    "Employee with id {id} has been successfully deleted."
                ))
            }
            Ok(reply) => {
                warn!(employee_id = id, status = %reply.status, marker = ?reply.marker, "employee deletion refused");
                Outcome::with_body(reply.status, delete_failed(id))
            }
            Err(err) => {
                error!(employee_id = id, error = %err, "employee deletion failed");
                Outcome::with_body(err.status(), delete_failed(id))
            }
        }
    }
}

fn delete_failed(id: &str) -> String {
    format!("Failed to delete employee with id {id}.")
}

/// Fold a read result into an outcome, logging the failure once.
fn settle<T>(operation: &'static str, result: Result<T, DirectoryError>) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::ok(value),
        Err(DirectoryError::Rejected(status)) => {
            warn!(operation, %status, "upstream rejected read");
            Outcome::status_only(status)
        }
        Err(err) => {
            error!(operation, error = %err, "upstream read failed");
            Outcome::server_error()
        }
    }
}
