use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Typed result of a service operation: an HTTP status plus an optional body.
///
/// Services never surface raw errors to the routing layer. Every failure is
/// folded into an `Outcome` before it leaves the service boundary, so a
/// handler can hand the value straight back to axum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome<T> {
    pub status: StatusCode,
    pub body: Option<T>,
}

impl<T> Outcome<T> {
    pub fn ok(body: T) -> Self {
        Self::with_body(StatusCode::OK, body)
    }

    pub fn with_body(status: StatusCode, body: T) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// Status without a payload, used when an upstream read is rejected.
    pub fn status_only(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    /// The generic server-error outcome.
    pub fn server_error() -> Self {
        Self::status_only(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            status: self.status,
            body: self.body.map(f),
        }
    }

    /// Wrap the body for JSON rendering.
    pub fn json(self) -> Outcome<Json<T>> {
        self.map(Json)
    }
}

impl<T> IntoResponse for Outcome<T>
where
    T: IntoResponse,
{
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, body).into_response(),
            None => self.status.into_response(),
        }
    }
}
