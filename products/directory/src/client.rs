use std::{sync::Arc, time::Duration};

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::{
    error::DirectoryError,
    model::{Employee, ListEnvelope, MutationEnvelope, SUCCESS_MARKER, SingleEnvelope},
};

pub const DEFAULT_BASE_URL: &str = "https://dummy.restapiexample.com/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Connection settings for the upstream directory.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub timeout: Duration,
    /// Upper bound on concurrent round trips. Excess calls wait for a permit.
    pub max_in_flight: usize,
}

impl UpstreamConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

/// Result of a create or delete round trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationReply {
    pub status: StatusCode,
    /// Envelope `status` field, only decoded for 2xx responses with a body.
    pub marker: Option<String>,
}

impl MutationReply {
    /// Both the HTTP status and the envelope marker must report success.
    pub fn succeeded(&self) -> bool {
        self.status.is_success() && self.marker.as_deref() == Some(SUCCESS_MARKER)
    }
}

/// HTTP adapter for the upstream employee API.
///
/// `reqwest::Client` is `Clone + Send + Sync` and the permit pool is shared,
/// so clones of this client draw from the same worker budget.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: Client,
    base: Url,
    permits: Arc<Semaphore>,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, DirectoryError> {
        if config.base_url.cannot_be_a_base() {
            return Err(DirectoryError::InvalidBaseUrl(config.base_url.to_string()));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base: config.base_url.clone(),
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    #[instrument(skip_all, fields(base = %self.base))]
    pub async fn list_employees(&self) -> Result<Vec<Employee>, DirectoryError> {
        let url = self.endpoint(&["employees"])?;
        let envelope: ListEnvelope = self.read(url).await?;
        debug!(marker = %envelope.status, count = envelope.data.len(), "listing decoded");
        Ok(envelope.data)
    }

    /// `Ok(None)` when the upstream answers 2xx without a record.
    #[instrument(skip_all, fields(base = %self.base, employee_id = %id))]
    pub async fn employee(&self, id: &str) -> Result<Option<Employee>, DirectoryError> {
        let url = self.endpoint(&["employee", id])?;
        let envelope: SingleEnvelope = self.read(url).await?;
        debug!(marker = %envelope.status, found = envelope.data.is_some(), "record decoded");
        Ok(envelope.data)
    }

    #[instrument(skip_all, fields(base = %self.base, keys = input.len()))]
    pub async fn create_employee(
        &self,
        input: &Map<String, Value>,
    ) -> Result<MutationReply, DirectoryError> {
        let url = self.endpoint(&["create"])?;
        self.mutate(Method::POST, url, Some(input)).await
    }

    #[instrument(skip_all, fields(base = %self.base, employee_id = %id))]
    pub async fn delete_employee(&self, id: &str) -> Result<MutationReply, DirectoryError> {
        let url = self.endpoint(&["delete", id])?;
        self.mutate(Method::DELETE, url, None).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| DirectoryError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read<T: DeserializeOwned>(&self, url: Url) -> Result<T, DirectoryError> {
        let (status, body) = self.round_trip(Method::GET, url, None).await?;
        if !status.is_success() {
            return Err(DirectoryError::Rejected(status));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn mutate(
        &self,
        method: Method,
        url: Url,
        input: Option<&Map<String, Value>>,
    ) -> Result<MutationReply, DirectoryError> {
        let (status, body) = self.round_trip(method, url, input).await?;
        if !status.is_success() {
            return Ok(MutationReply {
                status,
                marker: None,
            });
        }
        // An empty or `null` 2xx body carries no marker and reads as a refusal.
        let marker = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            serde_json::from_slice::<Option<MutationEnvelope>>(&body)?
                .and_then(|envelope| envelope.status)
        };
        Ok(MutationReply { status, marker })
    }

    async fn round_trip(
        &self,
        method: Method,
        url: Url,
        input: Option<&Map<String, Value>>,
    ) -> Result<(StatusCode, Vec<u8>), DirectoryError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DirectoryError::PoolClosed)?;
        let mut request = self.http.request(method.clone(), url);
        if let Some(input) = input {
            request = request.json(input);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        debug!(%method, %status, bytes = body.len(), "upstream responded");
        Ok((status, body))
    }
}
