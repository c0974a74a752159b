//! Employee directory facade.
//!
//! Every operation re-reads the upstream snapshot, applies a pure transform
//! and folds the result into a [`platform_api::Outcome`]. Nothing is cached.

mod client;
mod error;
pub mod model;
mod service;
pub mod transform;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_MAX_IN_FLIGHT, DEFAULT_TIMEOUT, MutationReply, UpstreamClient,
    UpstreamConfig,
};
pub use error::DirectoryError;
pub use model::Employee;
pub use service::{DirectoryService, EmployeeDirectory};
