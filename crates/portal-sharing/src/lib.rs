//! portal-sharing: the sharing service facade.
//!
//! [`SharingService`] issues share/unshare and permission requests through an [`ApiClient`].
//! The batched operations ([`SharingService::do_sharing_updates`] and
//! [`SharingService::get_permissions`]) send at most one request per resource kind and
//! direction, run them concurrently, and report results in a fixed kind order.

mod batch;
mod client;
mod error;
mod sharing;

pub use batch::{BatchReport, Operation, RequestBatch};
pub use client::{ApiClient, ApiRequest, HttpApiClient, Method};
pub use error::ApiError;
pub use sharing::{
    permissions_batch, permissions_endpoint, sharing_batch, sharing_endpoint, PermissionsQuery,
    SharingService, GET_PERMISSIONS_QUERY_KEY, SUBJECTS_ENDPOINT,
};
