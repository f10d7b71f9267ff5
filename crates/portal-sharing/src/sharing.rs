//! Sharing service facade: share/unshare calls per resource kind, permission lookups,
//! subject search, and the two batched operations used by the sharing dialog.
//!
//! | Operation            | Endpoint                                |
//! |----------------------|-----------------------------------------|
//! | share/unshare data   | `POST /api/share`                       |
//! | share apps           | `POST /api/apps/sharing`                |
//! | unshare apps         | `POST /api/apps/unsharing`              |
//! | share analyses       | `POST /api/analyses/sharing`            |
//! | unshare analyses     | `POST /api/analyses/unsharing`          |
//! | share tools          | `POST /api/tools/sharing`               |
//! | unshare tools        | `POST /api/tools/unsharing`             |
//! | data permissions     | `POST /api/filesystem/user-permissions` |
//! | app permissions      | `POST /api/apps/permission-lister`      |
//! | analysis permissions | `POST /api/analyses/permission-lister`  |
//! | tool permissions     | `POST /api/tools/permission-lister`     |
//! | subject search       | `GET /api/subjects?search=`             |

use crate::batch::{BatchReport, Operation, RequestBatch};
use crate::client::{ApiClient, ApiRequest, HttpApiClient};
use crate::error::ApiError;
use portal_core::{
    get_analysis_ids, get_app_ids, get_paths, get_tool_ids, non_empty, AnalysisSharing,
    AnalysisUnsharing, AppId, AppSharing, AppUnsharing, DataSharing, DataUnsharing, PortalConfig,
    ResourceKind, ResourceSelection, SharingDirection, SharingUpdates, ToolSharing, ToolUnsharing,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cache key under which callers store `get_permissions` results.
pub const GET_PERMISSIONS_QUERY_KEY: &str = "fetchSharingPermissions";

pub const SUBJECTS_ENDPOINT: &str = "/api/subjects";

pub fn sharing_endpoint(kind: ResourceKind, direction: SharingDirection) -> &'static str {
    use ResourceKind::*;
    use SharingDirection::*;
    match (kind, direction) {
        // Data grants and revocations share one endpoint; the body key tells them apart.
        (Data, _) => "/api/share",
        (App, Share) => "/api/apps/sharing",
        (App, Unshare) => "/api/apps/unsharing",
        (Analysis, Share) => "/api/analyses/sharing",
        (Analysis, Unshare) => "/api/analyses/unsharing",
        (Tool, Share) => "/api/tools/sharing",
        (Tool, Unshare) => "/api/tools/unsharing",
    }
}

pub fn permissions_endpoint(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Data => "/api/filesystem/user-permissions",
        ResourceKind::App => "/api/apps/permission-lister",
        ResourceKind::Analysis => "/api/analyses/permission-lister",
        ResourceKind::Tool => "/api/tools/permission-lister",
    }
}

/// Body key holding the id list of a permission lookup.
fn permissions_key(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Data => "paths",
        ResourceKind::App => "apps",
        ResourceKind::Analysis => "analyses",
        ResourceKind::Tool => "tools",
    }
}

fn sharing_request<T: Serialize>(
    kind: ResourceKind,
    direction: SharingDirection,
    entries: &[T],
) -> Result<ApiRequest, ApiError> {
    let key = match direction {
        SharingDirection::Share => "sharing",
        SharingDirection::Unshare => "unsharing",
    };
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), serde_json::to_value(entries)?);
    Ok(ApiRequest::post(
        sharing_endpoint(kind, direction),
        serde_json::Value::Object(body),
    ))
}

fn permissions_request<T: Serialize>(
    kind: ResourceKind,
    ids: &[T],
) -> Result<ApiRequest, ApiError> {
    let mut body = serde_json::Map::new();
    body.insert(permissions_key(kind).to_string(), serde_json::to_value(ids)?);
    Ok(ApiRequest::post(
        permissions_endpoint(kind),
        serde_json::Value::Object(body),
    ))
}

fn non_empty_slice<T>(list: &Option<Vec<T>>) -> Option<&[T]> {
    list.as_deref().filter(|items| !items.is_empty())
}

/// Parameters of a permission lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsQuery {
    #[serde(default)]
    pub resources: ResourceSelection,
}

/// One share-or-unshare batch: zero to eight requests, in data/apps/analyses/tools order
/// with the share request of each kind before its unshare request.
pub fn sharing_batch(updates: &SharingUpdates) -> Result<RequestBatch, ApiError> {
    use ResourceKind::*;
    use SharingDirection::*;

    fn add<T: Serialize>(
        batch: &mut RequestBatch,
        kind: ResourceKind,
        direction: SharingDirection,
        entries: &Option<Vec<T>>,
    ) -> Result<(), ApiError> {
        if let Some(entries) = non_empty_slice(entries) {
            let operation = match direction {
                Share => Operation::Share(kind),
                Unshare => Operation::Unshare(kind),
            };
            batch.push(operation, sharing_request(kind, direction, entries)?);
        }
        Ok(())
    }

    let SharingUpdates { sharing, unsharing } = updates;
    let mut batch = RequestBatch::new("sharing_updates");
    add(&mut batch, Data, Share, &sharing.data)?;
    add(&mut batch, Data, Unshare, &unsharing.data)?;
    add(&mut batch, App, Share, &sharing.apps)?;
    add(&mut batch, App, Unshare, &unsharing.apps)?;
    add(&mut batch, Analysis, Share, &sharing.analyses)?;
    add(&mut batch, Analysis, Unshare, &unsharing.analyses)?;
    add(&mut batch, Tool, Share, &sharing.tools)?;
    add(&mut batch, Tool, Unshare, &unsharing.tools)?;
    Ok(batch)
}

fn push_lookup<T: Serialize>(
    batch: &mut RequestBatch,
    kind: ResourceKind,
    ids: Option<Vec<T>>,
) -> Result<(), ApiError> {
    if let Some(ids) = non_empty(ids) {
        batch.push(Operation::ListPermissions(kind), permissions_request(kind, &ids)?);
    }
    Ok(())
}

/// One permission lookup per resource kind present in the selection, in
/// paths/apps/analyses/tools order.
pub fn permissions_batch(resources: &ResourceSelection) -> Result<RequestBatch, ApiError> {
    let mut batch = RequestBatch::new("permissions");
    for kind in ResourceKind::all() {
        match kind {
            ResourceKind::Data => push_lookup(&mut batch, kind, get_paths(resources))?,
            ResourceKind::App => push_lookup(&mut batch, kind, get_app_ids(resources))?,
            ResourceKind::Analysis => push_lookup(&mut batch, kind, get_analysis_ids(resources))?,
            ResourceKind::Tool => push_lookup(&mut batch, kind, get_tool_ids(resources))?,
        }
    }
    Ok(batch)
}

/// Facade over the portal's sharing endpoints. Holds no state besides the client.
#[derive(Clone)]
pub struct SharingService {
    client: Arc<dyn ApiClient>,
}

impl SharingService {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    /// Service over [`HttpApiClient`] built from config.
    pub fn from_config(config: &PortalConfig) -> Result<Self, ApiError> {
        Ok(Self::new(Arc::new(HttpApiClient::from_config(config)?)))
    }

    async fn send(
        &self,
        request: Result<ApiRequest, ApiError>,
    ) -> Result<serde_json::Value, ApiError> {
        self.client.call_api(request?).await
    }

    async fn send_sharing<T: Serialize>(
        &self,
        kind: ResourceKind,
        direction: SharingDirection,
        entries: &[T],
    ) -> Result<serde_json::Value, ApiError> {
        self.send(sharing_request(kind, direction, entries)).await
    }

    pub async fn data_sharing(
        &self,
        sharing: &[DataSharing],
    ) -> Result<serde_json::Value, ApiError> {
        self.send_sharing(ResourceKind::Data, SharingDirection::Share, sharing).await
    }

    pub async fn data_unsharing(
        &self,
        unsharing: &[DataUnsharing],
    ) -> Result<serde_json::Value, ApiError> {
        self.send_sharing(ResourceKind::Data, SharingDirection::Unshare, unsharing).await
    }

    pub async fn share_apps(&self, sharing: &[AppSharing]) -> Result<serde_json::Value, ApiError> {
        self.send_sharing(ResourceKind::App, SharingDirection::Share, sharing).await
    }

    pub async fn unshare_apps(
        &self,
        unsharing: &[AppUnsharing],
    ) -> Result<serde_json::Value, ApiError> {
        self.send_sharing(ResourceKind::App, SharingDirection::Unshare, unsharing).await
    }

    pub async fn share_analyses(
        &self,
        sharing: &[AnalysisSharing],
    ) -> Result<serde_json::Value, ApiError> {
        self.send_sharing(ResourceKind::Analysis, SharingDirection::Share, sharing).await
    }

    pub async fn unshare_analyses(
        &self,
        unsharing: &[AnalysisUnsharing],
    ) -> Result<serde_json::Value, ApiError> {
        self.send_sharing(ResourceKind::Analysis, SharingDirection::Unshare, unsharing).await
    }

    pub async fn share_tools(
        &self,
        sharing: &[ToolSharing],
    ) -> Result<serde_json::Value, ApiError> {
        self.send_sharing(ResourceKind::Tool, SharingDirection::Share, sharing).await
    }

    pub async fn unshare_tools(
        &self,
        unsharing: &[ToolUnsharing],
    ) -> Result<serde_json::Value, ApiError> {
        self.send_sharing(ResourceKind::Tool, SharingDirection::Unshare, unsharing).await
    }

    /// Users and groups matching `term` (surrounding whitespace ignored).
    pub async fn search_subjects(&self, term: &str) -> Result<serde_json::Value, ApiError> {
        let request = ApiRequest::get(SUBJECTS_ENDPOINT).with_param("search", term.trim());
        self.client.call_api(request).await
    }

    pub async fn get_resource_permissions(
        &self,
        paths: &[String],
    ) -> Result<serde_json::Value, ApiError> {
        self.send(permissions_request(ResourceKind::Data, paths)).await
    }

    pub async fn get_app_permissions(&self, apps: &[AppId]) -> Result<serde_json::Value, ApiError> {
        self.send(permissions_request(ResourceKind::App, apps)).await
    }

    pub async fn get_analysis_permissions(
        &self,
        analyses: &[String],
    ) -> Result<serde_json::Value, ApiError> {
        self.send(permissions_request(ResourceKind::Analysis, analyses)).await
    }

    pub async fn get_tool_permissions(
        &self,
        tools: &[String],
    ) -> Result<serde_json::Value, ApiError> {
        self.send(permissions_request(ResourceKind::Tool, tools)).await
    }

    /// Applies all grants and revocations concurrently. Resolves to the raw responses in
    /// request order, or fails with the first error; other requests are left to finish.
    pub async fn do_sharing_updates(
        &self,
        updates: &SharingUpdates,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        let batch = sharing_batch(updates)?;
        tracing::info!(requests = batch.len(), "applying sharing updates");
        batch.run(&self.client).await
    }

    /// Like [`SharingService::do_sharing_updates`] but waits for every request and reports
    /// each outcome, so the caller can tell which kinds were applied.
    pub async fn do_sharing_updates_settled(
        &self,
        updates: &SharingUpdates,
    ) -> Result<BatchReport, ApiError> {
        let batch = sharing_batch(updates)?;
        tracing::info!(requests = batch.len(), "applying sharing updates (settled)");
        Ok(batch.run_settled(&self.client).await)
    }

    /// Current permissions of every selected resource, one response per resource kind present.
    /// `key` only identifies the caller's cache entry.
    pub async fn get_permissions(
        &self,
        key: &str,
        query: &PermissionsQuery,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        let batch = permissions_batch(&query.resources)?;
        tracing::debug!(key, requests = batch.len(), "fetching sharing permissions");
        batch.run(&self.client).await
    }
}
