//! Resource selections and the sharing request payloads built from them.
//!
//! A [`ResourceSelection`] is what the sharing dialog hands over: any mix of data paths,
//! apps, analyses and tools. The classifier functions split it into the per-kind id lists
//! sent to the permission endpoints. Contents are not validated here; the API is the
//! authority on what a well-formed id looks like.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of entity being shared or permission-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Files and folders in the data store, addressed by path.
    Data,
    App,
    Analysis,
    Tool,
}

impl ResourceKind {
    /// All kinds in dispatch order.
    pub fn all() -> [Self; 4] {
        [Self::Data, Self::App, Self::Analysis, Self::Tool]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::App => "app",
            Self::Analysis => "analysis",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grant vs. revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingDirection {
    Share,
    Unshare,
}

/// Permission level. The set of levels belongs to the permission service; the ones the
/// portal itself offers get variants, anything else is carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Read,
    Write,
    Own,
    #[serde(untagged)]
    Other(String),
}

/// A selected data item. Listing rows carry more fields; only `path` matters for sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResource {
    pub path: String,
}

/// Apps are addressed by a composite id: the app id within its execution system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRef {
    pub id: String,
    pub system_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRef {
    pub id: String,
}

/// Heterogeneous selection of resources. An absent list and an empty list mean the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<PathResource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<AppRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyses: Option<Vec<AnalysisRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolRef>>,
}

/// Normalized app identifier as the apps service expects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppId {
    pub system_id: String,
    pub app_id: String,
}

/// Paths of the selected data items, in selection order. `None` when no paths were given.
pub fn get_paths(selection: &ResourceSelection) -> Option<Vec<String>> {
    selection
        .paths
        .as_ref()
        .map(|paths| paths.iter().map(|p| p.path.clone()).collect())
}

pub fn get_app_ids(selection: &ResourceSelection) -> Option<Vec<AppId>> {
    selection.apps.as_ref().map(|apps| {
        apps.iter()
            .map(|app| AppId {
                system_id: app.system_id.clone(),
                app_id: app.id.clone(),
            })
            .collect()
    })
}

pub fn get_analysis_ids(selection: &ResourceSelection) -> Option<Vec<String>> {
    selection
        .analyses
        .as_ref()
        .map(|analyses| analyses.iter().map(|a| a.id.clone()).collect())
}

pub fn get_tool_ids(selection: &ResourceSelection) -> Option<Vec<String>> {
    selection
        .tools
        .as_ref()
        .map(|tools| tools.iter().map(|t| t.id.clone()).collect())
}

/// `Some(list)` only when the list is present and non-empty.
pub fn non_empty<T>(list: Option<Vec<T>>) -> Option<Vec<T>> {
    list.filter(|items| !items.is_empty())
}

// ---- Sharing payloads ------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPermission {
    pub path: String,
    pub permission: PermissionLevel,
}

/// Grants for one user on a set of data paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSharing {
    pub user: String,
    pub paths: Vec<PathPermission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataUnsharing {
    pub user: String,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPermission {
    pub system_id: String,
    pub app_id: String,
    pub permission: PermissionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSharing {
    pub user: String,
    pub apps: Vec<AppPermission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUnsharing {
    pub user: String,
    pub apps: Vec<AppId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPermission {
    pub analysis_id: String,
    pub permission: PermissionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSharing {
    pub user: String,
    pub analyses: Vec<AnalysisPermission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisId {
    pub analysis_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisUnsharing {
    pub user: String,
    pub analyses: Vec<AnalysisId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPermission {
    pub tool_id: String,
    pub permission: PermissionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSharing {
    pub user: String,
    pub tools: Vec<ToolPermission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolId {
    pub tool_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUnsharing {
    pub user: String,
    pub tools: Vec<ToolId>,
}

/// Grants to apply, grouped by resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingRequests {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<DataSharing>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<AppSharing>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyses: Option<Vec<AnalysisSharing>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSharing>>,
}

/// Revocations to apply, grouped by resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsharingRequests {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<DataUnsharing>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<AppUnsharing>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyses: Option<Vec<AnalysisUnsharing>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolUnsharing>>,
}

/// One "apply sharing changes" action. Mixing a share and an unshare of the same
/// resource in one batch is unordered; callers keep them in separate batches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingUpdates {
    #[serde(default)]
    pub sharing: SharingRequests,
    #[serde(default)]
    pub unsharing: UnsharingRequests,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classifier_returns_none_for_absent_lists() {
        let selection = ResourceSelection::default();
        assert_eq!(get_paths(&selection), None);
        assert_eq!(get_app_ids(&selection), None);
        assert_eq!(get_analysis_ids(&selection), None);
        assert_eq!(get_tool_ids(&selection), None);
    }

    #[test]
    fn test_classifier_keeps_empty_lists_and_order() {
        let selection: ResourceSelection = serde_json::from_value(json!({
            "paths": [
                { "path": "/iplant/home/a/b.txt", "label": "b.txt" },
                { "path": "/iplant/home/a/c" }
            ],
            "apps": [{ "id": "app-1", "system_id": "de", "name": "Word Count" }],
            "analyses": []
        }))
        .unwrap();

        assert_eq!(
            get_paths(&selection),
            Some(vec!["/iplant/home/a/b.txt".to_string(), "/iplant/home/a/c".to_string()])
        );
        assert_eq!(
            get_app_ids(&selection),
            Some(vec![AppId { system_id: "de".into(), app_id: "app-1".into() }])
        );
        assert_eq!(get_analysis_ids(&selection), Some(vec![]));
        assert_eq!(non_empty(get_analysis_ids(&selection)), None);
        assert_eq!(get_tool_ids(&selection), None);
    }

    #[test]
    fn test_sharing_updates_deserialize_from_dialog_shape() {
        let updates: SharingUpdates = serde_json::from_value(json!({
            "sharing": {
                "data": [{ "user": "a", "paths": [{ "path": "/x", "permission": "read" }] }]
            },
            "unsharing": {}
        }))
        .unwrap();
        let data = updates.sharing.data.unwrap();
        assert_eq!(data[0].paths[0].permission, PermissionLevel::Read);
        assert!(updates.unsharing.data.is_none());
        assert!(updates.sharing.tools.is_none());
    }

    #[test]
    fn test_permission_level_serializes_lowercase() {
        assert_eq!(serde_json::to_value(PermissionLevel::Own).unwrap(), json!("own"));
    }

    #[test]
    fn test_unknown_permission_level_passes_through() {
        let updates: SharingUpdates = serde_json::from_value(json!({
            "sharing": {
                "analyses": [{ "user": "a", "analyses": [{ "analysis_id": "x", "permission": "admin" }] }]
            },
            "unsharing": {}
        }))
        .unwrap();
        let analyses = updates.sharing.analyses.as_ref().unwrap();
        assert_eq!(analyses[0].analyses[0].permission, PermissionLevel::Other("admin".into()));
        assert_eq!(
            serde_json::to_value(&updates.sharing).unwrap()["analyses"][0]["analyses"][0]["permission"],
            json!("admin")
        );
    }
}
