//! portal-core: shared types for the portal (resource selections, sharing payloads,
//! dashboard sections, subscription form mapping) and the API config.
//!
//! Nothing here performs I/O except [`PortalConfig::load`]; the network-facing pieces live in
//! `portal-sharing`.

pub mod dashboard;
mod resources;
pub mod subscriptions;
mod shared;

pub use shared::{PortalConfig, DEFAULT_CONFIG_PATH};

pub use resources::{
    get_analysis_ids, get_app_ids, get_paths, get_tool_ids, non_empty, AnalysisId,
    AnalysisPermission, AnalysisRef, AnalysisSharing, AnalysisUnsharing, AppId, AppPermission,
    AppRef, AppSharing, AppUnsharing, DataSharing, DataUnsharing, PathPermission, PathResource,
    PermissionLevel, ResourceKind, ResourceSelection, SharingDirection, SharingRequests,
    SharingUpdates, ToolId, ToolPermission, ToolRef, ToolSharing, ToolUnsharing,
    UnsharingRequests,
};

pub use dashboard::{classify, Layout, Section, SectionView};
