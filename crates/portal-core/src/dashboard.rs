//! Dashboard sections: which data slice each section shows and how its items are laid out.
//!
//! | Section           | kind     | name          | Layout |
//! |-------------------|----------|---------------|--------|
//! | RecentAnalyses    | analyses | recent        | cards  |
//! | RunningAnalyses   | analyses | running       | cards  |
//! | RecentlyAddedApps | apps     | recentlyAdded | cards  |
//! | PublicApps        | apps     | public        | cards  |
//! | NewsFeed          | feeds    | news          | feed   |
//! | EventsFeed        | feeds    | events        | feed   |

use serde::{Deserialize, Serialize};

pub const KIND_ANALYSES: &str = "analyses";
pub const KIND_APPS: &str = "apps";
pub const KIND_FEEDS: &str = "feeds";
pub const KIND_EVENTS: &str = "events";

pub const SECTION_RECENT: &str = "recent";
pub const SECTION_RUNNING: &str = "running";
pub const SECTION_RECENTLY_ADDED: &str = "recentlyAdded";
pub const SECTION_PUBLIC: &str = "public";
pub const SECTION_NEWS: &str = "news";
pub const SECTION_EVENTS: &str = "events";

/// Root of every dashboard element id.
pub const ID_BASE: &str = "dashboard";

/// Builds an element id under [`ID_BASE`], e.g. `make_id(&["news", "3"])` -> `dashboard.news.3`.
pub fn make_id<S: AsRef<str>>(parts: &[S]) -> String {
    std::iter::once(ID_BASE)
        .chain(parts.iter().map(|p| p.as_ref()))
        .collect::<Vec<_>>()
        .join(".")
}

/// How a section's items are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Compact list of feed entries.
    Feed,
    /// Grid of cards.
    Cards,
}

/// Feed layout only for news/events sections of a feed-like kind; everything else is cards.
pub fn classify(kind: &str, name: &str) -> Layout {
    let feed_kind = kind == KIND_FEEDS || kind == KIND_EVENTS;
    let feed_section = name == SECTION_NEWS || name == SECTION_EVENTS;
    if feed_kind && feed_section {
        Layout::Feed
    } else {
        Layout::Cards
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    RecentAnalyses,
    RunningAnalyses,
    RecentlyAddedApps,
    PublicApps,
    NewsFeed,
    EventsFeed,
}

/// Static description of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionConfig {
    pub kind: &'static str,
    pub name: &'static str,
    /// Translation key for the section heading.
    pub label: &'static str,
    /// Id suffix appended to [`ID_BASE`].
    pub id: &'static str,
}

const SECTION_TABLE: [(Section, SectionConfig); 6] = [
    (
        Section::RecentAnalyses,
        SectionConfig { kind: KIND_ANALYSES, name: SECTION_RECENT, label: "recentAnalyses", id: "recentAnalyses" },
    ),
    (
        Section::RunningAnalyses,
        SectionConfig { kind: KIND_ANALYSES, name: SECTION_RUNNING, label: "runningAnalyses", id: "runningAnalyses" },
    ),
    (
        Section::RecentlyAddedApps,
        SectionConfig { kind: KIND_APPS, name: SECTION_RECENTLY_ADDED, label: "recentlyAddedApps", id: "recentlyAddedApps" },
    ),
    (
        Section::PublicApps,
        SectionConfig { kind: KIND_APPS, name: SECTION_PUBLIC, label: "publicApps", id: "publicApps" },
    ),
    (
        Section::NewsFeed,
        SectionConfig { kind: KIND_FEEDS, name: SECTION_NEWS, label: "newsFeed", id: "news" },
    ),
    (
        Section::EventsFeed,
        SectionConfig { kind: KIND_FEEDS, name: SECTION_EVENTS, label: "eventsFeed", id: "events" },
    ),
];

/// One rendered entry of a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionItem {
    pub key: String,
    pub content: serde_json::Value,
}

/// Everything the rendering layer needs for one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub id: String,
    pub kind: &'static str,
    pub section: &'static str,
    pub label: String,
    pub layout: Layout,
    pub show_divider: bool,
    pub items: Vec<SectionItem>,
}

impl Section {
    /// All sections in dashboard order.
    pub fn all() -> [Self; 6] {
        SECTION_TABLE.map(|(section, _)| section)
    }

    pub fn config(&self) -> SectionConfig {
        // Table rows follow variant declaration order.
        SECTION_TABLE[*self as usize].1
    }

    pub fn id(&self) -> String {
        make_id(&[self.config().id])
    }

    pub fn layout(&self) -> Layout {
        let config = self.config();
        classify(config.kind, config.name)
    }

    /// Finds the section shown for a `kind`/`name` data slice.
    pub fn from_kind_and_name(kind: &str, name: &str) -> Option<Self> {
        SECTION_TABLE
            .iter()
            .find(|(_, config)| config.kind == kind && config.name == name)
            .map(|(section, _)| *section)
    }

    /// Selects `data[kind][name]` from the dashboard payload. A missing slice renders empty.
    pub fn view<F>(&self, data: &serde_json::Value, translate: F, show_divider: bool) -> SectionView
    where
        F: Fn(&str) -> String,
    {
        let config = self.config();
        let id = self.id();
        let items = data
            .get(config.kind)
            .and_then(|by_name| by_name.get(config.name))
            .and_then(|v| v.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .map(|(index, content)| SectionItem {
                        key: make_id(&[config.id.to_string(), index.to_string()]),
                        content: content.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        SectionView {
            id,
            kind: config.kind,
            section: config.name,
            label: translate(config.label),
            layout: classify(config.kind, config.name),
            show_divider,
            items,
        }
    }
}
