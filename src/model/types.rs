//! Core type definitions for the application

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::Deserialize;

use super::entities::{Album, Artist, Song};

/// Which catalog view is shown on the home surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Dashboard,
    Artist,
    Album,
    Songs,
}

impl ActiveView {
    pub const ALL: [ActiveView; 4] = [
        ActiveView::Dashboard,
        ActiveView::Artist,
        ActiveView::Album,
        ActiveView::Songs,
    ];

    /// Map a view tag to a view. Unrecognized tags select the dashboard.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "artist" => ActiveView::Artist,
            "album" => ActiveView::Album,
            "songs" => ActiveView::Songs,
            _ => ActiveView::Dashboard,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ActiveView::Dashboard => "dashboard",
            ActiveView::Artist => "artist",
            ActiveView::Album => "album",
            ActiveView::Songs => "songs",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ActiveView::Dashboard => "Dashboard",
            ActiveView::Artist => "Artists",
            ActiveView::Album => "Albums",
            ActiveView::Songs => "Songs",
        }
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Server-assigned identifier of a catalog entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EntityId)
    }
}

/// Collection sizes shown on the dashboard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub artists: usize,
    pub albums: usize,
    pub songs: usize,
}

/// Whatever the active view last received from the catalog service
#[derive(Clone, Debug, Default)]
pub enum Listing {
    #[default]
    Empty,
    Dashboard(DashboardSummary),
    Artists(Vec<Artist>),
    Albums(Vec<Album>),
    Songs(Vec<Song>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Listing::Empty | Listing::Dashboard(_) => 0,
            Listing::Artists(items) => items.len(),
            Listing::Albums(items) => items.len(),
            Listing::Songs(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// UI state for the application
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub active_view: ActiveView,
    pub listing: Listing,
    /// Set when the listing holds search results rather than the full collection
    pub search_query: Option<String>,
    pub is_loading: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
}
