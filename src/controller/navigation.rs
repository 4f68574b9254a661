//! View loading, dashboard and search

use super::{router, AppController};
use crate::error::Result;
use crate::model::{ActiveView, CatalogEntity, DashboardSummary, Listing, ResourceClient};

impl AppController {
    /// Switch to the view named by `tag` and load it.
    pub async fn select_view(&self, tag: &str) {
        let view = router::select_view(tag);
        tracing::debug!(tag, view = %view, "Selecting view");
        self.model.set_active_view(view).await;
        self.load_active_view().await;
    }

    /// Re-fetch whatever the active view shows.
    pub async fn load_active_view(&self) {
        if let Err(e) = self.ensure_home() {
            self.report("load view", e).await;
            return;
        }

        let view = self.model.active_view().await;
        self.model.set_content_loading(true).await;
        let result = match view {
            ActiveView::Dashboard => self.fetch_dashboard().await.map(Listing::Dashboard),
            ActiveView::Artist => fetch_all(&self.catalog.artists, Listing::Artists).await,
            ActiveView::Album => fetch_all(&self.catalog.albums, Listing::Albums).await,
            ActiveView::Songs => fetch_all(&self.catalog.songs, Listing::Songs).await,
        };

        match result {
            Ok(listing) => {
                tracing::info!(view = %view, items = listing.len(), "View loaded");
                self.model.set_listing(listing).await;
            }
            Err(e) => self.report("load view", e).await,
        }
    }

    /// All three collections, fetched concurrently.
    async fn fetch_dashboard(&self) -> Result<DashboardSummary> {
        let (artists, albums, songs) = futures::try_join!(
            self.catalog.artists.list(),
            self.catalog.albums.list(),
            self.catalog.songs.list()
        )?;
        Ok(DashboardSummary {
            artists: artists.len(),
            albums: albums.len(),
            songs: songs.len(),
        })
    }

    /// Search the active collection.
    pub async fn perform_search(&self, query: &str) {
        if let Err(e) = self.ensure_home() {
            self.report("search", e).await;
            return;
        }

        let view = self.model.active_view().await;
        tracing::debug!(query, view = %view, "Performing search");
        self.model.set_content_loading(true).await;
        let result = match view {
            ActiveView::Dashboard => {
                self.model.set_content_loading(false).await;
                self.model
                    .set_status("Select artist, album or songs to search".to_string())
                    .await;
                return;
            }
            ActiveView::Artist => search(&self.catalog.artists, query, Listing::Artists).await,
            ActiveView::Album => search(&self.catalog.albums, query, Listing::Albums).await,
            ActiveView::Songs => search(&self.catalog.songs, query, Listing::Songs).await,
        };

        match result {
            Ok(listing) => {
                tracing::info!(query, view = %view, matches = listing.len(), "Search completed successfully");
                self.model.set_search_results(query, listing).await;
            }
            Err(e) => self.report("search", e).await,
        }
    }
}

async fn fetch_all<T: CatalogEntity>(
    client: &ResourceClient<T>,
    wrap: fn(Vec<T>) -> Listing,
) -> Result<Listing> {
    client.list().await.map(wrap)
}

async fn search<T: CatalogEntity>(
    client: &ResourceClient<T>,
    query: &str,
    wrap: fn(Vec<T>) -> Listing,
) -> Result<Listing> {
    client.search(query).await.map(wrap)
}
