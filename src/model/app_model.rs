//! Main application model with state management

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::types::{ActiveView, Listing, UiState};

/// Errors stay on screen this long unless dismissed
pub const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

/// Main application model containing all state
pub struct AppModel {
    pub ui_state: Arc<Mutex<UiState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // View & Listing
    // ========================================================================

    pub async fn active_view(&self) -> ActiveView {
        self.ui_state.lock().await.active_view
    }

    /// Switch views. The previous listing belongs to the old view and is dropped.
    pub async fn set_active_view(&self, view: ActiveView) {
        let mut state = self.ui_state.lock().await;
        if state.active_view != view {
            state.listing = Listing::Empty;
            state.search_query = None;
        }
        state.active_view = view;
    }

    pub async fn set_content_loading(&self, loading: bool) {
        self.ui_state.lock().await.is_loading = loading;
    }

    pub async fn set_listing(&self, listing: Listing) {
        let mut state = self.ui_state.lock().await;
        state.listing = listing;
        state.search_query = None;
        state.is_loading = false;
    }

    pub async fn set_search_results(&self, query: &str, listing: Listing) {
        let mut state = self.ui_state.lock().await;
        state.listing = listing;
        state.search_query = Some(query.to_string());
        state.is_loading = false;
    }

    /// Forget everything tied to the previous session.
    pub async fn reset(&self) {
        let mut state = self.ui_state.lock().await;
        *state = UiState::default();
    }

    // ========================================================================
    // Messages
    // ========================================================================

    pub async fn set_status(&self, message: String) {
        self.ui_state.lock().await.status_message = Some(message);
    }

    pub async fn take_status(&self) -> Option<String> {
        self.ui_state.lock().await.status_message.take()
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
        state.is_loading = false;
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed() > ERROR_DISPLAY_TIME {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}
