//! Controller module - Application logic and command handling
//!
//! The controller coordinates the session, the router and the catalog clients
//! on behalf of the shell, and records every outcome in the model.
//!
//! - `router`: access gate and view selection
//! - `account`: login, signup, logout
//! - `navigation`: loading views, dashboard and search
//! - `editing`: create, update, delete in the active collection
//! - `input`: shell command parsing and dispatch

pub mod router;
mod account;
mod navigation;
mod editing;
mod input;

use std::sync::Arc;

pub use input::{Assignment, Command};
pub use router::{Route, ViewRouter};

use crate::error::{CatalogError, Result};
use crate::model::{AppModel, CatalogClients, SessionStore};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
    pub(crate) session: SessionStore,
    pub(crate) router: ViewRouter,
    pub(crate) catalog: CatalogClients,
}

impl AppController {
    pub fn new(model: Arc<AppModel>, session: SessionStore, catalog: CatalogClients) -> Self {
        let router = ViewRouter::attach(session.clone());
        Self {
            model,
            session,
            router,
            catalog,
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    /// Catalog work only happens behind the gate.
    pub(crate) fn ensure_home(&self) -> Result<()> {
        if self.router.can_render(Route::Home) {
            Ok(())
        } else {
            Err(CatalogError::auth("Please log in first"))
        }
    }

    pub(crate) fn format_error(error: &CatalogError) -> String {
        error.user_message()
    }

    pub(crate) async fn report(&self, context: &str, error: CatalogError) {
        tracing::error!(context, kind = ?error.kind(), error = %error, "Operation failed");
        self.model.set_error(Self::format_error(&error)).await;
    }
}
