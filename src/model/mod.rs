//! Model module - Application state and data types
//!
//! - `types`: view selection, identifiers, UI state
//! - `entities`: catalog entities and create/update payloads
//! - `catalog_client`: uniform CRUD + search client per collection
//! - `session`: authenticated identity and its observers
//! - `app_model`: view state consumed by the shell

mod types;
mod entities;
mod catalog_client;
mod session;
mod app_model;

pub use types::{ActiveView, DashboardSummary, EntityId, Listing, UiState};

pub use entities::{
    Album, AlbumDraft, Artist, ArtistDraft, Attachment, CatalogEntity, EntityPayload, Song,
    SongDraft, AUDIO_FIELD,
};

pub use catalog_client::{CatalogClients, DeleteAck, ResourceClient};

pub use session::{Identity, Session, SessionStore, SubscriptionId};

pub use app_model::{AppModel, ERROR_DISPLAY_TIME};
