//! Create, update and delete in the active collection

use super::input::Assignment;
use super::AppController;
use crate::error::{CatalogError, Result};
use crate::model::{
    ActiveView, Attachment, CatalogEntity, EntityId, EntityPayload, ResourceClient,
};

/// Short field names accepted by the shell, per view
fn wire_field(view: ActiveView, key: &str) -> String {
    let mapped = match (view, key) {
        (ActiveView::Artist, "name") => "Artist_name",
        (ActiveView::Artist, "country") => "Country",
        (ActiveView::Album, "title") => "Album_title",
        (ActiveView::Album, "tracks") => "Total_tracks",
        (ActiveView::Songs, "name") => "Songs_name",
        (ActiveView::Songs, "genre") => "Gener",
        _ => key,
    };
    mapped.to_string()
}

/// Turn shell assignments into a payload, reading any uploads from disk.
pub(crate) async fn build_payload(
    view: ActiveView,
    assignments: &[Assignment],
) -> Result<EntityPayload> {
    let mut payload = EntityPayload::new();
    for assignment in assignments {
        match assignment {
            Assignment::Field { key, value } => payload.set_field(wire_field(view, key), value.clone()),
            Assignment::Upload { field, path } => {
                let attachment = Attachment::from_path(field, path).await.map_err(|e| {
                    CatalogError::validation(format!("Cannot read {}: {e}", path.display()))
                })?;
                payload = payload.attach(attachment);
            }
        }
    }
    Ok(payload)
}

impl AppController {
    pub async fn create_entry(&self, assignments: &[Assignment]) {
        let view = match self.editable_view().await {
            Ok(view) => view,
            Err(e) => return self.report("create", e).await,
        };
        let payload = match build_payload(view, assignments).await {
            Ok(payload) => payload,
            Err(e) => return self.report("create", e).await,
        };

        let result = match view {
            ActiveView::Artist => create_in(&self.catalog.artists, payload).await,
            ActiveView::Album => create_in(&self.catalog.albums, payload).await,
            ActiveView::Songs => create_in(&self.catalog.songs, payload).await,
            ActiveView::Dashboard => dashboard_not_editable(),
        };
        self.finish_mutation("create", result).await;
    }

    pub async fn update_entry(&self, id: EntityId, assignments: &[Assignment]) {
        let view = match self.editable_view().await {
            Ok(view) => view,
            Err(e) => return self.report("update", e).await,
        };
        let payload = match build_payload(view, assignments).await {
            Ok(payload) => payload,
            Err(e) => return self.report("update", e).await,
        };

        let result = match view {
            ActiveView::Artist => update_in(&self.catalog.artists, id, payload).await,
            ActiveView::Album => update_in(&self.catalog.albums, id, payload).await,
            ActiveView::Songs => update_in(&self.catalog.songs, id, payload).await,
            ActiveView::Dashboard => dashboard_not_editable(),
        };
        self.finish_mutation("update", result).await;
    }

    pub async fn delete_entry(&self, id: EntityId) {
        let view = match self.editable_view().await {
            Ok(view) => view,
            Err(e) => return self.report("delete", e).await,
        };

        let result = match view {
            ActiveView::Artist => delete_in(&self.catalog.artists, id).await,
            ActiveView::Album => delete_in(&self.catalog.albums, id).await,
            ActiveView::Songs => delete_in(&self.catalog.songs, id).await,
            ActiveView::Dashboard => dashboard_not_editable(),
        };
        self.finish_mutation("delete", result).await;
    }

    async fn editable_view(&self) -> Result<ActiveView> {
        self.ensure_home()?;
        match self.model.active_view().await {
            ActiveView::Dashboard => Err(CatalogError::validation(
                "Select artist, album or songs before editing",
            )),
            view => Ok(view),
        }
    }

    /// Report the outcome, then re-fetch the listing the mutation invalidated.
    async fn finish_mutation(&self, operation: &str, result: Result<String>) {
        match result {
            Ok(status) => {
                tracing::info!(operation, status = %status, "Mutation applied");
                self.model.clear_error().await;
                self.load_active_view().await;
                self.model.set_status(status).await;
            }
            Err(e) => self.report(operation, e).await,
        }
    }
}

fn dashboard_not_editable() -> Result<String> {
    Err(CatalogError::validation("The dashboard has nothing to edit"))
}

async fn create_in<T: CatalogEntity>(client: &ResourceClient<T>, payload: EntityPayload) -> Result<String> {
    let created = client.create(payload).await?;
    Ok(format!("{} \"{}\" created (id {})", T::LABEL, created.name(), created.id()))
}

async fn update_in<T: CatalogEntity>(
    client: &ResourceClient<T>,
    id: EntityId,
    payload: EntityPayload,
) -> Result<String> {
    let updated = client.update(id, payload).await?;
    Ok(format!("{} {} updated", T::LABEL, updated.id()))
}

async fn delete_in<T: CatalogEntity>(client: &ResourceClient<T>, id: EntityId) -> Result<String> {
    let ack = client.delete(id).await?;
    Ok(ack
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {id} deleted", T::LABEL)))
}
