//! Reference test data for a fresh catalog

use anyhow::Context;

use crate::model::{
    AlbumDraft, ArtistDraft, CatalogClients, CatalogEntity, EntityPayload, ResourceClient, SongDraft,
};

/// Entries created per collection
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub removed: usize,
    pub artists: usize,
    pub albums: usize,
    pub songs: usize,
}

pub fn artists() -> Vec<ArtistDraft> {
    [("Queen", "UK"), ("The Weeknd", "Canada"), ("Eagles", "USA")]
        .into_iter()
        .map(|(name, country)| ArtistDraft {
            name: name.into(),
            country: country.into(),
            audio: None,
        })
        .collect()
}

pub fn albums() -> Vec<AlbumDraft> {
    [("Greatest Hits", 15), ("Summer Vibes", 20), ("Classic Collection", 12)]
        .into_iter()
        .map(|(title, total_tracks)| AlbumDraft {
            title: title.into(),
            total_tracks,
            audio: None,
        })
        .collect()
}

pub fn songs() -> Vec<SongDraft> {
    [
        ("Bohemian Rhapsody", "Rock"),
        ("Blinding Lights", "Pop"),
        ("Hotel California", "Rock"),
        ("Shape of You", "Pop"),
        ("Stairway to Heaven", "Rock"),
    ]
    .into_iter()
    .map(|(name, genre)| SongDraft {
        name: name.into(),
        genre: genre.into(),
        audio: None,
    })
    .collect()
}

/// Create the reference entries. With `replace`, existing entries are deleted first.
pub async fn seed_catalog(catalog: &CatalogClients, replace: bool) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();
    if replace {
        report.removed += clear(&catalog.artists).await?;
        report.removed += clear(&catalog.albums).await?;
        report.removed += clear(&catalog.songs).await?;
    }

    report.artists = create_all(&catalog.artists, artists()).await?;
    report.albums = create_all(&catalog.albums, albums()).await?;
    report.songs = create_all(&catalog.songs, songs()).await?;

    tracing::info!(?report, "Catalog seeded");
    Ok(report)
}

async fn clear<T: CatalogEntity>(client: &ResourceClient<T>) -> anyhow::Result<usize> {
    let existing = client
        .list()
        .await
        .with_context(|| format!("Listing {}", T::COLLECTION))?;
    for entry in &existing {
        client
            .delete(entry.id())
            .await
            .with_context(|| format!("Deleting {} {}", T::LABEL, entry.id()))?;
    }
    Ok(existing.len())
}

async fn create_all<T, D>(client: &ResourceClient<T>, drafts: Vec<D>) -> anyhow::Result<usize>
where
    T: CatalogEntity,
    D: Into<EntityPayload>,
{
    let count = drafts.len();
    for draft in drafts {
        let created = client
            .create(draft)
            .await
            .with_context(|| format!("Creating {}", T::LABEL))?;
        tracing::debug!(collection = T::COLLECTION, id = %created.id(), "Seeded entry");
    }
    Ok(count)
}
